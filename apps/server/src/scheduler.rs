//! Background scheduler for the daily price update.
//!
//! Runs `DailyUpdateJob` once a day at a fixed UTC wall-clock time.

use std::sync::Arc;

use chrono::{DateTime, Duration as ChronoDuration, NaiveTime, Utc};
use tokio::time::Duration;
use tracing::{error, info, warn};

use pricesync_core::sync::DailyUpdateJob;

use crate::main_lib::AppState;

/// Starts the background daily update scheduler.
pub fn start_daily_update_scheduler(state: Arc<AppState>, at: NaiveTime) {
    let job = state.daily_job.clone();
    tokio::spawn(async move {
        info!("Daily update scheduler started ({} UTC)", at.format("%H:%M"));
        loop {
            let wait = duration_until_next_run(Utc::now(), at);
            info!("Next daily update in {} minutes", wait.as_secs() / 60);
            tokio::time::sleep(wait).await;
            run_daily_update(&job).await;
        }
    });
}

/// Runs the job once and logs the outcome.
pub async fn run_daily_update(job: &DailyUpdateJob) {
    info!("Running daily price update...");
    match job.run().await {
        Ok(summary) => {
            let overview = summary.overview();
            if let Some(cleanup_error) = &overview.cleanup_error {
                warn!("Daily update cleanup failed: {}", cleanup_error);
            }
            info!(
                "Daily update completed: {}/{} symbols updated, {} failed, {:?} points pruned in {} ms",
                overview.succeeded,
                overview.total,
                overview.failed,
                overview.deleted_points,
                overview.duration_ms
            );
        }
        Err(e) => error!("Daily update failed: {}", e),
    }
}

/// Time from `now` until the next occurrence of `at` (UTC). A run time equal
/// to `now` is scheduled for the following day.
pub fn duration_until_next_run(now: DateTime<Utc>, at: NaiveTime) -> Duration {
    let today = now.date_naive().and_time(at).and_utc();
    let next = if today > now {
        today
    } else {
        today + ChronoDuration::days(1)
    };
    (next - now).to_std().unwrap_or(Duration::ZERO)
}
