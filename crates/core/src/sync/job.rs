//! Daily update of every tracked security.
//!
//! Pages through the tracked symbols, runs one batch per page with a pause
//! between pages, then drops price points older than the retention window.
//! Paging is a policy of this job only; the batch scheduler knows nothing
//! about it.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Duration as ChronoDuration, NaiveDate, Utc};
use log::{error, info};
use serde::Serialize;

use super::model::BatchReport;
use super::service::SyncServiceTrait;
use crate::constants::*;
use crate::errors::{Error, Result};

/// Paging, pacing and retention settings for the daily job.
#[derive(Debug, Clone, PartialEq)]
pub struct DailyUpdatePolicy {
    pub page_size: usize,
    pub page_delay: Duration,
    pub concurrency: usize,
    pub retention_days: i64,
}

impl Default for DailyUpdatePolicy {
    fn default() -> Self {
        Self {
            page_size: DAILY_PAGE_SIZE,
            page_delay: Duration::from_secs(DAILY_PAGE_DELAY_SECS),
            concurrency: DAILY_CONCURRENCY,
            retention_days: PRICE_RETENTION_DAYS,
        }
    }
}

impl DailyUpdatePolicy {
    pub fn validate(&self) -> Result<()> {
        if self.page_size == 0 || self.concurrency == 0 {
            return Err(Error::InvalidConfigValue(
                "page_size and concurrency must be at least 1".to_string(),
            ));
        }
        if self.retention_days < 0 {
            return Err(Error::InvalidConfigValue(format!(
                "retention_days must not be negative, got {}",
                self.retention_days
            )));
        }
        Ok(())
    }
}

/// Result of one daily run.
#[derive(Debug, Clone)]
pub struct DailyUpdateSummary {
    pub report: BatchReport,
    pub pages: usize,
    pub cutoff: NaiveDate,
    /// Points removed by retention cleanup, if cleanup succeeded.
    pub deleted_points: Option<usize>,
    pub cleanup_error: Option<String>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

/// Compact, serializable view of a [`DailyUpdateSummary`] for logs and APIs.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyUpdateOverview {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub success_rate: f64,
    pub pages: usize,
    pub deleted_points: Option<usize>,
    pub cleanup_error: Option<String>,
    pub duration_ms: i64,
}

impl DailyUpdateSummary {
    pub fn overview(&self) -> DailyUpdateOverview {
        DailyUpdateOverview {
            total: self.report.total,
            succeeded: self.report.succeeded.len(),
            failed: self.report.failed.len(),
            success_rate: self.report.success_rate(),
            pages: self.pages,
            deleted_points: self.deleted_points,
            cleanup_error: self.cleanup_error.clone(),
            duration_ms: (self.finished_at - self.started_at).num_milliseconds(),
        }
    }
}

pub struct DailyUpdateJob {
    service: Arc<dyn SyncServiceTrait>,
    policy: DailyUpdatePolicy,
}

impl DailyUpdateJob {
    pub fn new(service: Arc<dyn SyncServiceTrait>, policy: DailyUpdatePolicy) -> Result<Self> {
        policy.validate()?;
        Ok(Self { service, policy })
    }

    pub fn policy(&self) -> &DailyUpdatePolicy {
        &self.policy
    }

    /// Run the job for today's UTC date.
    pub async fn run(&self) -> Result<DailyUpdateSummary> {
        self.run_for(Utc::now().date_naive()).await
    }

    /// Run the job as of `today`; retention is measured from this date.
    pub async fn run_for(&self, today: NaiveDate) -> Result<DailyUpdateSummary> {
        let started_at = Utc::now();
        let symbols = self.service.tracked_symbols()?;
        let cutoff = today - ChronoDuration::days(self.policy.retention_days);

        let mut report = BatchReport::default();
        if symbols.is_empty() {
            info!("Daily update: no tracked symbols, nothing to do");
            return Ok(DailyUpdateSummary {
                report,
                pages: 0,
                cutoff,
                deleted_points: None,
                cleanup_error: None,
                started_at,
                finished_at: Utc::now(),
            });
        }

        let pages: Vec<&[String]> = symbols.chunks(self.policy.page_size).collect();
        info!(
            "Daily update: {} symbols in {} pages of {}",
            symbols.len(),
            pages.len(),
            self.policy.page_size
        );

        for (index, page) in pages.iter().enumerate() {
            if index > 0 && !self.policy.page_delay.is_zero() {
                info!(
                    "Waiting {:?} before page {}/{}",
                    self.policy.page_delay,
                    index + 1,
                    pages.len()
                );
                tokio::time::sleep(self.policy.page_delay).await;
            }

            let page_report = self
                .service
                .synchronize(page, self.policy.concurrency)
                .await?;
            info!("Page {}/{}: {}", index + 1, pages.len(), page_report.summary());
            report.merge(page_report);
        }

        let (deleted_points, cleanup_error) = match self.service.cleanup_before(cutoff).await {
            Ok(deleted) => (Some(deleted), None),
            Err(e) => {
                error!("Retention cleanup before {} failed: {}", cutoff, e);
                (None, Some(e.to_string()))
            }
        };

        let summary = DailyUpdateSummary {
            report,
            pages: pages.len(),
            cutoff,
            deleted_points,
            cleanup_error,
            started_at,
            finished_at: Utc::now(),
        };
        info!(
            "Daily update finished: {} ({:.1}% success)",
            summary.report.summary(),
            summary.report.success_rate()
        );
        Ok(summary)
    }
}
