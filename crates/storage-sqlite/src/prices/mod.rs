//! SQLite storage implementation for daily price points.

mod model;
mod repository;

pub use model::{DailyPriceDB, DATE_FORMAT};
pub use repository::PriceRepository;
