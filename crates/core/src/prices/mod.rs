//! Daily price points keyed by (symbol, date).

pub mod model;
pub mod store;

pub use model::DailyPricePoint;
pub use store::PriceStore;
