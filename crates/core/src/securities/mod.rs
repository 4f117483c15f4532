//! Securities: one record per tracked symbol.
//!
//! - [`model`] - Security and the upsert payload
//! - [`store`] - Storage trait

pub mod model;
pub mod store;

pub use model::{NewSecurity, Security};
pub use store::SecurityStore;
