//! SQLite storage implementation for securities.

mod model;
mod repository;

pub use model::{SecurityChangesetDB, SecurityDB};
pub use repository::SecurityRepository;
