//! SQLite storage implementation for PriceSync.
//!
//! This crate provides all database-related functionality using Diesel ORM with SQLite.
//! It implements the store traits defined in `pricesync-core` and contains:
//! - Database connection pooling and management
//! - Diesel migrations
//! - The single-writer actor every write goes through
//! - Repository implementations for securities and daily prices
//!
//! # Architecture
//!
//! This crate is the only place in the application where Diesel dependencies exist.
//!
//! ```text
//!            core (domain, traits)
//!                  │
//!                  ▼
//!          storage-sqlite (this crate)
//!                  │
//!                  ▼
//!              SQLite DB
//! ```

pub mod db;
pub mod errors;
pub mod schema;

// Repository implementations
pub mod prices;
pub mod securities;

// Re-export database utilities
pub use db::{
    create_pool, get_connection, get_db_path, init, run_migrations, spawn_writer, DbConnection,
    DbPool, WriteHandle,
};

// Re-export storage errors and conversion helpers
pub use errors::{IntoCore, StorageError};

pub use prices::PriceRepository;
pub use securities::SecurityRepository;

// Re-export from pricesync-core for convenience
pub use pricesync_core::errors::{DatabaseError, Error, Result};
