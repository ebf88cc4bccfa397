//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! `diesel-async` drives queries over a `bb8` pool; row structs (`models`) and
//! the table definition (`schema`) stay private to this module so the domain
//! only sees `User`.
//!
//! ```ignore
//! use backend::outbound::persistence::{DbPool, DieselUserStore, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/moussia")).await?;
//! let store = DieselUserStore::new(pool);
//! ```

mod diesel_user_store;
mod error_mapping;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_user_store::DieselUserStore;
pub use migrations::{MIGRATIONS, MigrationError, run_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
