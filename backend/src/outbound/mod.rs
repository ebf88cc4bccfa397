//! Outbound adapters implementing the `UserStore` port.
//!
//! - **persistence**: PostgreSQL via Diesel, `diesel-async` and `bb8`.
//! - **memory**: process-local table used without a database.
//!
//! Adapters translate between rows and domain types and hold no business
//! rules.

pub mod memory;
pub mod persistence;
