//! HTTP inbound adapter: operator login and the user pages.

pub mod auth;
pub mod error;
pub mod session;
pub mod state;
pub mod surface;
#[cfg(test)]
pub mod test_utils;
pub mod user_pages;

pub use error::ApiResult;
