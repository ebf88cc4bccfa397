//! Driven port for durable user storage.
//!
//! Adapters perform one parameterised statement per call and never hold a
//! connection beyond it. Absence is reported as `None` or as a silent no-op,
//! never as an error.

use async_trait::async_trait;
use serde::Serialize;

use crate::domain::{User, UserId, UserName};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by user store adapters.
    pub enum UserPersistenceError {
        /// Storage could not be reached or the connection was lost.
        Connection { message: String } => "user store connection failed: {message}",
        /// A statement failed during execution.
        Query { message: String } => "user store query failed: {message}",
    }
}

/// `(id, label)` pair for selection widgets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReferenceItem {
    pub id: UserId,
    pub label: String,
}

impl From<User> for ReferenceItem {
    fn from(user: User) -> Self {
        Self {
            id: user.id(),
            label: user.name().to_string(),
        }
    }
}

/// CRUD operations on the `testmoussia_user` table.
///
/// Listing operations return rows in storage-native order; the three listing
/// calls share that contract.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a row and return it with the store-generated key.
    async fn insert(&self, name: &UserName) -> Result<User, UserPersistenceError>;

    /// Look a user up by primary key.
    async fn load(&self, id: UserId) -> Result<Option<User>, UserPersistenceError>;

    /// Overwrite the name of the row keyed by `user.id()`. No row is a no-op.
    async fn store(&self, user: &User) -> Result<(), UserPersistenceError>;

    /// Delete the row keyed by `id`. No row is a no-op.
    async fn delete(&self, id: UserId) -> Result<(), UserPersistenceError>;

    /// Every user.
    async fn list_all(&self) -> Result<Vec<User>, UserPersistenceError>;

    /// Every key.
    async fn list_all_ids(&self) -> Result<Vec<UserId>, UserPersistenceError>;

    /// Every user as a reference pair.
    async fn list_all_as_reference(&self) -> Result<Vec<ReferenceItem>, UserPersistenceError>;
}
