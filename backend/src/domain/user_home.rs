//! Repository facade over the user store.
//!
//! Controllers talk to [`UserHome`] only. It forwards each call to the
//! configured [`UserStore`] and converts persistence failures into domain
//! errors; it adds no other behaviour.

use std::sync::Arc;

use crate::domain::ports::{ReferenceItem, UserPersistenceError, UserStore};
use crate::domain::{Error, User, UserId, UserName};

/// Entry point for user persistence.
#[derive(Clone)]
pub struct UserHome {
    store: Arc<dyn UserStore>,
}

impl UserHome {
    /// Wrap a store adapter.
    pub fn new(store: Arc<dyn UserStore>) -> Self {
        Self { store }
    }

    fn map_persistence_error(error: UserPersistenceError) -> Error {
        match error {
            UserPersistenceError::Connection { message } => {
                Error::service_unavailable(format!("user store unavailable: {message}"))
            }
            UserPersistenceError::Query { message } => {
                Error::internal(format!("user store error: {message}"))
            }
        }
    }

    /// Persist a new user and return it with its generated id.
    pub async fn create(&self, name: &UserName) -> Result<User, Error> {
        self.store
            .insert(name)
            .await
            .map_err(Self::map_persistence_error)
    }

    /// Overwrite an existing user.
    pub async fn update(&self, user: &User) -> Result<(), Error> {
        self.store
            .store(user)
            .await
            .map_err(Self::map_persistence_error)
    }

    /// Delete a user; absent ids are ignored.
    pub async fn remove(&self, id: UserId) -> Result<(), Error> {
        self.store
            .delete(id)
            .await
            .map_err(Self::map_persistence_error)
    }

    /// Look a user up by id.
    pub async fn find_by_primary_key(&self, id: UserId) -> Result<Option<User>, Error> {
        self.store
            .load(id)
            .await
            .map_err(Self::map_persistence_error)
    }

    /// Every stored user.
    pub async fn get_users_list(&self) -> Result<Vec<User>, Error> {
        self.store
            .list_all()
            .await
            .map_err(Self::map_persistence_error)
    }

    /// Keys of every stored user.
    pub async fn get_id_users_list(&self) -> Result<Vec<UserId>, Error> {
        self.store
            .list_all_ids()
            .await
            .map_err(Self::map_persistence_error)
    }

    /// Every user as an id/name pair for selection lists.
    pub async fn get_users_reference_list(&self) -> Result<Vec<ReferenceItem>, Error> {
        self.store
            .list_all_as_reference()
            .await
            .map_err(Self::map_persistence_error)
    }
}
