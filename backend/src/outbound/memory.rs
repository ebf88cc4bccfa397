//! Process-local `UserStore`.
//!
//! Used when no database URL is configured and by HTTP tests. Keys are issued
//! from a counter starting at 1, like the `SERIAL` column, and listings come
//! back in key order.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use crate::domain::ports::{ReferenceItem, UserPersistenceError, UserStore};
use crate::domain::{User, UserId, UserName};

#[derive(Debug, Default)]
struct Table {
    last_id: i32,
    rows: BTreeMap<UserId, UserName>,
}

/// Mutex-guarded in-memory table.
#[derive(Debug, Default)]
pub struct InMemoryUserStore {
    table: Mutex<Table>,
}

impl InMemoryUserStore {
    /// Create an empty store whose keys start at 1.
    pub fn new() -> Self {
        Self::default()
    }

    fn table(&self) -> Result<MutexGuard<'_, Table>, UserPersistenceError> {
        self.table
            .lock()
            .map_err(|_| UserPersistenceError::connection("in-memory user table poisoned"))
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn insert(&self, name: &UserName) -> Result<User, UserPersistenceError> {
        let mut table = self.table()?;
        let next = table
            .last_id
            .checked_add(1)
            .ok_or_else(|| UserPersistenceError::query("user id sequence exhausted"))?;
        let id = UserId::new(next).map_err(|err| UserPersistenceError::query(err.to_string()))?;
        table.last_id = next;
        table.rows.insert(id, name.clone());
        Ok(User::new(id, name.clone()))
    }

    async fn load(&self, id: UserId) -> Result<Option<User>, UserPersistenceError> {
        let table = self.table()?;
        Ok(table
            .rows
            .get(&id)
            .map(|name| User::new(id, name.clone())))
    }

    async fn store(&self, user: &User) -> Result<(), UserPersistenceError> {
        let mut table = self.table()?;
        if let Some(name) = table.rows.get_mut(&user.id()) {
            *name = user.name().clone();
        }
        Ok(())
    }

    async fn delete(&self, id: UserId) -> Result<(), UserPersistenceError> {
        self.table()?.rows.remove(&id);
        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<User>, UserPersistenceError> {
        let table = self.table()?;
        Ok(table
            .rows
            .iter()
            .map(|(id, name)| User::new(*id, name.clone()))
            .collect())
    }

    async fn list_all_ids(&self) -> Result<Vec<UserId>, UserPersistenceError> {
        Ok(self.table()?.rows.keys().copied().collect())
    }

    async fn list_all_as_reference(&self) -> Result<Vec<ReferenceItem>, UserPersistenceError> {
        let table = self.table()?;
        Ok(table
            .rows
            .iter()
            .map(|(id, name)| ReferenceItem {
                id: *id,
                label: name.to_string(),
            })
            .collect())
    }
}
