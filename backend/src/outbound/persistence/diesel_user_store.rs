//! PostgreSQL-backed `UserStore` implementation using Diesel ORM.
//!
//! Every method checks one connection out of the pool, runs one statement and
//! returns; the pooled guard goes back to the pool when it drops.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::{debug, warn};

use crate::domain::ports::{ReferenceItem, UserPersistenceError, UserStore};
use crate::domain::{User, UserId, UserName};

use super::error_mapping::{map_diesel_error, map_pool_error};
use super::models::{NewUserRow, UserRow, UserUpdate};
use super::pool::DbPool;
use super::schema::testmoussia_user;

/// Diesel-backed [`UserStore`].
#[derive(Clone)]
pub struct DieselUserStore {
    pool: DbPool,
}

impl DieselUserStore {
    /// Create a store drawing connections from `pool`.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn id_from_row(raw: i32) -> Result<UserId, UserPersistenceError> {
    UserId::new(raw).map_err(|err| {
        warn!(id_user = raw, error = %err, "non-positive key in testmoussia_user");
        UserPersistenceError::query("stored user id is invalid")
    })
}

fn row_to_user(row: UserRow) -> Result<User, UserPersistenceError> {
    let id = id_from_row(row.id_user)?;
    Ok(User::new(id, UserName::from_storage(row.nom)))
}

#[async_trait]
impl UserStore for DieselUserStore {
    async fn insert(&self, name: &UserName) -> Result<User, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let raw_id: i32 = diesel::insert_into(testmoussia_user::table)
            .values(&NewUserRow {
                nom: name.as_ref(),
            })
            .returning(testmoussia_user::id_user)
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(User::new(id_from_row(raw_id)?, name.clone()))
    }

    async fn load(&self, id: UserId) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<UserRow> = testmoussia_user::table
            .filter(testmoussia_user::id_user.eq(id.get()))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_user).transpose()
    }

    async fn store(&self, user: &User) -> Result<(), UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let affected = diesel::update(testmoussia_user::table.find(user.id().get()))
            .set(&UserUpdate {
                nom: user.name().as_ref(),
            })
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        if affected == 0 {
            debug!(user_id = %user.id(), "update matched no row");
        }
        Ok(())
    }

    async fn delete(&self, id: UserId) -> Result<(), UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let affected = diesel::delete(testmoussia_user::table.find(id.get()))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        if affected == 0 {
            debug!(user_id = %id, "delete matched no row");
        }
        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<UserRow> = testmoussia_user::table
            .select(UserRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows.into_iter().map(row_to_user).collect()
    }

    async fn list_all_ids(&self) -> Result<Vec<UserId>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let ids: Vec<i32> = testmoussia_user::table
            .select(testmoussia_user::id_user)
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        ids.into_iter().map(id_from_row).collect()
    }

    async fn list_all_as_reference(&self) -> Result<Vec<ReferenceItem>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<UserRow> = testmoussia_user::table
            .select(UserRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows.into_iter()
            .map(|row| {
                Ok(ReferenceItem {
                    id: id_from_row(row.id_user)?,
                    label: row.nom,
                })
            })
            .collect()
    }
}
