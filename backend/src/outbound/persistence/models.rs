//! Diesel row structs for `testmoussia_user`. Internal to the persistence
//! layer; the domain only sees `User`.

use diesel::prelude::*;

use super::schema::testmoussia_user;

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = testmoussia_user)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id_user: i32,
    pub nom: String,
}

/// Insert payload; `id_user` comes from the column's sequence.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = testmoussia_user)]
pub(crate) struct NewUserRow<'a> {
    pub nom: &'a str,
}

#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = testmoussia_user)]
pub(crate) struct UserUpdate<'a> {
    pub nom: &'a str,
}
