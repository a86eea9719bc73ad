use chrono::Utc;
use diesel::prelude::*;

use crate::models::{UpsertUser, User};
use crate::schema::users;

pub fn get_user(conn: &mut PgConnection, id: &str) -> QueryResult<Option<User>> {
    users::table.find(id).first(conn).optional()
}

/// Insert-or-update keyed by the identity-provider subject id. Fields absent
/// from the payload take column defaults on insert and keep their stored
/// values on conflict.
pub fn upsert_user(conn: &mut PgConnection, user: &UpsertUser) -> QueryResult<User> {
    let now = Utc::now().naive_utc();
    diesel::insert_into(users::table)
        .values(user)
        .on_conflict(users::id)
        .do_update()
        .set((user, users::updated_at.eq(now)))
        .get_result(conn)
}
