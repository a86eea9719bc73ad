use chrono::Utc;
use diesel::prelude::*;

use crate::models::{NewUserProfile, UserProfile, UserProfilePatch};
use crate::schema::user_profiles;

pub fn get_user_profile(conn: &mut PgConnection, user_id: &str) -> QueryResult<Option<UserProfile>> {
    user_profiles::table
        .filter(user_profiles::user_id.eq(user_id))
        .first(conn)
        .optional()
}

pub fn create_user_profile(
    conn: &mut PgConnection,
    profile: &NewUserProfile,
) -> QueryResult<UserProfile> {
    diesel::insert_into(user_profiles::table)
        .values(profile)
        .get_result(conn)
}

pub fn update_user_profile(
    conn: &mut PgConnection,
    user_id: &str,
    patch: &UserProfilePatch,
) -> QueryResult<Option<UserProfile>> {
    if patch.is_empty() {
        return get_user_profile(conn, user_id);
    }
    let now = Utc::now().naive_utc();
    diesel::update(user_profiles::table.filter(user_profiles::user_id.eq(user_id)))
        .set((patch, user_profiles::updated_at.eq(now)))
        .get_result(conn)
        .optional()
}
