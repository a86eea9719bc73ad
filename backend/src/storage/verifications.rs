use chrono::Utc;
use diesel::prelude::*;

use crate::models::{NewVerification, Verification};
use crate::schema::{users, verifications};

pub fn create_verification(
    conn: &mut PgConnection,
    verification: &NewVerification,
) -> QueryResult<Verification> {
    diesel::insert_into(verifications::table)
        .values(verification)
        .get_result(conn)
}

/// Only the most recently submitted request is reachable per user; older
/// ones are superseded.
pub fn latest_verification_for_user(
    conn: &mut PgConnection,
    user_id: &str,
) -> QueryResult<Option<Verification>> {
    verifications::table
        .filter(verifications::user_id.eq(user_id))
        .order(verifications::submitted_at.desc())
        .first(conn)
        .optional()
}

pub fn get_verification(conn: &mut PgConnection, id: &str) -> QueryResult<Option<Verification>> {
    verifications::table.find(id).first(conn).optional()
}

pub fn has_pending_verification(conn: &mut PgConnection, user_id: &str) -> QueryResult<bool> {
    diesel::select(diesel::dsl::exists(
        verifications::table.filter(
            verifications::user_id
                .eq(user_id)
                .and(verifications::status.eq("pending")),
        ),
    ))
    .get_result(conn)
}

/// Applies a review outcome to a still-pending request and, on approval,
/// flips the owner's verified flag in the same transaction. Returns `None`
/// when no pending request with the given id exists (absent or already
/// reviewed).
pub fn review_verification(
    conn: &mut PgConnection,
    id: &str,
    status: &str,
    notes: Option<&str>,
    reviewer_id: &str,
) -> QueryResult<Option<Verification>> {
    let now = Utc::now().naive_utc();
    conn.transaction(|conn| {
        let reviewed: Option<Verification> = diesel::update(
            verifications::table.filter(
                verifications::id
                    .eq(id)
                    .and(verifications::status.eq("pending")),
            ),
        )
        .set((
            verifications::status.eq(status),
            verifications::notes.eq(notes),
            verifications::reviewer_id.eq(reviewer_id),
            verifications::reviewed_at.eq(Some(now)),
        ))
        .get_result(conn)
        .optional()?;

        if let Some(verification) = &reviewed {
            if verification.status == "approved" {
                diesel::update(users::table.find(&verification.user_id))
                    .set((
                        users::is_verified.eq(true),
                        users::updated_at.eq(now),
                    ))
                    .execute(conn)?;
            }
        }
        Ok(reviewed)
    })
}
