use axum::extract::{Path, State};
use axum::{Extension, Json};
use diesel::result::DatabaseErrorKind;
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::{self, AuthUser};
use crate::errors::{ApiError, FieldError};
use crate::models::{NewVerification, Verification, REVIEW_STATUSES};
use crate::storage;
use crate::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationRequest {
    pub full_name: String,
    pub id_number: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub farm_name: Option<String>,
    pub coordinates: Option<String>,
    pub id_image_url: Option<String>,
}

impl VerificationRequest {
    fn validate(&self) -> Result<(), ApiError> {
        if self.full_name.trim().chars().count() < 2 {
            return Err(ApiError::invalid_fields(
                "Invalid payload",
                vec![FieldError::new(
                    "fullName",
                    "must be at least 2 characters long",
                )],
            ));
        }
        Ok(())
    }
}

pub async fn submit_verification(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    Json(req): Json<VerificationRequest>,
) -> Result<Json<Verification>, ApiError> {
    req.validate()?;

    let mut conn = state.db.get()?;
    if storage::verifications::has_pending_verification(&mut conn, caller.id())? {
        return Err(ApiError::validation(
            "A verification request is already pending",
        ));
    }

    let new_verification = NewVerification {
        id: Uuid::new_v4().to_string(),
        user_id: caller.id().to_string(),
        full_name: req.full_name,
        id_number: req.id_number,
        phone: req.phone,
        address: req.address,
        farm_name: req.farm_name,
        coordinates: req.coordinates,
        id_image_url: req.id_image_url,
    };
    // The partial unique index closes the race the pre-check leaves open.
    let verification = storage::verifications::create_verification(&mut conn, &new_verification)
        .map_err(|err| match err {
            diesel::result::Error::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                ApiError::validation("A verification request is already pending")
            }
            other => ApiError::Database(other),
        })?;
    Ok(Json(verification))
}

pub async fn get_my_verification(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
) -> Result<Json<Option<Verification>>, ApiError> {
    let mut conn = state.db.get()?;
    let verification =
        storage::verifications::latest_verification_for_user(&mut conn, caller.id())?;
    Ok(Json(verification))
}

#[derive(Debug, Deserialize)]
pub struct ReviewRequest {
    pub status: String,
    pub notes: Option<String>,
}

pub async fn review_verification(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    Path(id): Path<String>,
    Json(req): Json<ReviewRequest>,
) -> Result<Json<Verification>, ApiError> {
    auth::require_admin(&state.config.admin_users, caller.id())?;
    if !REVIEW_STATUSES.contains(&req.status.as_str()) {
        return Err(ApiError::validation("Invalid status"));
    }

    let mut conn = state.db.get()?;
    let reviewed = storage::verifications::review_verification(
        &mut conn,
        &id,
        &req.status,
        req.notes.as_deref(),
        caller.id(),
    )?;
    match reviewed {
        Some(verification) => Ok(Json(verification)),
        // Nothing pending under that id: tell an absent request apart from
        // one that already reached a terminal state.
        None => match storage::verifications::get_verification(&mut conn, &id)? {
            Some(_) => Err(ApiError::validation(
                "Verification request already reviewed",
            )),
            None => Err(ApiError::not_found("Verification request not found")),
        },
    }
}
