use axum::extract::State;
use axum::{Extension, Json};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::auth::{self, AuthUser};
use crate::errors::{ApiError, FieldError};
use crate::models::{
    NewUserProfile, UpsertUser, UserProfile, UserProfilePatch, UserWithProfile, USER_ROLES,
};
use crate::storage;
use crate::AppState;

/// Development stand-in for the external identity provider: mints a bearer
/// token for the given subject id and upserts the matching user row.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub user_id: String,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub profile_image_url: Option<String>,
    pub role: Option<String>,
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<Value>, ApiError> {
    if req.user_id.trim().is_empty() {
        return Err(ApiError::invalid_fields(
            "Invalid payload",
            vec![FieldError::new("userId", "must not be empty")],
        ));
    }
    if let Some(role) = &req.role {
        if !USER_ROLES.contains(&role.as_str()) {
            return Err(ApiError::validation("Invalid role"));
        }
    }

    let mut conn = state.db.get()?;
    let user = storage::users::upsert_user(
        &mut conn,
        &UpsertUser {
            id: req.user_id,
            email: req.email,
            first_name: req.first_name,
            last_name: req.last_name,
            profile_image_url: req.profile_image_url,
            role: req.role,
            ..UpsertUser::default()
        },
    )?;
    let token = auth::create_token(&user.id, &state.config.jwt_secret)?;
    Ok(Json(json!({ "token": token, "user": user })))
}

pub async fn get_current_user(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
) -> Result<Json<UserWithProfile>, ApiError> {
    let mut conn = state.db.get()?;
    let user = storage::users::get_user(&mut conn, caller.id())?
        .ok_or_else(|| ApiError::not_found("User not found"))?;
    let profile = storage::profiles::get_user_profile(&mut conn, caller.id())?;
    Ok(Json(UserWithProfile { user, profile }))
}

#[derive(Debug, Deserialize)]
pub struct UpdateRoleRequest {
    pub role: String,
}

pub async fn update_role(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    Json(req): Json<UpdateRoleRequest>,
) -> Result<Json<crate::models::User>, ApiError> {
    if !USER_ROLES.contains(&req.role.as_str()) {
        return Err(ApiError::validation("Invalid role"));
    }
    let mut conn = state.db.get()?;
    let user = storage::users::upsert_user(
        &mut conn,
        &UpsertUser {
            id: caller.id().to_string(),
            role: Some(req.role),
            ..UpsertUser::default()
        },
    )?;
    Ok(Json(user))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileRequest {
    pub bio: Option<String>,
    pub farm_name: Option<String>,
    pub farm_size: Option<String>,
    pub farm_location: Option<String>,
    pub coordinates: Option<String>,
    pub specialization: Option<String>,
    pub years_experience: Option<i32>,
}

impl ProfileRequest {
    fn into_patch(self) -> UserProfilePatch {
        UserProfilePatch {
            bio: self.bio,
            farm_name: self.farm_name,
            farm_size: self.farm_size,
            farm_location: self.farm_location,
            coordinates: self.coordinates,
            specialization: self.specialization,
            years_experience: self.years_experience,
        }
    }
}

/// One profile per user: a second POST updates the existing row in place.
pub async fn create_profile(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    Json(req): Json<ProfileRequest>,
) -> Result<Json<UserProfile>, ApiError> {
    let mut conn = state.db.get()?;
    if storage::profiles::get_user_profile(&mut conn, caller.id())?.is_some() {
        let updated =
            storage::profiles::update_user_profile(&mut conn, caller.id(), &req.into_patch())?
                .ok_or_else(|| ApiError::not_found("Profile not found"))?;
        return Ok(Json(updated));
    }

    let profile = storage::profiles::create_user_profile(
        &mut conn,
        &NewUserProfile {
            id: Uuid::new_v4().to_string(),
            user_id: caller.id().to_string(),
            bio: req.bio,
            farm_name: req.farm_name,
            farm_size: req.farm_size,
            farm_location: req.farm_location,
            coordinates: req.coordinates,
            specialization: req.specialization,
            years_experience: req.years_experience,
        },
    )?;
    Ok(Json(profile))
}

pub async fn update_profile(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    Json(req): Json<ProfileRequest>,
) -> Result<Json<UserProfile>, ApiError> {
    let mut conn = state.db.get()?;
    let profile =
        storage::profiles::update_user_profile(&mut conn, caller.id(), &req.into_patch())?
            .ok_or_else(|| ApiError::not_found("Profile not found"))?;
    Ok(Json(profile))
}
