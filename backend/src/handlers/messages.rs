use axum::extract::{Query, State};
use axum::{Extension, Json};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::errors::{ApiError, FieldError};
use crate::models::{Message, NewMessage};
use crate::storage;
use crate::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageQuery {
    pub other_id: Option<String>,
    pub order_id: Option<String>,
}

/// Conversation with ?otherId, order thread with ?orderId, otherwise every
/// message the caller sent or received. All oldest-first.
pub async fn list_messages(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    Query(query): Query<MessageQuery>,
) -> Result<Json<Vec<Message>>, ApiError> {
    let mut conn = state.db.get()?;
    let messages = if let Some(other_id) = &query.other_id {
        storage::messages::conversation_between(&mut conn, caller.id(), other_id)?
    } else if let Some(order_id) = &query.order_id {
        storage::messages::messages_for_order(&mut conn, order_id)?
    } else {
        storage::messages::messages_for_participant(&mut conn, caller.id())?
    };
    Ok(Json(messages))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageRequest {
    pub receiver_id: String,
    pub order_id: Option<String>,
    pub content: String,
    pub is_read: Option<bool>,
}

pub async fn create_message(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    Json(req): Json<SendMessageRequest>,
) -> Result<Json<Message>, ApiError> {
    let mut errors = Vec::new();
    if req.receiver_id.trim().is_empty() {
        errors.push(FieldError::new("receiverId", "is required"));
    }
    if req.content.trim().is_empty() {
        errors.push(FieldError::new("content", "must not be empty"));
    }
    if !errors.is_empty() {
        return Err(ApiError::invalid_fields("Invalid payload", errors));
    }

    let mut conn = state.db.get()?;
    let message = storage::messages::create_message(
        &mut conn,
        &NewMessage {
            id: Uuid::new_v4().to_string(),
            sender_id: caller.id().to_string(),
            receiver_id: req.receiver_id,
            order_id: req.order_id,
            content: req.content,
            is_read: req.is_read,
        },
    )?;
    Ok(Json(message))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkReadRequest {
    pub sender_id: String,
}

pub async fn mark_read(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    Json(req): Json<MarkReadRequest>,
) -> Result<Json<Value>, ApiError> {
    if req.sender_id.trim().is_empty() {
        return Err(ApiError::invalid_fields(
            "Invalid payload",
            vec![FieldError::new("senderId", "is required")],
        ));
    }
    let mut conn = state.db.get()?;
    storage::messages::mark_messages_read(&mut conn, caller.id(), &req.sender_id)?;
    Ok(Json(json!({ "message": "Messages marked as read" })))
}
