use axum::extract::{Multipart, State};
use axum::{Extension, Json};
use serde_json::{json, Value};
use std::path::Path;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::errors::ApiError;
use crate::AppState;

/// Replaces anything outside `[A-Za-z0-9._-]` so the stored name is safe to
/// serve from disk.
fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Stores the first file field of the multipart body under the configured
/// upload directory and returns its public URL. Size and content-type limits
/// are the client's concern.
pub async fn upload_id_image(
    State(state): State<AppState>,
    Extension(_caller): Extension<AuthUser>,
    mut multipart: Multipart,
) -> Result<Json<Value>, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| ApiError::validation(format!("Invalid upload: {}", err)))?
    {
        let Some(original_name) = field.file_name().map(str::to_string) else {
            continue;
        };
        let data = field
            .bytes()
            .await
            .map_err(|err| ApiError::validation(format!("Invalid upload: {}", err)))?;

        let filename = format!("{}-{}", Uuid::new_v4(), sanitize_filename(&original_name));
        let dir = Path::new(&state.config.upload_dir);
        tokio::fs::create_dir_all(dir).await?;
        tokio::fs::write(dir.join(&filename), &data).await?;
        log::info!("stored uploaded image as {}", filename);

        return Ok(Json(json!({ "url": format!("/uploads/{}", filename) })));
    }

    Err(ApiError::validation("No file field in upload"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filenames_keep_word_characters_and_dots() {
        assert_eq!(sanitize_filename("id-card.front.png"), "id-card.front.png");
    }

    #[test]
    fn filenames_lose_path_separators_and_spaces() {
        assert_eq!(
            sanitize_filename("../etc/pass wd.png"),
            ".._etc_pass_wd.png"
        );
    }
}
