/// Post handlers - HTTP endpoints for post operations
use super::AppState;
use crate::error::{AppError, Result};
use crate::middleware::UserId;
use actix_multipart::{Field, Multipart};
use actix_web::{web, HttpResponse};
use futures_util::TryStreamExt;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

/// Upload body cap for the image part
pub const MAX_IMAGE_BYTES: usize = 20 * 1024 * 1024;
const MAX_CONTENT_BYTES: usize = 64 * 1024;

#[derive(Debug, Deserialize, Validate)]
pub struct UpdatePostRequest {
    #[validate(length(max = 65536))]
    pub content: String,
}

/// Create a post from a multipart upload (`image` file part, `content` text part)
pub async fn create_post(
    state: web::Data<AppState>,
    user_id: UserId,
    mut payload: Multipart,
) -> Result<HttpResponse> {
    let mut image: Vec<u8> = Vec::new();
    let mut content_type = String::new();
    let mut content = String::new();

    while let Some(mut field) = payload
        .try_next()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart payload: {}", e)))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "image" => {
                content_type = field
                    .content_type()
                    .map(|mime| mime.essence_str().to_string())
                    .unwrap_or_default();
                image = read_field(&mut field, MAX_IMAGE_BYTES).await?;
            }
            "content" => {
                let bytes = read_field(&mut field, MAX_CONTENT_BYTES).await?;
                content = String::from_utf8(bytes)
                    .map_err(|_| AppError::Validation("content must be UTF-8 text".into()))?;
            }
            _ => {
                read_field(&mut field, MAX_CONTENT_BYTES).await?;
            }
        }
    }

    let post = state
        .ingestion
        .ingest(user_id.0, image, &content_type, &content)
        .await?;

    Ok(HttpResponse::Created().json(post))
}

async fn read_field(field: &mut Field, limit: usize) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    while let Some(chunk) = field
        .try_next()
        .await
        .map_err(|e| AppError::Validation(format!("Failed to read upload: {}", e)))?
    {
        if buf.len() + chunk.len() > limit {
            return Err(AppError::Validation(format!(
                "part '{}' exceeds {} bytes",
                field.name().unwrap_or_default(),
                limit
            )));
        }
        buf.extend_from_slice(&chunk);
    }
    Ok(buf)
}

/// Get a post with owner, like aggregates and tags
pub async fn get_post(
    state: web::Data<AppState>,
    user_id: UserId,
    post_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let detail = state.feed.get_post_detail(user_id.0, *post_id).await?;
    Ok(HttpResponse::Ok().json(detail))
}

/// Edit the text of an owned post
pub async fn update_post(
    state: web::Data<AppState>,
    user_id: UserId,
    post_id: web::Path<Uuid>,
    req: web::Json<UpdatePostRequest>,
) -> Result<HttpResponse> {
    req.validate()?;

    let post = state
        .posts
        .update_content(user_id.0, *post_id, &req.content)
        .await?;
    Ok(HttpResponse::Ok().json(post))
}

/// Delete an owned post
pub async fn delete_post(
    state: web::Data<AppState>,
    user_id: UserId,
    post_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    state.posts.delete_post(user_id.0, *post_id).await?;
    Ok(HttpResponse::NoContent().finish())
}
