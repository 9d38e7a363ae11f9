/// Social handlers - follow and like edges
use super::AppState;
use crate::error::Result;
use crate::middleware::UserId;
use actix_web::{web, HttpResponse};
use uuid::Uuid;

pub async fn follow_user(
    state: web::Data<AppState>,
    user_id: UserId,
    followee_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    state.graph.follow(user_id.0, *followee_id).await?;
    Ok(HttpResponse::Created().finish())
}

pub async fn unfollow_user(
    state: web::Data<AppState>,
    user_id: UserId,
    followee_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    state.graph.unfollow(user_id.0, *followee_id).await?;
    Ok(HttpResponse::NoContent().finish())
}

pub async fn like_post(
    state: web::Data<AppState>,
    user_id: UserId,
    post_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    state.graph.like(user_id.0, *post_id).await?;
    Ok(HttpResponse::Created().finish())
}

pub async fn unlike_post(
    state: web::Data<AppState>,
    user_id: UserId,
    post_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    state.graph.unlike(user_id.0, *post_id).await?;
    Ok(HttpResponse::NoContent().finish())
}
