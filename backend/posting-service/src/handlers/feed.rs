/// Feed handlers - own posts and the followed-users feed
use super::AppState;
use crate::error::Result;
use crate::middleware::UserId;
use crate::models::PageRequest;
use actix_web::{web, HttpResponse};
use serde::Deserialize;

/// Raw pagination values; validated by `PageRequest::parse`
#[derive(Debug, Deserialize)]
pub struct PaginationParams {
    pub offset: Option<String>,
    pub limit: Option<String>,
}

impl PaginationParams {
    fn page(&self) -> Result<PageRequest> {
        PageRequest::parse(self.offset.as_deref(), self.limit.as_deref())
    }
}

pub async fn get_own_posts(
    state: web::Data<AppState>,
    user_id: UserId,
    query: web::Query<PaginationParams>,
) -> Result<HttpResponse> {
    let page = state.feed.get_own_posts(user_id.0, query.page()?).await?;
    Ok(HttpResponse::Ok().json(page))
}

pub async fn get_feed(
    state: web::Data<AppState>,
    user_id: UserId,
    query: web::Query<PaginationParams>,
) -> Result<HttpResponse> {
    let page = state.feed.get_followed_feed(user_id.0, query.page()?).await?;
    Ok(HttpResponse::Ok().json(page))
}
