/// HTTP handlers for posting endpoints
///
/// - Posts: ingest an image post, read detail, edit text, delete
/// - Feed: own posts and the followed-users feed
/// - Social: follow/unfollow users, like/unlike posts
/// - Auth: logout (session revocation)
pub mod auth;
pub mod feed;
pub mod posts;
pub mod social;

pub use auth::logout;
pub use feed::{get_feed, get_own_posts};
pub use posts::{create_post, delete_post, get_post, update_post};
pub use social::{follow_user, like_post, unfollow_user, unlike_post};

use crate::auth::RevocationStore;
use crate::error::AppError;
use crate::services::{FeedQueryService, PostIngestionService, PostService, SocialGraphGate};
use actix_web::web;
use std::sync::Arc;

/// Services shared by all handlers
#[derive(Clone)]
pub struct AppState {
    pub ingestion: Arc<PostIngestionService>,
    pub posts: PostService,
    pub feed: FeedQueryService,
    pub graph: SocialGraphGate,
    pub revocations: Arc<dyn RevocationStore>,
}

/// Register the authenticated API routes (mounted under `/api/v1`)
pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .error_handler(|err, _| AppError::Validation(err.to_string()).into()),
    )
    .app_data(
        web::PathConfig::default()
            .error_handler(|err, _| AppError::Validation(err.to_string()).into()),
    )
    .service(
        web::scope("/posts")
            .service(web::resource("").route(web::post().to(create_post)))
            .service(
                web::resource("/{post_id}")
                    .route(web::get().to(get_post))
                    .route(web::put().to(update_post))
                    .route(web::delete().to(delete_post)),
            ),
    )
    .route("/users/me/posts", web::get().to(get_own_posts))
    .route("/feed", web::get().to(get_feed))
    .service(
        web::resource("/follows/{followee_id}")
            .route(web::post().to(follow_user))
            .route(web::delete().to(unfollow_user)),
    )
    .service(
        web::resource("/likes/{post_id}")
            .route(web::post().to(like_post))
            .route(web::delete().to(unlike_post)),
    )
    .route("/auth/logout", web::post().to(logout));
}
