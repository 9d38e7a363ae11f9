/// Session handlers
use super::AppState;
use crate::error::Result;
use crate::middleware::AuthContext;
use actix_web::{web, HttpResponse};

/// Revoke the presented token until it expires
pub async fn logout(state: web::Data<AppState>, session: AuthContext) -> Result<HttpResponse> {
    state
        .revocations
        .revoke(&session.jti, session.expires_at)
        .await?;

    tracing::info!(user_id = %session.user_id, "User logged out");
    Ok(HttpResponse::NoContent().finish())
}
