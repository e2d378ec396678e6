//! Axum extractors for the caller's identity

use crate::core::auth::{AuthContext, User};
use crate::core::error::{AppError, RequestError};
use crate::server::state::AppState;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;

/// The authenticated user making the request
///
/// Extraction asks the configured `AuthProvider` and rejects anonymous
/// callers with `401 UNAUTHORIZED`. Every `/api` handler takes this
/// extractor, which makes it the access guard for the whole API.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        match state.auth.current_user(&parts.headers).await? {
            AuthContext::User(user) => Ok(CurrentUser(user)),
            AuthContext::Anonymous => Err(RequestError::Unauthorized {
                message: "authentication required".to_string(),
            }
            .into()),
        }
    }
}
