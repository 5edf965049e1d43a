//! Request extractors.

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::http::HeaderMap;

use vitrine_auth::{AdminUser, AuthError, Role};

use crate::error::ApiError;
use crate::state::AppState;

/// Admin gate for back-office routes.
///
/// Resolves the `Authorization: Bearer <token>` header to a session and
/// rejects principals below the admin permission level. Handlers that
/// take this extractor are authenticated before their body runs.
pub struct AdminAuth(pub AdminUser);

#[async_trait]
impl FromRequestParts<AppState> for AdminAuth {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token =
            bearer_token(&parts.headers).ok_or(ApiError::Auth(AuthError::SessionNotFound))?;
        let user = state.auth.authenticate(token)?;
        if !user.role.has_permission(Role::Admin) {
            return Err(ApiError::Auth(AuthError::InsufficientPermissions));
        }
        Ok(AdminAuth(user))
    }
}

/// Pull the bearer token out of the request headers.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}
