//! Authentication endpoints.

use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};

use vitrine_auth::AdminUser;

use crate::error::ApiError;
use crate::extract::{bearer_token, AdminAuth};
use crate::response::ApiResponse;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: AdminUser,
}

/// POST /auth/login — exchange credentials for a bearer token.
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let (user, token) = state.auth.login(&req.email, &req.password)?;
    Ok(Json(ApiResponse::ok(LoginResponse { token, user })))
}

/// POST /auth/logout — close the current session.
pub async fn logout(
    State(state): State<AppState>,
    AdminAuth(_): AdminAuth,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    if let Some(token) = bearer_token(&headers) {
        state.auth.logout(token)?;
    }
    Ok(Json(ApiResponse::message("logged out")))
}

/// GET /auth/me — identify the current session.
pub async fn me(AdminAuth(user): AdminAuth) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(ApiResponse::ok(user)))
}
