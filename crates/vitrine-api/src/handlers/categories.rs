//! Category endpoints.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;

use vitrine_core::catalog::Category;

use crate::error::ApiError;
use crate::extract::AdminAuth;
use crate::response::ApiResponse;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct CategoryRequest {
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub position: i32,
}

/// GET /categories — public navigation list.
pub async fn list(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let categories = state.categories.list()?;
    Ok(Json(ApiResponse::ok(categories)))
}

/// POST /categories — admin create.
pub async fn create(
    State(state): State<AppState>,
    AdminAuth(_): AdminAuth,
    Json(req): Json<CategoryRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let mut category = Category::new(req.name, req.slug);
    category.position = req.position;
    let category = state.categories.insert(category)?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(category))))
}
