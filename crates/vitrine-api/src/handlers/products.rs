//! Product endpoints.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

use vitrine_core::catalog::{ProductDraft, ProductPatch};
use vitrine_core::ids::ProductId;

use crate::error::ApiError;
use crate::extract::AdminAuth;
use crate::response::ApiResponse;
use crate::state::AppState;

/// GET /products — public catalog listing.
pub async fn list(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let products = state.products.list()?;
    Ok(Json(ApiResponse::ok(products)))
}

/// GET /products/:slug — public product page lookup.
pub async fn get_by_slug(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let product = state.products.get_by_slug(&slug)?;
    Ok(Json(ApiResponse::ok(product)))
}

/// POST /products — admin create.
pub async fn create(
    State(state): State<AppState>,
    AdminAuth(_): AdminAuth,
    Json(draft): Json<ProductDraft>,
) -> Result<impl IntoResponse, ApiError> {
    let product = state.products.insert(draft)?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(product))))
}

/// PUT /products/:id — admin partial update.
pub async fn update(
    State(state): State<AppState>,
    AdminAuth(_): AdminAuth,
    Path(id): Path<String>,
    Json(patch): Json<ProductPatch>,
) -> Result<impl IntoResponse, ApiError> {
    let product = state.products.update(&ProductId::new(id), patch)?;
    Ok(Json(ApiResponse::ok(product)))
}

/// DELETE /products/:id — admin delete.
///
/// Refused while a pending order references the product.
pub async fn delete(
    State(state): State<AppState>,
    AdminAuth(_): AdminAuth,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    state.products.delete(&ProductId::new(id))?;
    Ok(Json(ApiResponse::message("product deleted")))
}
