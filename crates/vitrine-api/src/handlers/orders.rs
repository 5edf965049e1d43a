//! Order endpoints.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;

use vitrine_core::ids::OrderId;
use vitrine_core::orders::{Order, OrderDraft, OrderItem, OrderPatch};

use crate::error::ApiError;
use crate::extract::AdminAuth;
use crate::response::ApiResponse;
use crate::state::AppState;

/// An order with its line items, serialized flat.
#[derive(Serialize)]
pub struct OrderWithItems {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItem>,
}

/// POST /orders — storefront checkout, no auth.
pub async fn create(
    State(state): State<AppState>,
    Json(draft): Json<OrderDraft>,
) -> Result<impl IntoResponse, ApiError> {
    let (order, items) = state.orders.create(&draft)?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok_with_message(
            OrderWithItems { order, items },
            "order placed",
        )),
    ))
}

/// GET /orders — admin list, newest first.
pub async fn list(
    State(state): State<AppState>,
    AdminAuth(_): AdminAuth,
) -> Result<impl IntoResponse, ApiError> {
    let orders = state.orders.list()?;
    Ok(Json(ApiResponse::ok(orders)))
}

/// GET /orders/:id — admin detail with line items.
pub async fn get(
    State(state): State<AppState>,
    AdminAuth(_): AdminAuth,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let (order, items) = state.orders.get(&OrderId::new(id))?;
    Ok(Json(ApiResponse::ok(OrderWithItems { order, items })))
}

/// PUT /orders/:id — edit a pending order.
///
/// A `total` without `items` is written verbatim (caller-trusted).
pub async fn update(
    State(state): State<AppState>,
    AdminAuth(_): AdminAuth,
    Path(id): Path<String>,
    Json(patch): Json<OrderPatch>,
) -> Result<impl IntoResponse, ApiError> {
    let order = state.orders.update(&OrderId::new(id), patch)?;
    Ok(Json(ApiResponse::ok(order)))
}

/// PATCH /orders/:id/validate — decrement stock and complete the order.
pub async fn validate(
    State(state): State<AppState>,
    AdminAuth(_): AdminAuth,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let order = state.orders.validate(&OrderId::new(id))?;
    Ok(Json(ApiResponse::ok_with_message(order, "order validated")))
}

/// PATCH /orders/:id/cancel.
pub async fn cancel(
    State(state): State<AppState>,
    AdminAuth(_): AdminAuth,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let order = state.orders.cancel(&OrderId::new(id))?;
    Ok(Json(ApiResponse::ok_with_message(order, "order cancelled")))
}

/// GET /orders/stats — dashboard aggregates.
pub async fn stats(
    State(state): State<AppState>,
    AdminAuth(_): AdminAuth,
) -> Result<impl IntoResponse, ApiError> {
    let stats = state.orders.stats()?;
    Ok(Json(ApiResponse::ok(stats)))
}
