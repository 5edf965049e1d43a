//! HTTP API for the Vitrine storefront.
//!
//! Storefront routes (catalog reads, order intake) are public; the
//! back-office surface sits behind the [`extract::AdminAuth`] bearer
//! gate. Handlers validate, call the injected stores, and wrap every
//! outcome in the [`response::ApiResponse`] envelope.

pub mod error;
pub mod extract;
pub mod handlers;
pub mod response;
pub mod state;

pub use error::ApiError;
pub use response::ApiResponse;
pub use state::AppState;

use axum::routing::{get, patch, post};
use axum::Router;

/// Build the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        // Orders
        .route("/orders", post(handlers::orders::create).get(handlers::orders::list))
        .route("/orders/stats", get(handlers::orders::stats))
        .route(
            "/orders/:id",
            get(handlers::orders::get).put(handlers::orders::update),
        )
        .route("/orders/:id/validate", patch(handlers::orders::validate))
        .route("/orders/:id/cancel", patch(handlers::orders::cancel))
        // Catalog
        .route(
            "/products",
            get(handlers::products::list).post(handlers::products::create),
        )
        .route(
            "/products/:key",
            get(handlers::products::get_by_slug)
                .put(handlers::products::update)
                .delete(handlers::products::delete),
        )
        .route(
            "/categories",
            get(handlers::categories::list).post(handlers::categories::create),
        )
        // Back-office auth
        .route("/auth/login", post(handlers::auth::login))
        .route("/auth/logout", post(handlers::auth::logout))
        .route("/auth/me", get(handlers::auth::me))
        .with_state(state)
}
