//! HTTP error mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;
use tracing::error;

use vitrine_auth::AuthError;
use vitrine_core::StoreError;

use crate::response::ApiResponse;

/// Any failure a handler can surface.
///
/// Business-rule failures keep their message; internal faults are logged
/// and replaced with a generic reason so nothing leaks to the client.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Auth(#[from] AuthError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::Store(e) => store_response(e),
            ApiError::Auth(e) => auth_response(e),
        };
        (status, Json(body)).into_response()
    }
}

fn store_response(e: StoreError) -> (StatusCode, ApiResponse<()>) {
    match e {
        StoreError::Validation(errors) => {
            (StatusCode::BAD_REQUEST, ApiResponse::validation(errors))
        }
        e if e.is_not_found() => (StatusCode::NOT_FOUND, ApiResponse::error(e.to_string())),
        e @ (StoreError::InvalidState(_) | StoreError::InsufficientStock { .. }) => {
            (StatusCode::BAD_REQUEST, ApiResponse::error(e.to_string()))
        }
        e @ StoreError::Conflict(_) => (StatusCode::CONFLICT, ApiResponse::error(e.to_string())),
        e => {
            error!(error = %e, "internal store failure");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiResponse::error("internal server error"),
            )
        }
    }
}

fn auth_response(e: AuthError) -> (StatusCode, ApiResponse<()>) {
    if e.is_auth_failure() {
        (StatusCode::UNAUTHORIZED, ApiResponse::error(e.to_string()))
    } else if e.is_permission_error() {
        (StatusCode::FORBIDDEN, ApiResponse::error(e.to_string()))
    } else {
        match e {
            e @ (AuthError::WeakPassword(_) | AuthError::UserAlreadyExists(_)) => {
                (StatusCode::BAD_REQUEST, ApiResponse::error(e.to_string()))
            }
            e => {
                error!(error = %e, "internal auth failure");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ApiResponse::error("internal server error"),
                )
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(e: ApiError) -> StatusCode {
        e.into_response().status()
    }

    #[test]
    fn test_store_error_statuses() {
        assert_eq!(
            status_of(StoreError::validation("bad").into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(StoreError::OrderNotFound("o1".into()).into()),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(StoreError::InvalidState("only pending orders can be edited".into()).into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(
                StoreError::InsufficientStock {
                    product_id: "p1".into(),
                    name: "Tee".into(),
                    requested: 5,
                    available: 3,
                }
                .into()
            ),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(StoreError::Database("locked".into()).into()),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_auth_error_statuses() {
        assert_eq!(
            status_of(AuthError::InvalidCredentials.into()),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            status_of(AuthError::SessionExpired.into()),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            status_of(AuthError::InsufficientPermissions.into()),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            status_of(AuthError::WeakPassword("too short".into()).into()),
            StatusCode::BAD_REQUEST
        );
    }
}
