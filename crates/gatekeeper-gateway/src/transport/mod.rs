//! Transport layer (HTTP for unary calls, WebSocket for server streams).
//!
//! Call metadata travels as HTTP headers; the interceptor runs as route
//! middleware in front of both handlers.

pub mod unary;
pub mod ws;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use gatekeeper_core::error::{ClientCode, GatekeeperError};
use gatekeeper_core::protocol::ErrorBody;

pub fn status_for(code: ClientCode) -> StatusCode {
    match code {
        ClientCode::Unauthenticated => StatusCode::UNAUTHORIZED,
        ClientCode::InvalidArgument => StatusCode::BAD_REQUEST,
        ClientCode::Unimplemented => StatusCode::NOT_FOUND,
        ClientCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Render an error as `{code, msg}` with the matching HTTP status.
pub fn error_response(e: &GatekeeperError) -> Response {
    (status_for(e.client_code()), Json(ErrorBody::from(e))).into_response()
}
