use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};

use crate::app_state::AppState;
use crate::context::CallContext;

use super::error_response;

/// `POST /<service>/<method>`: run the registered unary handler.
pub async fn unary_call(
    State(app): State<AppState>,
    Extension(call): Extension<CallContext>,
) -> Response {
    match app.dispatcher().dispatch(call).await {
        Ok(body) => Json(body).into_response(),
        Err(e) => error_response(&e),
    }
}
