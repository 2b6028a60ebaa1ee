//! Axum router wiring.
//!
//! RPC routes sit behind the interceptor middleware; ops endpoints do not.

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use gatekeeper_core::protocol::method::{ADMIN_LOGGING, ADMIN_STATISTICS};

use crate::{app_state::AppState, intercept, ops, transport};

pub fn build_router(state: AppState) -> Router {
    let rpc = Router::new()
        .route("/main.Biz/:method", post(transport::unary::unary_call))
        .route(ADMIN_LOGGING, get(transport::ws::logging))
        .route(ADMIN_STATISTICS, get(transport::ws::statistics))
        .route_layer(middleware::from_fn_with_state(state.clone(), intercept::intercept));

    Router::new()
        .route("/healthz", get(ops::healthz))
        .route("/readyz", get(ops::readyz))
        .route("/metrics", get(ops::metrics))
        .merge(rpc)
        .with_state(state)
}
