//! Server lifecycle: bind, serve, coordinated shutdown.

use std::future::Future;

use tokio::net::TcpListener;

use gatekeeper_core::error::{GatekeeperError, Result};

use crate::{app_state::AppState, config::GatewayConfig, router};

/// Bind `cfg.gateway.listen` and serve until `shutdown` resolves.
///
/// Config (including the ACL) is validated before the listener opens. On
/// shutdown every audit subscriber is closed once, then in-flight requests
/// are drained.
pub async fn run<F>(cfg: GatewayConfig, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    cfg.validate()?;
    let listen = cfg.gateway.listen_addr()?;

    let state = AppState::new(cfg)?;
    let listener = TcpListener::bind(listen)
        .await
        .map_err(|e| GatekeeperError::Transport(format!("bind {listen} failed: {e}")))?;

    serve(state, listener, shutdown).await
}

/// Serve on an already-bound listener.
pub async fn serve<F>(state: AppState, listener: TcpListener, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let local = listener
        .local_addr()
        .map_err(|e| GatekeeperError::Transport(e.to_string()))?;
    tracing::info!(%local, "gatekeeper listening");

    let app = router::build_router(state.clone());
    let drain = state.clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown.await;
            tracing::info!("shutdown requested, closing audit streams");
            drain.shutdown();
        })
        .await
        .map_err(|e| GatekeeperError::Transport(format!("server failed: {e}")))
}
