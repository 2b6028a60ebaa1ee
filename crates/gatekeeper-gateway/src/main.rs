//! gatekeeper gateway binary.
//!
//! Usage: `gatekeeper-gateway [config.yaml]` (default `gatekeeper.yaml`).
//! Log filtering follows `RUST_LOG`.

use tracing_subscriber::{fmt, EnvFilter};

use gatekeeper_gateway::{config, server};

#[tokio::main]
async fn main() -> gatekeeper_core::Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let path = std::env::args().nth(1).unwrap_or_else(|| "gatekeeper.yaml".to_string());
    let cfg = config::load_from_file(&path)?;

    server::run(cfg, async {
        let _ = tokio::signal::ctrl_c().await;
    })
    .await
}
