//! senbridge gateway
//!
//! - WebSocket endpoint: /v1/bridge?target=...
//! - Host frame answered by an in-memory development wallet
//! - Tracing span per session
//! - Heartbeat ping + idle timeout

use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::{fmt, EnvFilter};

use senbridge_core::error::{BridgeError, Result};
use senbridge_gateway::{app_state, config, facade::MemoryWallet, router};

const DEFAULT_CONFIG_PATH: &str = "senbridge.yaml";

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let cfg = config::load_from_file(&path)?;
    let listen: SocketAddr = cfg
        .gateway
        .listen
        .parse()
        .map_err(|e| BridgeError::BadRequest(format!("gateway.listen: {e}")))?;

    // Ephemeral key; a real deployment plugs in its own `Wallet`.
    let wallet = MemoryWallet::generate();
    tracing::info!(address = %wallet.signer().address(), "development wallet ready");

    let state = app_state::AppState::new(cfg, Arc::new(wallet))?;
    let app = router::build_router(state);

    tracing::info!(%listen, config = %path, "senbridge-gateway starting");
    let listener = tokio::net::TcpListener::bind(listen)
        .await
        .map_err(|e| BridgeError::Internal(format!("bind {listen} failed: {e}")))?;

    axum::serve(listener, app)
        .await
        .map_err(|e| BridgeError::Internal(format!("server failed: {e}")))
}
