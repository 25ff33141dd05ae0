//! Axum router wiring.
//!
//! - `/v1/bridge` : WebSocket upgrade for remote widgets
//! - `/healthz`   : liveness
//! - `/v1/whoami` : bearer check for relying parties

use axum::{routing::get, Router};

use crate::{app_state::AppState, ops, transport};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/v1/bridge", get(transport::ws::ws_upgrade))
        .route("/healthz", get(ops::healthz))
        .route("/v1/whoami", get(ops::whoami))
        .with_state(state)
}
