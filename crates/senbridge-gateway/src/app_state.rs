//! Shared application state for the bridge gateway.
//!
//! Owns the host frame the gateway listens on, the directory remote widgets
//! attach to, and the wallet gateway that answers their requests.

use std::sync::Arc;

use senbridge_core::error::Result;

use crate::channel::{Frame, FrameDirectory, MessageSource};
use crate::config::BridgeConfig;
use crate::facade::{Wallet, WalletGateway};

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    cfg: BridgeConfig,
    host: Arc<Frame>,
    directory: Arc<FrameDirectory>,
    gateway: WalletGateway,
}

impl AppState {
    /// Build application state and start the wallet gateway.
    /// Must run inside a tokio runtime.
    pub fn new(cfg: BridgeConfig, wallet: Arc<dyn Wallet>) -> Result<Self> {
        let host = Frame::new(cfg.gateway.host_frame_id.clone());
        let directory = Arc::new(FrameDirectory::new());

        let source: Arc<dyn MessageSource> = host.clone();
        let gateway = WalletGateway::new(
            source,
            Arc::clone(&directory),
            wallet,
            &cfg.operations,
        )?;
        tracing::info!(
            host = %host.id(),
            operations = ?gateway.server().registered_kinds(),
            "wallet gateway listening"
        );

        Ok(Self {
            inner: Arc::new(AppStateInner {
                cfg,
                host,
                directory,
                gateway,
            }),
        })
    }

    pub fn cfg(&self) -> &BridgeConfig {
        &self.inner.cfg
    }

    pub fn host(&self) -> &Arc<Frame> {
        &self.inner.host
    }

    pub fn directory(&self) -> &Arc<FrameDirectory> {
        &self.inner.directory
    }

    pub fn gateway(&self) -> &WalletGateway {
        &self.inner.gateway
    }
}
