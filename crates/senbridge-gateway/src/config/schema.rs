use std::collections::HashSet;
use std::net::SocketAddr;
use std::time::Duration;

use serde::Deserialize;
use senbridge_core::error::{BridgeError, Result};
use senbridge_core::protocol::OperationKind;
use senbridge_core::token::SEPARATOR;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BridgeConfig {
    pub version: u32,

    #[serde(default)]
    pub gateway: GatewaySection,

    #[serde(default)]
    pub timeouts: TimeoutConfig,

    #[serde(default = "default_operations")]
    pub operations: Vec<OperationKind>,

    #[serde(default)]
    pub auth: AuthSection,
}

impl BridgeConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(BridgeError::UnsupportedVersion);
        }

        self.gateway.validate()?;
        self.timeouts.validate()?;
        self.auth.validate()?;

        let mut seen = HashSet::new();
        for kind in &self.operations {
            if !seen.insert(*kind) {
                return Err(BridgeError::BadRequest(format!(
                    "operations lists {kind} more than once"
                )));
            }
        }

        Ok(())
    }
}

fn default_operations() -> Vec<OperationKind> {
    OperationKind::ALL.to_vec()
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GatewaySection {
    #[serde(default = "default_listen")]
    pub listen: String,

    #[serde(default = "default_ping_interval_ms")]
    pub ping_interval_ms: u64,

    #[serde(default = "default_idle_timeout_ms")]
    pub idle_timeout_ms: u64,

    /// Id of the host frame the gateway listens on.
    #[serde(default = "default_host_frame_id")]
    pub host_frame_id: String,

    #[serde(default = "default_max_frame_bytes")]
    pub max_frame_bytes: usize,

    /// Per-socket outbound queue capacity.
    #[serde(default = "default_outbound_queue")]
    pub outbound_queue: usize,
}

impl Default for GatewaySection {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            ping_interval_ms: default_ping_interval_ms(),
            idle_timeout_ms: default_idle_timeout_ms(),
            host_frame_id: default_host_frame_id(),
            max_frame_bytes: default_max_frame_bytes(),
            outbound_queue: default_outbound_queue(),
        }
    }
}

impl GatewaySection {
    pub fn validate(&self) -> Result<()> {
        self.listen.parse::<SocketAddr>().map_err(|e| {
            BridgeError::BadRequest(format!("gateway.listen must be a socket address: {e}"))
        })?;
        if !(5000..=120000).contains(&self.ping_interval_ms) {
            return Err(BridgeError::BadRequest(
                "gateway.ping_interval_ms must be between 5000 and 120000".into(),
            ));
        }
        if !(10000..=600000).contains(&self.idle_timeout_ms) {
            return Err(BridgeError::BadRequest(
                "gateway.idle_timeout_ms must be between 10000 and 600000".into(),
            ));
        }
        if self.idle_timeout_ms <= self.ping_interval_ms {
            return Err(BridgeError::BadRequest(
                "gateway.idle_timeout_ms must be greater than ping_interval_ms".into(),
            ));
        }
        if self.host_frame_id.is_empty() || self.host_frame_id.contains(char::is_whitespace) {
            return Err(BridgeError::BadRequest(
                "gateway.host_frame_id must be non-empty without whitespace".into(),
            ));
        }
        if !(1024..=16 * 1024 * 1024).contains(&self.max_frame_bytes) {
            return Err(BridgeError::BadRequest(
                "gateway.max_frame_bytes must be between 1024 and 16777216".into(),
            ));
        }
        if self.outbound_queue == 0 {
            return Err(BridgeError::BadRequest(
                "gateway.outbound_queue must be greater than 0".into(),
            ));
        }
        Ok(())
    }
}

fn default_listen() -> String {
    "127.0.0.1:8080".into()
}
fn default_ping_interval_ms() -> u64 {
    20000
}
fn default_idle_timeout_ms() -> u64 {
    60000
}
fn default_host_frame_id() -> String {
    "gateway".into()
}
fn default_max_frame_bytes() -> usize {
    1024 * 1024
}
fn default_outbound_queue() -> usize {
    256
}

/// Per-operation deadlines. A liveness probe is short; signing waits on a human.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TimeoutConfig {
    #[serde(default = "default_connect_ms")]
    pub connect_ms: u64,
    #[serde(default = "default_get_address_ms")]
    pub get_address_ms: u64,
    #[serde(default = "default_sign_transaction_ms")]
    pub sign_transaction_ms: u64,
    #[serde(default = "default_sign_all_transactions_ms")]
    pub sign_all_transactions_ms: u64,
    #[serde(default = "default_sign_message_ms")]
    pub sign_message_ms: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_ms: default_connect_ms(),
            get_address_ms: default_get_address_ms(),
            sign_transaction_ms: default_sign_transaction_ms(),
            sign_all_transactions_ms: default_sign_all_transactions_ms(),
            sign_message_ms: default_sign_message_ms(),
        }
    }
}

impl TimeoutConfig {
    /// Same deadline for every operation.
    pub fn uniform(ms: u64) -> Self {
        Self {
            connect_ms: ms,
            get_address_ms: ms,
            sign_transaction_ms: ms,
            sign_all_transactions_ms: ms,
            sign_message_ms: ms,
        }
    }

    pub fn millis_for(&self, kind: OperationKind) -> u64 {
        match kind {
            OperationKind::Connect => self.connect_ms,
            OperationKind::GetAddress => self.get_address_ms,
            OperationKind::SignTransaction => self.sign_transaction_ms,
            OperationKind::SignAllTransactions => self.sign_all_transactions_ms,
            OperationKind::SignMessage => self.sign_message_ms,
        }
    }

    pub fn for_kind(&self, kind: OperationKind) -> Duration {
        Duration::from_millis(self.millis_for(kind))
    }

    pub fn validate(&self) -> Result<()> {
        for kind in OperationKind::ALL {
            if !(100..=600000).contains(&self.millis_for(kind)) {
                return Err(BridgeError::BadRequest(format!(
                    "timeouts for {kind} must be between 100 and 600000 ms"
                )));
            }
        }
        Ok(())
    }
}

fn default_connect_ms() -> u64 {
    3000
}
fn default_get_address_ms() -> u64 {
    6000
}
fn default_sign_transaction_ms() -> u64 {
    60000
}
fn default_sign_all_transactions_ms() -> u64 {
    120000
}
fn default_sign_message_ms() -> u64 {
    60000
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuthSection {
    /// When set, `/v1/whoami` only accepts bearers issued by this issuer.
    #[serde(default)]
    pub issuer: Option<String>,
}

impl AuthSection {
    pub fn validate(&self) -> Result<()> {
        if let Some(issuer) = &self.issuer {
            if issuer.is_empty() || issuer.contains(SEPARATOR) {
                return Err(BridgeError::BadRequest(
                    "auth.issuer must be non-empty and cannot contain '/'".into(),
                ));
            }
        }
        Ok(())
    }
}
