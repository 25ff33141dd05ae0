use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::warn;

use senbridge_core::error::{BridgeError, Result};
use senbridge_core::protocol::{OperationKind, WireBytes};

use crate::channel::{FrameDirectory, MessageSource};
use crate::facade::wallet::Wallet;
use crate::rpc::{RequestCtx, RequestHandler, RpcServer};

/// Host-side façade: routes each exposed operation to the wallet.
pub struct WalletGateway {
    server: Arc<RpcServer>,
}

impl WalletGateway {
    /// Register a route per kind in `operations` and start listening on `host`.
    pub fn new(
        host: Arc<dyn MessageSource>,
        directory: Arc<FrameDirectory>,
        wallet: Arc<dyn Wallet>,
        operations: &[OperationKind],
    ) -> Result<Self> {
        let server = RpcServer::new("gateway", host, directory);
        for &kind in operations {
            server.register(Arc::new(WalletRoute {
                kind,
                wallet: Arc::clone(&wallet),
            }));
        }
        server.start()?;
        Ok(Self { server })
    }

    /// Gateway exposing every operation.
    pub fn with_all_operations(
        host: Arc<dyn MessageSource>,
        directory: Arc<FrameDirectory>,
        wallet: Arc<dyn Wallet>,
    ) -> Result<Self> {
        Self::new(host, directory, wallet, &OperationKind::ALL)
    }

    pub fn server(&self) -> &Arc<RpcServer> {
        &self.server
    }

    pub fn terminate(&self) {
        self.server.terminate();
    }
}

/// One routing-table entry.
struct WalletRoute {
    kind: OperationKind,
    wallet: Arc<dyn Wallet>,
}

#[async_trait]
impl RequestHandler for WalletRoute {
    fn kind(&self) -> OperationKind {
        self.kind
    }

    async fn handle(&self, ctx: RequestCtx, data: Option<Value>) -> Result<Value> {
        match self.invoke(data).await {
            Ok(v) => Ok(v),
            Err(e) => {
                warn!(kind = %self.kind, target = %ctx.target_id, correlation_id = ctx.correlation_id, error = %e, "wallet call failed");
                Ok(json!({ "error": e.to_string() }))
            }
        }
    }
}

impl WalletRoute {
    async fn invoke(&self, data: Option<Value>) -> Result<Value> {
        match self.kind {
            OperationKind::Connect => Ok(Value::Bool(true)),
            OperationKind::GetAddress => Ok(Value::String(self.wallet.get_address().await?)),
            OperationKind::SignTransaction => {
                let tx = decode_data::<WireBytes>(self.kind, data)?.into_transaction()?;
                let signed = self.wallet.sign_transaction(tx).await?;
                encode_data(&WireBytes::from_transaction(&signed)?)
            }
            OperationKind::SignAllTransactions => {
                let txs = decode_data::<Vec<WireBytes>>(self.kind, data)?
                    .into_iter()
                    .map(WireBytes::into_transaction)
                    .collect::<Result<Vec<_>>>()?;
                let expected = txs.len();

                let signed = self.wallet.sign_all_transactions(txs).await?;
                if signed.len() != expected {
                    return Err(BridgeError::Wallet(format!(
                        "wallet returned {} transactions for {expected}",
                        signed.len()
                    )));
                }

                let out = signed
                    .iter()
                    .map(WireBytes::from_transaction)
                    .collect::<Result<Vec<_>>>()?;
                encode_data(&out)
            }
            OperationKind::SignMessage => {
                let message = decode_data::<String>(self.kind, data)?;
                encode_data(&self.wallet.sign_message(&message).await?)
            }
        }
    }
}

fn decode_data<T: DeserializeOwned>(kind: OperationKind, data: Option<Value>) -> Result<T> {
    let data = data.ok_or_else(|| BridgeError::BadRequest(format!("{kind} requires data")))?;
    serde_json::from_value(data)
        .map_err(|e| BridgeError::BadRequest(format!("{kind} invalid data: {e}")))
}

fn encode_data<T: Serialize>(value: &T) -> Result<Value> {
    serde_json::to_value(value)
        .map_err(|e| BridgeError::Internal(format!("response encode failed: {e}")))
}
