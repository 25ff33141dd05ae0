use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;

use senbridge_core::error::{BridgeError, Result};
use senbridge_core::protocol::{OperationKind, SignedMessage, Transaction, WireBytes};

use crate::channel::{MessageSource, MessageTarget};
use crate::config::TimeoutConfig;
use crate::rpc::RpcClient;

/// Widget-side façade: typed wallet calls over the bridge.
///
/// Results are fresh values; inputs are never mutated.
pub struct WalletConnector {
    rpc: RpcClient,
    timeouts: TimeoutConfig,
}

impl WalletConnector {
    /// Connector for app `app_id`, identified to the host as `<app_id>-iframe`.
    pub fn new<T>(app_id: &str, own: Arc<dyn MessageSource>, parent: &Arc<T>) -> Self
    where
        T: MessageTarget + 'static,
    {
        Self::from_rpc(RpcClient::new(format!("{app_id}-iframe"), own, parent))
    }

    pub fn from_rpc(rpc: RpcClient) -> Self {
        Self {
            rpc,
            timeouts: TimeoutConfig::default(),
        }
    }

    pub fn with_timeouts(mut self, timeouts: TimeoutConfig) -> Self {
        self.timeouts = timeouts;
        self
    }

    pub fn id(&self) -> &str {
        self.rpc.target_id()
    }

    pub fn rpc(&self) -> &RpcClient {
        &self.rpc
    }

    async fn interact<T: DeserializeOwned>(&self, kind: OperationKind, data: Option<Value>) -> Result<T> {
        let data = self.rpc.call(kind, data, self.timeouts.for_kind(kind)).await?;
        if let Some(message) = remote_failure(&data) {
            return Err(BridgeError::Remote(message));
        }
        serde_json::from_value(data)
            .map_err(|e| BridgeError::BadRequest(format!("{kind} unexpected response: {e}")))
    }

    pub async fn is_connected(&self) -> Result<bool> {
        self.interact(OperationKind::Connect, None).await
    }

    pub async fn get_address(&self) -> Result<String> {
        self.interact(OperationKind::GetAddress, None).await
    }

    pub async fn sign_transaction(&self, tx: &Transaction) -> Result<Transaction> {
        let data = wire_value(&WireBytes::from_transaction(tx)?)?;
        let signed: WireBytes = self
            .interact(OperationKind::SignTransaction, Some(data))
            .await?;
        signed.into_transaction()
    }

    /// Output `i` is the signed form of input `i`.
    pub async fn sign_all_transactions(&self, txs: &[Transaction]) -> Result<Vec<Transaction>> {
        let wire = txs
            .iter()
            .map(WireBytes::from_transaction)
            .collect::<Result<Vec<_>>>()?;
        let signed: Vec<WireBytes> = self
            .interact(OperationKind::SignAllTransactions, Some(wire_value(&wire)?))
            .await?;
        if signed.len() != txs.len() {
            return Err(BridgeError::BadRequest(format!(
                "sign-all-transactions returned {} transactions for {}",
                signed.len(),
                txs.len()
            )));
        }
        signed.into_iter().map(WireBytes::into_transaction).collect()
    }

    pub async fn sign_message(&self, message: &str) -> Result<SignedMessage> {
        self.interact(OperationKind::SignMessage, Some(Value::String(message.to_string())))
            .await
    }

    pub fn terminate(&self) {
        self.rpc.terminate();
    }
}

/// `{ "error": "<message>" }` is how the host reports a failed wallet call.
fn remote_failure(data: &Value) -> Option<String> {
    let obj = data.as_object()?;
    if obj.len() != 1 {
        return None;
    }
    obj.get("error")?.as_str().map(str::to_owned)
}

fn wire_value<T: serde::Serialize>(value: &T) -> Result<Value> {
    serde_json::to_value(value)
        .map_err(|e| BridgeError::BadRequest(format!("request encode failed: {e}")))
}
