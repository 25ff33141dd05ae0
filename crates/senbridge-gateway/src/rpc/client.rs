use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, Weak};

use serde::Deserialize;
use serde_json::Value;
use tokio::sync::oneshot;
use tokio::time::{timeout, Duration};
use tracing::{debug, warn};

use senbridge_core::error::{BridgeError, Result};
use senbridge_core::protocol::{OperationKind, Request, Response};

use crate::channel::{Disposer, MessageSource, MessageTarget, Messenger};

/// Client role of the request/response engine.
///
/// Each call registers a one-shot listener, races it against a timer, and
/// settles exactly once; the listener is disposed before the call returns.
pub struct RpcClient {
    target_id: Arc<str>,
    messenger: Messenger,
    parent: Weak<dyn MessageTarget>,
    next_id: AtomicU64,
}

/// In-flight call. Dropping it (settled or cancelled) disposes its listener.
struct PendingCall {
    kind: OperationKind,
    correlation_id: u64,
    disposer: Disposer,
}

impl Drop for PendingCall {
    fn drop(&mut self) {
        if !self.disposer.is_disposed() {
            debug!(kind = %self.kind, correlation_id = self.correlation_id, "disposing pending call");
        }
        self.disposer.dispose();
    }
}

impl RpcClient {
    /// `own` is where responses arrive; `parent` is where requests go.
    pub fn new<T>(target_id: impl Into<Arc<str>>, own: Arc<dyn MessageSource>, parent: &Arc<T>) -> Self
    where
        T: MessageTarget + 'static,
    {
        let target_id: Arc<str> = target_id.into();
        let parent: Weak<T> = Arc::downgrade(parent);
        let parent: Weak<dyn MessageTarget> = parent;
        Self {
            messenger: Messenger::new(Arc::clone(&target_id), own),
            target_id,
            parent,
            // Random start keeps sibling clients in one frame apart;
            // the counter keeps in-flight ids unique within this client.
            next_id: AtomicU64::new(u64::from(rand::random::<u32>())),
        }
    }

    pub fn with_starting_id(self, id: u64) -> Self {
        self.next_id.store(id, Ordering::Relaxed);
        self
    }

    pub fn target_id(&self) -> &str {
        &self.target_id
    }

    pub fn live_listeners(&self) -> usize {
        self.messenger.live_listeners()
    }

    fn next_correlation_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    /// Send `kind` with `data` and wait up to `deadline` for the matching response.
    pub async fn call(&self, kind: OperationKind, data: Option<Value>, deadline: Duration) -> Result<Value> {
        let parent = self
            .parent
            .upgrade()
            .ok_or_else(|| BridgeError::Channel("cannot access parent frame".into()))?;

        let correlation_id = self.next_correlation_id();
        let (tx, rx) = oneshot::channel::<Value>();
        let slot = Mutex::new(Some(tx));

        let disposer = self.messenger.listen(move |payload| {
            let Ok(resp) = Response::deserialize(payload) else {
                return;
            };
            if !resp.answers(kind, correlation_id) {
                return;
            }
            let tx = slot.lock().unwrap_or_else(PoisonError::into_inner).take();
            if let Some(tx) = tx {
                let _ = tx.send(resp.data);
            }
        });
        let pending = PendingCall {
            kind,
            correlation_id,
            disposer,
        };

        let req = Request {
            operation_kind: kind,
            target_id: self.target_id.to_string(),
            correlation_id,
            data,
        };
        debug!(%kind, correlation_id, target = %self.target_id, "making call");
        self.messenger.emit(parent.as_ref(), &req)?;
        drop(parent);

        let outcome = timeout(deadline, rx).await;
        drop(pending);

        match outcome {
            Ok(Ok(data)) => {
                debug!(%kind, correlation_id, "call completed");
                Ok(data)
            }
            Ok(Err(_)) => Err(BridgeError::Internal("response slot dropped".into())),
            Err(_) => {
                warn!(%kind, correlation_id, ?deadline, "call timed out");
                Err(BridgeError::Timeout)
            }
        }
    }

    /// Dispose every listener this client still owns.
    pub fn terminate(&self) {
        self.messenger.dispose_all();
    }
}
