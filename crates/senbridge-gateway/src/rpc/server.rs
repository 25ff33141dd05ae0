use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use dashmap::DashMap;
use serde::Deserialize;
use serde_json::Value;
use tokio::runtime::Handle;
use tracing::{debug, trace, warn};

use senbridge_core::error::{BridgeError, Result};
use senbridge_core::protocol::{OperationKind, Request, Response};

use crate::channel::{Disposer, FrameDirectory, MessageSource, Messenger};

/// Who asked, and which call this is.
#[derive(Debug, Clone)]
pub struct RequestCtx {
    pub target_id: String,
    pub correlation_id: u64,
}

/// Handler for one operation kind.
///
/// An `Err` is not turned into a response: the client side times out. A
/// handler that wants the caller to see a failure encodes it into its `Ok`
/// value instead.
#[async_trait]
pub trait RequestHandler: Send + Sync {
    fn kind(&self) -> OperationKind;
    async fn handle(&self, ctx: RequestCtx, data: Option<Value>) -> Result<Value>;
}

/// Server role of the request/response engine: routing table + responder.
pub struct RpcServer {
    messenger: Messenger,
    directory: Arc<FrameDirectory>,
    routes: DashMap<OperationKind, Arc<dyn RequestHandler>>,
    listening: Mutex<Option<Disposer>>,
}

impl RpcServer {
    pub fn new(name: &str, host: Arc<dyn MessageSource>, directory: Arc<FrameDirectory>) -> Arc<Self> {
        Arc::new(Self {
            messenger: Messenger::new(name, host),
            directory,
            routes: DashMap::new(),
            listening: Mutex::new(None),
        })
    }

    pub fn register(&self, handler: Arc<dyn RequestHandler>) {
        self.routes.insert(handler.kind(), handler);
    }

    pub fn registered_kinds(&self) -> Vec<OperationKind> {
        self.routes.iter().map(|e| *e.key()).collect()
    }

    pub fn directory(&self) -> &Arc<FrameDirectory> {
        &self.directory
    }

    /// Start listening on the host frame. Must run inside a tokio runtime;
    /// calling it again while listening is a no-op.
    pub fn start(self: &Arc<Self>) -> Result<()> {
        let mut listening = self.listening.lock().unwrap_or_else(PoisonError::into_inner);
        if listening.is_some() {
            return Ok(());
        }

        let runtime = Handle::try_current()
            .map_err(|e| BridgeError::Internal(format!("rpc server needs a tokio runtime: {e}")))?;
        let weak = Arc::downgrade(self);

        let disposer = self.messenger.listen(move |payload| {
            let Some(server) = weak.upgrade() else {
                return;
            };
            let req = match Request::deserialize(payload) {
                Ok(req) => req,
                Err(e) => {
                    trace!(error = %e, "not a request; ignored");
                    return;
                }
            };
            let Some(handler) = server.routes.get(&req.operation_kind).map(|h| Arc::clone(h.value())) else {
                debug!(kind = %req.operation_kind, target = %req.target_id, "no handler; request dropped");
                return;
            };
            runtime.spawn(async move { server.serve(handler, req).await });
        });

        *listening = Some(disposer);
        Ok(())
    }

    async fn serve(&self, handler: Arc<dyn RequestHandler>, req: Request) {
        let Request {
            operation_kind,
            target_id,
            correlation_id,
            data,
        } = req;
        let ctx = RequestCtx {
            target_id: target_id.clone(),
            correlation_id,
        };

        let data = match handler.handle(ctx, data).await {
            Ok(data) => data,
            Err(e) => {
                warn!(kind = %operation_kind, correlation_id, target = %target_id, error = %e, "handler failed; no response sent");
                return;
            }
        };

        let resp = Response {
            operation_kind,
            correlation_id,
            data,
        };
        if let Err(e) = self.respond(&target_id, &resp) {
            warn!(kind = %operation_kind, correlation_id, target = %target_id, error = %e, "response not delivered");
        }
    }

    fn respond(&self, target_id: &str, resp: &Response) -> Result<()> {
        let target = self.directory.resolve(target_id)?;
        self.messenger.emit(target.as_ref(), resp)
    }

    /// Stop listening and dispose every listener this server owns.
    pub fn terminate(&self) {
        self.listening
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        self.messenger.dispose_all();
    }
}
