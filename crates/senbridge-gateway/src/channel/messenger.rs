use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError, Weak};

use serde::Serialize;
use serde_json::Value;

use senbridge_core::error::Result;
use senbridge_core::protocol::envelope;

use crate::channel::frame::{Listener, MessageSource, MessageTarget};

type Registry = Arc<Mutex<Vec<Arc<DisposerInner>>>>;

/// Channel adapter: marks outgoing payloads, filters incoming ones, and owns
/// the listeners it registers.
pub struct Messenger {
    name: Arc<str>,
    source: Arc<dyn MessageSource>,
    registry: Registry,
}

impl Messenger {
    pub fn new(name: impl Into<Arc<str>>, source: Arc<dyn MessageSource>) -> Self {
        Self {
            name: name.into(),
            source,
            registry: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Seal `payload` and post it to `target`.
    pub fn emit<T: Serialize>(&self, target: &dyn MessageTarget, payload: &T) -> Result<()> {
        let sealed = envelope::seal(payload)?;
        target.post_message(&sealed);
        Ok(())
    }

    /// Run `callback` with the payload of every correctly marked envelope.
    pub fn listen<F>(&self, callback: F) -> Disposer
    where
        F: Fn(&Value) + Send + Sync + 'static,
    {
        let name = Arc::clone(&self.name);
        let listener: Listener = Arc::new(move |raw: &Value| {
            let Some(payload) = envelope::open(raw) else {
                return;
            };
            tracing::debug!(bridge = %name, %payload, "bridge message");
            callback(payload);
        });

        let id = self.source.add_listener(listener);
        let inner = Arc::new(DisposerInner {
            id,
            source: Arc::downgrade(&self.source),
            registry: Arc::downgrade(&self.registry),
            disposed: AtomicBool::new(false),
        });
        lock(&self.registry).push(Arc::clone(&inner));

        Disposer { inner }
    }

    /// Dispose every outstanding listener, newest first. Idempotent.
    pub fn dispose_all(&self) {
        let owned = std::mem::take(&mut *lock(&self.registry));
        for inner in owned.into_iter().rev() {
            if !inner.disposed.swap(true, Ordering::AcqRel) {
                self.source.remove_listener(inner.id);
            }
        }
    }

    pub fn live_listeners(&self) -> usize {
        lock(&self.registry).len()
    }
}

impl Drop for Messenger {
    fn drop(&mut self) {
        self.dispose_all();
    }
}

/// Handle that deregisters exactly one listener.
#[derive(Clone)]
pub struct Disposer {
    inner: Arc<DisposerInner>,
}

struct DisposerInner {
    id: u64,
    source: Weak<dyn MessageSource>,
    registry: Weak<Mutex<Vec<Arc<DisposerInner>>>>,
    disposed: AtomicBool,
}

impl Disposer {
    pub fn dispose(&self) {
        if self.inner.disposed.swap(true, Ordering::AcqRel) {
            return;
        }
        if let Some(source) = self.inner.source.upgrade() {
            source.remove_listener(self.inner.id);
        }
        if let Some(registry) = self.inner.registry.upgrade() {
            lock(&registry).retain(|owned| !Arc::ptr_eq(owned, &self.inner));
        }
    }

    pub fn is_disposed(&self) -> bool {
        self.inner.disposed.load(Ordering::Acquire)
    }
}

fn lock<T>(registry: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    registry.lock().unwrap_or_else(PoisonError::into_inner)
}
