use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use serde_json::Value;

use senbridge_core::error::{BridgeError, Result};

/// Registered message callback.
pub type Listener = Arc<dyn Fn(&Value) + Send + Sync>;

/// Where a message can be posted. Fire-and-forget: a gone or full peer is
/// not an error at send time (callers rely on their own timeouts).
pub trait MessageTarget: Send + Sync {
    fn post_message(&self, msg: &Value);
}

/// Where listeners attach (the receiving side of a script context).
pub trait MessageSource: Send + Sync {
    fn add_listener(&self, listener: Listener) -> u64;
    fn remove_listener(&self, id: u64);
}

/// In-process script context: the "window" of one side of the bridge.
///
/// Posting delivers synchronously, on the posting task, to a snapshot of the
/// live listeners, so a listener may remove itself while it runs.
pub struct Frame {
    id: String,
    listeners: DashMap<u64, Listener>,
    seq: AtomicU64,
}

impl Frame {
    pub fn new(id: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            id: id.into(),
            listeners: DashMap::new(),
            seq: AtomicU64::new(1),
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}

impl MessageTarget for Frame {
    fn post_message(&self, msg: &Value) {
        let snapshot: Vec<Listener> = self.listeners.iter().map(|e| e.value().clone()).collect();
        for listener in snapshot {
            listener(msg);
        }
    }
}

impl MessageSource for Frame {
    fn add_listener(&self, listener: Listener) -> u64 {
        let id = self.seq.fetch_add(1, Ordering::Relaxed);
        self.listeners.insert(id, listener);
        id
    }

    fn remove_listener(&self, id: u64) {
        self.listeners.remove(&id);
    }
}

/// Target lookup by id (the host page's element lookup).
#[derive(Default)]
pub struct FrameDirectory {
    targets: DashMap<String, Arc<dyn MessageTarget>>,
}

impl FrameDirectory {
    pub fn new() -> Self {
        Self {
            targets: DashMap::new(),
        }
    }

    /// Attach `target` under `id`. Fails if the id is taken.
    pub fn attach(&self, id: impl Into<String>, target: Arc<dyn MessageTarget>) -> Result<()> {
        let id = id.into();
        match self.targets.entry(id) {
            dashmap::mapref::entry::Entry::Occupied(e) => Err(BridgeError::BadRequest(format!(
                "frame id already attached: {}",
                e.key()
            ))),
            dashmap::mapref::entry::Entry::Vacant(e) => {
                e.insert(target);
                Ok(())
            }
        }
    }

    pub fn detach(&self, id: &str) -> Option<Arc<dyn MessageTarget>> {
        self.targets.remove(id).map(|(_, t)| t)
    }

    pub fn resolve(&self, id: &str) -> Result<Arc<dyn MessageTarget>> {
        self.targets
            .get(id)
            .map(|t| Arc::clone(t.value()))
            .ok_or_else(|| BridgeError::Channel(format!("cannot find frame with id {id}")))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.targets.contains_key(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn listener_may_remove_itself_during_delivery() {
        let frame = Frame::new("w");
        let hits = Arc::new(AtomicUsize::new(0));
        let slot = Arc::new(AtomicU64::new(0));

        let (f, h, s) = (Arc::clone(&frame), Arc::clone(&hits), Arc::clone(&slot));
        let id = frame.add_listener(Arc::new(move |_| {
            h.fetch_add(1, Ordering::SeqCst);
            f.remove_listener(s.load(Ordering::SeqCst));
        }));
        slot.store(id, Ordering::SeqCst);

        frame.post_message(&json!(1));
        frame.post_message(&json!(2));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert_eq!(frame.listener_count(), 0);
    }

    #[test]
    fn directory_rejects_duplicates_and_unknown_ids() {
        let dir = FrameDirectory::new();
        dir.attach("a", Frame::new("a")).unwrap();
        assert!(dir.attach("a", Frame::new("a")).is_err());
        assert_eq!(dir.resolve("b").err().map(|e| e.code().as_str()), Some("CHANNEL"));
        assert!(dir.detach("a").is_some());
        assert!(!dir.contains("a"));
    }
}
