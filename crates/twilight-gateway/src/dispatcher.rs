//! Event dispatcher: tag → ordered listener list.
//!
//! Tags match by exact string. Listeners for a tag fire synchronously in
//! registration order; a tag with no listeners is a no-op.

use std::collections::HashMap;
use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;
use serde_json::Value;
use tracing::warn;

/// A listener callback. Receives the frame's payload.
pub type Listener = Arc<dyn Fn(&Value) + Send + Sync>;

/// Handle identifying one registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "listener-{}", self.0)
    }
}

struct Registration {
    id: ListenerId,
    once: bool,
    listener: Listener,
}

#[derive(Default)]
struct Registry {
    by_tag: HashMap<String, Vec<Registration>>,
}

/// Publish/subscribe registry for inbound gateway events.
///
/// Clones share the same registry.
#[derive(Clone, Default)]
pub struct EventDispatcher {
    registry: Arc<RwLock<Registry>>,
    next_id: Arc<AtomicU64>,
}

impl fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventDispatcher")
            .field("tags", &self.event_names())
            .finish()
    }
}

impl EventDispatcher {
    /// Create an empty dispatcher.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `listener` for `tag`.
    pub fn on<F>(&self, tag: impl Into<String>, listener: F) -> ListenerId
    where
        F: Fn(&Value) + Send + Sync + 'static,
    {
        self.register(tag.into(), Arc::new(listener), false)
    }

    /// Register an already shared listener, e.g. one used for several tags.
    pub fn on_shared(&self, tag: impl Into<String>, listener: Listener) -> ListenerId {
        self.register(tag.into(), listener, false)
    }

    /// Register `listener` for the next `tag` event only.
    pub fn once<F>(&self, tag: impl Into<String>, listener: F) -> ListenerId
    where
        F: Fn(&Value) + Send + Sync + 'static,
    {
        self.register(tag.into(), Arc::new(listener), true)
    }

    /// Remove a registration. Returns `false` if it was not registered.
    pub fn off(&self, id: ListenerId) -> bool {
        let mut registry = self.registry.write();
        let mut emptied = None;
        let mut removed = false;
        for (tag, entries) in &mut registry.by_tag {
            if let Some(pos) = entries.iter().position(|r| r.id == id) {
                entries.remove(pos);
                removed = true;
                if entries.is_empty() {
                    emptied = Some(tag.clone());
                }
                break;
            }
        }
        if let Some(tag) = emptied {
            registry.by_tag.remove(&tag);
        }
        removed
    }

    /// Remove every listener for `tag`. Returns how many were removed.
    pub fn remove_all(&self, tag: &str) -> usize {
        self.registry
            .write()
            .by_tag
            .remove(tag)
            .map_or(0, |entries| entries.len())
    }

    /// Number of listeners registered for `tag`.
    #[must_use]
    pub fn listener_count(&self, tag: &str) -> usize {
        self.registry.read().by_tag.get(tag).map_or(0, Vec::len)
    }

    /// Tags with at least one listener, sorted.
    #[must_use]
    pub fn event_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.registry.read().by_tag.keys().cloned().collect();
        names.sort();
        names
    }

    /// Deliver `payload` to every listener registered for `tag`.
    ///
    /// Listeners run on the caller's task, in registration order, outside
    /// the registry lock. A panicking listener is logged and skipped; the
    /// rest still run. Returns the number of listeners invoked.
    pub fn emit(&self, tag: &str, payload: &Value) -> usize {
        let listeners: Vec<Listener> = {
            let mut registry = self.registry.write();
            let Some(entries) = registry.by_tag.get_mut(tag) else {
                return 0;
            };
            let snapshot = entries.iter().map(|r| Arc::clone(&r.listener)).collect();
            entries.retain(|r| !r.once);
            if entries.is_empty() {
                registry.by_tag.remove(tag);
            }
            snapshot
        };

        for listener in &listeners {
            if catch_unwind(AssertUnwindSafe(|| listener(payload))).is_err() {
                warn!(tag, "event listener panicked");
            }
        }
        listeners.len()
    }

    fn register(&self, tag: String, listener: Listener, once: bool) -> ListenerId {
        let id = ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.registry
            .write()
            .by_tag
            .entry(tag)
            .or_default()
            .push(Registration { id, once, listener });
        id
    }
}
