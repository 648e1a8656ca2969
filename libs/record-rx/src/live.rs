use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use serde_json::Value;
use tokio::sync::mpsc;

use record_api::{ConnectionError, ErrorHandler, ListenerId, RecordClient, RecordHandle};

use crate::error::RecordError;

pub(crate) type LiveSender = mpsc::UnboundedSender<Result<Value, RecordError>>;

// ═══════════════════════════════════════════════════════════════
//  LiveSubscription
// ═══════════════════════════════════════════════════════════════

/// Client record handle owned by one `get()` stream.
///
/// `discard()` reaches the client at most once, whichever teardown path
/// (drop, connection error) gets there first.
pub(crate) struct LiveSubscription {
    name: Arc<str>,
    handle: Box<dyn RecordHandle>,
    discarded: AtomicBool,
}

impl LiveSubscription {
    pub(crate) fn new(name: Arc<str>, handle: Box<dyn RecordHandle>) -> Self {
        Self {
            name,
            handle,
            discarded: AtomicBool::new(false),
        }
    }

    pub(crate) fn handle(&self) -> &dyn RecordHandle {
        self.handle.as_ref()
    }

    pub(crate) fn is_discarded(&self) -> bool {
        self.discarded.load(Ordering::Acquire)
    }

    pub(crate) fn discard(&self) {
        if !self.discarded.swap(true, Ordering::AcqRel) {
            tracing::debug!(record = %self.name, "discarding live record subscription");
            self.handle.discard();
        }
    }
}

// ═══════════════════════════════════════════════════════════════
//  Shared — client + registry of live streams
// ═══════════════════════════════════════════════════════════════

struct Entry {
    tx: LiveSender,
    sub: Arc<LiveSubscription>,
}

#[derive(Default)]
struct Registry {
    next_id: u64,
    entries: HashMap<u64, Entry>,
    listener: Option<ListenerId>,
    /// An `on_error` call is in flight outside the lock.
    attaching: bool,
}

/// State shared by an `RxClient` and everything built from it.
///
/// The connection error listener is attached while at least one live
/// stream is registered and detached as soon as none is.
pub(crate) struct Shared {
    pub(crate) client: Arc<dyn RecordClient>,
    registry: Mutex<Registry>,
}

impl Shared {
    pub(crate) fn new(client: Arc<dyn RecordClient>) -> Self {
        Self {
            client,
            registry: Mutex::new(Registry::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Registry> {
        match self.registry.lock() {
            Ok(g) => g,
            Err(poisoned) => {
                tracing::warn!("live stream registry lock was poisoned, recovering");
                poisoned.into_inner()
            }
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.lock().entries.len()
    }

    /// Track a live stream so connection errors reach it. Returns its
    /// registry id.
    ///
    /// The client may invoke the error handler from inside `on_error`, so the
    /// registry lock is not held across that call.
    pub(crate) fn register(self: &Arc<Self>, tx: LiveSender, sub: Arc<LiveSubscription>) -> u64 {
        let (id, attach) = {
            let mut registry = self.lock();
            let id = registry.next_id;
            registry.next_id += 1;
            registry.entries.insert(id, Entry { tx, sub });
            let attach = registry.listener.is_none() && !registry.attaching;
            registry.attaching |= attach;
            (id, attach)
        };
        if attach {
            self.attach_listener();
        }
        id
    }

    fn attach_listener(self: &Arc<Self>) {
        let weak = Arc::downgrade(self);
        let handler: ErrorHandler = Arc::new(move |err: &ConnectionError| {
            if let Some(shared) = weak.upgrade() {
                shared.broadcast(err);
            }
        });
        let listener = self.client.on_error(handler);

        // Streams may have been dropped or terminated while attaching.
        let surplus = {
            let mut registry = self.lock();
            registry.attaching = false;
            if registry.entries.is_empty() || registry.listener.is_some() {
                Some(listener)
            } else {
                registry.listener = Some(listener);
                None
            }
        };
        match surplus {
            Some(listener) => {
                self.client.remove_error_listener(listener);
                tracing::debug!("connection error listener no longer needed, detached");
            }
            None => tracing::debug!("connection error listener attached"),
        }
    }

    /// Forget a live stream. Detaches the error listener with the last one.
    pub(crate) fn unregister(&self, id: u64) {
        let detach = {
            let mut registry = self.lock();
            registry.entries.remove(&id);
            if registry.entries.is_empty() {
                registry.listener.take()
            } else {
                None
            }
        };
        if let Some(listener) = detach {
            self.client.remove_error_listener(listener);
            tracing::debug!("connection error listener detached");
        }
    }

    /// Terminate every registered live stream with `err`.
    fn broadcast(&self, err: &ConnectionError) {
        let (entries, listener) = {
            let mut registry = self.lock();
            (
                std::mem::take(&mut registry.entries),
                registry.listener.take(),
            )
        };
        if let Some(listener) = listener {
            self.client.remove_error_listener(listener);
        }

        tracing::debug!(
            code = %err.code,
            streams = entries.len(),
            "connection error, terminating live record streams"
        );
        for (_, entry) in entries {
            entry.sub.discard();
            let _ = entry.tx.send(Err(RecordError::Connection(err.clone())));
        }
    }
}
