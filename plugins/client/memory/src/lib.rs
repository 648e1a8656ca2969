//! In-process record client.
//!
//! Keeps every record in memory and notifies live subscribers
//! synchronously on each write. Useful for local runs and tests; connection
//! errors and write failures can be injected by hand.

pub mod path;

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use serde_json::{Map, Value};

use record_api::{
    ClientError, ConnectionError, ErrorHandler, HasCallback, ListenerId, ReadyCallback,
    RecordClient, RecordHandle, SnapshotCallback, UpdateCallback, WriteCallback,
};

pub use path::{PathError, get_path, set_path};

/// Error code reported by `snapshot` for an unknown record.
pub const RECORD_NOT_FOUND: &str = "RECORD_NOT_FOUND";

/// Error code reported by `set_data` for a field path that cannot be written.
pub const INVALID_PATH: &str = "INVALID_PATH";

fn lock<'a, T>(mutex: &'a Mutex<T>, what: &str) -> MutexGuard<'a, T> {
    match mutex.lock() {
        Ok(g) => g,
        Err(poisoned) => {
            tracing::warn!(lock = what, "memory client lock was poisoned, recovering");
            poisoned.into_inner()
        }
    }
}

// ═══════════════════════════════════════════════════════════════
//  Shared state
// ═══════════════════════════════════════════════════════════════

#[derive(Default)]
struct Inner {
    records: Mutex<HashMap<String, Value>>,
    subscribers: Mutex<HashMap<String, Vec<(u64, UpdateCallback)>>>,
    error_listeners: Mutex<Vec<(ListenerId, ErrorHandler)>>,
    write_failure: Mutex<Option<ClientError>>,
    next_id: AtomicU64,
}

impl Inner {
    fn next_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    fn current(&self, name: &str) -> Option<Value> {
        lock(&self.records, "records").get(name).cloned()
    }

    /// Deliver `value` to every subscriber of `name`. Callbacks run with no
    /// lock held.
    fn notify(&self, name: &str, value: &Value) {
        let callbacks: Vec<UpdateCallback> = lock(&self.subscribers, "subscribers")
            .get(name)
            .map(|subs| subs.iter().map(|(_, cb)| Arc::clone(cb)).collect())
            .unwrap_or_default();
        for cb in callbacks {
            cb(value);
        }
    }

    fn unsubscribe(&self, name: &str, ids: &[u64]) {
        let mut subscribers = lock(&self.subscribers, "subscribers");
        if let Some(subs) = subscribers.get_mut(name) {
            subs.retain(|(id, _)| !ids.contains(id));
            if subs.is_empty() {
                subscribers.remove(name);
            }
        }
    }
}

// ═══════════════════════════════════════════════════════════════
//  MemoryClient
// ═══════════════════════════════════════════════════════════════

/// In-memory [`RecordClient`]. Clones share the same records.
#[derive(Clone, Default)]
pub struct MemoryClient {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for MemoryClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryClient")
            .field("records", &self.record_names().len())
            .field("error_listeners", &self.error_listener_count())
            .finish()
    }
}

impl MemoryClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `value` as the content of `name` and notify its subscribers.
    pub fn insert(&self, name: impl Into<String>, value: Value) {
        let name = name.into();
        lock(&self.inner.records, "records").insert(name.clone(), value.clone());
        self.inner.notify(&name, &value);
    }

    pub fn get(&self, name: &str) -> Option<Value> {
        self.inner.current(name)
    }

    pub fn record_names(&self) -> Vec<String> {
        lock(&self.inner.records, "records").keys().cloned().collect()
    }

    /// Make every following `set_data` fail with `error` (`None` restores
    /// normal writes).
    pub fn fail_writes(&self, error: Option<ClientError>) {
        *lock(&self.inner.write_failure, "write_failure") = error;
    }

    /// Raise a connection-level error on every attached listener.
    pub fn emit_error(&self, code: impl Into<String>, message: impl Into<String>) {
        let err = ConnectionError::new(code, message);
        let handlers: Vec<ErrorHandler> = lock(&self.inner.error_listeners, "error_listeners")
            .iter()
            .map(|(_, h)| Arc::clone(h))
            .collect();
        tracing::debug!(code = %err.code, listeners = handlers.len(), "emitting connection error");
        for handler in handlers {
            handler(&err);
        }
    }

    /// Live subscriptions currently registered on `name`.
    pub fn subscriber_count(&self, name: &str) -> usize {
        lock(&self.inner.subscribers, "subscribers")
            .get(name)
            .map_or(0, Vec::len)
    }

    pub fn error_listener_count(&self) -> usize {
        lock(&self.inner.error_listeners, "error_listeners").len()
    }
}

impl RecordClient for MemoryClient {
    fn get_record(&self, name: &str) -> Box<dyn RecordHandle> {
        lock(&self.inner.records, "records")
            .entry(name.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        Box::new(MemoryRecordHandle {
            inner: Arc::clone(&self.inner),
            name: name.to_string(),
            subscriptions: Mutex::new(Vec::new()),
            discarded: AtomicBool::new(false),
        })
    }

    fn set_data(&self, name: &str, path: Option<&str>, value: Value, callback: WriteCallback) {
        let failure = lock(&self.inner.write_failure, "write_failure").clone();
        if let Some(err) = failure {
            callback(Err(err));
            return;
        }

        // A rejected path leaves the stored record untouched.
        let written = {
            let mut records = lock(&self.inner.records, "records");
            let updated = match path {
                Some(path) => {
                    let mut record = records
                        .get(name)
                        .cloned()
                        .unwrap_or_else(|| Value::Object(Map::new()));
                    set_path(&mut record, path, value).map(|()| record)
                }
                None => Ok(value),
            };
            updated.inspect(|record| {
                records.insert(name.to_string(), record.clone());
            })
        };

        match written {
            Ok(updated) => {
                self.inner.notify(name, &updated);
                callback(Ok(()));
            }
            Err(err) => {
                tracing::debug!(record = name, path = ?path, error = %err, "rejected field path");
                callback(Err(ClientError::with_code(INVALID_PATH, err.to_string())));
            }
        }
    }

    fn snapshot(&self, name: &str, callback: SnapshotCallback) {
        let result = self.inner.current(name).ok_or_else(|| {
            ClientError::with_code(RECORD_NOT_FOUND, format!("record '{name}' not found"))
        });
        callback(result);
    }

    fn has(&self, name: &str, callback: HasCallback) {
        let exists = lock(&self.inner.records, "records").contains_key(name);
        callback(exists);
    }

    fn on_error(&self, handler: ErrorHandler) -> ListenerId {
        let id = self.inner.next_id();
        lock(&self.inner.error_listeners, "error_listeners").push((id, handler));
        id
    }

    fn remove_error_listener(&self, id: ListenerId) {
        lock(&self.inner.error_listeners, "error_listeners").retain(|(lid, _)| *lid != id);
    }
}

// ═══════════════════════════════════════════════════════════════
//  MemoryRecordHandle
// ═══════════════════════════════════════════════════════════════

struct MemoryRecordHandle {
    inner: Arc<Inner>,
    name: String,
    subscriptions: Mutex<Vec<u64>>,
    discarded: AtomicBool,
}

impl RecordHandle for MemoryRecordHandle {
    fn when_ready(&self, callback: ReadyCallback) {
        if !self.discarded.load(Ordering::Acquire) {
            callback();
        }
    }

    fn subscribe(&self, callback: UpdateCallback, trigger_now: bool) {
        if self.discarded.load(Ordering::Acquire) {
            return;
        }
        let id = self.inner.next_id();
        lock(&self.inner.subscribers, "subscribers")
            .entry(self.name.clone())
            .or_default()
            .push((id, Arc::clone(&callback)));
        lock(&self.subscriptions, "subscriptions").push(id);

        if trigger_now {
            if let Some(value) = self.inner.current(&self.name) {
                callback(&value);
            }
        }
    }

    fn discard(&self) {
        if self.discarded.swap(true, Ordering::AcqRel) {
            return;
        }
        let ids = std::mem::take(&mut *lock(&self.subscriptions, "subscriptions"));
        self.inner.unsubscribe(&self.name, &ids);
    }
}
