//! Recording mock of `RecordClient` shared by the integration tests.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use serde_json::Value;

use record_api::{
    ClientError, ConnectionError, ErrorHandler, HasCallback, ListenerId, ReadyCallback,
    RecordClient, RecordHandle, SnapshotCallback, UpdateCallback, WriteCallback,
};

#[derive(Debug, Clone, PartialEq)]
pub struct WriteCall {
    pub name: String,
    pub path: Option<String>,
    pub value: Value,
}

#[derive(Clone, Default)]
pub enum WriteOutcome {
    #[default]
    Succeed,
    Fail(ClientError),
    /// Drop the callback without calling it.
    Vanish,
}

/// One handle returned by `get_record`.
#[derive(Default)]
pub struct HandleState {
    pub name: String,
    pending_ready: Mutex<Vec<ReadyCallback>>,
    callbacks: Mutex<Vec<UpdateCallback>>,
    /// Every callback ever subscribed, kept past `discard`.
    retained: Mutex<Vec<UpdateCallback>>,
    subscribe_calls: Mutex<Vec<bool>>,
    discards: AtomicUsize,
}

impl HandleState {
    pub fn discards(&self) -> usize {
        self.discards.load(Ordering::SeqCst)
    }

    /// `trigger_now` flag of every `subscribe` call, in order.
    pub fn subscribe_calls(&self) -> Vec<bool> {
        self.subscribe_calls.lock().unwrap().clone()
    }

    fn is_discarded(&self) -> bool {
        self.discards() > 0
    }
}

struct MockHandle {
    state: Arc<HandleState>,
    initial: Option<Value>,
}

impl RecordHandle for MockHandle {
    fn when_ready(&self, callback: ReadyCallback) {
        self.state.pending_ready.lock().unwrap().push(callback);
    }

    fn subscribe(&self, callback: UpdateCallback, trigger_now: bool) {
        self.state.subscribe_calls.lock().unwrap().push(trigger_now);
        self.state.callbacks.lock().unwrap().push(Arc::clone(&callback));
        self.state.retained.lock().unwrap().push(Arc::clone(&callback));
        if trigger_now {
            if let Some(value) = &self.initial {
                callback(value);
            }
        }
    }

    fn discard(&self) {
        self.state.discards.fetch_add(1, Ordering::SeqCst);
        self.state.callbacks.lock().unwrap().clear();
    }
}

#[derive(Default)]
struct MockState {
    initial: HashMap<String, Value>,
    existing: HashSet<String>,
    manual_ready: bool,
    handles: Vec<Arc<HandleState>>,
    writes: Vec<WriteCall>,
    write_outcome: WriteOutcome,
    snapshot_result: Option<Result<Value, ClientError>>,
    calls: Vec<String>,
    replay_on_attach: Option<ConnectionError>,
    listeners: Vec<(ListenerId, ErrorHandler)>,
    removed_listeners: Vec<ListenerId>,
    next_listener: ListenerId,
}

#[derive(Default)]
pub struct MockClient {
    state: Mutex<MockState>,
}

impl MockClient {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Content delivered on `subscribe(_, true)` for handles on `name`.
    pub fn with_value(&self, name: &str, value: Value) {
        self.state.lock().unwrap().initial.insert(name.to_string(), value);
    }

    /// Hold `when_ready` callbacks until `make_ready`.
    pub fn manual_ready(&self) {
        self.state.lock().unwrap().manual_ready = true;
    }

    pub fn make_ready(&self, name: &str) {
        let pending: Vec<ReadyCallback> = self
            .handles(name)
            .iter()
            .flat_map(|h| std::mem::take(&mut *h.pending_ready.lock().unwrap()))
            .collect();
        for callback in pending {
            callback();
        }
    }

    pub fn set_existing(&self, name: &str) {
        self.state.lock().unwrap().existing.insert(name.to_string());
    }

    pub fn set_write_outcome(&self, outcome: WriteOutcome) {
        self.state.lock().unwrap().write_outcome = outcome;
    }

    /// `None` drops the snapshot callback without calling it.
    pub fn set_snapshot_result(&self, result: Option<Result<Value, ClientError>>) {
        self.state.lock().unwrap().snapshot_result = result;
    }

    /// Deliver `value` to every live subscriber on `name`.
    pub fn push(&self, name: &str, value: Value) {
        let callbacks: Vec<UpdateCallback> = self
            .handles(name)
            .iter()
            .filter(|h| !h.is_discarded())
            .flat_map(|h| h.callbacks.lock().unwrap().clone())
            .collect();
        for callback in callbacks {
            callback(&value);
        }
    }

    /// Deliver `value` to every callback ever subscribed on `name`, discarded
    /// or not, like a client whose update races the discard.
    pub fn push_ignoring_discard(&self, name: &str, value: Value) {
        let callbacks: Vec<UpdateCallback> = self
            .handles(name)
            .iter()
            .flat_map(|h| h.retained.lock().unwrap().clone())
            .collect();
        for callback in callbacks {
            callback(&value);
        }
    }

    /// Invoke each new error handler with this error from inside `on_error`.
    pub fn replay_error_on_attach(&self, code: &str, message: &str) {
        self.state.lock().unwrap().replay_on_attach = Some(ConnectionError::new(code, message));
    }

    pub fn emit_error(&self, code: &str, message: &str) {
        let handlers: Vec<ErrorHandler> = self
            .state
            .lock()
            .unwrap()
            .listeners
            .iter()
            .map(|(_, h)| Arc::clone(h))
            .collect();
        let err = ConnectionError::new(code, message);
        for handler in handlers {
            handler(&err);
        }
    }

    pub fn handles(&self, name: &str) -> Vec<Arc<HandleState>> {
        self.state
            .lock()
            .unwrap()
            .handles
            .iter()
            .filter(|h| h.name == name)
            .cloned()
            .collect()
    }

    pub fn all_handles(&self) -> Vec<Arc<HandleState>> {
        self.state.lock().unwrap().handles.clone()
    }

    pub fn writes(&self) -> Vec<WriteCall> {
        self.state.lock().unwrap().writes.clone()
    }

    /// Operation log, e.g. `get_record:r`, `snapshot:r`, `has:r`.
    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn listener_count(&self) -> usize {
        self.state.lock().unwrap().listeners.len()
    }

    pub fn removed_listeners(&self) -> Vec<ListenerId> {
        self.state.lock().unwrap().removed_listeners.clone()
    }
}

impl RecordClient for MockClient {
    fn get_record(&self, name: &str) -> Box<dyn RecordHandle> {
        let (state, initial, manual_ready) = {
            let mut s = self.state.lock().unwrap();
            s.calls.push(format!("get_record:{name}"));
            let state = Arc::new(HandleState {
                name: name.to_string(),
                ..Default::default()
            });
            s.handles.push(Arc::clone(&state));
            (state, s.initial.get(name).cloned(), s.manual_ready)
        };
        Box::new(AutoReadyHandle {
            inner: MockHandle { state, initial },
            manual_ready,
        })
    }

    fn set_data(&self, name: &str, path: Option<&str>, value: Value, callback: WriteCallback) {
        let outcome = {
            let mut s = self.state.lock().unwrap();
            s.calls.push(format!("set_data:{name}"));
            s.writes.push(WriteCall {
                name: name.to_string(),
                path: path.map(str::to_string),
                value,
            });
            s.write_outcome.clone()
        };
        match outcome {
            WriteOutcome::Succeed => callback(Ok(())),
            WriteOutcome::Fail(err) => callback(Err(err)),
            WriteOutcome::Vanish => drop(callback),
        }
    }

    fn snapshot(&self, name: &str, callback: SnapshotCallback) {
        let result = {
            let mut s = self.state.lock().unwrap();
            s.calls.push(format!("snapshot:{name}"));
            s.snapshot_result.clone()
        };
        if let Some(result) = result {
            callback(result);
        }
    }

    fn has(&self, name: &str, callback: HasCallback) {
        let exists = {
            let mut s = self.state.lock().unwrap();
            s.calls.push(format!("has:{name}"));
            s.existing.contains(name)
        };
        callback(exists);
    }

    fn on_error(&self, handler: ErrorHandler) -> ListenerId {
        let (id, replay) = {
            let mut s = self.state.lock().unwrap();
            s.next_listener += 1;
            let id = s.next_listener;
            s.listeners.push((id, Arc::clone(&handler)));
            (id, s.replay_on_attach.clone())
        };
        if let Some(err) = replay {
            handler(&err);
        }
        id
    }

    fn remove_error_listener(&self, id: ListenerId) {
        let mut s = self.state.lock().unwrap();
        s.listeners.retain(|(lid, _)| *lid != id);
        s.removed_listeners.push(id);
    }
}

/// Runs `when_ready` callbacks immediately unless the mock is in manual mode.
struct AutoReadyHandle {
    inner: MockHandle,
    manual_ready: bool,
}

impl RecordHandle for AutoReadyHandle {
    fn when_ready(&self, callback: ReadyCallback) {
        if self.manual_ready {
            self.inner.when_ready(callback);
        } else {
            callback();
        }
    }

    fn subscribe(&self, callback: UpdateCallback, trigger_now: bool) {
        self.inner.subscribe(callback, trigger_now);
    }

    fn discard(&self) {
        self.inner.discard();
    }
}
