use std::sync::Arc;

use serde_json::Value;

use crate::error::{ClientError, ConnectionError};

// ════════════════════════════════════════════════════════════════
//  Callback types
// ════════════════════════════════════════════════════════════════

/// Identifier of a registered connection error listener.
pub type ListenerId = u64;

/// Invoked exactly once with the outcome of a write.
pub type WriteCallback = Box<dyn FnOnce(Result<(), ClientError>) + Send>;

/// Invoked exactly once with the record content or the read failure.
pub type SnapshotCallback = Box<dyn FnOnce(Result<Value, ClientError>) + Send>;

/// Invoked exactly once with whether the record exists.
pub type HasCallback = Box<dyn FnOnce(bool) + Send>;

/// Invoked once the record handle has loaded its initial state.
pub type ReadyCallback = Box<dyn FnOnce() + Send>;

/// Invoked with the full record content on every change.
pub type UpdateCallback = Arc<dyn Fn(&Value) + Send + Sync>;

/// Invoked for every connection-level error event.
pub type ErrorHandler = Arc<dyn Fn(&ConnectionError) + Send + Sync>;

// ════════════════════════════════════════════════════════════════
//  Client traits
// ════════════════════════════════════════════════════════════════

/// Live handle to one named record, returned by [`RecordClient::get_record`].
///
/// Implementations own their connection-side resources until `discard()`.
pub trait RecordHandle: Send + Sync {
    /// Run `callback` once the record is ready. Runs immediately if it
    /// already is.
    fn when_ready(&self, callback: ReadyCallback);

    /// Register `callback` for content changes. With `trigger_now` the
    /// current content is delivered right away.
    fn subscribe(&self, callback: UpdateCallback, trigger_now: bool);

    /// Drop all subscriptions and release the handle. Further updates are
    /// never delivered.
    fn discard(&self);
}

/// Real-time data-sync client, shared by every record adapter built on it.
///
/// All callbacks may run synchronously inside the call or later from any
/// thread. Implementations must not hold internal locks while invoking
/// callbacks or error handlers.
pub trait RecordClient: Send + Sync {
    /// Open a handle on `name`. No data is delivered until `subscribe`.
    fn get_record(&self, name: &str) -> Box<dyn RecordHandle>;

    /// Write `value` to the record, whole (`path == None`) or at a field path.
    fn set_data(&self, name: &str, path: Option<&str>, value: Value, callback: WriteCallback);

    /// One-time read of the record's current content.
    fn snapshot(&self, name: &str, callback: SnapshotCallback);

    /// Check whether the record currently exists.
    fn has(&self, name: &str, callback: HasCallback);

    /// Attach a connection error listener.
    fn on_error(&self, handler: ErrorHandler) -> ListenerId;

    /// Detach a listener. Unknown ids are ignored.
    fn remove_error_listener(&self, id: ListenerId);
}
