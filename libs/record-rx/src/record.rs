use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use futures::{Stream, StreamExt};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::oneshot;

use crate::client::RxClient;
use crate::error::RecordError;
use crate::live::Shared;
use crate::stream::RecordStream;

/// Future returned by the one-shot record operations.
///
/// Lazy: the client call is issued on first poll. Dropping it afterwards
/// only suppresses delivery, the issued call is not revoked.
pub type RecordFuture<T> = Pin<Box<dyn Future<Output = Result<T, RecordError>> + Send + 'static>>;

/// Lazy handle on one named record.
///
/// Name and client are fixed at construction. Every operation is
/// independent: two `get()` calls open two client subscriptions.
#[derive(Clone)]
pub struct Record {
    shared: Arc<Shared>,
    name: Arc<str>,
}

impl std::fmt::Debug for Record {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Record").field("name", &self.name).finish()
    }
}

impl Record {
    pub fn new(client: &RxClient, name: impl Into<String>) -> Self {
        Self {
            shared: Arc::clone(client.shared()),
            name: Arc::from(name.into()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Live stream of the record's full content.
    pub fn get(&self) -> RecordStream {
        RecordStream::new(Arc::clone(&self.shared), Arc::clone(&self.name))
    }

    /// [`get`](Self::get), decoding each value into `T`.
    ///
    /// A value that fails to decode is yielded as [`RecordError::Decode`];
    /// the stream stays open.
    pub fn get_as<T>(&self) -> Pin<Box<dyn Stream<Item = Result<T, RecordError>> + Send + 'static>>
    where
        T: DeserializeOwned + Send + 'static,
    {
        let name = Arc::clone(&self.name);
        Box::pin(
            self.get()
                .map(move |item| item.and_then(|value| decode::<T>(&name, value))),
        )
    }

    /// Replace the whole record with `value`.
    pub fn set(&self, value: impl Into<Value>) -> RecordFuture<()> {
        self.write(None, value.into())
    }

    /// Write `value` at the field `path` (e.g. `"address.city"`).
    pub fn set_field(&self, path: impl Into<String>, value: impl Into<Value>) -> RecordFuture<()> {
        self.write(Some(path.into()), value.into())
    }

    fn write(&self, path: Option<String>, value: Value) -> RecordFuture<()> {
        let shared = Arc::clone(&self.shared);
        let name = Arc::clone(&self.name);
        Box::pin(async move {
            let (tx, rx) = oneshot::channel();
            tracing::debug!(record = %name, field = ?path, "writing record");
            shared.client.set_data(
                &name,
                path.as_deref(),
                value,
                Box::new(move |result| {
                    let _ = tx.send(result);
                }),
            );
            match rx.await {
                Ok(result) => result.map_err(RecordError::Write),
                Err(_) => Err(RecordError::CallbackDropped("set_data")),
            }
        })
    }

    /// Point-in-time read. Opens no live subscription.
    pub fn snapshot(&self) -> RecordFuture<Value> {
        let shared = Arc::clone(&self.shared);
        let name = Arc::clone(&self.name);
        Box::pin(async move {
            let (tx, rx) = oneshot::channel();
            shared.client.snapshot(
                &name,
                Box::new(move |result| {
                    let _ = tx.send(result);
                }),
            );
            match rx.await {
                Ok(result) => result.map_err(RecordError::Snapshot),
                Err(_) => Err(RecordError::CallbackDropped("snapshot")),
            }
        })
    }

    /// [`snapshot`](Self::snapshot), decoded into `T`.
    pub fn snapshot_as<T>(&self) -> RecordFuture<T>
    where
        T: DeserializeOwned + Send + 'static,
    {
        let snapshot = self.snapshot();
        let name = Arc::clone(&self.name);
        Box::pin(async move { decode::<T>(&name, snapshot.await?) })
    }

    /// Whether the record currently exists on the client side.
    pub fn exists(&self) -> RecordFuture<bool> {
        let shared = Arc::clone(&self.shared);
        let name = Arc::clone(&self.name);
        Box::pin(async move {
            let (tx, rx) = oneshot::channel();
            shared.client.has(
                &name,
                Box::new(move |exists| {
                    let _ = tx.send(exists);
                }),
            );
            rx.await.map_err(|_| RecordError::CallbackDropped("has"))
        })
    }
}

fn decode<T: DeserializeOwned>(name: &str, value: Value) -> Result<T, RecordError> {
    serde_json::from_value(value).map_err(|source| RecordError::Decode {
        name: name.to_string(),
        source,
    })
}
