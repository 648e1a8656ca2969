use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures::Stream;
use futures::stream::FusedStream;
use serde_json::Value;
use tokio::sync::mpsc;

use record_api::UpdateCallback;

use crate::error::RecordError;
use crate::live::{LiveSubscription, Shared};

/// Live content of one record, returned by [`Record::get`](crate::Record::get).
///
/// Lazy: the client subscription is opened on the first poll. Yields the
/// current content once the record is ready, then every update in the order
/// the client delivers it. A connection error is yielded once as `Err` and
/// ends the stream. Dropping the stream discards the subscription.
pub struct RecordStream {
    shared: Arc<Shared>,
    name: Arc<str>,
    state: State,
}

enum State {
    Idle,
    Live(Live),
    Done,
}

struct Live {
    rx: mpsc::UnboundedReceiver<Result<Value, RecordError>>,
    _guard: LiveGuard,
}

/// Releases the registry slot and the client handle on every exit path.
struct LiveGuard {
    shared: Arc<Shared>,
    id: u64,
    sub: Arc<LiveSubscription>,
}

impl Drop for LiveGuard {
    fn drop(&mut self) {
        self.sub.discard();
        self.shared.unregister(self.id);
    }
}

impl RecordStream {
    pub(crate) fn new(shared: Arc<Shared>, name: Arc<str>) -> Self {
        Self {
            shared,
            name,
            state: State::Idle,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the client subscription is currently open.
    pub fn is_live(&self) -> bool {
        matches!(self.state, State::Live(_))
    }

    fn open(&self) -> Live {
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = self.shared.client.get_record(&self.name);
        let sub = Arc::new(LiveSubscription::new(self.name.clone(), handle));
        let id = self.shared.register(tx.clone(), Arc::clone(&sub));
        tracing::debug!(record = %self.name, "live record stream opened");

        // Subscribe only once ready, so the initial content leads.
        let weak = Arc::downgrade(&sub);
        let name = self.name.clone();
        sub.handle().when_ready(Box::new(move || {
            let Some(sub) = weak.upgrade() else { return };
            if sub.is_discarded() {
                return;
            }
            let forward: UpdateCallback = Arc::new(move |value: &Value| {
                tracing::trace!(record = %name, "record update");
                let _ = tx.send(Ok(value.clone()));
            });
            sub.handle().subscribe(forward, true);
        }));

        Live {
            rx,
            _guard: LiveGuard {
                shared: Arc::clone(&self.shared),
                id,
                sub,
            },
        }
    }
}

impl Stream for RecordStream {
    type Item = Result<Value, RecordError>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        if matches!(this.state, State::Idle) {
            this.state = State::Live(this.open());
        }
        let State::Live(live) = &mut this.state else {
            return Poll::Ready(None);
        };

        match live.rx.poll_recv(cx) {
            Poll::Ready(Some(Ok(value))) => Poll::Ready(Some(Ok(value))),
            Poll::Ready(Some(Err(e))) => {
                this.state = State::Done;
                Poll::Ready(Some(Err(e)))
            }
            Poll::Ready(None) => {
                this.state = State::Done;
                Poll::Ready(None)
            }
            Poll::Pending => Poll::Pending,
        }
    }
}

impl FusedStream for RecordStream {
    fn is_terminated(&self) -> bool {
        matches!(self.state, State::Done)
    }
}

impl std::fmt::Debug for RecordStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = match self.state {
            State::Idle => "idle",
            State::Live(_) => "live",
            State::Done => "done",
        };
        f.debug_struct("RecordStream")
            .field("name", &self.name)
            .field("state", &state)
            .finish()
    }
}
