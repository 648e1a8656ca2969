use std::sync::Arc;

use record_api::RecordClient;

use crate::live::Shared;
use crate::record::Record;

/// Reactive front of a shared record client.
///
/// Cheap to clone: all clones share one registry of live streams, and
/// therefore one connection error listener.
#[derive(Clone)]
pub struct RxClient {
    shared: Arc<Shared>,
}

impl std::fmt::Debug for RxClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RxClient")
            .field("live_streams", &self.live_streams())
            .finish()
    }
}

impl RxClient {
    pub fn new(client: Arc<dyn RecordClient>) -> Self {
        Self {
            shared: Arc::new(Shared::new(client)),
        }
    }

    /// Lazy handle on the record `name`. Performs no client calls.
    pub fn record(&self, name: impl Into<String>) -> Record {
        Record::new(self, name)
    }

    pub fn client(&self) -> &Arc<dyn RecordClient> {
        &self.shared.client
    }

    /// Number of `get()` streams currently holding a live subscription.
    pub fn live_streams(&self) -> usize {
        self.shared.len()
    }

    pub(crate) fn shared(&self) -> &Arc<Shared> {
        &self.shared
    }
}
