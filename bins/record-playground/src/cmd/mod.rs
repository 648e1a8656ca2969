pub mod ops;
pub mod watch;

use std::sync::Arc;

use client_memory::MemoryClient;
use record_rx::RxClient;
use tokio::task::JoinHandle;

use crate::config::{PlaygroundConfig, ScheduledUpdate};
use crate::error::PlaygroundError;

/// In-memory client seeded from config, plus its reactive front.
pub struct Playground {
    pub client: MemoryClient,
    pub rx: RxClient,
    updates: Vec<ScheduledUpdate>,
}

impl Playground {
    pub fn load(path: Option<&str>) -> Result<Self, PlaygroundError> {
        let config = match path {
            Some(path) => {
                let config = PlaygroundConfig::load(path)?;
                tracing::info!(
                    config = %path,
                    records = config.records.len(),
                    updates = config.updates.len(),
                    "loaded config"
                );
                config
            }
            None => PlaygroundConfig::default(),
        };

        let client = MemoryClient::new();
        for seed in config.records {
            client.insert(seed.name, seed.data);
        }
        let rx = RxClient::new(Arc::new(client.clone()));
        Ok(Self {
            client,
            rx,
            updates: config.updates,
        })
    }

    /// Apply the scheduled updates in order through the record adapter.
    pub fn spawn_updates(&self) -> JoinHandle<()> {
        let rx = self.rx.clone();
        let updates = self.updates.clone();
        tokio::spawn(async move {
            for update in updates {
                tokio::time::sleep(std::time::Duration::from_millis(update.delay_ms)).await;
                let record = rx.record(&update.record);
                let result = match update.path {
                    Some(path) => record.set_field(path, update.value).await,
                    None => record.set(update.value).await,
                };
                if let Err(e) = result {
                    tracing::warn!(record = %update.record, error = %e, "scheduled update failed");
                }
            }
        })
    }
}
