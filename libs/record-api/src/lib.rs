pub mod client;
pub mod error;

pub use client::{
    ErrorHandler, HasCallback, ListenerId, ReadyCallback, RecordClient, RecordHandle,
    SnapshotCallback, UpdateCallback, WriteCallback,
};
pub use error::{ClientError, ConnectionError};
