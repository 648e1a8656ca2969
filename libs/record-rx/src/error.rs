use record_api::{ClientError, ConnectionError};

#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    /// The client rejected a write. Carries the client's error untouched.
    #[error(transparent)]
    Write(ClientError),

    /// The client failed a snapshot read. Carries the client's error untouched.
    #[error(transparent)]
    Snapshot(ClientError),

    /// Connection-level error event; terminates every live stream.
    #[error(transparent)]
    Connection(ConnectionError),

    #[error("record client dropped the {0} callback without invoking it")]
    CallbackDropped(&'static str),

    #[error("decode record '{name}': {source}")]
    Decode {
        name: String,
        #[source]
        source: serde_json::Error,
    },
}

impl RecordError {
    /// The client's error value for write and snapshot failures.
    pub fn client_error(&self) -> Option<&ClientError> {
        match self {
            RecordError::Write(e) | RecordError::Snapshot(e) => Some(e),
            _ => None,
        }
    }

    pub fn connection_error(&self) -> Option<&ConnectionError> {
        match self {
            RecordError::Connection(e) => Some(e),
            _ => None,
        }
    }
}
