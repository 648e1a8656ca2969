use std::fmt;

/// Error value handed back by a record client callback (`set_data`, `snapshot`).
///
/// Opaque to the adapter: it is carried through to the caller as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientError {
    code: Option<String>,
    message: String,
}

impl ClientError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self { code: None, message: msg.into() }
    }

    /// Error tagged with a client-specific code (e.g. `RECORD_NOT_FOUND`).
    pub fn with_code(code: impl Into<String>, msg: impl Into<String>) -> Self {
        Self { code: Some(code.into()), message: msg.into() }
    }

    pub fn code(&self) -> Option<&str> {
        self.code.as_deref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for ClientError {}

impl From<String> for ClientError {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for ClientError {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Connection-level error event: not scoped to any record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionError {
    pub code: String,
    pub message: String,
}

impl ConnectionError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self { code: code.into(), message: message.into() }
    }
}

impl fmt::Display for ConnectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for ConnectionError {}
