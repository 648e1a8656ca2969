#[derive(Debug, thiserror::Error)]
pub enum PlaygroundError {
    #[error("config ({context}): {detail}")]
    Config { context: &'static str, detail: String },

    #[error("invalid JSON argument '{input}': {source}")]
    Json {
        input: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("record: {0}")]
    Record(#[from] record_rx::RecordError),

    #[error("record '{0}' stream ended before any value")]
    EmptyStream(String),

    #[error("signal: {0}")]
    Signal(#[from] std::io::Error),
}
