use clap::{Args, Parser, Subcommand};
use serde::Deserialize;
use serde_json::Value;

use crate::error::PlaygroundError;

#[derive(Parser)]
#[command(
    name = "record-playground",
    about = "Drive reactive records against an in-memory client"
)]
pub struct Cli {
    /// Path to TOML file with seed records and scheduled updates
    #[arg(long, global = true, env = "RECORD_PLAYGROUND_CONFIG")]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print live values of a record while scheduled updates are applied
    Watch(WatchArgs),
    /// Watch a record, then raise a connection error and print how it ends
    Error(ErrorArgs),
    /// Print a one-time snapshot of a record
    Snapshot(SnapshotArgs),
    /// Print whether a record exists
    Exists(NameArgs),
    /// Replace a whole record with a JSON value
    Set(SetArgs),
    /// Write a JSON value at a field path
    SetField(SetFieldArgs),
}

#[derive(Args, Clone, Debug)]
pub struct NameArgs {
    pub name: String,
}

#[derive(Args, Clone, Debug)]
pub struct WatchArgs {
    pub name: String,
    /// Stop after this many values
    #[arg(long)]
    pub count: Option<usize>,
}

#[derive(Args, Clone, Debug)]
pub struct ErrorArgs {
    pub name: String,
    #[arg(long, default_value = "CONNECTION_ERROR")]
    pub code: String,
    #[arg(long, default_value = "connection lost")]
    pub message: String,
}

#[derive(Args, Clone, Debug)]
pub struct SnapshotArgs {
    pub name: String,
    /// Print only the value at this field path
    #[arg(long)]
    pub field: Option<String>,
}

#[derive(Args, Clone, Debug)]
pub struct SetArgs {
    pub name: String,
    /// JSON value
    pub value: String,
}

#[derive(Args, Clone, Debug)]
pub struct SetFieldArgs {
    pub name: String,
    pub path: String,
    /// JSON value
    pub value: String,
}

// ---- TOML Config ----

#[derive(Debug, Default, Deserialize)]
pub struct PlaygroundConfig {
    #[serde(default)]
    pub records: Vec<SeedRecord>,
    #[serde(default)]
    pub updates: Vec<ScheduledUpdate>,
}

/// Record present in the client before any command runs.
#[derive(Debug, Clone, Deserialize)]
pub struct SeedRecord {
    pub name: String,
    pub data: Value,
}

/// Write applied by `watch` after `delay_ms`, relative to the previous one.
#[derive(Debug, Clone, Deserialize)]
pub struct ScheduledUpdate {
    pub record: String,
    #[serde(default)]
    pub path: Option<String>,
    pub value: Value,
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,
}

fn default_delay_ms() -> u64 {
    100
}

impl PlaygroundConfig {
    pub fn load(path: &str) -> Result<Self, PlaygroundError> {
        let content = std::fs::read_to_string(path).map_err(|e| PlaygroundError::Config {
            context: "read",
            detail: format!("'{path}': {e}"),
        })?;
        Self::parse(&content).map_err(|e| match e {
            PlaygroundError::Config { context, detail } => PlaygroundError::Config {
                context,
                detail: format!("'{path}': {detail}"),
            },
            other => other,
        })
    }

    pub fn parse(toml_str: &str) -> Result<Self, PlaygroundError> {
        toml::from_str(toml_str).map_err(|e| PlaygroundError::Config {
            context: "parse",
            detail: e.to_string(),
        })
    }
}

/// Parse a command-line JSON argument.
pub fn parse_json(input: &str) -> Result<Value, PlaygroundError> {
    serde_json::from_str(input).map_err(|source| PlaygroundError::Json {
        input: input.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn parses_records_and_updates() {
        let config = PlaygroundConfig::parse(
            r#"
            [[records]]
            name = "user/1"
            data = { name = "Ada", tags = ["x", "y"] }

            [[updates]]
            record = "user/1"
            path = "age"
            value = 37
            delay_ms = 250

            [[updates]]
            record = "user/1"
            value = { name = "Grace" }
            "#,
        )
        .unwrap();

        assert_eq!(config.records.len(), 1);
        assert_eq!(config.records[0].data, json!({"name": "Ada", "tags": ["x", "y"]}));
        assert_eq!(config.updates[0].path.as_deref(), Some("age"));
        assert_eq!(config.updates[0].value, json!(37));
        assert_eq!(config.updates[0].delay_ms, 250);
        assert_eq!(config.updates[1].path, None);
        assert_eq!(config.updates[1].delay_ms, 100);
    }

    #[test]
    fn empty_config_is_valid() {
        let config = PlaygroundConfig::parse("").unwrap();
        assert!(config.records.is_empty());
        assert!(config.updates.is_empty());
    }

    #[test]
    fn parse_error_is_reported_as_config_error() {
        let err = PlaygroundConfig::parse("records = 5").unwrap_err();
        assert!(matches!(err, PlaygroundError::Config { context: "parse", .. }));
    }

    #[test]
    fn json_arguments() {
        assert_eq!(parse_json(r#"{"a":1}"#).unwrap(), json!({"a": 1}));
        assert!(matches!(parse_json("{oops"), Err(PlaygroundError::Json { .. })));
    }
}
