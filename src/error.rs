use std::path::PathBuf;

use thiserror::Error;

use crate::expr::ExprError;

/// Errors from loading workflows, hook payloads and configuration.
#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid workflow YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid TOML: {0}")]
    Toml(#[from] toml::de::Error),
}

/// An `if` condition that failed to parse or evaluate, tagged with the
/// trigger it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{trigger} trigger: {source}")]
pub struct TriggerError {
    /// `tool` or `tools[N]`.
    pub trigger: String,
    #[source]
    pub source: ExprError,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
