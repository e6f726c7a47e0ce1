//! Core error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Invalid chart: {message}")]
    InvalidChart { message: String },

    #[error("Found in Chart.yaml, but missing in charts/ directory: {}", .names.join(", "))]
    MissingDependencies { names: Vec<String> },

    #[error("Invalid manifest {path}: {message}")]
    InvalidManifest { path: String, message: String },

    #[error("Unknown hook event: {0}")]
    UnknownHookEvent(String),

    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("Invalid version: {0}")]
    InvalidVersion(#[from] semver::Error),

    #[error("Cannot set '{path}': {message}")]
    ValuesPath { path: String, message: String },
}

pub type Result<T> = std::result::Result<T, CoreError>;
