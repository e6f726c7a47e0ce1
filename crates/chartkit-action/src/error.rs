//! Error types for chartkit-action

use thiserror::Error;

/// Result type for chartkit-action operations
pub type Result<T> = std::result::Result<T, ActionError>;

/// Errors raised while assembling or using an action configuration
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ActionError {
    /// API discovery failed
    #[error("could not get apiVersions from Kubernetes: {0}")]
    Discovery(String),

    /// Cluster client operation failed
    #[error("kube client {op} failed: {message}")]
    KubeClient { op: &'static str, message: String },

    /// Release not found
    #[error("release '{name}' not found in namespace '{namespace}'")]
    ReleaseNotFound { name: String, namespace: String },

    /// Release revision already stored
    #[error("release '{name}' revision {version} already exists in namespace '{namespace}'")]
    ReleaseAlreadyExists {
        name: String,
        namespace: String,
        version: u32,
    },

    /// Storage error
    #[error("storage error: {0}")]
    Storage(String),

    /// Registry client setup or cache error
    #[error("registry error: {0}")]
    Registry(String),

    /// Unparsable OCI reference
    #[error("invalid reference '{reference}': {message}")]
    InvalidReference { reference: String, message: String },

    /// Chart requires a different Kubernetes version
    #[error("chart requires kubeVersion: {constraint} which is incompatible with Kubernetes {kube_version}")]
    IncompatibleKubeVersion {
        constraint: String,
        kube_version: String,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Chart or release model error
    #[error(transparent)]
    Core(#[from] chartkit_core::CoreError),
}

impl From<serde_json::Error> for ActionError {
    fn from(e: serde_json::Error) -> Self {
        ActionError::Serialization(e.to_string())
    }
}

impl ActionError {
    /// Check if this is a missing release
    pub fn is_not_found(&self) -> bool {
        matches!(self, ActionError::ReleaseNotFound { .. })
    }
}
