//! Action configuration: everything install/upgrade/rollback depend on

use std::fmt::Display;

use crate::capabilities::Capabilities;
use crate::kube_client::KubeClient;
use crate::registry::RegistryClient;
use crate::storage::Storage;

/// Debug logger gated by an explicit verbosity flag
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Logger {
    pub verbose: bool,
}

impl Logger {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }

    /// Emit `message` as a debug event when verbose
    pub fn log(&self, message: impl Display) {
        if self.verbose {
            tracing::debug!(target: "chartkit::action", "{}", message);
        }
    }
}

/// Collaborators shared by every action
pub struct Configuration {
    /// Release history
    pub releases: Storage,

    /// Cluster the manifests are applied to
    pub kube_client: Box<dyn KubeClient>,

    /// What the cluster supports
    pub capabilities: Capabilities,

    /// Chart registry access
    pub registry_client: RegistryClient,

    pub log: Logger,
}

impl Configuration {
    /// Log through the configured logger
    pub fn log(&self, message: impl Display) {
        self.log.log(message);
    }
}
