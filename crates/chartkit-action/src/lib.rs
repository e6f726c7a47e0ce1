//! Chartkit Action - shared configuration for release actions
//!
//! This crate provides:
//! - **Capabilities**: API versions and Kubernetes version of the target cluster
//! - **Discovery**: the seam capabilities are read through, with a live snapshot and a fake
//! - **Storage**: release history drivers, in-memory by default
//! - **Kube clients**: printing and failing clients for running actions without a cluster
//! - **Registry**: credentials, reference resolution and the local chart cache
//! - **Fixtures**: charts, releases and configurations for tests

pub mod capabilities;
pub mod config;
pub mod discovery;
pub mod error;
pub mod fixtures;
pub mod kube_client;
pub mod registry;
pub mod storage;

pub use capabilities::{Capabilities, KubeVersion, VersionSet, get_version_set};
pub use config::{Configuration, Logger};
pub use discovery::{DiscoverySnapshot, FakeDiscovery, ServerDiscovery};
pub use error::{ActionError, Result};
pub use kube_client::{FailingKubeClient, KubeClient, PrintingKubeClient};
pub use registry::RegistryClient;
pub use storage::{MemoryDriver, Storage, StorageDriver};
