//! Release storage
//!
//! Actions persist every revision of a release through a [`StorageDriver`].
//! Only the in-memory driver ships here; cluster-backed drivers plug in
//! behind the same trait.

mod memory;

pub use memory::{MemoryDriver, OperationCounts};

use async_trait::async_trait;
use chartkit_core::Release;

use crate::error::{ActionError, Result};

/// Storage driver trait for release persistence
///
/// Implementations must be Send + Sync for use across async tasks.
#[async_trait]
pub trait StorageDriver: Send + Sync {
    /// Get a specific release by name and version
    async fn get(&self, namespace: &str, name: &str, version: u32) -> Result<Release>;

    /// Get the latest release for a name
    async fn get_latest(&self, namespace: &str, name: &str) -> Result<Release>;

    /// List releases, optionally filtered by namespace
    async fn list(&self, namespace: Option<&str>) -> Result<Vec<Release>>;

    /// Get release history (all versions for a name, newest first)
    async fn history(&self, namespace: &str, name: &str) -> Result<Vec<Release>>;

    /// Store a new revision
    async fn create(&self, release: &Release) -> Result<()>;

    /// Replace an existing revision
    async fn update(&self, release: &Release) -> Result<()>;

    /// Delete a specific revision
    async fn delete(&self, namespace: &str, name: &str, version: u32) -> Result<Release>;

    /// Check if a release exists
    async fn exists(&self, namespace: &str, name: &str) -> Result<bool> {
        match self.get_latest(namespace, name).await {
            Ok(_) => Ok(true),
            Err(ActionError::ReleaseNotFound { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }
}

/// Release store used by actions
pub struct Storage {
    driver: Box<dyn StorageDriver>,
}

impl Storage {
    pub fn new(driver: impl StorageDriver + 'static) -> Self {
        Self {
            driver: Box::new(driver),
        }
    }

    /// Storage backed by a fresh [`MemoryDriver`]
    pub fn memory() -> Self {
        Self::new(MemoryDriver::new())
    }

    pub fn driver(&self) -> &dyn StorageDriver {
        self.driver.as_ref()
    }

    /// Latest revision of `name`
    pub async fn last(&self, namespace: &str, name: &str) -> Result<Release> {
        self.driver.get_latest(namespace, name).await
    }

    /// Store a new revision
    pub async fn create(&self, release: &Release) -> Result<()> {
        self.driver.create(release).await
    }

    /// All revisions of `name`, newest first
    pub async fn history(&self, namespace: &str, name: &str) -> Result<Vec<Release>> {
        self.driver.history(namespace, name).await
    }
}
