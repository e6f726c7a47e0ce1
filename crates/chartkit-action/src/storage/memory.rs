//! In-memory storage driver
//!
//! Releases live in a map keyed by namespace, name and revision. Nothing
//! survives the process, which is what tests want.

use async_trait::async_trait;
use chartkit_core::Release;
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::StorageDriver;
use crate::error::{ActionError, Result};

type Store = HashMap<String, HashMap<String, HashMap<u32, Release>>>;

/// In-memory storage driver
#[derive(Clone, Default)]
pub struct MemoryDriver {
    /// namespace -> name -> version -> release
    store: Arc<RwLock<Store>>,
    operations: Arc<RwLock<OperationCounts>>,
}

/// Counts of operations performed, for assertions
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct OperationCounts {
    pub gets: usize,
    pub lists: usize,
    pub creates: usize,
    pub updates: usize,
    pub deletes: usize,
}

impl MemoryDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get operation counts
    pub fn operation_counts(&self) -> Result<OperationCounts> {
        Ok(self
            .operations
            .read()
            .map_err(|_| poisoned())?
            .clone())
    }

    /// Count stored revisions across all releases
    pub fn release_count(&self) -> Result<usize> {
        let store = self.read()?;
        Ok(store
            .values()
            .flat_map(|ns| ns.values())
            .map(|versions| versions.len())
            .sum())
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Store>> {
        self.store.read().map_err(|_| poisoned())
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Store>> {
        self.store.write().map_err(|_| poisoned())
    }

    fn count(&self, bump: impl FnOnce(&mut OperationCounts)) -> Result<()> {
        let mut ops = self.operations.write().map_err(|_| poisoned())?;
        bump(&mut ops);
        Ok(())
    }
}

fn poisoned() -> ActionError {
    ActionError::Storage("memory driver lock poisoned".to_string())
}

fn not_found(namespace: &str, name: &str) -> ActionError {
    ActionError::ReleaseNotFound {
        name: name.to_string(),
        namespace: namespace.to_string(),
    }
}

#[async_trait]
impl StorageDriver for MemoryDriver {
    async fn get(&self, namespace: &str, name: &str, version: u32) -> Result<Release> {
        self.count(|ops| ops.gets += 1)?;

        self.read()?
            .get(namespace)
            .and_then(|ns| ns.get(name))
            .and_then(|versions| versions.get(&version))
            .cloned()
            .ok_or_else(|| not_found(namespace, name))
    }

    async fn get_latest(&self, namespace: &str, name: &str) -> Result<Release> {
        self.count(|ops| ops.gets += 1)?;

        self.read()?
            .get(namespace)
            .and_then(|ns| ns.get(name))
            .and_then(|versions| versions.values().max_by_key(|r| r.version))
            .cloned()
            .ok_or_else(|| not_found(namespace, name))
    }

    async fn list(&self, namespace: Option<&str>) -> Result<Vec<Release>> {
        self.count(|ops| ops.lists += 1)?;

        let store = self.read()?;
        let mut releases: Vec<Release> = store
            .iter()
            .filter(|(ns, _)| namespace.is_none_or(|n| n == ns.as_str()))
            .flat_map(|(_, names)| names.values())
            .flat_map(|versions| versions.values())
            .cloned()
            .collect();

        releases.sort_by(|a, b| a.name.cmp(&b.name).then(b.version.cmp(&a.version)));
        Ok(releases)
    }

    async fn history(&self, namespace: &str, name: &str) -> Result<Vec<Release>> {
        self.count(|ops| ops.lists += 1)?;

        let mut releases: Vec<Release> = self
            .read()?
            .get(namespace)
            .and_then(|ns| ns.get(name))
            .map(|versions| versions.values().cloned().collect())
            .unwrap_or_default();

        if releases.is_empty() {
            return Err(not_found(namespace, name));
        }

        releases.sort_by(|a, b| b.version.cmp(&a.version));
        Ok(releases)
    }

    async fn create(&self, release: &Release) -> Result<()> {
        self.count(|ops| ops.creates += 1)?;

        let mut store = self.write()?;
        let versions = store
            .entry(release.namespace.clone())
            .or_default()
            .entry(release.name.clone())
            .or_default();

        if versions.contains_key(&release.version) {
            return Err(ActionError::ReleaseAlreadyExists {
                name: release.name.clone(),
                namespace: release.namespace.clone(),
                version: release.version,
            });
        }

        versions.insert(release.version, release.clone());
        Ok(())
    }

    async fn update(&self, release: &Release) -> Result<()> {
        self.count(|ops| ops.updates += 1)?;

        let mut store = self.write()?;
        let versions = store
            .get_mut(&release.namespace)
            .and_then(|ns| ns.get_mut(&release.name))
            .filter(|versions| versions.contains_key(&release.version))
            .ok_or_else(|| not_found(&release.namespace, &release.name))?;

        versions.insert(release.version, release.clone());
        Ok(())
    }

    async fn delete(&self, namespace: &str, name: &str, version: u32) -> Result<Release> {
        self.count(|ops| ops.deletes += 1)?;

        self.write()?
            .get_mut(namespace)
            .and_then(|ns| ns.get_mut(name))
            .and_then(|versions| versions.remove(&version))
            .ok_or_else(|| not_found(namespace, name))
    }
}
