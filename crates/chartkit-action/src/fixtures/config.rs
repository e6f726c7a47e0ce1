//! Action configuration wired for tests
//!
//! Everything stays local: releases live in memory, the kube client discards
//! what it prints and the registry cache sits in a temporary directory that
//! is removed when the fixture is dropped.

use std::ops::{Deref, DerefMut};
use std::path::Path;

use tempfile::TempDir;

use crate::capabilities::Capabilities;
use crate::config::{Configuration, Logger};
use crate::error::Result;
use crate::kube_client::{FailingKubeClient, PrintingKubeClient};
use crate::registry::{Authorizer, CACHE_ROOT_DIR, Cache, RegistryClient, Resolver};
use crate::storage::Storage;

/// Prefix of the fixture's temporary directory
pub const TEMP_DIR_PREFIX: &str = "chartkit-action-test";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FixtureOptions {
    /// Forward configuration log lines to `tracing`
    pub verbose: bool,
}

/// A [`Configuration`] plus the temporary directory backing its cache
pub struct ConfigFixture {
    pub config: Configuration,
    temp_dir: TempDir,
}

impl ConfigFixture {
    /// Root of the temporary directory
    pub fn temp_dir(&self) -> &Path {
        self.temp_dir.path()
    }
}

impl Deref for ConfigFixture {
    type Target = Configuration;

    fn deref(&self) -> &Configuration {
        &self.config
    }
}

impl DerefMut for ConfigFixture {
    fn deref_mut(&mut self) -> &mut Configuration {
        &mut self.config
    }
}

/// Build a configuration with in-memory storage and a throwaway cache
///
/// Credentials come from the user's Docker config, when there is one.
pub fn action_config_fixture(options: &FixtureOptions) -> Result<ConfigFixture> {
    let authorizer = Authorizer::new()?;
    let resolver = Resolver::new(authorizer.clone());

    let temp_dir = tempfile::Builder::new()
        .prefix(TEMP_DIR_PREFIX)
        .tempdir()?;

    let cache = Cache::builder()
        .debug(true)
        .root(temp_dir.path().join(CACHE_ROOT_DIR))
        .build()?;

    let registry_client = RegistryClient::builder()
        .authorizer(authorizer)
        .resolver(resolver)
        .cache(cache)
        .build()?;

    let config = Configuration {
        releases: Storage::memory(),
        kube_client: Box::new(FailingKubeClient::new(PrintingKubeClient::discard())),
        capabilities: Capabilities::default(),
        registry_client,
        log: Logger::new(options.verbose),
    };

    config.log(format_args!(
        "action config fixture ready in {}",
        temp_dir.path().display()
    ));

    Ok(ConfigFixture { config, temp_dir })
}
