//! Chart registry client
//!
//! The client is assembled from three parts:
//! - [`Authorizer`]: registry credentials
//! - [`Resolver`]: reference parsing and credential lookup
//! - [`Cache`]: local content-addressed storage for chart archives
//!
//! No network traffic happens here; pushing and pulling are the caller's job.

mod auth;
mod cache;
mod resolver;

pub use auth::{Authorizer, Credential, DockerAuth, DockerConfig};
pub use cache::{CACHE_ROOT_DIR, Cache, CacheBuilder};
pub use resolver::{ResolvedReference, Resolver};

use crate::error::Result;

/// Registry client
#[derive(Debug, Clone)]
pub struct RegistryClient {
    authorizer: Authorizer,
    resolver: Resolver,
    cache: Cache,
}

/// Options for [`RegistryClient`]; unset parts fall back to their defaults
#[derive(Debug, Clone, Default)]
pub struct RegistryClientBuilder {
    authorizer: Option<Authorizer>,
    resolver: Option<Resolver>,
    cache: Option<Cache>,
}

impl RegistryClientBuilder {
    pub fn authorizer(mut self, authorizer: Authorizer) -> Self {
        self.authorizer = Some(authorizer);
        self
    }

    pub fn resolver(mut self, resolver: Resolver) -> Self {
        self.resolver = Some(resolver);
        self
    }

    pub fn cache(mut self, cache: Cache) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn build(self) -> Result<RegistryClient> {
        let authorizer = match self.authorizer {
            Some(authorizer) => authorizer,
            None => Authorizer::new()?,
        };
        let resolver = self
            .resolver
            .unwrap_or_else(|| Resolver::new(authorizer.clone()));
        let cache = match self.cache {
            Some(cache) => cache,
            None => Cache::builder().build()?,
        };

        Ok(RegistryClient {
            authorizer,
            resolver,
            cache,
        })
    }
}

impl RegistryClient {
    pub fn builder() -> RegistryClientBuilder {
        RegistryClientBuilder::default()
    }

    pub fn authorizer(&self) -> &Authorizer {
        &self.authorizer
    }

    pub fn resolver(&self) -> &Resolver {
        &self.resolver
    }

    pub fn cache(&self) -> &Cache {
        &self.cache
    }

    /// Store a chart archive in the local cache under `reference`
    pub fn save_chart(&self, archive: &[u8], reference: &str) -> Result<String> {
        let resolved = self.resolver.resolve(reference)?;
        self.cache.store(&resolved.reference, archive)
    }

    /// Load a chart archive from the local cache
    pub fn load_chart(&self, reference: &str) -> Result<Option<Vec<u8>>> {
        let resolved = self.resolver.resolve(reference)?;
        self.cache.fetch(&resolved.reference)
    }
}
