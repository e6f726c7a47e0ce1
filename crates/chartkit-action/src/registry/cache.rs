//! Content-addressed local cache for chart archives
//!
//! Layout under the cache root:
//! - `blobs/sha256/<hex>`: archive bytes
//! - `refs/<registry>/<repository>/<tag>`: digest the tag points at

use oci_distribution::Reference;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

use crate::error::{ActionError, Result};

/// Directory name of the cache below a registry config root
pub const CACHE_ROOT_DIR: &str = "cache";

/// Local blob cache
#[derive(Debug, Clone)]
pub struct Cache {
    root: PathBuf,
    debug: bool,
}

/// Options for [`Cache`]
#[derive(Debug, Clone, Default)]
pub struct CacheBuilder {
    root: Option<PathBuf>,
    debug: bool,
}

impl CacheBuilder {
    /// Directory the cache lives in
    pub fn root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = Some(root.into());
        self
    }

    /// Log every store and fetch
    pub fn debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Create the cache directories
    pub fn build(self) -> Result<Cache> {
        let root = match self.root {
            Some(root) => root,
            None => Cache::default_root()?,
        };

        std::fs::create_dir_all(root.join("blobs").join("sha256"))?;
        std::fs::create_dir_all(root.join("refs"))?;

        Ok(Cache {
            root,
            debug: self.debug,
        })
    }
}

impl Cache {
    pub fn builder() -> CacheBuilder {
        CacheBuilder::default()
    }

    /// `<user cache dir>/chartkit/registry/cache`
    pub fn default_root() -> Result<PathBuf> {
        let cache_dir = dirs::cache_dir().ok_or_else(|| {
            ActionError::Registry("could not determine cache directory".to_string())
        })?;
        Ok(cache_dir.join("chartkit").join("registry").join(CACHE_ROOT_DIR))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the blob with `digest` (`sha256:<hex>`)
    pub fn blob_path(&self, digest: &str) -> PathBuf {
        let hex = digest.strip_prefix("sha256:").unwrap_or(digest);
        self.root.join("blobs").join("sha256").join(hex)
    }

    fn ref_path(&self, reference: &Reference) -> PathBuf {
        let tag = match (reference.tag(), reference.digest()) {
            (Some(tag), _) => tag.to_string(),
            (None, Some(digest)) => digest.replace(':', "-"),
            (None, None) => "latest".to_string(),
        };
        self.root
            .join("refs")
            .join(reference.registry())
            .join(reference.repository())
            .join(tag)
    }

    /// Store `content` and point `reference` at it; returns the digest
    pub fn store(&self, reference: &Reference, content: &[u8]) -> Result<String> {
        let digest = format!("sha256:{}", hex::encode(Sha256::digest(content)));

        let blob = self.blob_path(&digest);
        if !blob.exists() {
            std::fs::write(&blob, content)?;
        }

        let ref_path = self.ref_path(reference);
        if let Some(parent) = ref_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&ref_path, &digest)?;

        if self.debug {
            tracing::debug!(reference = %reference.whole(), %digest, size = content.len(), "cache store");
        }
        Ok(digest)
    }

    /// Content stored for `reference`, if any
    pub fn fetch(&self, reference: &Reference) -> Result<Option<Vec<u8>>> {
        let ref_path = self.ref_path(reference);
        if !ref_path.exists() {
            if self.debug {
                tracing::debug!(reference = %reference.whole(), "cache miss");
            }
            return Ok(None);
        }

        let digest = std::fs::read_to_string(&ref_path)?;
        let digest = digest.trim();
        let blob = self.blob_path(digest);
        if !blob.exists() {
            tracing::warn!(reference = %reference.whole(), %digest, "cache ref points at a missing blob");
            return Ok(None);
        }

        let content = std::fs::read(&blob)?;
        let actual = format!("sha256:{}", hex::encode(Sha256::digest(&content)));
        if actual != digest {
            return Err(ActionError::Registry(format!(
                "cache blob {} is corrupted (expected {}, got {})",
                blob.display(),
                digest,
                actual
            )));
        }

        if self.debug {
            tracing::debug!(reference = %reference.whole(), %digest, "cache hit");
        }
        Ok(Some(content))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::Resolver;

    fn cache(dir: &Path) -> Cache {
        Cache::builder()
            .root(dir.join(CACHE_ROOT_DIR))
            .debug(true)
            .build()
            .unwrap()
    }

    #[test]
    fn test_build_creates_layout() {
        let dir = tempfile::tempdir().unwrap();
        let cache = cache(dir.path());
        assert!(cache.root().join("blobs/sha256").is_dir());
        assert!(cache.root().join("refs").is_dir());
    }

    #[test]
    fn test_store_and_fetch() {
        let dir = tempfile::tempdir().unwrap();
        let cache = cache(dir.path());
        let reference = Resolver::parse_reference("localhost:5000/hello:0.1.0").unwrap();

        let digest = cache.store(&reference, b"chart-bytes").unwrap();
        assert!(digest.starts_with("sha256:"));
        assert!(cache.blob_path(&digest).exists());

        assert_eq!(cache.fetch(&reference).unwrap().as_deref(), Some(&b"chart-bytes"[..]));
    }

    #[test]
    fn test_fetch_miss() {
        let dir = tempfile::tempdir().unwrap();
        let cache = cache(dir.path());
        let reference = Resolver::parse_reference("localhost:5000/absent:1.0.0").unwrap();
        assert!(cache.fetch(&reference).unwrap().is_none());
    }

    #[test]
    fn test_same_content_shares_blob() {
        let dir = tempfile::tempdir().unwrap();
        let cache = cache(dir.path());
        let a = Resolver::parse_reference("localhost:5000/hello:0.1.0").unwrap();
        let b = Resolver::parse_reference("localhost:5000/hello:latest").unwrap();

        assert_eq!(cache.store(&a, b"same").unwrap(), cache.store(&b, b"same").unwrap());
        let blobs = std::fs::read_dir(cache.root().join("blobs/sha256")).unwrap().count();
        assert_eq!(blobs, 1);
    }

    #[test]
    fn test_corrupted_blob_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let cache = cache(dir.path());
        let reference = Resolver::parse_reference("localhost:5000/hello:0.1.0").unwrap();

        let digest = cache.store(&reference, b"original").unwrap();
        std::fs::write(cache.blob_path(&digest), b"tampered").unwrap();

        assert!(matches!(cache.fetch(&reference), Err(ActionError::Registry(_))));
    }
}
