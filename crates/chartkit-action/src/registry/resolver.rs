//! Chart reference resolution
//!
//! Turns `oci://registry/repo:tag` strings into parsed references with the
//! credentials that apply to their registry. Nothing is fetched.

use oci_distribution::Reference;

use super::auth::{Authorizer, Credential};
use crate::error::{ActionError, Result};

/// A parsed reference plus the credentials for its registry
#[derive(Debug, Clone)]
pub struct ResolvedReference {
    pub reference: Reference,
    pub credential: Option<Credential>,
}

/// Resolves chart references against an [`Authorizer`]
#[derive(Debug, Clone, Default)]
pub struct Resolver {
    authorizer: Authorizer,
}

impl Resolver {
    pub fn new(authorizer: Authorizer) -> Self {
        Self { authorizer }
    }

    /// Parse an OCI reference string
    ///
    /// Format: oci://registry/repo:tag or registry/repo:tag
    pub fn parse_reference(reference: &str) -> Result<Reference> {
        let clean = reference
            .trim_start_matches("oci://")
            .trim_start_matches("https://")
            .trim_start_matches("http://");

        Reference::try_from(clean).map_err(|e| ActionError::InvalidReference {
            reference: reference.to_string(),
            message: e.to_string(),
        })
    }

    /// Parse `reference` and attach credentials for its registry
    pub fn resolve(&self, reference: &str) -> Result<ResolvedReference> {
        let reference = Self::parse_reference(reference)?;
        let credential = self.authorizer.credentials(reference.registry())?;
        Ok(ResolvedReference {
            reference,
            credential,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_reference() {
        let r = Resolver::parse_reference("oci://ghcr.io/myorg/charts/nginx:1.0.0").unwrap();
        assert_eq!(r.registry(), "ghcr.io");
        assert_eq!(r.repository(), "myorg/charts/nginx");
        assert_eq!(r.tag(), Some("1.0.0"));
        assert!(r.digest().is_none());
    }

    #[test]
    fn test_parse_reference_with_port() {
        let r = Resolver::parse_reference("localhost:5000/hello:0.1.0").unwrap();
        assert_eq!(r.registry(), "localhost:5000");
        assert_eq!(r.repository(), "hello");
        assert_eq!(r.tag(), Some("0.1.0"));
    }

    #[test]
    fn test_parse_reference_invalid() {
        let err = Resolver::parse_reference("ghcr.io/UPPER/Case:1.0").unwrap_err();
        assert!(matches!(err, ActionError::InvalidReference { .. }));
    }

    #[test]
    fn test_resolve_anonymous() {
        let resolved = Resolver::default().resolve("ghcr.io/myorg/nginx:1.0").unwrap();
        assert_eq!(resolved.reference.repository(), "myorg/nginx");
        assert!(resolved.credential.is_none());
    }
}
