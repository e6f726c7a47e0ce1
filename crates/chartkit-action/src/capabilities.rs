//! Cluster capabilities: Kubernetes version and supported API versions

use chartkit_core::{Chart, CoreError};
use semver::{Version, VersionReq};
use std::collections::BTreeSet;

use crate::discovery::ServerDiscovery;
use crate::error::{ActionError, Result};

/// Group/versions assumed when no cluster is available
const KNOWN_VERSIONS: &[&str] = &[
    "v1",
    "admissionregistration.k8s.io/v1",
    "apiextensions.k8s.io/v1",
    "apps/v1",
    "authentication.k8s.io/v1",
    "authorization.k8s.io/v1",
    "autoscaling/v1",
    "autoscaling/v2",
    "batch/v1",
    "certificates.k8s.io/v1",
    "coordination.k8s.io/v1",
    "discovery.k8s.io/v1",
    "events.k8s.io/v1",
    "networking.k8s.io/v1",
    "node.k8s.io/v1",
    "policy/v1",
    "rbac.authorization.k8s.io/v1",
    "scheduling.k8s.io/v1",
    "storage.k8s.io/v1",
];

/// Set of API versions a cluster supports
///
/// Entries are group/versions (`apps/v1`) and, when resources were
/// discovered, group/version/kind triples (`apps/v1/Deployment`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VersionSet(BTreeSet<String>);

impl VersionSet {
    /// The well-known versions used by [`Capabilities::default`]
    pub fn default_set() -> Self {
        KNOWN_VERSIONS.iter().copied().collect()
    }

    /// Check if `version` is supported
    pub fn has(&self, version: &str) -> bool {
        self.0.contains(version)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for VersionSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// Collect the API versions a cluster serves
///
/// An empty discovery answer gives an empty set, not an error.
pub fn get_version_set<D: ServerDiscovery + ?Sized>(client: &D) -> Result<VersionSet> {
    let groups = client.server_groups()?;
    let resources = client.server_resources()?;

    let mut versions = BTreeSet::new();
    for group in &groups.groups {
        for version in &group.versions {
            versions.insert(version.group_version.clone());
        }
    }
    for list in &resources {
        for resource in &list.resources {
            versions.insert(format!("{}/{}", list.group_version, resource.kind));
        }
    }

    tracing::debug!(count = versions.len(), "resolved API version set");
    Ok(VersionSet(versions))
}

/// Kubernetes server version
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KubeVersion {
    /// Full version, e.g. `v1.20.0`
    pub version: String,
    pub major: String,
    pub minor: String,
}

impl KubeVersion {
    pub fn new(major: u64, minor: u64) -> Self {
        Self {
            version: format!("v{}.{}.0", major, minor),
            major: major.to_string(),
            minor: minor.to_string(),
        }
    }

    /// Parse the version as SemVer, ignoring a leading `v`
    pub fn semver(&self) -> Result<Version> {
        Version::parse(self.version.trim_start_matches('v'))
            .map_err(|e| ActionError::Core(CoreError::InvalidVersion(e)))
    }
}

impl Default for KubeVersion {
    fn default() -> Self {
        Self::new(1, 20)
    }
}

impl std::fmt::Display for KubeVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.version)
    }
}

/// What the target cluster can do
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Capabilities {
    pub kube_version: KubeVersion,
    pub api_versions: VersionSet,
}

impl Default for Capabilities {
    fn default() -> Self {
        Self {
            kube_version: KubeVersion::default(),
            api_versions: VersionSet::default_set(),
        }
    }
}

impl Capabilities {
    /// Capabilities of a discovered cluster
    pub fn discover<D: ServerDiscovery + ?Sized>(client: &D, kube_version: KubeVersion) -> Result<Self> {
        Ok(Self {
            kube_version,
            api_versions: get_version_set(client)?,
        })
    }

    /// Check a chart's `kubeVersion` constraint against this cluster
    pub fn check_kube_version(&self, chart: &Chart) -> Result<()> {
        let Some(constraint) = chart.metadata.kube_version.as_deref() else {
            return Ok(());
        };

        let req = VersionReq::parse(constraint.trim())
            .map_err(|e| ActionError::Core(CoreError::InvalidVersion(e)))?;

        if req.matches(&self.kube_version.semver()?) {
            Ok(())
        } else {
            Err(ActionError::IncompatibleKubeVersion {
                constraint: constraint.to_string(),
                kube_version: self.kube_version.to_string(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discovery::FakeDiscovery;

    #[test]
    fn test_version_set_from_standard_cluster() {
        let vs = get_version_set(&FakeDiscovery::standard()).unwrap();

        assert!(vs.has("v1"));
        assert!(vs.has("apps/v1"));
        assert!(vs.has("apps/v1/Deployment"));
        assert!(vs.has("v1/ConfigMap"));
        assert!(!vs.has("nosuchversion/v1"));
    }

    #[test]
    fn test_version_set_empty_discovery() {
        let vs = get_version_set(&FakeDiscovery::empty()).unwrap();
        assert!(vs.is_empty());
        assert!(!vs.has("v1"));
    }

    #[test]
    fn test_version_set_discovery_failure() {
        let err = get_version_set(&FakeDiscovery::failing("boom")).unwrap_err();
        assert!(matches!(err, ActionError::Discovery(_)));
        assert!(err.to_string().contains("boom"));
    }

    #[test]
    fn test_version_set_through_trait_object() {
        let discovery: Box<dyn ServerDiscovery> = Box::new(FakeDiscovery::standard());
        assert!(get_version_set(discovery.as_ref()).unwrap().has("batch/v1"));
    }

    #[test]
    fn test_default_set() {
        let vs = VersionSet::default_set();
        assert!(vs.has("v1"));
        assert!(vs.has("rbac.authorization.k8s.io/v1"));
        assert_eq!(vs.len(), KNOWN_VERSIONS.len());
    }

    #[test]
    fn test_default_capabilities() {
        let caps = Capabilities::default();
        assert_eq!(caps.kube_version.to_string(), "v1.20.0");
        assert_eq!(caps.kube_version.major, "1");
        assert_eq!(caps.kube_version.minor, "20");
        assert!(caps.api_versions.has("apps/v1"));
    }

    #[test]
    fn test_discover_capabilities() {
        let caps = Capabilities::discover(&FakeDiscovery::standard(), KubeVersion::new(1, 31)).unwrap();
        assert!(caps.api_versions.has("batch/v1/Job"));
        assert_eq!(caps.kube_version.version, "v1.31.0");
    }

    #[test]
    fn test_check_kube_version() {
        let caps = Capabilities::default();
        let mut chart = Chart::new("hello", "0.1.0");
        assert!(caps.check_kube_version(&chart).is_ok());

        chart.metadata.kube_version = Some(">=1.19.0".to_string());
        assert!(caps.check_kube_version(&chart).is_ok());

        chart.metadata.kube_version = Some(">=1.20.0-0".to_string());
        assert!(caps.check_kube_version(&chart).is_ok());

        chart.metadata.kube_version = Some(">=1.21.0".to_string());
        assert!(matches!(
            caps.check_kube_version(&chart),
            Err(ActionError::IncompatibleKubeVersion { .. })
        ));

        chart.metadata.kube_version = Some("not a constraint".to_string());
        assert!(matches!(
            caps.check_kube_version(&chart),
            Err(ActionError::Core(CoreError::InvalidVersion(_)))
        ));
    }
}
