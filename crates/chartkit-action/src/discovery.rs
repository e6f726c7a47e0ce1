//! Cluster API discovery
//!
//! Version-set resolution only needs two answers from a cluster: which
//! group/versions it serves and which resources each of them exposes.
//! [`ServerDiscovery`] is that seam. [`DiscoverySnapshot`] answers it from a
//! real cluster (fetched once through kube), [`FakeDiscovery`] from memory.

use k8s_openapi::apimachinery::pkg::apis::meta::v1::{
    APIGroup, APIGroupList, APIResource, APIResourceList, GroupVersionForDiscovery,
};

use crate::error::{ActionError, Result};

/// Read-only view of a cluster's discovery endpoints
pub trait ServerDiscovery {
    /// Served API groups; the legacy core group has an empty name
    fn server_groups(&self) -> Result<APIGroupList>;

    /// Resources served by each group/version
    fn server_resources(&self) -> Result<Vec<APIResourceList>>;
}

/// Discovery data captured from a live cluster
#[derive(Debug, Clone, Default)]
pub struct DiscoverySnapshot {
    groups: APIGroupList,
    resources: Vec<APIResourceList>,
}

impl DiscoverySnapshot {
    pub fn new(groups: APIGroupList, resources: Vec<APIResourceList>) -> Self {
        Self { groups, resources }
    }

    /// Query core versions, API groups and every group/version's resources
    pub async fn fetch(client: &kube::Client) -> Result<Self> {
        let discovery_err = |e: kube::Error| ActionError::Discovery(e.to_string());

        let core = client.list_core_api_versions().await.map_err(discovery_err)?;
        let mut groups = vec![core_group(&core.versions)];
        let mut resources = Vec::new();

        for version in &core.versions {
            resources.push(
                client
                    .list_core_api_resources(version)
                    .await
                    .map_err(discovery_err)?,
            );
        }

        let api_groups = client.list_api_groups().await.map_err(discovery_err)?;
        for group in api_groups.groups {
            for version in &group.versions {
                let listed = client.list_api_group_resources(&version.group_version).await;
                keep_group_resources(&mut resources, &version.group_version, listed);
            }
            groups.push(group);
        }

        tracing::debug!(
            groups = groups.len(),
            group_versions = resources.len(),
            "captured cluster discovery"
        );

        Ok(Self {
            groups: APIGroupList { groups },
            resources,
        })
    }
}

impl ServerDiscovery for DiscoverySnapshot {
    fn server_groups(&self) -> Result<APIGroupList> {
        Ok(self.groups.clone())
    }

    fn server_resources(&self) -> Result<Vec<APIResourceList>> {
        Ok(self.resources.clone())
    }
}

/// Record the resources of one group/version
///
/// An unavailable group (an aggregated API that is down, say) is skipped
/// with a warning; its group/version stays listed in the groups.
fn keep_group_resources<E: std::fmt::Display>(
    resources: &mut Vec<APIResourceList>,
    group_version: &str,
    listed: std::result::Result<APIResourceList, E>,
) {
    match listed {
        Ok(list) => resources.push(list),
        Err(e) => {
            tracing::warn!(%group_version, error = %e, "skipping group that failed discovery");
        }
    }
}

fn core_group(versions: &[String]) -> APIGroup {
    let versions: Vec<GroupVersionForDiscovery> = versions
        .iter()
        .map(|v| GroupVersionForDiscovery {
            group_version: v.clone(),
            version: v.clone(),
        })
        .collect();

    APIGroup {
        name: String::new(),
        preferred_version: versions.first().cloned(),
        versions,
        ..Default::default()
    }
}

/// In-memory discovery for tests
#[derive(Debug, Clone, Default)]
pub struct FakeDiscovery {
    resources: Vec<APIResourceList>,
    failure: Option<String>,
}

impl FakeDiscovery {
    /// A cluster that serves nothing
    pub fn empty() -> Self {
        Self::default()
    }

    /// A cluster whose discovery calls always fail
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            resources: Vec::new(),
            failure: Some(message.into()),
        }
    }

    /// A small but typical cluster: core v1, apps, batch and RBAC
    pub fn standard() -> Self {
        Self::empty()
            .with_resources(
                "v1",
                &[
                    ("pods", "Pod", true),
                    ("configmaps", "ConfigMap", true),
                    ("secrets", "Secret", true),
                    ("services", "Service", true),
                    ("serviceaccounts", "ServiceAccount", true),
                    ("namespaces", "Namespace", false),
                ],
            )
            .with_resources(
                "apps/v1",
                &[
                    ("deployments", "Deployment", true),
                    ("statefulsets", "StatefulSet", true),
                    ("daemonsets", "DaemonSet", true),
                ],
            )
            .with_resources("batch/v1", &[("jobs", "Job", true), ("cronjobs", "CronJob", true)])
            .with_resources(
                "rbac.authorization.k8s.io/v1",
                &[
                    ("roles", "Role", true),
                    ("rolebindings", "RoleBinding", true),
                    ("clusterroles", "ClusterRole", false),
                    ("clusterrolebindings", "ClusterRoleBinding", false),
                ],
            )
    }

    /// Serve `group_version` with the given `(plural, kind, namespaced)` resources
    pub fn with_resources(mut self, group_version: &str, resources: &[(&str, &str, bool)]) -> Self {
        self.resources.push(APIResourceList {
            group_version: group_version.to_string(),
            resources: resources
                .iter()
                .map(|(name, kind, namespaced)| APIResource {
                    name: name.to_string(),
                    kind: kind.to_string(),
                    namespaced: *namespaced,
                    verbs: vec!["get".to_string(), "list".to_string()],
                    ..Default::default()
                })
                .collect(),
        });
        self
    }

    fn check(&self) -> Result<()> {
        match &self.failure {
            Some(message) => Err(ActionError::Discovery(message.clone())),
            None => Ok(()),
        }
    }
}

impl ServerDiscovery for FakeDiscovery {
    fn server_groups(&self) -> Result<APIGroupList> {
        self.check()?;

        let mut groups: Vec<APIGroup> = Vec::new();
        for list in &self.resources {
            let (group, version) = match list.group_version.split_once('/') {
                Some((group, version)) => (group, version),
                None => ("", list.group_version.as_str()),
            };
            let entry = GroupVersionForDiscovery {
                group_version: list.group_version.clone(),
                version: version.to_string(),
            };

            match groups.iter_mut().find(|g| g.name == group) {
                Some(existing) => existing.versions.push(entry),
                None => groups.push(APIGroup {
                    name: group.to_string(),
                    preferred_version: Some(entry.clone()),
                    versions: vec![entry],
                    ..Default::default()
                }),
            }
        }

        Ok(APIGroupList { groups })
    }

    fn server_resources(&self) -> Result<Vec<APIResourceList>> {
        self.check()?;
        Ok(self.resources.clone())
    }
}
