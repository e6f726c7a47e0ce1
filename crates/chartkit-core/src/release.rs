//! Release management types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::chart::Chart;
use crate::hook::{Hook, HookEvent};
use crate::values::Values;

/// Namespace used when none is given
pub const DEFAULT_NAMESPACE: &str = "default";

/// A chart installed with a specific configuration at a given revision
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Release {
    /// Release name
    pub name: String,

    /// Kubernetes namespace
    #[serde(default = "default_namespace")]
    pub namespace: String,

    /// Deployment information
    pub info: Info,

    /// Chart snapshot at deploy time
    pub chart: Chart,

    /// User-supplied configuration
    #[serde(default)]
    pub config: Values,

    /// Rendered manifest (all non-hook resources)
    #[serde(default)]
    pub manifest: String,

    /// Hooks extracted from the chart
    #[serde(default)]
    pub hooks: Vec<Hook>,

    /// Revision number (1-indexed, increments with each upgrade)
    pub version: u32,
}

fn default_namespace() -> String {
    DEFAULT_NAMESPACE.to_string()
}

impl Release {
    /// Hooks that fire on `event`, ordered by weight then name
    pub fn hooks_for(&self, event: HookEvent) -> Vec<&Hook> {
        let mut hooks: Vec<&Hook> = self.hooks.iter().filter(|h| h.fires_on(event)).collect();
        hooks.sort_by(|a, b| a.weight.cmp(&b.weight).then_with(|| a.name.cmp(&b.name)));
        hooks
    }

    /// Storage key for this revision
    pub fn storage_key(&self) -> String {
        format!("sh.chartkit.release.v1.{}.v{}", self.name, self.version)
    }
}

/// Deployment information for a release
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Info {
    pub first_deployed: DateTime<Utc>,

    pub last_deployed: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted: Option<DateTime<Utc>>,

    /// Human-readable description of the last operation
    #[serde(default)]
    pub description: String,

    pub status: Status,

    /// Rendered NOTES.txt
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Info {
    /// Info for a release deployed at `now`
    pub fn new(status: Status, description: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            first_deployed: now,
            last_deployed: now,
            deleted: None,
            description: description.into(),
            status,
            notes: None,
        }
    }
}

/// Release status
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum Status {
    #[default]
    Unknown,
    Deployed,
    Uninstalled,
    Superseded,
    Failed,
    Uninstalling,
    PendingInstall,
    PendingUpgrade,
    PendingRollback,
}

impl Status {
    /// Is an operation in flight for this release?
    pub fn is_pending(&self) -> bool {
        matches!(
            self,
            Status::PendingInstall | Status::PendingUpgrade | Status::PendingRollback
        )
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Unknown => "unknown",
            Self::Deployed => "deployed",
            Self::Uninstalled => "uninstalled",
            Self::Superseded => "superseded",
            Self::Failed => "failed",
            Self::Uninstalling => "uninstalling",
            Self::PendingInstall => "pending-install",
            Self::PendingUpgrade => "pending-upgrade",
            Self::PendingRollback => "pending-rollback",
        };
        write!(f, "{}", s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn release_with_hooks(hooks: Vec<Hook>) -> Release {
        Release {
            name: "myapp".to_string(),
            namespace: DEFAULT_NAMESPACE.to_string(),
            info: Info::new(Status::Deployed, "Install complete", Utc::now()),
            chart: Chart::new("myapp", "1.0.0"),
            config: Values::new(),
            manifest: String::new(),
            hooks,
            version: 3,
        }
    }

    #[test]
    fn test_status_display_matches_serde() {
        for status in [
            Status::Unknown,
            Status::Deployed,
            Status::Uninstalled,
            Status::Superseded,
            Status::Failed,
            Status::Uninstalling,
            Status::PendingInstall,
            Status::PendingUpgrade,
            Status::PendingRollback,
        ] {
            let yaml = serde_yaml::to_string(&status).unwrap();
            assert_eq!(yaml.trim(), status.to_string());
        }
    }

    #[test]
    fn test_status_is_pending() {
        assert!(Status::PendingUpgrade.is_pending());
        assert!(!Status::Deployed.is_pending());
        assert!(!Status::Failed.is_pending());
    }

    #[test]
    fn test_info_new_sets_equal_timestamps() {
        let info = Info::new(Status::Deployed, "d", Utc::now());
        assert_eq!(info.first_deployed, info.last_deployed);
        assert!(info.deleted.is_none());
    }

    #[test]
    fn test_hooks_for_orders_by_weight() {
        let release = release_with_hooks(vec![
            Hook::new("late", "Job", "late", "", HookEvent::PreUpgrade).with_weight(10),
            Hook::new("early", "Job", "early", "", HookEvent::PreUpgrade).with_weight(-1),
            Hook::new("other", "Pod", "other", "", HookEvent::Test),
        ]);

        let names: Vec<&str> = release
            .hooks_for(HookEvent::PreUpgrade)
            .iter()
            .map(|h| h.name.as_str())
            .collect();
        assert_eq!(names, vec!["early", "late"]);
        assert!(release.hooks_for(HookEvent::PostDelete).is_empty());
    }

    #[test]
    fn test_storage_key() {
        let release = release_with_hooks(Vec::new());
        assert_eq!(release.storage_key(), "sh.chartkit.release.v1.myapp.v3");
    }

    #[test]
    fn test_namespace_defaults_on_deserialize() {
        let release = release_with_hooks(Vec::new());
        let mut json = serde_json::to_value(&release).unwrap();
        json.as_object_mut().unwrap().remove("namespace");
        let back: Release = serde_json::from_value(json).unwrap();
        assert_eq!(back.namespace, "default");
    }
}
