//! Release hooks: manifests bound to lifecycle events
//!
//! A hook is extracted from a rendered manifest carrying the `helm.sh/hook`
//! annotation. One manifest may fire on several events.

use serde::{Deserialize, Deserializer, Serialize};
use std::str::FromStr;

use crate::error::{CoreError, Result};

/// Annotation listing the events a hook fires on
pub const HOOK_ANNOTATION: &str = "helm.sh/hook";

/// Annotation controlling hook ordering
pub const HOOK_WEIGHT_ANNOTATION: &str = "helm.sh/hook-weight";

/// Annotation listing when a hook resource is deleted
pub const HOOK_DELETE_ANNOTATION: &str = "helm.sh/hook-delete-policy";

/// Lifecycle event a hook can fire on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HookEvent {
    PreInstall,
    PostInstall,
    PreDelete,
    PostDelete,
    PreUpgrade,
    PostUpgrade,
    PreRollback,
    PostRollback,
    #[serde(alias = "test-success")]
    Test,
}

impl HookEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            HookEvent::PreInstall => "pre-install",
            HookEvent::PostInstall => "post-install",
            HookEvent::PreDelete => "pre-delete",
            HookEvent::PostDelete => "post-delete",
            HookEvent::PreUpgrade => "pre-upgrade",
            HookEvent::PostUpgrade => "post-upgrade",
            HookEvent::PreRollback => "pre-rollback",
            HookEvent::PostRollback => "post-rollback",
            HookEvent::Test => "test",
        }
    }
}

impl std::fmt::Display for HookEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for HookEvent {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pre-install" => Ok(HookEvent::PreInstall),
            "post-install" => Ok(HookEvent::PostInstall),
            "pre-delete" => Ok(HookEvent::PreDelete),
            "post-delete" => Ok(HookEvent::PostDelete),
            "pre-upgrade" => Ok(HookEvent::PreUpgrade),
            "post-upgrade" => Ok(HookEvent::PostUpgrade),
            "pre-rollback" => Ok(HookEvent::PreRollback),
            "post-rollback" => Ok(HookEvent::PostRollback),
            "test" | "test-success" => Ok(HookEvent::Test),
            _ => Err(CoreError::UnknownHookEvent(s.to_string())),
        }
    }
}

/// When a hook resource should be deleted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HookDeletePolicy {
    BeforeHookCreation,
    HookSucceeded,
    HookFailed,
}

impl FromStr for HookDeletePolicy {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "before-hook-creation" => Ok(HookDeletePolicy::BeforeHookCreation),
            "hook-succeeded" => Ok(HookDeletePolicy::HookSucceeded),
            "hook-failed" => Ok(HookDeletePolicy::HookFailed),
            other => Err(CoreError::InvalidManifest {
                path: String::new(),
                message: format!("unknown hook delete policy '{}'", other),
            }),
        }
    }
}

/// A hook attached to a release
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hook {
    /// Resource name (metadata.name)
    pub name: String,

    /// Kubernetes kind of the hook resource
    pub kind: String,

    /// Template path the hook was rendered from
    pub path: String,

    /// Raw manifest
    pub manifest: String,

    /// Events this hook fires on, never empty
    #[serde(deserialize_with = "non_empty_events")]
    events: Vec<HookEvent>,

    /// Ordering within an event (lower runs first)
    #[serde(default)]
    pub weight: i32,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub delete_policies: Vec<HookDeletePolicy>,
}

impl Hook {
    /// Create a hook firing on a single event
    pub fn new(
        name: impl Into<String>,
        kind: impl Into<String>,
        path: impl Into<String>,
        manifest: impl Into<String>,
        event: HookEvent,
    ) -> Self {
        Self {
            name: name.into(),
            kind: kind.into(),
            path: path.into(),
            manifest: manifest.into(),
            events: vec![event],
            weight: 0,
            delete_policies: Vec::new(),
        }
    }

    /// Also fire on `event`; duplicates are ignored
    pub fn also_on(mut self, event: HookEvent) -> Self {
        if !self.events.contains(&event) {
            self.events.push(event);
        }
        self
    }

    pub fn with_weight(mut self, weight: i32) -> Self {
        self.weight = weight;
        self
    }

    /// Events this hook fires on, in registration order
    pub fn events(&self) -> &[HookEvent] {
        &self.events
    }

    /// Check if this hook fires on `event`
    pub fn fires_on(&self, event: HookEvent) -> bool {
        self.events.contains(&event)
    }

    /// Extract a hook from a rendered manifest
    ///
    /// Returns `Ok(None)` when the manifest carries no hook annotation.
    /// Unknown event names are skipped, but at least one must be recognised.
    pub fn from_manifest(path: &str, manifest: &str) -> Result<Option<Hook>> {
        let invalid = |message: String| CoreError::InvalidManifest {
            path: path.to_string(),
            message,
        };

        let doc: serde_yaml::Value =
            serde_yaml::from_str(manifest).map_err(|e| invalid(e.to_string()))?;

        let annotation = |key: &str| {
            doc.get("metadata")
                .and_then(|m| m.get("annotations"))
                .and_then(|a| a.get(key))
                .and_then(|v| v.as_str())
        };

        let Some(events_value) = annotation(HOOK_ANNOTATION) else {
            return Ok(None);
        };

        let mut events: Vec<HookEvent> = Vec::new();
        for event in events_value.split(',').filter_map(|e| e.parse().ok()) {
            if !events.contains(&event) {
                events.push(event);
            }
        }
        if events.is_empty() {
            return Err(invalid(format!(
                "no known hook events in '{}'",
                events_value
            )));
        }

        let weight = annotation(HOOK_WEIGHT_ANNOTATION)
            .and_then(|w| w.trim().parse().ok())
            .unwrap_or(0);

        let delete_policies = annotation(HOOK_DELETE_ANNOTATION)
            .map(|p| p.split(',').filter_map(|s| s.parse().ok()).collect())
            .unwrap_or_default();

        let name = doc
            .get("metadata")
            .and_then(|m| m.get("name"))
            .and_then(|n| n.as_str())
            .unwrap_or_default()
            .to_string();

        let kind = doc
            .get("kind")
            .and_then(|k| k.as_str())
            .unwrap_or_default()
            .to_string();

        Ok(Some(Hook {
            name,
            kind,
            path: path.to_string(),
            manifest: manifest.to_string(),
            events,
            weight,
            delete_policies,
        }))
    }
}

fn non_empty_events<'de, D>(deserializer: D) -> std::result::Result<Vec<HookEvent>, D::Error>
where
    D: Deserializer<'de>,
{
    let events = Vec::<HookEvent>::deserialize(deserializer)?;
    if events.is_empty() {
        return Err(serde::de::Error::custom("hook must fire on at least one event"));
    }
    Ok(events)
}
