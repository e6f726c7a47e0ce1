//! Ready-made charts, releases and action configurations for tests
//!
//! - [`chart`]: a composable chart builder seeded with a hello-world chart
//! - [`release`]: deployed release stubs with two representative hooks
//! - [`config`]: an action [`Configuration`](crate::Configuration) wired to
//!   in-memory collaborators and a throwaway registry cache

pub mod chart;
pub mod config;
pub mod release;

pub use chart::{ChartBuilder, ChartOption, build_chart, sample_values};
pub use config::{ConfigFixture, FixtureOptions, action_config_fixture};
pub use release::{named_release_stub, release_stub};

/// ConfigMap hook firing on post-install, pre-delete and post-upgrade
pub const MANIFEST_WITH_HOOK: &str = r#"kind: ConfigMap
metadata:
  name: test-cm
  annotations:
    "helm.sh/hook": post-install,pre-delete,post-upgrade
data:
  name: value"#;

/// Test-hook Pod manifest
///
/// Kept exactly as captured, tab indentation and trailing comma included; it
/// does not parse as YAML.
pub const MANIFEST_WITH_TEST_HOOK: &str = "kind: Pod\n  metadata:\n\tname: finding-nemo,\n\tannotations:\n\t  \"helm.sh/hook\": test\n  spec:\n\tcontainers:\n\t- name: nemo-test\n\t  image: fake-image\n\t  cmd: fake-command\n  ";

/// Role and RoleBinding in one file, with release-namespace placeholders
pub const RBAC_MANIFESTS: &str = r#"apiVersion: rbac.authorization.k8s.io/v1
kind: Role
metadata:
  name: schedule-agents
rules:
- apiGroups: [""]
  resources: ["pods", "pods/exec", "pods/log"]
  verbs: ["*"]

---

apiVersion: rbac.authorization.k8s.io/v1
kind: RoleBinding
metadata:
  name: schedule-agents
  namespace: {{ default .Release.Namespace}}
roleRef:
  apiGroup: rbac.authorization.k8s.io
  kind: Role
  name: schedule-agents
subjects:
- kind: ServiceAccount
  name: schedule-agents
  namespace: {{ .Release.Namespace }}
"#;
