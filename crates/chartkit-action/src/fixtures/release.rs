//! Release stubs

use chartkit_core::release::DEFAULT_NAMESPACE;
use chartkit_core::{Hook, HookEvent, Info, Release, Status, Values};
use chrono::Utc;
use serde_json::json;

use super::chart::ChartBuilder;
use super::{MANIFEST_WITH_HOOK, MANIFEST_WITH_TEST_HOOK};

/// Name used by [`release_stub`]
pub const STUB_RELEASE_NAME: &str = "angry-panda";

/// A deployed `angry-panda` release
pub fn release_stub() -> Release {
    named_release_stub(STUB_RELEASE_NAME, Status::Deployed)
}

/// First revision of `name` in `status`
///
/// The chart carries the sample templates, the config is `{name: value}` and
/// there are two hooks: a ConfigMap firing on post-install and pre-delete,
/// and a test Pod.
pub fn named_release_stub(name: &str, status: Status) -> Release {
    let now = Utc::now();

    Release {
        name: name.to_string(),
        namespace: DEFAULT_NAMESPACE.to_string(),
        info: Info::new(status, "Named Release Stub", now),
        chart: ChartBuilder::new().sample_templates().build(),
        config: Values::from(json!({"name": "value"})),
        manifest: String::new(),
        hooks: vec![
            Hook::new(
                "test-cm",
                "ConfigMap",
                "test-cm",
                MANIFEST_WITH_HOOK,
                HookEvent::PostInstall,
            )
            .also_on(HookEvent::PreDelete),
            Hook::new(
                "finding-nemo",
                "Pod",
                "finding-nemo",
                MANIFEST_WITH_TEST_HOOK,
                HookEvent::Test,
            ),
        ],
        version: 1,
    }
}
