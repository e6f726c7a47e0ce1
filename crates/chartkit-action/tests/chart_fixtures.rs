//! Chart builder behaviour

use chartkit_action::Capabilities;
use chartkit_action::fixtures::{ChartBuilder, ChartOption, build_chart, sample_values};
use chartkit_core::{CoreError, Dependency, Hook};

fn template_names(builder: &ChartBuilder) -> Vec<String> {
    builder
        .build()
        .templates
        .iter()
        .map(|t| t.name.clone())
        .collect()
}

#[test]
fn test_default_chart_name() {
    assert_eq!(ChartBuilder::new().build().name(), "hello");
    assert_eq!(build_chart(std::iter::empty()).name(), "hello");
}

#[test]
fn test_last_name_wins() {
    let chart = build_chart(&[
        ChartOption::Name("first".into()),
        ChartOption::Name("last".into()),
    ]);
    assert_eq!(chart.name(), "last");
}

#[test]
fn test_one_dependency_per_option() {
    let chart = ChartBuilder::new()
        .dependency(ChartBuilder::new().name("sub-a"))
        .dependency(ChartBuilder::new().name("sub-b").sample_values())
        .dependency(ChartBuilder::new().name("sub-c"))
        .build();

    let names: Vec<&str> = chart.dependencies().iter().map(|c| c.name()).collect();
    assert_eq!(names, ["sub-a", "sub-b", "sub-c"]);
    assert_eq!(chart.dependencies()[1].values, sample_values());
    assert!(chart.metadata.dependencies.is_empty());
    assert_eq!(chart.undeclared_dependencies(), ["sub-a", "sub-b", "sub-c"]);
}

#[test]
fn test_builds_are_independent() {
    let builder = ChartBuilder::new().sample_templates().sample_values();

    let first = builder.build();
    let mut second = builder.build();
    assert_eq!(first, second);

    second.metadata.name = "changed".to_string();
    second.templates.clear();
    second.values.set("someKey", "other".into()).unwrap();

    assert_eq!(first, builder.build());
    assert_eq!(first.templates.len(), 6);
}

#[test]
fn test_sibling_dependencies_are_independent() {
    let sub = ChartBuilder::new().name("sub").sample_templates().sample_values();
    let mut chart = ChartBuilder::new()
        .dependency(sub.clone())
        .dependency(sub.clone())
        .build();

    assert_eq!(chart.dependencies[0], chart.dependencies[1]);

    let first = &mut chart.dependencies[0];
    first.metadata.name = "changed".to_string();
    first.templates.clear();
    first.values.set("nestedKey.simpleKey", "other".into()).unwrap();

    assert_eq!(chart.dependencies[1], sub.build());
    assert_eq!(chart.dependencies[1].name(), "sub");
    assert_eq!(chart.dependencies[1].templates.len(), 6);
}

#[test]
fn test_notes_template() {
    let chart = ChartBuilder::new().notes("thanks for installing").build();
    let notes: Vec<_> = chart
        .templates
        .iter()
        .filter(|t| t.name == "templates/NOTES.txt")
        .collect();

    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].as_str(), Some("thanks for installing"));
}

#[test]
fn test_metadata_dependency_is_missing() {
    let chart = ChartBuilder::new()
        .metadata_dependency(Dependency::new("hello", "0.1.0", "https://charts.example.com"))
        .build();

    let err = chart.check_dependencies().unwrap_err();
    assert!(matches!(&err, CoreError::MissingDependencies { names } if names == &["hello"]));
    assert_eq!(
        err.to_string(),
        "Found in Chart.yaml, but missing in charts/ directory: hello"
    );
}

#[test]
fn test_declared_and_resolved_dependency() {
    let chart = ChartBuilder::new()
        .metadata_dependency(Dependency::new("sub", "0.1.0", "https://charts.example.com"))
        .dependency(ChartBuilder::new().name("sub"))
        .build();

    chart.check_dependencies().unwrap();
    assert!(chart.undeclared_dependencies().is_empty());
}

#[test]
fn test_multiple_manifest_template() {
    let chart = ChartBuilder::new().multiple_manifest_template().build();
    let rbac = chart.template("templates/rbac").unwrap().as_str().unwrap();

    let documents: Vec<&str> = rbac.split("\n---\n").collect();
    assert_eq!(documents.len(), 2);
    assert!(documents[0].contains("kind: Role\n"));
    assert!(documents[1].contains("kind: RoleBinding\n"));
    assert!(rbac.contains("{{ .Release.Namespace }}"));
}

#[test]
fn test_base_hook_template_parses() {
    let chart = ChartBuilder::new().build();
    let hooks = chart.template("templates/hooks").unwrap();

    let hook = Hook::from_manifest(&hooks.name, hooks.as_str().unwrap())
        .unwrap()
        .unwrap();
    assert_eq!(hook.name, "test-cm");
    assert_eq!(hook.events().len(), 3);
}

#[test]
fn test_kube_version_against_default_capabilities() {
    let caps = Capabilities::default();

    let ok = ChartBuilder::new().kube_version(">=1.19.0").build();
    caps.check_kube_version(&ok).unwrap();

    let too_new = ChartBuilder::new().kube_version(">=1.99.0").build();
    assert!(caps.check_kube_version(&too_new).is_err());
}

#[test]
fn test_template_order() {
    let builder = ChartBuilder::new()
        .sample_templates()
        .notes("notes")
        .multiple_manifest_template();

    insta::assert_yaml_snapshot!(template_names(&builder), @r"
    - templates/hello
    - templates/hooks
    - templates/goodbye
    - templates/empty
    - templates/with-partials
    - templates/partials/_planet
    - templates/NOTES.txt
    - templates/rbac
    ");
}

#[test]
fn test_metadata_serializes_like_chart_yaml() {
    let chart = ChartBuilder::new()
        .kube_version(">=1.19.0")
        .metadata_dependency(Dependency::new("sub", "0.1.0", "https://charts.example.com"))
        .build();

    let yaml = serde_yaml::to_string(&chart.metadata).unwrap();
    assert!(yaml.contains("apiVersion: v1\n"));
    assert!(yaml.contains("name: hello\n"));
    assert!(yaml.contains("kubeVersion:"));

    let back: chartkit_core::ChartMetadata = serde_yaml::from_str(&yaml).unwrap();
    assert_eq!(back, chart.metadata);
}
