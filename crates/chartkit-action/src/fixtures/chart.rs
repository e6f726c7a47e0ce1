//! Chart builder for tests
//!
//! Every build starts from the same base chart, `hello` 0.1.0, with a plain
//! template and a hook template, then applies the options in the order they
//! were given. Later options win where they overlap.

use chartkit_core::{Chart, ChartFile, Dependency, Values};
use serde_json::json;

use super::{MANIFEST_WITH_HOOK, RBAC_MANIFESTS};

/// Name of the base chart
pub const DEFAULT_CHART_NAME: &str = "hello";

/// Version of the base chart
pub const DEFAULT_CHART_VERSION: &str = "0.1.0";

/// One modification applied on top of the base chart
#[derive(Debug, Clone, PartialEq)]
pub enum ChartOption {
    /// Rename the chart
    Name(String),
    /// Replace the default values
    Values(Values),
    /// Add `templates/NOTES.txt`
    Notes(String),
    /// Add a resolved dependency built from its own options
    Dependency(ChartBuilder),
    /// Declare a dependency in the metadata only
    MetadataDependency(Dependency),
    /// Add the goodbye, empty and partial templates
    SampleTemplates,
    /// Add a template holding two RBAC documents
    MultipleManifestTemplate,
    /// Set the Kubernetes version constraint
    KubeVersion(String),
}

/// Ordered list of [`ChartOption`]s
///
/// The builder only records options; [`build`](Self::build) produces a new,
/// independent chart every time it is called.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChartBuilder {
    options: Vec<ChartOption>,
}

impl ChartBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a raw option
    pub fn option(mut self, option: ChartOption) -> Self {
        self.options.push(option);
        self
    }

    pub fn name(self, name: impl Into<String>) -> Self {
        self.option(ChartOption::Name(name.into()))
    }

    /// Use [`sample_values`] as the chart defaults
    pub fn sample_values(self) -> Self {
        self.values(sample_values())
    }

    pub fn values(self, values: Values) -> Self {
        self.option(ChartOption::Values(values))
    }

    pub fn notes(self, notes: impl Into<String>) -> Self {
        self.option(ChartOption::Notes(notes.into()))
    }

    pub fn dependency(self, dependency: ChartBuilder) -> Self {
        self.option(ChartOption::Dependency(dependency))
    }

    pub fn metadata_dependency(self, dependency: Dependency) -> Self {
        self.option(ChartOption::MetadataDependency(dependency))
    }

    pub fn sample_templates(self) -> Self {
        self.option(ChartOption::SampleTemplates)
    }

    pub fn multiple_manifest_template(self) -> Self {
        self.option(ChartOption::MultipleManifestTemplate)
    }

    pub fn kube_version(self, constraint: impl Into<String>) -> Self {
        self.option(ChartOption::KubeVersion(constraint.into()))
    }

    pub fn options(&self) -> &[ChartOption] {
        &self.options
    }

    pub fn build(&self) -> Chart {
        build_chart(&self.options)
    }
}

/// Build a chart from the base chart and `options`, applied in order
pub fn build_chart<'a>(options: impl IntoIterator<Item = &'a ChartOption>) -> Chart {
    let mut chart = base_chart();
    for option in options {
        apply(&mut chart, option);
    }
    chart
}

/// Nested values used by [`ChartBuilder::sample_values`]
pub fn sample_values() -> Values {
    Values::from(json!({
        "someKey": "someValue",
        "nestedKey": {
            "simpleKey": "simpleValue",
            "anotherNestedKey": {
                "yetAnotherNestedKey": {
                    "youReadyForAnotherNestedKey": "No"
                }
            }
        }
    }))
}

fn base_chart() -> Chart {
    let mut chart = Chart::new(DEFAULT_CHART_NAME, DEFAULT_CHART_VERSION);
    chart.templates = vec![
        ChartFile::new("templates/hello", "hello: world"),
        ChartFile::new("templates/hooks", MANIFEST_WITH_HOOK),
    ];
    chart
}

fn apply(chart: &mut Chart, option: &ChartOption) {
    match option {
        ChartOption::Name(name) => chart.metadata.name = name.clone(),
        ChartOption::Values(values) => chart.values = values.clone(),
        ChartOption::Notes(notes) => chart
            .templates
            .push(ChartFile::new("templates/NOTES.txt", notes.as_str())),
        ChartOption::Dependency(builder) => chart.add_dependency(builder.build()),
        ChartOption::MetadataDependency(dependency) => {
            chart.metadata.dependencies.push(dependency.clone())
        }
        ChartOption::SampleTemplates => chart.templates.extend([
            ChartFile::new("templates/goodbye", "goodbye: world"),
            ChartFile::new("templates/empty", ""),
            ChartFile::new(
                "templates/with-partials",
                r#"hello: {{ template "_planet" . }}"#,
            ),
            ChartFile::new("templates/partials/_planet", r#"{{define "_planet"}}Earth{{end}}"#),
        ]),
        ChartOption::MultipleManifestTemplate => chart
            .templates
            .push(ChartFile::new("templates/rbac", RBAC_MANIFESTS)),
        ChartOption::KubeVersion(constraint) => {
            chart.metadata.kube_version = Some(constraint.clone())
        }
    }
}
