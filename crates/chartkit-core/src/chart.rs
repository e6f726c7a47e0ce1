//! Chart definition: a versioned package tree

use semver::Version;
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};
use crate::values::Values;

/// A chart and its resolved dependency tree
///
/// Nested charts are owned by their parent and addressed by index; there are
/// no back-references to the parent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chart {
    /// Chart metadata (Chart.yaml)
    pub metadata: ChartMetadata,

    /// Raw template files, in load order
    #[serde(default)]
    pub templates: Vec<ChartFile>,

    /// Default configuration values
    #[serde(default)]
    pub values: Values,

    /// Resolved dependencies (the charts/ directory)
    #[serde(default)]
    pub dependencies: Vec<Chart>,
}

/// Chart metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartMetadata {
    /// Chart API version (v1 or v2)
    pub api_version: String,

    /// Chart name (required)
    pub name: String,

    /// Chart version (required, SemVer)
    pub version: String,

    /// Kubernetes version constraint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kube_version: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_version: Option<String>,

    /// Declared dependencies
    #[serde(default)]
    pub dependencies: Vec<Dependency>,
}

/// A single file inside a chart
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartFile {
    /// Path relative to the chart root (e.g. `templates/hello`)
    pub name: String,

    /// Raw file content
    pub data: Vec<u8>,
}

impl ChartFile {
    pub fn new(name: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            data: data.into(),
        }
    }

    /// File content as text, if it is valid UTF-8
    pub fn as_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.data).ok()
    }
}

/// Declared chart dependency
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dependency {
    /// Dependency name
    pub name: String,

    /// Version constraint (semver)
    #[serde(default)]
    pub version: String,

    /// Repository URL
    #[serde(default)]
    pub repository: String,

    /// Dot-separated values path that enables the dependency
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,

    /// Tags for conditional inclusion
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,

    /// Alias name (overrides dependency name in templates)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
}

impl Dependency {
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        repository: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            repository: repository.into(),
            condition: None,
            tags: Vec::new(),
            alias: None,
        }
    }

    /// Get the effective name (alias if set, otherwise name)
    #[inline]
    pub fn effective_name(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }
}

impl Chart {
    /// Create an empty chart with the given name and version
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            metadata: ChartMetadata {
                api_version: "v1".to_string(),
                name: name.into(),
                version: version.into(),
                kube_version: None,
                description: None,
                app_version: None,
                dependencies: Vec::new(),
            },
            templates: Vec::new(),
            values: Values::new(),
            dependencies: Vec::new(),
        }
    }

    /// Chart name
    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    /// Append a resolved dependency
    pub fn add_dependency(&mut self, chart: Chart) {
        self.dependencies.push(chart);
    }

    /// Resolved dependencies
    pub fn dependencies(&self) -> &[Chart] {
        &self.dependencies
    }

    /// Look up a template by its path
    pub fn template(&self, name: &str) -> Option<&ChartFile> {
        self.templates.iter().find(|t| t.name == name)
    }

    /// Validate the required metadata fields
    pub fn validate(&self) -> Result<()> {
        if self.metadata.api_version.is_empty() {
            return Err(CoreError::InvalidChart {
                message: "apiVersion is required".to_string(),
            });
        }
        if self.metadata.name.is_empty() {
            return Err(CoreError::InvalidChart {
                message: "name is required".to_string(),
            });
        }
        Version::parse(&self.metadata.version)?;
        Ok(())
    }

    /// Check that every declared dependency has exactly one resolved chart
    ///
    /// Resolved charts are matched by the dependency's alias when it has one,
    /// otherwise by its name.
    pub fn check_dependencies(&self) -> Result<()> {
        let mut missing = Vec::new();

        for declared in &self.metadata.dependencies {
            let matches = self
                .dependencies
                .iter()
                .filter(|c| c.name() == declared.effective_name())
                .count();

            match matches {
                0 => missing.push(declared.name.clone()),
                1 => {}
                n => {
                    return Err(CoreError::InvalidChart {
                        message: format!(
                            "dependency '{}' is resolved {} times in charts/",
                            declared.name, n
                        ),
                    });
                }
            }
        }

        if missing.is_empty() {
            Ok(())
        } else {
            Err(CoreError::MissingDependencies { names: missing })
        }
    }

    /// Names of resolved charts that no declared dependency refers to
    pub fn undeclared_dependencies(&self) -> Vec<&str> {
        self.dependencies
            .iter()
            .map(Chart::name)
            .filter(|name| {
                !self
                    .metadata
                    .dependencies
                    .iter()
                    .any(|d| d.effective_name() == *name)
            })
            .collect()
    }
}
