//! Registry credentials from Docker's `config.json`

use base64::Engine;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::{ActionError, Result};

/// Docker config.json format
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DockerConfig {
    #[serde(default)]
    pub auths: HashMap<String, DockerAuth>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DockerAuth {
    #[serde(default)]
    pub auth: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

/// Username/password pair for one registry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    pub username: String,
    pub password: String,
}

/// Looks up registry credentials by host
#[derive(Debug, Clone, Default)]
pub struct Authorizer {
    config: DockerConfig,
}

impl Authorizer {
    /// Load credentials from `~/.docker/config.json`
    ///
    /// A missing file means no credentials, not an error.
    pub fn new() -> Result<Self> {
        Self::from_path(&Self::default_path()?)
    }

    /// Load credentials from a specific config file
    pub fn from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::anonymous());
        }

        let content = std::fs::read_to_string(path)?;
        let config: DockerConfig = serde_json::from_str(&content).map_err(|e| {
            ActionError::Registry(format!("invalid docker config {}: {}", path.display(), e))
        })?;
        Ok(Self { config })
    }

    /// An authorizer without credentials
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn default_path() -> Result<PathBuf> {
        let home = dirs::home_dir().ok_or_else(|| {
            ActionError::Registry("could not determine home directory".to_string())
        })?;
        Ok(home.join(".docker").join("config.json"))
    }

    /// Credentials for `host`, if any are configured
    pub fn credentials(&self, host: &str) -> Result<Option<Credential>> {
        let candidates = [
            host.to_string(),
            format!("https://{}", host),
            format!("http://{}", host),
        ];

        let Some(auth) = candidates.iter().find_map(|c| self.config.auths.get(c)) else {
            return Ok(None);
        };

        if let (Some(username), Some(password)) = (&auth.username, &auth.password) {
            return Ok(Some(Credential {
                username: username.clone(),
                password: password.clone(),
            }));
        }

        let Some(encoded) = &auth.auth else {
            return Ok(None);
        };

        let invalid = || ActionError::Registry(format!("invalid auth entry for {}", host));
        let decoded = base64::engine::general_purpose::STANDARD
            .decode(encoded)
            .map_err(|_| invalid())?;
        let decoded = String::from_utf8(decoded).map_err(|_| invalid())?;
        let (username, password) = decoded.split_once(':').ok_or_else(invalid)?;

        Ok(Some(Credential {
            username: username.to_string(),
            password: password.to_string(),
        }))
    }
}
