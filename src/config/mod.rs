use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::input;

/// Default CRXcavator API base URI, used until the user overrides it.
pub const DEFAULT_API_URI: &str = "https://api.crxcavator.io/v1";

/// Default Chrome extension install root relative to the home directory.
const DEFAULT_EXTENSION_PATH: &str =
    "Library/Application Support/Google/Chrome/Default/Extensions";

/// Persisted application settings, stored as a flat key/value TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_api_uri")]
    pub crxcavator_api_uri: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crxcavator_api_key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub virustotal_api_key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extension_path: Option<String>,
}

fn default_api_uri() -> String {
    DEFAULT_API_URI.to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            crxcavator_api_uri: default_api_uri(),
            crxcavator_api_key: None,
            virustotal_api_key: None,
            extension_path: None,
        }
    }
}

impl Settings {
    /// Load settings from `path`. A missing file yields the defaults; a file
    /// that exists but does not parse is a fatal configuration error.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Cannot read configuration at {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Configuration at {} is corrupted", path.display()))
    }

    /// Persist settings to `path`, creating parent directories as needed.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Cannot create {}", parent.display()))?;
        }

        let content = toml::to_string_pretty(self).context("Cannot serialize configuration")?;
        std::fs::write(path, content)
            .with_context(|| format!("Cannot write configuration to {}", path.display()))
    }

    /// Set the CRXcavator API key after validating its format.
    pub fn set_crxcavator_key(&mut self, key: &str) -> Result<()> {
        if !input::is_crxcavator_key(key) {
            anyhow::bail!("The provided API key, {}, is incorrectly formatted", key);
        }
        self.crxcavator_api_key = Some(key.to_string());
        Ok(())
    }

    /// Set the VirusTotal API key after validating its format.
    pub fn set_virustotal_key(&mut self, key: &str) -> Result<()> {
        if !input::is_virustotal_key(key) {
            anyhow::bail!("The provided API key, {}, is incorrectly formatted", key);
        }
        self.virustotal_api_key = Some(key.to_string());
        Ok(())
    }

    /// Set the CRXcavator API base URI after validating it parses as an
    /// http(s) URL with a host.
    pub fn set_crxcavator_uri(&mut self, uri: &str) -> Result<()> {
        let parsed = url::Url::parse(uri)
            .ok()
            .filter(|u| matches!(u.scheme(), "http" | "https") && u.host_str().is_some());
        if parsed.is_none() {
            anyhow::bail!("The provided API URI, {}, is incorrectly formatted", uri);
        }
        self.crxcavator_api_uri = uri.trim_end_matches('/').to_string();
        Ok(())
    }

    /// Set the local extension install root.
    pub fn set_extension_path(&mut self, path: &str) -> Result<()> {
        if path.trim().is_empty() {
            anyhow::bail!("The provided extension path is empty");
        }
        self.extension_path = Some(path.to_string());
        Ok(())
    }

    /// The CRXcavator API key, or a configuration error if none is set.
    pub fn require_crxcavator_key(&self) -> Result<&str> {
        self.crxcavator_api_key
            .as_deref()
            .context("No CRXcavator API key has been set yet")
    }

    /// The VirusTotal API key, or a configuration error if none is set.
    pub fn require_virustotal_key(&self) -> Result<&str> {
        self.virustotal_api_key
            .as_deref()
            .context("No VirusTotal API key has been set yet")
    }

    /// The extension install root: the configured override, or the default
    /// Chrome profile location under the home directory.
    pub fn extension_root(&self) -> PathBuf {
        match &self.extension_path {
            Some(path) => PathBuf::from(path),
            None => dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(DEFAULT_EXTENSION_PATH),
        }
    }
}

/// Default configuration file location.
pub fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("crxscan")
        .join("config.toml")
}
