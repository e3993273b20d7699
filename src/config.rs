//! Configuration Management
//!
//! Handles persistent configuration storage for oktactl. The API token is
//! never written here; it comes from `--api-key` or `OKTA_API_KEY`.

use crate::okta::client::DEFAULT_PROVIDER_DOMAIN;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Environment variable naming the organization
pub const ORGANIZATION_ENV: &str = "OKTA_ORG";

/// User configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    /// Okta subdomain, e.g. `acme` for acme.okta.com
    #[serde(default)]
    pub organization: Option<String>,
    /// Provider domain, `okta.com` unless using a preview org
    #[serde(default)]
    pub provider_domain: Option<String>,
    /// Full API root overriding organization + domain
    #[serde(default)]
    pub base_url: Option<String>,
    /// Request deadline in seconds
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl Config {
    /// Directory holding config and logs
    pub fn config_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("oktactl"))
    }

    /// Get the config file path
    fn config_path() -> Option<PathBuf> {
        Self::config_dir().map(|p| p.join("config.json"))
    }

    /// Load configuration from disk
    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            return Self::default();
        };

        if !path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(&path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                tracing::warn!("Ignoring unreadable config {:?}: {}", path, e);
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    /// Save configuration to disk
    pub fn save(&self) -> Result<()> {
        let Some(path) = Self::config_path() else {
            return Ok(());
        };

        // Create parent directory
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {:?}", parent))?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&path, content).with_context(|| format!("Failed to write {:?}", path))?;

        Ok(())
    }

    /// Get effective organization (CLI/env > config)
    pub fn effective_organization(&self, cli: Option<&str>) -> Option<String> {
        cli.map(str::to_string)
            .or_else(|| self.organization.clone())
            .filter(|org| !org.trim().is_empty())
    }

    /// Get effective provider domain (config > okta.com)
    pub fn effective_provider_domain(&self) -> String {
        self.provider_domain
            .clone()
            .unwrap_or_else(|| DEFAULT_PROVIDER_DOMAIN.to_string())
    }

    /// Get effective base URL override (CLI > config)
    pub fn effective_base_url(&self, cli: Option<&str>) -> Option<String> {
        cli.map(str::to_string).or_else(|| self.base_url.clone())
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    /// Set organization and save
    pub fn set_organization(&mut self, organization: &str) -> Result<()> {
        self.organization = Some(organization.trim().to_string());
        self.save()
    }
}
