//! Configuration loading
//!
//! The configuration is a JSON file (`sitelang.json` by default):
//!
//! ```json
//! {
//!     "database": "sitelang.db",
//!     "sites": [
//!         { "id": 1, "handle": "default", "language": "en" },
//!         { "id": 2, "handle": "france", "language": "fr" }
//!     ],
//!     "primarySite": 1,
//!     "autotranslate": { "enabled": true, "apiKeyEnv": "GOOGLE_TRANSLATE_API_KEY" }
//! }
//! ```
//!
//! Secrets never live in the file; `autotranslate.apiKeyEnv` names the
//! environment variable holding the provider key.

use crate::error::{CatalogError, CatalogResult};
use crate::site::{Site, SiteId, StaticSiteDirectory};
use icu_locale::Locale;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Environment variable overriding the configuration path
pub const CONFIG_ENV: &str = "SITELANG_CONFIG";

pub const DEFAULT_CONFIG_FILE: &str = "sitelang.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogConfig {
    #[serde(default = "default_database")]
    pub database: PathBuf,
    pub sites: Vec<Site>,
    #[serde(default)]
    pub primary_site: Option<SiteId>,
    #[serde(default)]
    pub autotranslate: AutotranslateConfig,
    /// Entry fixture served to the autotranslate endpoint
    #[serde(default)]
    pub entries: Option<PathBuf>,
    #[serde(default = "default_listen")]
    pub listen: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutotranslateConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
}

impl Default for AutotranslateConfig {
    fn default() -> Self {
        AutotranslateConfig {
            enabled: default_enabled(),
            api_key_env: default_api_key_env(),
        }
    }
}

fn default_database() -> PathBuf {
    PathBuf::from("sitelang.db")
}

fn default_listen() -> String {
    "127.0.0.1:3000".to_string()
}

fn default_enabled() -> bool {
    true
}

fn default_api_key_env() -> String {
    "GOOGLE_TRANSLATE_API_KEY".to_string()
}

impl CatalogConfig {
    /// Read and validate a configuration file
    pub fn load(path: &Path) -> CatalogResult<Self> {
        tracing::debug!("Loading configuration from: {:?}", path);
        let content = std::fs::read_to_string(path).map_err(|e| {
            CatalogError::Config(format!("Failed to read '{}': {}", path.display(), e))
        })?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> CatalogResult<Self> {
        let config: CatalogConfig = serde_json::from_str(content)
            .map_err(|e| CatalogError::Config(format!("Invalid configuration: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Explicit path, then `SITELANG_CONFIG`, then `sitelang.json`
    pub fn resolve_path(explicit: Option<&Path>) -> PathBuf {
        explicit
            .map(Path::to_path_buf)
            .or_else(|| std::env::var_os(CONFIG_ENV).map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE))
    }

    pub fn validate(&self) -> CatalogResult<()> {
        if self.sites.is_empty() {
            return Err(CatalogError::Config(
                "At least one site must be configured".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for site in &self.sites {
            if !seen.insert(site.id) {
                return Err(CatalogError::Config(format!(
                    "Duplicate site id {}",
                    site.id
                )));
            }
            if site.handle.trim().is_empty() {
                return Err(CatalogError::Config(format!(
                    "Site {} has an empty handle",
                    site.id
                )));
            }
            if site.language.parse::<Locale>().is_err() {
                return Err(CatalogError::Config(format!(
                    "Site {} has an invalid language code '{}'",
                    site.id, site.language
                )));
            }
        }

        if let Some(primary) = self.primary_site {
            if !seen.contains(&primary) {
                return Err(CatalogError::Config(format!(
                    "Primary site {} is not among the configured sites",
                    primary
                )));
            }
        }

        Ok(())
    }

    pub fn site_directory(&self) -> CatalogResult<StaticSiteDirectory> {
        let directory = match self.primary_site {
            Some(primary) => StaticSiteDirectory::with_primary(self.sites.clone(), primary),
            None => StaticSiteDirectory::new(self.sites.clone()),
        };
        directory.ok_or_else(|| CatalogError::Config("Invalid site configuration".to_string()))
    }
}
