use crate::error::{CarbonImportError, Result};
use carbon_import_common::CategoryRegistry;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const TOKEN_ENV: &str = "CARBON_API_TOKEN";
const URL_ENV: &str = "CARBON_API_URL";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_base_url: String,
    pub api_token: Option<String>,
    pub timeout_seconds: u64,
    /// Rows submitted at once (1 = strictly sequential)
    pub concurrency: usize,
    /// Custom category registry JSON; built-in TGO table when unset
    pub registry_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:5000".into(),
            api_token: None,
            timeout_seconds: 30,
            concurrency: 1,
            registry_path: None,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Config = serde_json::from_str(&content)?;
            tracing::debug!(path = %path.display(), "loaded config");
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| CarbonImportError::Config("home directory not found".into()))?;
        Ok(home.join(".config").join("carbon-import").join("config.json"))
    }

    /// API base URL; the environment wins over the file
    pub fn api_base_url(&self) -> String {
        std::env::var(URL_ENV)
            .ok()
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| self.api_base_url.clone())
    }

    pub fn get_api_token(&self) -> Result<String> {
        if let Ok(token) = std::env::var(TOKEN_ENV) {
            if !token.trim().is_empty() {
                return Ok(token);
            }
        }

        self.api_token
            .clone()
            .filter(|t| !t.trim().is_empty())
            .ok_or(CarbonImportError::MissingApiToken)
    }

    pub fn set_api_token(&mut self, token: String) -> Result<()> {
        self.api_token = Some(token);
        self.save()
    }

    pub fn set_api_base_url(&mut self, url: String) -> Result<()> {
        let url = url.trim().trim_end_matches('/').to_string();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(CarbonImportError::Config(format!(
                "API URL must start with http:// or https://: {}",
                url
            )));
        }
        self.api_base_url = url;
        self.save()
    }

    /// Category registry to validate against
    pub fn load_registry(&self) -> Result<CategoryRegistry> {
        match &self.registry_path {
            Some(path) => {
                if !path.exists() {
                    return Err(CarbonImportError::FileNotFound(path.display().to_string()));
                }
                let registry = CategoryRegistry::from_file(path)?;
                tracing::info!(path = %path.display(), categories = registry.len(), "using custom registry");
                Ok(registry)
            }
            None => Ok(CategoryRegistry::tgo()),
        }
    }
}
