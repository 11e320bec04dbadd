//! Configuration management using the prefer crate.

mod loader;
mod settings;

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

pub use loader::{load_settings_with_options, LoadOptions};
pub use settings::{RpcFunctions, Settings};

/// Name used for config file discovery (`nexo.json`, `nexo.toml`, ...).
pub const CONFIG_NAME: &str = "nexo";

/// Remote procedure names, as they appear in the config file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, prefer::FromValue)]
pub struct RpcFunctionsConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pending_invoices: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pending_quotes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invoice: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invoice_lines: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quote: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quote_lines: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_settings: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_preferences: Option<String>,
    /// Edge function fronting the archive bucket.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage: Option<String>,
}

impl RpcFunctionsConfig {
    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }
}

/// Configuration file structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize, prefer::FromValue)]
pub struct Config {
    /// Base URL of the backend (REST and functions endpoints hang off it).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,
    /// Public API key sent as `apikey`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// User access token sent as bearer authorization.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    /// Request timeout in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_timeout: Option<u64>,
    /// Delay between archived documents in milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_delay_ms: Option<u64>,
    /// Rendered PDFs smaller than this are flagged with a warning.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_pdf_bytes: Option<u64>,
    /// Remote procedure names.
    #[serde(default, skip_serializing_if = "RpcFunctionsConfig::is_default")]
    #[prefer(default)]
    pub functions: RpcFunctionsConfig,
    /// Path to the config file this was loaded from (not serialized).
    #[serde(skip)]
    #[prefer(skip)]
    pub source_path: Option<PathBuf>,
}

impl Config {
    /// Load configuration using prefer for file discovery.
    pub async fn load() -> Self {
        match prefer::load(CONFIG_NAME).await {
            Ok(pref_config) => {
                if let Some(path) = pref_config.source_path() {
                    match Self::load_from_path(path).await {
                        Ok(config) => config,
                        Err(e) => {
                            tracing::warn!("Ignoring config file {}: {}", path.display(), e);
                            Self::default()
                        }
                    }
                } else {
                    Self::default()
                }
            }
            Err(_) => Self::default(),
        }
    }

    /// Load configuration from a specific file path.
    /// Supports JSON, TOML and YAML based on file extension.
    pub async fn load_from_path(path: &Path) -> Result<Self, String> {
        let contents = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| format!("Failed to read config file: {}", e))?;

        let mut config = Self::parse(&contents, path)?;
        config.source_path = Some(path.to_path_buf());
        Ok(config)
    }

    fn parse(contents: &str, path: &Path) -> Result<Self, String> {
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("json");
        match ext {
            "toml" => {
                toml::from_str(contents).map_err(|e| format!("Failed to parse TOML config: {}", e))
            }
            "yaml" | "yml" => serde_yaml::from_str(contents)
                .map_err(|e| format!("Failed to parse YAML config: {}", e)),
            _ => serde_json::from_str(contents)
                .map_err(|e| format!("Failed to parse JSON config: {}", e)),
        }
    }

    /// Apply configuration to settings. Unset values keep their defaults.
    pub fn apply_to_settings(&self, settings: &mut Settings) {
        if let Some(ref url) = self.api_url {
            settings.api_url = url.trim_end_matches('/').to_string();
        }
        if let Some(ref key) = self.api_key {
            settings.api_key = Some(expand_env(key));
        }
        if let Some(ref token) = self.access_token {
            settings.access_token = Some(expand_env(token));
        }
        if let Some(timeout) = self.request_timeout {
            settings.request_timeout = timeout;
        }
        if let Some(delay) = self.item_delay_ms {
            settings.item_delay_ms = delay;
        }
        if let Some(floor) = self.min_pdf_bytes {
            settings.min_pdf_bytes = floor;
        }
        settings.functions.apply(&self.functions);
    }
}

/// Expand `$VAR` references so secrets can stay out of the config file.
fn expand_env(value: &str) -> String {
    shellexpand::env(value)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn apply_overrides_only_set_values() {
        let config = Config {
            api_url: Some("https://erp.nexoav.test/".to_string()),
            item_delay_ms: Some(0),
            functions: RpcFunctionsConfig {
                quote: Some("quotes_get".to_string()),
                ..Default::default()
            },
            ..Config::default()
        };
        let mut settings = Settings::default();
        config.apply_to_settings(&mut settings);

        assert_eq!(settings.api_url, "https://erp.nexoav.test");
        assert_eq!(settings.item_delay_ms, 0);
        assert_eq!(settings.min_pdf_bytes, 1000);
        assert_eq!(settings.functions.quote, "quotes_get");
        assert_eq!(
            settings.functions.invoice,
            RpcFunctions::default().invoice
        );
    }

    #[test]
    fn parse_by_extension() {
        let toml = "api_url = \"https://a.test\"\nitem_delay_ms = 250\n[functions]\nstorage = \"archiver\"\n";
        let config = Config::parse(toml, Path::new("nexo.toml")).unwrap();
        assert_eq!(config.item_delay_ms, Some(250));
        assert_eq!(config.functions.storage.as_deref(), Some("archiver"));

        let yaml = "api_url: https://b.test\nmin_pdf_bytes: 2048\n";
        let config = Config::parse(yaml, Path::new("nexo.yml")).unwrap();
        assert_eq!(config.min_pdf_bytes, Some(2048));

        let json = r#"{"request_timeout": 5}"#;
        let config = Config::parse(json, Path::new("nexo.json")).unwrap();
        assert_eq!(config.request_timeout, Some(5));

        assert!(Config::parse("{", Path::new("nexo.json")).is_err());
    }

    #[tokio::test]
    async fn load_from_path_records_source() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nexo.json");
        std::fs::write(&path, r#"{"api_url": "https://c.test"}"#).unwrap();

        let config = Config::load_from_path(&path).await.unwrap();
        assert_eq!(config.api_url.as_deref(), Some("https://c.test"));
        assert_eq!(config.source_path.as_deref(), Some(path.as_path()));
    }
}
