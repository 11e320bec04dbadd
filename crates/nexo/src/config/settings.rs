//! Application settings.

use std::time::Duration;

use serde::Serialize;

use super::RpcFunctionsConfig;

/// Resolved remote procedure names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RpcFunctions {
    pub pending_invoices: String,
    pub pending_quotes: String,
    pub invoice: String,
    pub invoice_lines: String,
    pub quote: String,
    pub quote_lines: String,
    pub client: String,
    pub project: String,
    pub company_settings: String,
    pub company_preferences: String,
    pub storage: String,
}

impl Default for RpcFunctions {
    fn default() -> Self {
        Self {
            pending_invoices: "list_invoices_pending_archive".to_string(),
            pending_quotes: "list_quotes_pending_archive".to_string(),
            invoice: "finance_get_invoice".to_string(),
            invoice_lines: "finance_get_invoice_lines".to_string(),
            quote: "quotes_get_quote".to_string(),
            quote_lines: "quotes_get_quote_lines".to_string(),
            client: "crm_get_client".to_string(),
            project: "projects_get_project".to_string(),
            company_settings: "get_company_settings".to_string(),
            company_preferences: "get_company_preferences".to_string(),
            storage: "storage-archive".to_string(),
        }
    }
}

impl RpcFunctions {
    /// Overlay names set in the config file.
    pub fn apply(&mut self, overlay: &RpcFunctionsConfig) {
        let pairs: [(&mut String, &Option<String>); 11] = [
            (&mut self.pending_invoices, &overlay.pending_invoices),
            (&mut self.pending_quotes, &overlay.pending_quotes),
            (&mut self.invoice, &overlay.invoice),
            (&mut self.invoice_lines, &overlay.invoice_lines),
            (&mut self.quote, &overlay.quote),
            (&mut self.quote_lines, &overlay.quote_lines),
            (&mut self.client, &overlay.client),
            (&mut self.project, &overlay.project),
            (&mut self.company_settings, &overlay.company_settings),
            (&mut self.company_preferences, &overlay.company_preferences),
            (&mut self.storage, &overlay.storage),
        ];
        for (target, value) in pairs {
            if let Some(name) = value.as_ref().filter(|n| !n.trim().is_empty()) {
                *target = name.clone();
            }
        }
    }
}

/// Application settings.
#[derive(Debug, Clone, Serialize)]
pub struct Settings {
    /// Backend base URL, without trailing slash.
    pub api_url: String,
    /// Public API key.
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    /// User access token.
    #[serde(skip_serializing)]
    pub access_token: Option<String>,
    /// Request timeout in seconds.
    pub request_timeout: u64,
    /// Delay between documents in milliseconds (0 disables throttling).
    pub item_delay_ms: u64,
    /// Rendered PDFs below this size get a warning.
    pub min_pdf_bytes: u64,
    pub functions: RpcFunctions,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:54321".to_string(),
            api_key: None,
            access_token: None,
            request_timeout: 30,
            item_delay_ms: 500,
            min_pdf_bytes: 1000,
            functions: RpcFunctions::default(),
        }
    }
}

impl Settings {
    /// Apply `NEXO_*` environment overrides.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary variable lookup.
    pub fn with_overrides_from<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(url) = var("NEXO_API_URL") {
            self.api_url = url.trim_end_matches('/').to_string();
        }
        if let Some(key) = var("NEXO_API_KEY") {
            self.api_key = Some(key);
        }
        if let Some(token) = var("NEXO_ACCESS_TOKEN") {
            self.access_token = Some(token);
        }
        if let Some(delay) = var("NEXO_ITEM_DELAY_MS") {
            match delay.parse::<u64>() {
                Ok(ms) => self.item_delay_ms = ms,
                Err(_) => tracing::warn!("Ignoring invalid NEXO_ITEM_DELAY_MS: {}", delay),
            }
        }
        self
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }

    pub fn item_delay(&self) -> Duration {
        Duration::from_millis(self.item_delay_ms)
    }

    /// Whether credentials for the backend are configured.
    pub fn has_credentials(&self) -> bool {
        self.api_key.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn env_overrides_apply() {
        let vars: HashMap<&str, &str> = [
            ("NEXO_API_URL", "https://api.nexoav.test/"),
            ("NEXO_API_KEY", "anon"),
            ("NEXO_ITEM_DELAY_MS", "0"),
        ]
        .into_iter()
        .collect();

        let settings =
            Settings::default().with_overrides_from(|k| vars.get(k).map(|v| v.to_string()));
        assert_eq!(settings.api_url, "https://api.nexoav.test");
        assert_eq!(settings.api_key.as_deref(), Some("anon"));
        assert_eq!(settings.item_delay(), Duration::ZERO);
        assert!(settings.access_token.is_none());
    }

    #[test]
    fn invalid_delay_keeps_default() {
        let settings = Settings::default().with_overrides_from(|k| {
            (k == "NEXO_ITEM_DELAY_MS").then(|| "soon".to_string())
        });
        assert_eq!(settings.item_delay_ms, 500);
    }

    #[test]
    fn secrets_not_serialized() {
        let settings = Settings {
            api_key: Some("secret-key".into()),
            access_token: Some("secret-token".into()),
            ..Default::default()
        };
        let json = serde_json::to_string(&settings).unwrap();
        assert!(!json.contains("secret"));
        assert!(json.contains("item_delay_ms"));
    }
}
