//! Configuration inspection commands.

use console::style;
use serde_json::{json, Value};

use nexo::config::{Config, Settings};

use crate::cli::icons::{dim_arrow, warn};

/// Print the effective settings with secrets replaced by their status.
pub fn cmd_config_show(settings: &Settings, config: &Config) -> anyhow::Result<()> {
    let value = redacted_settings(settings)?;
    println!("{}", serde_json::to_string_pretty(&value)?);

    match config.source_path {
        Some(ref path) => eprintln!("{} Loaded from {}", dim_arrow(), path.display()),
        None => eprintln!("{} No config file found, using defaults and environment", dim_arrow()),
    }
    Ok(())
}

pub fn cmd_config_path(config: &Config) -> anyhow::Result<()> {
    match config.source_path {
        Some(ref path) => println!("{}", path.display()),
        None => {
            eprintln!(
                "{} No config file found (looked for {} in the config directory and current directory)",
                warn(),
                style("nexo.{json,toml,yaml}").bold()
            );
        }
    }
    Ok(())
}

fn redacted_settings(settings: &Settings) -> anyhow::Result<Value> {
    let mut value = serde_json::to_value(settings)?;
    if let Value::Object(ref mut map) = value {
        map.insert("api_key".to_string(), secret_status(&settings.api_key));
        map.insert(
            "access_token".to_string(),
            secret_status(&settings.access_token),
        );
    }
    Ok(value)
}

fn secret_status(secret: &Option<String>) -> Value {
    match secret {
        Some(s) if !s.is_empty() => json!("<set>"),
        _ => Value::Null,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn secrets_never_printed() {
        let settings = Settings {
            api_key: Some("super-secret-anon-key".to_string()),
            ..Default::default()
        };
        let value = redacted_settings(&settings).unwrap();
        let text = value.to_string();
        assert!(!text.contains("super-secret-anon-key"));
        assert_eq!(value["api_key"], "<set>");
        assert!(value["access_token"].is_null());
        assert_eq!(value["item_delay_ms"], 500);
        assert_eq!(value["functions"]["storage"], "storage-archive");
    }
}
