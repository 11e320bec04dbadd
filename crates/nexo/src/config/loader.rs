//! Configuration loading and merging logic.

use std::path::{Path, PathBuf};

use super::{Config, Settings, CONFIG_NAME};

/// Options for loading settings.
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Explicit config file path (overrides auto-discovery).
    pub config_path: Option<PathBuf>,
}

/// Look for a config file in a directory.
/// Checks for nexo.{ext} and config.{ext} in the formats the loader parses.
fn find_config_in_dir(dir: &Path) -> Option<PathBuf> {
    let extensions = ["json", "toml", "yaml", "yml"];
    let basenames = [CONFIG_NAME, "config"];

    for basename in basenames {
        for ext in extensions {
            let path = dir.join(format!("{}.{}", basename, ext));
            if path.exists() {
                return Some(path);
            }
        }
    }
    None
}

/// Load config from file sources.
async fn load_file_config(options: &LoadOptions) -> Result<Config, String> {
    // Priority 1: explicit --config flag. A broken explicit file is an error.
    if let Some(ref config_path) = options.config_path {
        return Config::load_from_path(config_path).await;
    }

    // Priority 2: config in the user config directory
    if let Some(dir) = dirs::config_dir().map(|d| d.join(CONFIG_NAME)) {
        if let Some(config_path) = find_config_in_dir(&dir) {
            tracing::debug!("Found config in user config dir: {}", config_path.display());
            return Ok(Config::load_from_path(&config_path)
                .await
                .unwrap_or_default());
        }
    }

    // Priority 3: auto-discover via prefer
    Ok(Config::load().await)
}

/// Load settings with explicit options.
/// Returns (Settings, Config) tuple.
pub async fn load_settings_with_options(options: LoadOptions) -> Result<(Settings, Config), String> {
    let config = load_file_config(&options).await?;

    let mut settings = Settings::default();
    config.apply_to_settings(&mut settings);
    let settings = settings.with_env_overrides();

    if let Some(ref path) = config.source_path {
        tracing::debug!("Loaded config from {}", path.display());
    }

    Ok((settings, config))
}
