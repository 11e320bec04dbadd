//! Shared helpers for CLI commands.

use std::sync::Arc;

use nexo::archive::{ArchiverOptions, BatchArchiver};
use nexo::config::Settings;
use nexo::render::LopdfRenderer;
use nexo::rpc::RpcClient;

use crate::cli::icons;

/// Build an archiver wired to the configured backend.
pub fn build_archiver(settings: &Settings) -> anyhow::Result<BatchArchiver> {
    warn_if_no_credentials(settings);
    let client = Arc::new(RpcClient::new(settings)?);
    Ok(BatchArchiver::new(
        client.clone(),
        client,
        Arc::new(LopdfRenderer::new()),
        ArchiverOptions::from_settings(settings),
    ))
}

pub fn warn_if_no_credentials(settings: &Settings) {
    if !settings.has_credentials() {
        eprintln!(
            "{} No API key configured (set NEXO_API_KEY or api_key in the config file)",
            icons::warn()
        );
    }
}

/// Make a document number safe to use in a file name.
pub fn file_stem(number: &str) -> String {
    let stem: String = number
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if stem.is_empty() {
        "document".to_string()
    } else {
        stem
    }
}
