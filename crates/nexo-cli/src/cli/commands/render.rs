//! Render one document locally.

use std::path::PathBuf;

use nexo::archive::assemble_render_model;
use nexo::config::Settings;
use nexo::models::{ArchivableDocument, DocumentKind};
use nexo::render::LopdfRenderer;
use nexo::rpc::RpcClient;
use nexo::utils::format_size;

use super::helpers::{file_stem, warn_if_no_credentials};
use crate::cli::icons::{dim_arrow, success};

pub async fn cmd_render(
    settings: &Settings,
    kind: DocumentKind,
    id: &str,
    output: Option<PathBuf>,
) -> anyhow::Result<()> {
    warn_if_no_credentials(settings);
    let client = RpcClient::new(settings)?;

    let doc = ArchivableDocument::new(id, kind, id);
    let model = assemble_render_model(&client, &doc)
        .await
        .map_err(|e| anyhow::anyhow!("{} {}: {}", kind, id, e))?;
    let number = model
        .header
        .display_number()
        .unwrap_or(id)
        .to_string();
    let line_total = model.lines.len();

    let (bytes, pages) =
        tokio::task::spawn_blocking(move || LopdfRenderer::new().render_counting_pages(&model))
            .await??;

    let output =
        output.unwrap_or_else(|| PathBuf::from(format!("{}-{}.pdf", kind, file_stem(&number))));
    tokio::fs::write(&output, &bytes).await?;

    println!(
        "{} Rendered {} {} to {}",
        success(),
        kind,
        number,
        output.display()
    );
    println!(
        "  {} {} page(s), {} lines, {}",
        dim_arrow(),
        pages,
        line_total,
        format_size(bytes.len() as u64)
    );
    Ok(())
}
