//! Per-document data assembly.

use crate::models::{sort_lines, ArchivableDocument, DocumentRenderModel};
use crate::rpc::DocumentSource;

use super::ItemFailure;

/// Fetch everything needed to render `doc`.
///
/// A missing header is a failure. Missing client, project or company rows are
/// tolerated and render as empty blocks; transport errors on any call fail the item.
pub async fn assemble_render_model(
    source: &dyn DocumentSource,
    doc: &ArchivableDocument,
) -> Result<DocumentRenderModel, ItemFailure> {
    let header = source
        .get_header(doc.kind, &doc.id)
        .await
        .map_err(ItemFailure::fetch("header"))?
        .ok_or(ItemFailure::NotFound)?;

    let mut lines = source
        .get_lines(doc.kind, &doc.id)
        .await
        .map_err(ItemFailure::fetch("lines"))?;
    sort_lines(&mut lines);

    let client = match non_empty(header.client_id.as_deref()) {
        Some(client_id) => source
            .get_client(client_id)
            .await
            .map_err(ItemFailure::fetch("client"))?,
        None => None,
    };

    let project = match non_empty(header.project_id.as_deref()) {
        Some(project_id) => source
            .get_project(project_id)
            .await
            .map_err(ItemFailure::fetch("project"))?,
        None => None,
    };

    let company = source
        .get_company_settings()
        .await
        .map_err(ItemFailure::fetch("company settings"))?;
    let preferences = source
        .get_company_preferences()
        .await
        .map_err(ItemFailure::fetch("company preferences"))?;

    Ok(DocumentRenderModel {
        kind: doc.kind,
        header,
        lines,
        client,
        project,
        company,
        preferences,
    })
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
