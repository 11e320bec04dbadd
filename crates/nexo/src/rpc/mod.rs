//! Call surface of the external collaborators.
//!
//! The archiver only sees these traits. `RpcClient` implements both against a
//! PostgREST-style backend; tests substitute in-memory fakes.

mod client;
mod error;

pub use client::RpcClient;
pub use error::RpcError;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::models::{
    ArchivableDocument, ClientRecord, CompanyPreferences, CompanySettings, DocumentHeader,
    DocumentKind, LineItem, ProjectRecord,
};

/// Read-only data-fetch service.
#[async_trait]
pub trait DocumentSource: Send + Sync {
    /// Invoices still missing an archived PDF, in backend order.
    async fn list_pending_invoices(&self) -> Result<Vec<ArchivableDocument>, RpcError>;

    /// Quotes still missing an archived PDF, in backend order.
    async fn list_pending_quotes(&self) -> Result<Vec<ArchivableDocument>, RpcError>;

    /// Header of an invoice or quote. `None` when the backend has no row.
    async fn get_header(
        &self,
        kind: DocumentKind,
        id: &str,
    ) -> Result<Option<DocumentHeader>, RpcError>;

    /// Lines of an invoice or quote, in whatever order the backend returns them.
    async fn get_lines(&self, kind: DocumentKind, id: &str) -> Result<Vec<LineItem>, RpcError>;

    async fn get_client(&self, client_id: &str) -> Result<Option<ClientRecord>, RpcError>;

    async fn get_project(&self, project_id: &str) -> Result<Option<ProjectRecord>, RpcError>;

    async fn get_company_settings(&self) -> Result<Option<CompanySettings>, RpcError>;

    async fn get_company_preferences(&self) -> Result<CompanyPreferences, RpcError>;
}

/// Location of an archived payload in durable storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchivedObject {
    pub key: String,
    pub size_bytes: u64,
}

/// Upload service fronting the archive bucket.
#[async_trait]
pub trait ArchiveStore: Send + Sync {
    /// Store a base64-encoded PDF for `source_id` under the kind's `source_type`.
    async fn archive_document(
        &self,
        kind: DocumentKind,
        source_id: &str,
        payload_base64: &str,
    ) -> Result<ArchivedObject, RpcError>;
}
