//! HTTP client for the NEXO AV backend.
//!
//! Remote procedures are called as `POST {api_url}/rest/v1/rpc/{function}`
//! with named JSON parameters. Uploads go through the storage edge function at
//! `POST {api_url}/functions/v1/{storage}`.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;
use url::Url;

use super::{ArchiveStore, ArchivedObject, DocumentSource, RpcError};
use crate::config::{RpcFunctions, Settings};
use crate::models::{
    ArchivableDocument, ClientRecord, CompanyPreferences, CompanySettings, DocumentHeader,
    DocumentKind, LineItem, PendingInvoiceRow, PendingQuoteRow, ProjectRecord,
};

/// Longest error body kept in an `RpcError::Http`.
const MAX_ERROR_BODY_CHARS: usize = 500;

/// Client for the backend's RPC and storage endpoints.
#[derive(Clone)]
pub struct RpcClient {
    client: Client,
    base_url: Url,
    api_key: Option<String>,
    access_token: Option<String>,
    functions: RpcFunctions,
}

/// Response of the storage edge function.
#[derive(Debug, Deserialize)]
struct StorageResponse {
    #[serde(default)]
    ok: Option<bool>,
    #[serde(default)]
    key: Option<String>,
    #[serde(default)]
    size_bytes: Option<u64>,
    #[serde(default)]
    error: Option<String>,
}

impl RpcClient {
    /// Create a client from resolved settings.
    pub fn new(settings: &Settings) -> Result<Self, RpcError> {
        let base_url = Url::parse(&format!("{}/", settings.api_url.trim_end_matches('/')))
            .map_err(|e| RpcError::InvalidUrl(format!("{}: {}", settings.api_url, e)))?;

        let client = Client::builder()
            .timeout(settings.request_timeout())
            .user_agent(concat!("nexo/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| RpcError::Connection(e.to_string()))?;

        Ok(Self {
            client,
            base_url,
            api_key: settings.api_key.clone(),
            access_token: settings.access_token.clone(),
            functions: settings.functions.clone(),
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, RpcError> {
        self.base_url
            .join(path)
            .map_err(|e| RpcError::InvalidUrl(format!("{}: {}", path, e)))
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        let request = match self.api_key {
            Some(ref key) => request.header("apikey", key),
            None => request,
        };
        match self.access_token.as_ref().or(self.api_key.as_ref()) {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// POST JSON to an endpoint and return the decoded JSON body.
    async fn post_json(&self, label: &str, url: Url, body: &Value) -> Result<Value, RpcError> {
        debug!("POST {} ({})", url, label);
        let resp = self
            .authorize(self.client.post(url))
            .json(body)
            .send()
            .await
            .map_err(|e| RpcError::Connection(e.to_string()))?;

        let status = resp.status();
        let text = resp
            .text()
            .await
            .map_err(|e| RpcError::Connection(e.to_string()))?;

        if !status.is_success() {
            return Err(RpcError::Http {
                function: label.to_string(),
                status: status.as_u16(),
                body: truncate_chars(&text, MAX_ERROR_BODY_CHARS).to_string(),
            });
        }

        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text).map_err(|e| RpcError::decode(label, e))
    }

    /// Call a remote procedure.
    async fn rpc(&self, function: &str, params: Value) -> Result<Value, RpcError> {
        let url = self.endpoint(&format!("rest/v1/rpc/{}", function))?;
        self.post_json(function, url, &params).await
    }

    /// Call a set-returning procedure and decode every row.
    async fn rpc_rows<T: DeserializeOwned>(
        &self,
        function: &str,
        params: Value,
    ) -> Result<Vec<T>, RpcError> {
        let value = self.rpc(function, params).await?;
        decode_rows(function, value)
    }

    /// Call a procedure expected to return at most one row.
    async fn rpc_row<T: DeserializeOwned>(
        &self,
        function: &str,
        params: Value,
    ) -> Result<Option<T>, RpcError> {
        let value = self.rpc(function, params).await?;
        decode_optional_row(function, value)
    }
}

/// Decode a set-returning response. `null` is an empty set.
fn decode_rows<T: DeserializeOwned>(function: &str, value: Value) -> Result<Vec<T>, RpcError> {
    match value {
        Value::Null => Ok(Vec::new()),
        Value::Array(rows) => rows
            .into_iter()
            .map(|row| serde_json::from_value(row).map_err(|e| RpcError::decode(function, e)))
            .collect(),
        other => Err(RpcError::decode(
            function,
            format!("expected an array of rows, got {}", json_kind(&other)),
        )),
    }
}

/// Decode a single-row response. Accepts `null`, an object, or an array of
/// zero or one rows (set-returning functions wrap their row).
fn decode_optional_row<T: DeserializeOwned>(
    function: &str,
    value: Value,
) -> Result<Option<T>, RpcError> {
    let row = match value {
        Value::Null => return Ok(None),
        Value::Array(rows) => match rows.into_iter().next() {
            Some(Value::Null) | None => return Ok(None),
            Some(row) => row,
        },
        obj @ Value::Object(_) => obj,
        other => {
            return Err(RpcError::decode(
                function,
                format!("expected a row, got {}", json_kind(&other)),
            ))
        }
    };
    serde_json::from_value(row)
        .map(Some)
        .map_err(|e| RpcError::decode(function, e))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Truncate to at most `max` characters (UTF-8 safe).
fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[async_trait]
impl DocumentSource for RpcClient {
    async fn list_pending_invoices(&self) -> Result<Vec<ArchivableDocument>, RpcError> {
        let rows: Vec<PendingInvoiceRow> = self
            .rpc_rows(&self.functions.pending_invoices, json!({}))
            .await?;
        Ok(rows.into_iter().map(ArchivableDocument::from).collect())
    }

    async fn list_pending_quotes(&self) -> Result<Vec<ArchivableDocument>, RpcError> {
        let rows: Vec<PendingQuoteRow> = self
            .rpc_rows(&self.functions.pending_quotes, json!({}))
            .await?;
        Ok(rows.into_iter().map(ArchivableDocument::from).collect())
    }

    async fn get_header(
        &self,
        kind: DocumentKind,
        id: &str,
    ) -> Result<Option<DocumentHeader>, RpcError> {
        match kind {
            DocumentKind::Invoice => {
                self.rpc_row(&self.functions.invoice, json!({ "p_invoice_id": id }))
                    .await
            }
            DocumentKind::Quote => {
                self.rpc_row(&self.functions.quote, json!({ "p_quote_id": id }))
                    .await
            }
        }
    }

    async fn get_lines(&self, kind: DocumentKind, id: &str) -> Result<Vec<LineItem>, RpcError> {
        match kind {
            DocumentKind::Invoice => {
                self.rpc_rows(&self.functions.invoice_lines, json!({ "p_invoice_id": id }))
                    .await
            }
            DocumentKind::Quote => {
                self.rpc_rows(&self.functions.quote_lines, json!({ "p_quote_id": id }))
                    .await
            }
        }
    }

    async fn get_client(&self, client_id: &str) -> Result<Option<ClientRecord>, RpcError> {
        self.rpc_row(&self.functions.client, json!({ "p_client_id": client_id }))
            .await
    }

    async fn get_project(&self, project_id: &str) -> Result<Option<ProjectRecord>, RpcError> {
        self.rpc_row(&self.functions.project, json!({ "p_project_id": project_id }))
            .await
    }

    async fn get_company_settings(&self) -> Result<Option<CompanySettings>, RpcError> {
        self.rpc_row(&self.functions.company_settings, json!({}))
            .await
    }

    async fn get_company_preferences(&self) -> Result<CompanyPreferences, RpcError> {
        Ok(self
            .rpc_row(&self.functions.company_preferences, json!({}))
            .await?
            .unwrap_or_default())
    }
}

#[async_trait]
impl ArchiveStore for RpcClient {
    async fn archive_document(
        &self,
        kind: DocumentKind,
        source_id: &str,
        payload_base64: &str,
    ) -> Result<ArchivedObject, RpcError> {
        let function = &self.functions.storage;
        let url = self.endpoint(&format!("functions/v1/{}", function))?;
        let body = json!({
            "action": "archive_document",
            "source_type": kind.source_type(),
            "source_id": source_id,
            "pdf_base64": payload_base64,
        });

        let value = self.post_json(function, url, &body).await?;
        let resp: StorageResponse =
            serde_json::from_value(value).map_err(|e| RpcError::decode(function, e))?;

        if resp.ok == Some(false) {
            return Err(RpcError::Rejected(
                resp.error
                    .unwrap_or_else(|| "storage service reported failure".to_string()),
            ));
        }

        match resp.key {
            Some(key) if !key.is_empty() => Ok(ArchivedObject {
                key,
                size_bytes: resp.size_bytes.unwrap_or(0),
            }),
            _ => Err(RpcError::decode(function, "response has no storage key")),
        }
    }
}
