//! RpcClient against a mock backend.

use serde_json::json;
use wiremock::matchers::{bearer_token, body_json, body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use nexo::config::Settings;
use nexo::models::DocumentKind;
use nexo::rpc::{ArchiveStore, DocumentSource, RpcClient, RpcError};

fn client_for(server: &MockServer) -> RpcClient {
    let settings = Settings {
        api_url: format!("{}/", server.uri()),
        api_key: Some("anon-key".to_string()),
        access_token: Some("user-jwt".to_string()),
        ..Default::default()
    };
    RpcClient::new(&settings).unwrap()
}

#[tokio::test]
async fn lists_pending_documents_with_auth_headers() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/rest/v1/rpc/list_invoices_pending_archive"))
        .and(header("apikey", "anon-key"))
        .and(bearer_token("user-jwt"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": "i1", "invoice_number": "F-25-001" },
            { "id": "i2", "invoice_number": null, "preliminary_number": "BORR-7" },
            { "id": "i3" }
        ])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/rest/v1/rpc/list_quotes_pending_archive"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": "q1", "quote_number": "P-25-004" }
        ])))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let invoices = client.list_pending_invoices().await.unwrap();
    let numbers: Vec<&str> = invoices.iter().map(|d| d.display_number.as_str()).collect();
    assert_eq!(numbers, vec!["F-25-001", "BORR-7", "i3"]);
    assert!(invoices.iter().all(|d| d.kind == DocumentKind::Invoice));

    let quotes = client.list_pending_quotes().await.unwrap();
    assert_eq!(quotes.len(), 1);
    assert_eq!(quotes[0].kind, DocumentKind::Quote);
    assert_eq!(quotes[0].display_number, "P-25-004");
}

#[tokio::test]
async fn fetches_header_and_lines_with_named_params() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/rest/v1/rpc/quotes_get_quote"))
        .and(body_json(json!({ "p_quote_id": "q1" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "id": "q1",
            "quote_number": "P-25-004",
            "client_id": "c1",
            "subtotal": "1500.00",
            "tax_amount": 315,
            "total": 1815.0
        }])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/rest/v1/rpc/quotes_get_quote_lines"))
        .and(body_json(json!({ "p_quote_id": "q1" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "name": "Pantalla LED", "quantity": 1, "unit_price": 1500, "line_order": 0 }
        ])))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let header = client
        .get_header(DocumentKind::Quote, "q1")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(header.number.as_deref(), Some("P-25-004"));
    assert_eq!(header.subtotal, 1500.0);
    assert_eq!(header.tax_amount, 315.0);
    assert_eq!(header.client_id.as_deref(), Some("c1"));

    let lines = client.get_lines(DocumentKind::Quote, "q1").await.unwrap();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].concept, "Pantalla LED");
    assert_eq!(lines[0].line_order, Some(0));
}

#[tokio::test]
async fn empty_result_means_no_row() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/rest/v1/rpc/finance_get_invoice"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/rest/v1/rpc/crm_get_client"))
        .respond_with(ResponseTemplate::new(200).set_body_string("null"))
        .mount(&server)
        .await;

    let client = client_for(&server);
    assert!(client
        .get_header(DocumentKind::Invoice, "gone")
        .await
        .unwrap()
        .is_none());
    assert!(client.get_client("c-missing").await.unwrap().is_none());
}

#[tokio::test]
async fn http_errors_carry_function_and_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/rest/v1/rpc/finance_get_invoice_lines"))
        .respond_with(
            ResponseTemplate::new(500).set_body_string("{\"message\":\"relation does not exist\"}"),
        )
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client
        .get_lines(DocumentKind::Invoice, "i1")
        .await
        .unwrap_err();
    match err {
        RpcError::Http {
            function,
            status,
            body,
        } => {
            assert_eq!(function, "finance_get_invoice_lines");
            assert_eq!(status, 500);
            assert!(body.contains("relation does not exist"));
        }
        other => panic!("unexpected error: {}", other),
    }
}

#[tokio::test]
async fn company_preferences_default_when_absent() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/rest/v1/rpc/get_company_preferences"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let prefs = client_for(&server).get_company_preferences().await.unwrap();
    assert!(prefs.bank_accounts.is_empty());
}

#[tokio::test]
async fn archive_upload_posts_base64_payload() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/functions/v1/storage-archive"))
        .and(body_partial_json(json!({
            "action": "archive_document",
            "source_type": "ventas",
            "source_id": "i1",
            "pdf_base64": "JVBERi0xLjU="
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ok": true,
            "key": "archive/ventas/i1.pdf",
            "size_bytes": 8
        })))
        .expect(1)
        .mount(&server)
        .await;

    let archived = client_for(&server)
        .archive_document(DocumentKind::Invoice, "i1", "JVBERi0xLjU=")
        .await
        .unwrap();
    assert_eq!(archived.key, "archive/ventas/i1.pdf");
    assert_eq!(archived.size_bytes, 8);
}

#[tokio::test]
async fn archive_upload_reports_rejection() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/functions/v1/storage-archive"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ok": false,
            "error": "source already archived"
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/functions/v1/other-storage"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client
        .archive_document(DocumentKind::Quote, "q1", "AAAA")
        .await
        .unwrap_err();
    assert!(matches!(err, RpcError::Rejected(ref msg) if msg == "source already archived"));

    let mut settings = Settings {
        api_url: server.uri(),
        ..Default::default()
    };
    settings.functions.storage = "other-storage".to_string();
    let err = RpcClient::new(&settings)
        .unwrap()
        .archive_document(DocumentKind::Quote, "q1", "AAAA")
        .await
        .unwrap_err();
    assert!(matches!(err, RpcError::Decode { .. }));
}
