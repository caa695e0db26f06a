use docsumo::upload::REQUEST_FAILED;
use docsumo::{Config, Docsumo, FailureReason};
use httpmock::prelude::*;
use serde_json::json;
use std::path::PathBuf;
use tempfile::TempDir;
use tracing_subscriber::EnvFilter;

const UPLOAD_PATH: &str = "/api/v1/eevee/apikey/upload/";

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn client_for(server: &MockServer) -> Docsumo {
    Docsumo::new(Config::new("test-key").with_base_url(server.base_url()))
        .expect("failed to build client")
}

/// Write small files into a temp directory, returning their paths
fn write_files(names: &[&str]) -> (TempDir, Vec<PathBuf>) {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let paths = names
        .iter()
        .map(|name| {
            let path = dir.path().join(name);
            std::fs::write(&path, format!("content of {}", name)).expect("failed to write file");
            path
        })
        .collect();
    (dir, paths)
}

#[test]
fn test_upload_files_partial_failure() {
    init_tracing();
    let server = MockServer::start();
    let (_dir, paths) = write_files(&["a.png", "b.png"]);

    let ok_mock = server.mock(|when, then| {
        when.method(POST)
            .path(UPLOAD_PATH)
            .header("apikey", "test-key")
            .body_contains("filename=\"a.png\"")
            .body_contains("id1")
            .body_contains("content of a.png");
        then.status(200).json_body(json!({
            "data": {"doc_id": "D1", "user_doc_id": "id1", "title": "a.png", "type": "invoice"},
            "status": "success",
            "status_code": 200
        }));
    });
    let bad_mock = server.mock(|when, then| {
        when.method(POST)
            .path(UPLOAD_PATH)
            .body_contains("filename=\"b.png\"");
        then.status(400)
            .json_body(json!({"error": "bad type", "message": "m", "status_code": 400}));
    });

    let client = client_for(&server);
    let result = client
        .upload_files_with_ids(&paths, "Invoice", &["id1".to_string(), "id2".to_string()])
        .expect("batch should not fail");

    ok_mock.assert();
    bad_mock.assert();

    assert_eq!(result.successes.len(), 1);
    assert_eq!(result.successes[0]["data"]["doc_id"], "D1");
    assert_eq!(
        serde_json::to_value(&result.failures).unwrap(),
        json!([{
            "metadata": {"user_doc_id": "id2", "title": "b.png"},
            "error": "bad type",
            "message": "m",
            "status_code": 400
        }])
    );
}

#[test]
fn test_upload_files_sends_form_fields() {
    init_tracing();
    let server = MockServer::start();
    let (_dir, paths) = write_files(&["scan.pdf"]);

    let mock = server.mock(|when, then| {
        when.method(POST)
            .path(UPLOAD_PATH)
            .body_contains("name=\"files\"")
            .body_contains("name=\"type\"")
            .body_contains("invoice")
            .body_contains("name=\"user_doc_id\"")
            .body_contains("name=\"uploaded_from\"");
        then.status(200).json_body(json!({"status": "success"}));
    });

    let client = client_for(&server);
    let result = client
        .upload_files(&paths, "INVOICE")
        .expect("batch should not fail");

    mock.assert();
    assert!(result.all_uploaded());
}

#[test]
fn test_undocumented_status_keeps_only_status_code() {
    init_tracing();
    let server = MockServer::start();
    let (_dir, paths) = write_files(&["a.png", "b.png"]);

    let mock = server.mock(|when, then| {
        when.method(POST).path(UPLOAD_PATH);
        then.status(502).body("<html>Bad Gateway</html>");
    });

    let client = client_for(&server);
    let result = client
        .upload_files(&paths, "invoice")
        .expect("batch should not fail");

    mock.assert_hits(2);
    assert!(result.successes.is_empty());
    assert_eq!(
        serde_json::to_value(&result.failures).unwrap(),
        json!([
            {"metadata": {"title": "a.png"}, "status_code": 502},
            {"metadata": {"title": "b.png"}, "status_code": 502}
        ])
    );
}

#[test]
fn test_length_mismatch_makes_no_request() {
    let server = MockServer::start();
    let (_dir, paths) = write_files(&["a.png", "b.png"]);

    let mock = server.mock(|when, then| {
        when.method(POST).path(UPLOAD_PATH);
        then.status(200).json_body(json!({}));
    });

    let client = client_for(&server);
    let err = client
        .upload_files_with_ids(&paths, "invoice", &["only-one".to_string()])
        .unwrap_err();

    assert!(err.is_configuration_error());
    mock.assert_hits(0);
}

#[test]
fn test_refresh_then_upload_file() {
    init_tracing();
    let server = MockServer::start();
    let (_dir, paths) = write_files(&["invoice.png"]);

    let limit_mock = server.mock(|when, then| {
        when.method(GET)
            .path("/api/v1/eevee/apikey/limit/")
            .header("apikey", "test-key");
        then.status(200).json_body(json!({
            "data": {
                "document_types": [{"title": "Invoice", "value": "invoice_v2"}],
                "monthly_doc_current": 1,
                "monthly_doc_limit": 100
            },
            "status": "success",
            "status_code": 200
        }));
    });
    let upload_mock = server.mock(|when, then| {
        when.method(POST)
            .path(UPLOAD_PATH)
            .body_contains("invoice_v2")
            .body_contains("11001");
        then.status(200).json_body(json!({
            "data": {"doc_id": "D9", "user_doc_id": "11001", "title": "invoice.png"},
            "status": "success"
        }));
    });

    let mut client = client_for(&server);
    client
        .refresh_document_types()
        .expect("failed to refresh document types");
    let body = client
        .upload_file(&paths[0], "Invoice", Some("11001"))
        .expect("failed to upload file");

    limit_mock.assert();
    upload_mock.assert();
    assert_eq!(body["data"]["doc_id"], "D9");
    assert_eq!(body["data"]["title"], "invoice.png");
}

#[test]
fn test_connection_failure_is_captured_per_file() {
    init_tracing();
    let (_dir, paths) = write_files(&["a.png", "b.png"]);

    // Nothing listens on port 1
    let client = Docsumo::new(Config::new("test-key").with_base_url("http://127.0.0.1:1"))
        .expect("failed to build client");
    let result = client
        .upload_files(&paths, "invoice")
        .expect("batch should not fail");

    assert!(result.successes.is_empty());
    assert_eq!(result.failures.len(), 2);
    for failure in &result.failures {
        assert!(matches!(
            &failure.reason,
            FailureReason::Local { error, .. } if error == REQUEST_FAILED
        ));
    }
}
