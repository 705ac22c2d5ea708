use std::time::Duration;

use httpmock::prelude::*;
use serde_json::json;

use datacat_classifier::{CachedClassifier, HttpClassifier};
use datacat_engine::classify::{ClassificationRequest, Classifier, ClassifyError};

fn request() -> ClassificationRequest {
    ClassificationRequest {
        table_name: "ventas".into(),
        sample: json!({"codigo": ["A1", "A2"], "monto": [10.5, 20]}),
        context: Some("Ventas mensuales".into()),
    }
}

fn completion(content: &str) -> serde_json::Value {
    json!({
        "id": "chatcmpl-1",
        "choices": [{"index": 0, "message": {"role": "assistant", "content": content}}]
    })
}

fn client(server: &MockServer, key: Option<&str>) -> HttpClassifier {
    HttpClassifier::new(server.url("/v1"), "gpt-4o-mini", key.map(String::from), Duration::from_secs(5)).unwrap()
}

const ANSWER: &str = r#"{
    "table_description": "Registro de ventas por producto",
    "columns": [
        {"name": "codigo", "description": "Código del producto", "type": "texto", "new_name": "codigo_producto", "reason": "Más descriptivo"},
        {"name": "monto", "description": "Monto vendido", "type": "numero", "new_name": null, "reason": null}
    ]
}"#;

#[test]
fn test_classify_success() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST)
            .path("/v1/chat/completions")
            .header("authorization", "Bearer sk-test")
            .body_includes("gpt-4o-mini")
            .body_includes("Ventas mensuales");
        then.status(200)
            .header("content-type", "application/json")
            .json_body(completion(ANSWER));
    });

    let metadata = client(&server, Some("sk-test")).classify(&request()).unwrap();

    mock.assert();
    assert_eq!(metadata.table_description, "Registro de ventas por producto");
    assert_eq!(metadata.columns.len(), 2);
    assert_eq!(metadata.columns[0].new_name.as_deref(), Some("codigo_producto"));
    assert_eq!(metadata.columns[1].kind.as_deref(), Some("numero"));
    assert_eq!(metadata.columns[1].reason, None);
}

#[test]
fn test_local_provider_sends_no_auth() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST).path("/v1/chat/completions").header_missing("authorization");
        then.status(200).json_body(completion(ANSWER));
    });

    client(&server, None).classify(&request()).unwrap();
    mock.assert();
}

#[test]
fn test_auth_failure_is_http_error() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/v1/chat/completions");
        then.status(401).json_body(json!({"error": {"message": "Incorrect API key provided"}}));
    });

    let err = client(&server, Some("bad")).classify(&request()).unwrap_err();
    match err {
        ClassifyError::Http(code, body) => {
            assert_eq!(code, 401);
            assert!(body.contains("Incorrect API key"), "body: {}", body);
        }
        other => panic!("expected Http, got {:?}", other),
    }
}

#[test]
fn test_non_json_content_is_malformed() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/v1/chat/completions");
        then.status(200).json_body(completion("Lo siento, no puedo analizar esa tabla."));
    });

    let err = client(&server, Some("sk-test")).classify(&request()).unwrap_err();
    assert!(matches!(err, ClassifyError::Malformed(_)), "got {:?}", err);
}

#[test]
fn test_unreachable_endpoint_is_network_error() {
    let classifier =
        HttpClassifier::new("http://127.0.0.1:1/v1", "m", None, Duration::from_secs(2)).unwrap();
    let err = classifier.classify(&request()).unwrap_err();
    assert!(matches!(err, ClassifyError::Network(_)), "got {:?}", err);
}

#[test]
fn test_cached_classifier_hits_server_once() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST).path("/v1/chat/completions");
        then.status(200).json_body(completion(ANSWER));
    });
    let dir = tempfile::tempdir().unwrap();

    let cached = CachedClassifier::new(client(&server, Some("sk-test")), dir.path(), "gpt-4o-mini");
    let first = cached.classify(&request()).unwrap();
    let second = cached.classify(&request()).unwrap();

    mock.assert_calls(1);
    assert_eq!(first, second);
}
