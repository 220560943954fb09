//! Structured-intent path end to end against a mock classification endpoint.
//!
//! Run with: `cargo test -p mesa_core --test intent_flow`

use std::sync::Arc;
use std::time::Duration;

use mesa_core::templates::{IntentTemplate, MenuItemTemplate, ORDER_CALL_TO_ACTION};
use mesa_core::{BackendMode, ChatConfig, ChatError, ChatSession, IntentBridge};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ANALYZE_PATH: &str = "/language/:analyze-conversations";

fn test_config(server: &MockServer, max_retries: u32) -> ChatConfig {
    ChatConfig {
        endpoint: server.uri(),
        api_key: "test-key".to_string(),
        deployment_name: "restaurante".to_string(),
        mode: BackendMode::StructuredIntent,
        max_retries,
        retry_backoff_ms: 1,
        ..ChatConfig::default()
    }
}

fn prediction(top_intent: &str, entities: serde_json::Value) -> serde_json::Value {
    json!({
        "kind": "ConversationResult",
        "result": {
            "query": "ignored",
            "prediction": {
                "topIntent": top_intent,
                "projectKind": "Conversation",
                "entities": entities
            }
        }
    })
}

#[tokio::test]
async fn order_with_pizza_returns_fragment_and_call_to_action() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(ANALYZE_PATH))
        .and(query_param("api-version", "2022-10-01-preview"))
        .and(header("Ocp-Apim-Subscription-Key", "test-key"))
        .and(body_partial_json(json!({
            "kind": "Conversation",
            "analysisInput": {"conversationItem": {"id": "1", "participantId": "user", "text": "quiero pizza"}},
            "parameters": {"projectName": "restaurante", "deploymentName": "production", "stringIndexType": "TextElement_V8"}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(prediction(
            "RealizarPedido",
            json!([{"category": "Plato", "text": "pizza", "offset": 7, "length": 5, "confidenceScore": 1.0}]),
        )))
        .expect(1)
        .mount(&server)
        .await;

    let bridge = IntentBridge::new(&test_config(&server, 0)).unwrap();
    let reply = bridge.resolve("quiero pizza").await.unwrap();

    assert_eq!(
        reply,
        format!("{}{}", MenuItemTemplate::Pizza.fragment(), ORDER_CALL_TO_ACTION)
    );
}

#[tokio::test]
async fn intent_without_entities_field_uses_intent_template() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(ANALYZE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "result": {"prediction": {"topIntent": "Horarios"}}
        })))
        .mount(&server)
        .await;

    let bridge = IntentBridge::new(&test_config(&server, 0)).unwrap();
    assert_eq!(
        bridge.resolve("¿a qué hora abren?").await.unwrap(),
        IntentTemplate::Horarios.text()
    );
}

#[tokio::test]
async fn unmapped_intent_falls_back_to_default() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(ANALYZE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(prediction("Despedida", json!([]))))
        .mount(&server)
        .await;

    let bridge = IntentBridge::new(&test_config(&server, 0)).unwrap();
    assert_eq!(bridge.resolve("adiós").await.unwrap(), IntentTemplate::None.text());
}

#[tokio::test]
async fn server_error_raises_classification_error_and_appends_no_turn() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(ANALYZE_PATH))
        .respond_with(ResponseTemplate::new(500).set_body_string("internal failure"))
        .expect(1)
        .mount(&server)
        .await;

    let config = test_config(&server, 0);
    let mut session = ChatSession::new(mesa_core::select_responder(&config).unwrap());
    let err = session.respond("hola").await.unwrap_err();

    match err {
        ChatError::Classification { status, body } => {
            assert_eq!(status, Some(500));
            assert_eq!(body, "internal failure");
        }
        other => panic!("expected classification error, got {other:?}"),
    }
    assert!(session.conversation().is_empty());
}

#[tokio::test]
async fn malformed_body_is_classification_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(ANALYZE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    // A decode failure on a 200 is deterministic: reported with its status, never retried.
    let bridge = IntentBridge::new(&test_config(&server, 1)).unwrap();
    assert!(matches!(
        bridge.resolve("hola").await,
        Err(ChatError::Classification { status: Some(200), .. })
    ));
    assert_eq!(server.received_requests().await.unwrap().len(), 1);
}

#[tokio::test]
async fn wrong_shape_payload_falls_back_to_default_template() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(ANALYZE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "result": {"prediction": {"topIntent": 42, "entities": [{"category": "Plato"}]}}
        })))
        .mount(&server)
        .await;

    let bridge = IntentBridge::new(&test_config(&server, 0)).unwrap();
    let mut session = ChatSession::new(Arc::new(bridge));
    let reply = session.respond("???").await.unwrap();
    assert_eq!(reply, IntentTemplate::None.text());
    assert_eq!(session.conversation().len(), 2);
}

#[tokio::test]
async fn timeout_raises_classification_error_and_appends_no_turn() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(ANALYZE_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(prediction("Horarios", json!([])))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let config = ChatConfig {
        request_timeout_secs: 1,
        ..test_config(&server, 0)
    };
    let mut session = ChatSession::new(Arc::new(IntentBridge::new(&config).unwrap()));
    match session.respond("¿a qué hora abren?").await {
        Err(ChatError::Classification { status: None, .. }) => {}
        other => panic!("expected classification timeout, got {other:?}"),
    }
    assert!(session.conversation().is_empty());
}

#[tokio::test]
async fn transient_failure_is_retried() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(ANALYZE_PATH))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(ANALYZE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(prediction("Ubicacion", json!([]))))
        .mount(&server)
        .await;

    let bridge = IntentBridge::new(&test_config(&server, 1)).unwrap();
    assert_eq!(bridge.resolve("¿dónde están?").await.unwrap(), IntentTemplate::Ubicacion.text());
    assert_eq!(server.received_requests().await.unwrap().len(), 2);
}

#[tokio::test]
async fn client_error_is_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(ANALYZE_PATH))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid subscription key"))
        .mount(&server)
        .await;

    let bridge = IntentBridge::new(&test_config(&server, 3)).unwrap();
    let err = bridge.resolve("hola").await.unwrap_err();
    assert_eq!(err.status(), Some(401));
    assert_eq!(server.received_requests().await.unwrap().len(), 1);
}

#[tokio::test]
async fn session_records_successful_exchanges() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(ANALYZE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(prediction(
            "MenuInfo",
            json!([{"category": "Plato", "text": "Pasta"}]),
        )))
        .mount(&server)
        .await;

    let responder = Arc::new(IntentBridge::new(&test_config(&server, 0)).unwrap());
    let mut session = ChatSession::new(responder);
    let reply = session.respond("¿qué pastas tienen?").await.unwrap();
    assert_eq!(reply, MenuItemTemplate::Pasta.fragment());
    assert_eq!(session.conversation().len(), 2);
    assert_eq!(session.conversation().snapshot()[1].text(), reply);
}
