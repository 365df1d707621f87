//! End-to-end flows through the HTTP router over a real SQLite database.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use futures::future::join_all;
use serde_json::json;
use wadesk_core::config::{Config, DuplicatePolicy};
use wadesk_core::{ContactFilter, Direction};
use wadesk_integration_tests::{status_update, text_message, TestApp, VERIFY_TOKEN};
use wadesk_store::Store;
use wiremock::{matchers, Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_handshake_echoes_challenge() {
    let app = TestApp::new(Config::default(), None).await;

    let uri = format!(
        "/api/webhook?hub.mode=subscribe&hub.verify_token={}&hub.challenge=challenge-abc",
        VERIFY_TOKEN
    );
    let (status, body) = app.get(&uri).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "challenge-abc");

    let (status, _) = app
        .get("/api/webhook?hub.mode=subscribe&hub.verify_token=wrong&hub.challenge=x")
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_inbound_message_creates_contact_and_conversation() {
    let app = TestApp::new(Config::default(), None).await;

    let (status, body) = app
        .post("/api/webhook", text_message("5215512345678", "wamid.IN1", "Hola"))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "EVENT_RECEIVED");

    app.post("/api/webhook", text_message("5215512345678", "wamid.IN2", "Sigo aqui"))
        .await;

    let contacts = app.store.list_contacts(&ContactFilter::default()).await.unwrap();
    assert_eq!(contacts.len(), 1);
    assert_eq!(contacts[0].phone_normalized, "5215512345678");
    assert_eq!(contacts[0].name, "Usuario 5215512345678");

    let conversation = app
        .store
        .list_messages(Some(&contacts[0].id), None)
        .await
        .unwrap();
    let contents: Vec<_> = conversation.iter().map(|m| m.content.as_str()).collect();
    assert_eq!(contents, ["Hola", "Sigo aqui"]);
    assert!(conversation.iter().all(|m| m.direction == Direction::Inbound));
}

#[tokio::test]
async fn test_concurrent_deliveries_share_one_contact() {
    let app = TestApp::new(Config::default(), None).await;

    let deliveries = (0..8).map(|i| {
        app.post(
            "/api/webhook",
            text_message("+52 1 55 9999 0000", &format!("wamid.C{}", i), "ping"),
        )
    });
    for (status, _) in join_all(deliveries).await {
        assert_eq!(status, StatusCode::OK);
    }

    let contacts = app.store.list_contacts(&ContactFilter::default()).await.unwrap();
    assert_eq!(contacts.len(), 1);
    let messages = app
        .store
        .list_messages(Some(&contacts[0].id), None)
        .await
        .unwrap();
    assert_eq!(messages.len(), 8);
}

#[tokio::test]
async fn test_redelivery_is_dropped_under_skip_policy() {
    let mut config = Config::default();
    config.webhook.duplicate_policy = DuplicatePolicy::Skip;
    let app = TestApp::new(config, None).await;

    for _ in 0..3 {
        app.post("/api/webhook", text_message("5511", "wamid.SAME", "Hola"))
            .await;
    }

    let messages = app.store.list_messages(None, None).await.unwrap();
    assert_eq!(messages.len(), 1);
}

#[tokio::test]
async fn test_delivery_status_only_ensures_contact() {
    let app = TestApp::new(Config::default(), None).await;

    app.post("/api/webhook", status_update("5511223344", "delivered"))
        .await;
    app.post("/api/webhook", status_update("5599887766", "read"))
        .await;

    let contacts = app.store.list_contacts(&ContactFilter::default()).await.unwrap();
    assert_eq!(contacts.len(), 1);
    assert_eq!(contacts[0].phone_normalized, "5511223344");
    assert!(app.store.list_messages(None, None).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_reply_reaches_provider_and_joins_conversation() {
    let server = MockServer::start().await;
    Mock::given(matchers::method("POST"))
        .and(matchers::path("/100200300/messages"))
        .and(matchers::header("authorization", "Bearer integration-token"))
        .and(matchers::body_partial_json(json!({
            "to": "5215512345678",
            "text": { "body": "Gracias" }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "messages": [{ "id": "wamid.OUT1" }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let app = TestApp::new(Config::default(), Some(&server.uri())).await;
    app.post("/api/webhook", text_message("5215512345678", "wamid.IN1", "Hola"))
        .await;

    let (status, body) = app
        .post(
            "/api/send-message",
            json!({ "phone": "+52 1 55 1234 5678", "message": "Gracias" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["messageId"], "wamid.OUT1");
    assert_eq!(body["persisted"], true);

    let contacts = app.store.list_contacts(&ContactFilter::default()).await.unwrap();
    assert_eq!(contacts.len(), 1);
    let conversation = app
        .store
        .list_messages(Some(&contacts[0].id), None)
        .await
        .unwrap();
    assert_eq!(conversation.len(), 2);
    assert_eq!(conversation[1].direction, Direction::Outbound);
    assert_eq!(conversation[1].whatsapp_message_id.as_deref(), Some("wamid.OUT1"));
}

#[tokio::test]
async fn test_provider_rejection_surfaces_as_bad_gateway() {
    let server = MockServer::start().await;
    Mock::given(matchers::method("POST"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": { "message": "Recipient phone number not in allowed list" }
        })))
        .mount(&server)
        .await;

    let app = TestApp::new(Config::default(), Some(&server.uri())).await;
    let (status, body) = app
        .post("/api/send-message", json!({ "phone": "5511", "message": "Hola" }))
        .await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"], "Recipient phone number not in allowed list");
    assert!(app.store.list_messages(None, None).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_api_token_guards_send_routes_only() {
    let mut config = Config::default();
    config.server.api_token = Some("desk-token".into());
    let app = TestApp::new(config, None).await;

    let (status, _) = app
        .post(
            "/api/register-outbound-message",
            json!({ "phone": "5511", "message": "Hola" }),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let request = Request::builder()
        .method("POST")
        .uri("/api/register-outbound-message")
        .header("content-type", "application/json")
        .header("authorization", "Bearer desk-token")
        .body(Body::from(json!({ "phone": "5511", "message": "Hola" }).to_string()))
        .unwrap();
    let (status, body) = app.call(request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let (status, _) = app
        .post("/api/webhook", text_message("5511", "wamid.IN1", "Hola"))
        .await;
    assert_eq!(status, StatusCode::OK);

    // Both writes landed on the same contact
    let contacts = app.store.list_contacts(&ContactFilter::default()).await.unwrap();
    assert_eq!(contacts.len(), 1);
    assert_eq!(app.store.list_messages(None, None).await.unwrap().len(), 2);
}
