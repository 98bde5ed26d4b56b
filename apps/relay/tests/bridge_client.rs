use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post},
};
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use wa_relay::{BridgeSessionClient, StartOptions};
use wa_relay_core::{ChatId, InboundMessage, SessionClient, SessionError};

#[derive(Clone, Default)]
struct MockBridge {
    requests: Arc<Mutex<Vec<(String, Value, Option<String>)>>>,
}

impl MockBridge {
    async fn record(&self, path: String, body: Value, headers: &HeaderMap) {
        let auth = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        self.requests.lock().await.push((path, body, auth));
    }
}

async fn start(
    State(bridge): State<MockBridge>,
    Path(client): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> StatusCode {
    bridge.record(format!("start:{client}"), body, &headers).await;
    StatusCode::NO_CONTENT
}

async fn registered(
    State(bridge): State<MockBridge>,
    Path((client, chat_id)): Path<(String, String)>,
    headers: HeaderMap,
) -> Result<Json<Value>, (StatusCode, String)> {
    bridge
        .record(format!("registered:{client}:{chat_id}"), Value::Null, &headers)
        .await;
    match chat_id.as_str() {
        "62812345@c.us" => Ok(Json(json!({ "registered": true }))),
        "broken@c.us" => Ok(Json(json!({ "unexpected": "shape" }))),
        _ => Ok(Json(json!({ "registered": false }))),
    }
}

async fn messages(
    State(bridge): State<MockBridge>,
    Path(client): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Result<Json<Value>, (StatusCode, String)> {
    bridge
        .record(format!("messages:{client}"), body.clone(), &headers)
        .await;
    if body["text"] == "boom" {
        return Err((
            StatusCode::SERVICE_UNAVAILABLE,
            "session not ready".to_string(),
        ));
    }
    Ok(Json(json!({ "id": "true_62812345@c.us_3EB0" })))
}

async fn spawn_bridge() -> (SocketAddr, MockBridge) {
    let bridge = MockBridge::default();
    let app = Router::new()
        .route("/sessions/{client}/start", post(start))
        .route(
            "/sessions/{client}/contacts/{chat_id}/registered",
            get(registered),
        )
        .route("/sessions/{client}/messages", post(messages))
        .with_state(bridge.clone());
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (addr, bridge)
}

fn client(addr: SocketAddr, token: Option<&str>) -> BridgeSessionClient {
    BridgeSessionClient::new(
        reqwest::Client::new(),
        format!("http://{addr}"),
        "default",
        token.map(str::to_string),
        StartOptions::new(true, "http://relay:8080/session/events"),
    )
}

#[tokio::test]
async fn initialize_posts_start_options() {
    let (addr, bridge) = spawn_bridge().await;
    client(addr, Some("tok")).initialize().await.unwrap();

    let requests = bridge.requests.lock().await;
    let (path, body, auth) = &requests[0];
    assert_eq!(path, "start:default");
    assert_eq!(body["headless"], true);
    assert_eq!(body["webhook_url"], "http://relay:8080/session/events");
    assert!(
        body["args"]
            .as_array()
            .unwrap()
            .contains(&json!("--disable-gpu"))
    );
    assert_eq!(auth.as_deref(), Some("Bearer tok"));
}

#[tokio::test]
async fn registration_check_reads_bridge_answer() {
    let (addr, bridge) = spawn_bridge().await;
    let client = client(addr, None);

    assert!(
        client
            .is_registered_user(&ChatId::from_raw("62812345@c.us"))
            .await
            .unwrap()
    );
    assert!(
        !client
            .is_registered_user(&ChatId::from_raw("62899999@c.us"))
            .await
            .unwrap()
    );

    let requests = bridge.requests.lock().await;
    assert_eq!(requests[0].0, "registered:default:62812345@c.us");
    assert_eq!(requests[0].2, None);
}

#[tokio::test]
async fn malformed_registration_answer_is_a_decode_error() {
    let (addr, _bridge) = spawn_bridge().await;
    let err = client(addr, None)
        .is_registered_user(&ChatId::from_raw("broken@c.us"))
        .await
        .unwrap_err();
    assert!(matches!(err, SessionError::Decode(_)));
}

#[tokio::test]
async fn send_and_reply_post_messages() {
    let (addr, bridge) = spawn_bridge().await;
    let client = client(addr, None);

    client
        .send_message(&ChatId::from_raw("62812345@c.us"), "hello")
        .await
        .unwrap();
    let inbound = InboundMessage {
        id: "false_628111@c.us_AAA".into(),
        from: ChatId::from_raw("628111@c.us"),
        body: "!ping".into(),
        from_me: false,
    };
    client.reply(&inbound, "pong : 628111@c.us").await.unwrap();

    let requests = bridge.requests.lock().await;
    assert_eq!(
        requests[0].1,
        json!({ "chat_id": "62812345@c.us", "text": "hello" })
    );
    assert_eq!(
        requests[1].1,
        json!({
            "chat_id": "628111@c.us",
            "text": "pong : 628111@c.us",
            "quoted_message_id": "false_628111@c.us_AAA"
        })
    );
}

#[tokio::test]
async fn bridge_failures_keep_status_and_body() {
    let (addr, _bridge) = spawn_bridge().await;
    let err = client(addr, None)
        .send_message(&ChatId::from_raw("62812345@c.us"), "boom")
        .await
        .unwrap_err();
    match err {
        SessionError::Remote { status, body } => {
            assert_eq!(status, 503);
            assert_eq!(body, "session not ready");
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[tokio::test]
async fn unreachable_bridge_is_a_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = client(addr, None).initialize().await.unwrap_err();
    assert!(matches!(err, SessionError::Transport(_)));
}
