#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use axum::{
    Json, Router,
    body::Body,
    extract::{Multipart, Path, Request, State},
    http::{HeaderMap, StatusCode, header},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get as route_get, post},
};
use chatbot_portal::{AppConfig, AppState, config::SessionLookup, create_router};
use serde_json::json;
use tokio::net::TcpListener;

/// Token the mock backend accepts on admin endpoints.
pub const VALID_TOKEN: &str = "valid-token";
/// Cookie value the mock auth server maps to [`VALID_TOKEN`].
pub const REMOTE_COOKIE: &str = "cookie-abc";
/// Cookie value that makes the mock auth server fail.
pub const FAILING_COOKIE: &str = "explode";
/// Cookie value the mock auth server never answers in time.
pub const STALLING_COOKIE: &str = "stall";

/// One request as the backend saw it.
#[derive(Debug, Clone)]
pub struct Seen {
    pub path: String,
    pub authorization: Option<String>,
}

#[derive(Clone, Default)]
pub struct Recorder(Arc<Mutex<Vec<Seen>>>);

impl Recorder {
    pub fn all(&self) -> Vec<Seen> {
        self.0.lock().unwrap().clone()
    }

    /// Authorization header of the last request to `path`.
    pub fn authorization_for(&self, path: &str) -> Option<Option<String>> {
        self.all()
            .into_iter()
            .rev()
            .find(|seen| seen.path == path)
            .map(|seen| seen.authorization)
    }
}

pub struct MockBackend {
    pub address: String,
    pub recorder: Recorder,
}

async fn record(State(recorder): State<Recorder>, request: Request, next: Next) -> Response {
    let authorization = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);
    recorder.0.lock().unwrap().push(Seen {
        path: request.uri().path().to_string(),
        authorization,
    });
    next.run(request).await
}

fn bearer_ok(headers: &HeaderMap) -> bool {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        == Some(format!("Bearer {VALID_TOKEN}").as_str())
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "detail": "Invalid or expired session token" })),
    )
        .into_response()
}

async fn chat_send(Json(body): Json<serde_json::Value>) -> Json<serde_json::Value> {
    Json(json!({
        "response_text": format!("echo[{}]: {}", body["language"].as_str().unwrap_or("?"), body["message"].as_str().unwrap_or("")),
        "citations": [{ "source": "handbook.pdf", "page": 3, "text": "Office hours are 9-5." }],
        "confidence_score": 0.87
    }))
}

async fn chat_history(Path(session_id): Path<String>) -> Response {
    if session_id == "boom" {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "detail": "history store offline" })),
        )
            .into_response();
    }
    Json(json!([
        { "role": "user", "content": "hello", "timestamp": "2024-01-01T00:00:00Z" },
        { "role": "assistant", "content": format!("hi from {session_id}"), "timestamp": "2024-01-01T00:00:01Z" }
    ]))
    .into_response()
}

async fn chat_feedback(Path(_message_id): Path<String>) -> Json<serde_json::Value> {
    Json(json!({ "status": "working", "message": "Feedback received" }))
}

async fn admin_logs(headers: HeaderMap) -> Response {
    if !bearer_ok(&headers) {
        return unauthorized();
    }
    Json(json!({ "logs": [
        { "timestamp": "2024-01-01T00:00:00Z", "level": "INFO", "message": "scraper finished" },
        { "timestamp": "2024-01-01T00:01:00Z", "level": "ERROR", "message": "embedding \"timeout\"" }
    ]}))
    .into_response()
}

async fn admin_scrape(headers: HeaderMap) -> Response {
    if !bearer_ok(&headers) {
        return unauthorized();
    }
    Json(json!({ "job_id": "job-42", "status": "started" })).into_response()
}

async fn admin_upload(headers: HeaderMap, mut multipart: Multipart) -> Response {
    if !bearer_ok(&headers) {
        return unauthorized();
    }
    while let Ok(Some(field)) = multipart.next_field().await {
        if field.name() == Some("file") {
            let name = field.file_name().unwrap_or("unnamed").to_string();
            let size = field.bytes().await.map(|b| b.len()).unwrap_or(0);
            return Json(json!({ "doc_id": format!("{name}:{size}"), "status": "uploaded" }))
                .into_response();
        }
    }
    (StatusCode::UNPROCESSABLE_ENTITY, Json(json!({ "detail": "file missing" }))).into_response()
}

async fn auth_login(Json(body): Json<serde_json::Value>) -> Response {
    if body["username"] == "admin" && body["password"] == "secret" {
        return Json(json!({ "access_token": VALID_TOKEN, "token_type": "bearer" }))
            .into_response();
    }
    unauthorized()
}

/// Stand-in for the auth server's `GET /api/auth/get-session`.
async fn get_session(headers: HeaderMap) -> Response {
    let cookie = headers
        .get(header::COOKIE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string();

    if cookie.ends_with(&format!("={STALLING_COOKIE}")) {
        tokio::time::sleep(std::time::Duration::from_secs(5)).await;
    }
    if cookie.ends_with(&format!("={FAILING_COOKIE}")) {
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }
    if cookie.ends_with(&format!("={REMOTE_COOKIE}")) {
        return Json(json!({
            "session": { "token": VALID_TOKEN, "userId": "u-1" },
            "user": { "id": "u-1", "email": "admin@example.com", "name": "Admin", "role": "admin" }
        }))
        .into_response();
    }
    Json(serde_json::Value::Null).into_response()
}

/// spawn_backend
///
/// Serves the backend contract (and the auth server's session endpoint) on an
/// ephemeral port.
pub async fn spawn_backend() -> MockBackend {
    let recorder = Recorder::default();

    let router = Router::new()
        .route("/v1/chat/send", post(chat_send))
        .route("/v1/chat/history/{session_id}", route_get(chat_history))
        .route("/v1/chat/feedback/{message_id}", post(chat_feedback))
        .route("/v1/admin/logs", route_get(admin_logs))
        .route("/v1/admin/scrape", post(admin_scrape))
        .route("/v1/admin/upload", post(admin_upload))
        .route("/v1/auth/login", post(auth_login))
        .route("/api/auth/get-session", route_get(get_session))
        .layer(middleware::from_fn_with_state(recorder.clone(), record));

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    MockBackend { address, recorder }
}

pub fn config_for(backend: &MockBackend) -> AppConfig {
    AppConfig {
        api_url: backend.address.parse().unwrap(),
        ..AppConfig::default()
    }
}

pub fn remote_config_for(backend: &MockBackend) -> AppConfig {
    AppConfig {
        session_lookup: SessionLookup::Remote {
            auth_url: backend.address.parse().unwrap(),
        },
        ..config_for(backend)
    }
}

pub fn portal(config: AppConfig) -> Router {
    create_router(AppState::new(config))
}

pub fn session_cookie(token: &str) -> String {
    format!("better-auth.session_token={token}")
}

pub async fn body_text(response: Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub fn get(uri: &str) -> axum::http::request::Builder {
    axum::http::Request::builder().method("GET").uri(uri)
}

pub fn empty(builder: axum::http::request::Builder) -> axum::http::Request<Body> {
    builder.body(Body::empty()).unwrap()
}

pub fn location(response: &Response) -> Option<String> {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}
