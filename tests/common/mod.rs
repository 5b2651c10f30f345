use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::response::{Html, IntoResponse, Response};
use serde_json::{Value, json};
use sqlx::SqlitePool;
use uuid::Uuid;

use cachelog::config::{Config, GcVoteConfig};
use cachelog::gc::GcLoggingManager;

pub const CSRF_TOKEN: &str = "test-csrf-token-42";

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub csrf: Option<String>,
    pub body: Vec<u8>,
}

impl RecordedRequest {
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).unwrap_or(Value::Null)
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Knobs and request log of the fake geocaching.com.
#[derive(Default)]
pub struct FakeGcState {
    requests: Mutex<Vec<RecordedRequest>>,
    pub omit_csrf: AtomicBool,
    pub reject_logs: AtomicBool,
    pub reject_images: AtomicBool,
    pub reject_votes: AtomicBool,
    counter: AtomicUsize,
}

impl FakeGcState {
    fn next_id(&self) -> usize {
        self.counter.fetch_add(1, Ordering::SeqCst) + 1
    }
}

/// A running fake of the geocaching.com website and GCVote.
pub struct FakeGc {
    pub addr: SocketAddr,
    pub state: Arc<FakeGcState>,
}

impl FakeGc {
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().unwrap().clone()
    }

    /// Everything except page loads.
    pub fn api_requests(&self) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.method != Method::GET)
            .collect()
    }

    pub fn find(&self, method: Method, path: &str) -> Option<RecordedRequest> {
        self.requests()
            .into_iter()
            .find(|r| r.method == method && r.path == path)
    }

    pub fn find_all(&self, method: Method, path: &str) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.method == method && r.path == path)
            .collect()
    }

    pub fn set(&self, flag: &AtomicBool, value: bool) {
        flag.store(value, Ordering::SeqCst);
    }
}

/// Spawn the fake on a random port.
pub async fn spawn_fake_gc() -> FakeGc {
    let state = Arc::new(FakeGcState::default());
    let app = Router::new().fallback(handle).with_state(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind to random port");
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Fake server failed");
    });

    FakeGc { addr, state }
}

fn log_page(state: &FakeGcState, extra: &str) -> Response {
    let token = if state.omit_csrf.load(Ordering::SeqCst) {
        String::new()
    } else {
        format!(r#""csrfToken":"{CSRF_TOKEN}","#)
    };
    Html(format!(
        r#"<html><body><script>window.__APP__ = {{{token}"locale":"en"{extra}}};</script></body></html>"#
    ))
    .into_response()
}

async fn handle(
    State(state): State<Arc<FakeGcState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let path = uri.path().to_string();
    let csrf = headers
        .get("csrf-token")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    state.requests.lock().unwrap().push(RecordedRequest {
        method: method.clone(),
        path: path.clone(),
        csrf: csrf.clone(),
        body: body.to_vec(),
    });

    let segments: Vec<&str> = path.trim_start_matches('/').split('/').collect();

    if method == Method::GET {
        return match segments.as_slice() {
            ["live", "trackable", _, "log"] => log_page(
                &state,
                r#","currentGeocache":{"id":77,"referenceCode":"GC77TB","name":"Hideout"}"#,
            ),
            ["live", ..] => log_page(&state, ""),
            _ => StatusCode::NOT_FOUND.into_response(),
        };
    }

    if segments.as_slice() == ["setVote.php"] {
        let reply = if state.reject_votes.load(Ordering::SeqCst) {
            "ERROR"
        } else {
            "OK\n"
        };
        return reply.into_response();
    }

    if csrf.as_deref() != Some(CSRF_TOKEN) {
        return (StatusCode::FORBIDDEN, Html("<html>forbidden</html>")).into_response();
    }

    match (method.as_str(), segments.as_slice()) {
        ("POST", ["api", "live", "v1", "logs", "geocacheLog", "delete", _])
        | ("POST", ["api", "live", "v1", "logs", "trackableLog", "delete", _])
        | ("POST", ["api", "live", "v1", "images", "delete", _, _]) => {
            axum::Json(json!({})).into_response()
        }
        ("PUT", ["api", "live", "v1", "logs", "geocacheLog", log_id]) => {
            let request: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
            axum::Json(json!({
                "guid": "edited-guid",
                "logReferenceCode": log_id,
                "logDate": request["logDate"],
                "logType": request["logType"],
            }))
            .into_response()
        }
        ("POST", ["api", "live", "v1", "logs", _, "geocacheLog"]) => {
            if state.reject_logs.load(Ordering::SeqCst) {
                return (
                    StatusCode::BAD_REQUEST,
                    axum::Json(json!({ "errorMessage": "Log type not allowed" })),
                )
                    .into_response();
            }
            let request: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
            let n = state.next_id();
            axum::Json(json!({
                "guid": format!("log-guid-{n}"),
                "logReferenceCode": format!("GL{n}"),
                "dateTimeCreatedUtc": "2024-05-01T12:30:00",
                "dateTimeLastUpdatedUtc": "2024-05-01T12:30:00",
                "logDate": request["logDate"],
                "logType": request["logType"],
                "images": [],
                "trackables": [],
                "cannotDelete": false,
                "usedFavoritePoint": request["usedFavoritePoint"],
            }))
            .into_response()
        }
        ("POST", ["api", "live", "v1", "logs", _, "trackableLog"]) => {
            let request: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
            let n = state.next_id();
            axum::Json(json!({
                "guid": format!("tb-guid-{n}"),
                "logReferenceCode": format!("TL{n}"),
                "logDate": request["logDate"],
                "logType": { "id": request["logType"] },
            }))
            .into_response()
        }
        ("POST", ["api", "live", "v1", "logs", _, "images"]) => {
            if state.reject_images.load(Ordering::SeqCst) {
                return (StatusCode::INTERNAL_SERVER_ERROR, "upload failed").into_response();
            }
            let n = state.next_id();
            let guid = format!("img-{n}");
            axum::Json(json!({
                "guid": guid,
                "url": format!("https://img.example.com/{guid}.jpg"),
                "thumbnailUrl": format!("https://img.example.com/large/{guid}.jpg"),
                "success": true,
            }))
            .into_response()
        }
        ("PUT", ["api", "live", "v1", "images", _, guid, "replace"]) => axum::Json(json!({
            "guid": guid,
            "url": format!("https://img.example.com/{guid}.jpg"),
            "success": true,
        }))
        .into_response(),
        _ => StatusCode::NOT_FOUND.into_response(),
    }
}

pub fn test_config(fake: &FakeGc, with_vote: bool) -> Config {
    Config {
        database_url: "sqlite::memory:".to_string(),
        website_url: fake.url(),
        username: "alice".to_string(),
        auth_cookie: Some("gspkauth=test-session".to_string()),
        caches_found: Some(10),
        http_timeout: Duration::from_secs(5),
        image_title_prefix: "Photo".to_string(),
        log_level: "warn".to_string(),
        gcvote: with_vote.then(|| GcVoteConfig {
            url: fake.url(),
            password: "vote-secret".to_string(),
        }),
    }
}

pub fn gc_manager(fake: &FakeGc, with_vote: bool) -> Arc<GcLoggingManager> {
    Arc::new(
        GcLoggingManager::from_config(&test_config(fake, with_vote))
            .expect("Failed to build logging manager"),
    )
}

/// Fresh in-memory store with migrations applied.
pub async fn test_pool() -> SqlitePool {
    cachelog::db::connect("sqlite::memory:")
        .await
        .expect("Failed to open test database")
}

/// Write a small fake JPEG to a unique temporary path.
pub fn temp_image(name: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("cachelog-{}-{name}", Uuid::now_v7()));
    std::fs::write(&path, [0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, b'J', b'F', b'I', b'F'])
        .expect("Failed to write test image");
    path
}
