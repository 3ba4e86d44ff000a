//! In-process stand-in for the compliance service, used by unit tests.
//!
//! Accepts `admin`/`admin` (token `t1`) and registrations (token `t-reg`),
//! rejects any other bearer token with `401`, and serves canned data for
//! the compliance endpoints. Every request's `Authorization` header and
//! query string are recorded for assertions.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use axum::{
    extract::{RawQuery, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};

use crate::auth::{KeyValueStore, MemoryStore};

#[derive(Default)]
struct Recorded {
    valid_tokens: HashSet<String>,
    last_authorization: Option<String>,
    last_query: Option<String>,
}

type Shared = Arc<Mutex<Recorded>>;

pub(crate) struct FakeService {
    pub base_url: String,
    state: Shared,
}

impl FakeService {
    pub async fn start() -> Self {
        let state: Shared = Arc::new(Mutex::new(Recorded {
            valid_tokens: ["t1", "t-reg"].into_iter().map(String::from).collect(),
            ..Default::default()
        }));

        let app = Router::new()
            .route("/api/auth/login", post(login))
            .route("/api/auth/register", post(register))
            .route("/api/dashboard", get(dashboard))
            .route("/api/anomalies/detect", post(detect))
            .route("/api/ekyc/verify", post(verify))
            .route("/api/audit/trail", get(audit_trail))
            .route("/api/reports/compliance", get(report))
            .route("/api/health/plain", get(|| async { "ok" }))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{}/api", addr),
            state,
        }
    }

    /// A base URL nothing is listening on
    pub async fn unreachable_base_url() -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        format!("http://{}/api", addr)
    }

    pub fn revoke(&self, token: &str) {
        self.state.lock().unwrap().valid_tokens.remove(token);
    }

    pub fn last_authorization(&self) -> Option<String> {
        self.state.lock().unwrap().last_authorization.clone()
    }

    pub fn last_query(&self) -> Option<String> {
        self.state.lock().unwrap().last_query.clone()
    }
}

fn error(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

/// Record the header and check it the way the service's token decorator does
fn authorize(state: &Shared, headers: &HeaderMap) -> Result<(), Response> {
    let authorization = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let mut recorded = state.lock().unwrap();
    recorded.last_authorization = authorization.clone();

    let token = match authorization.as_deref().and_then(|a| a.strip_prefix("Bearer ")) {
        Some(token) => token,
        None => return Err(error(StatusCode::UNAUTHORIZED, "Token is missing")),
    };
    if recorded.valid_tokens.contains(token) {
        Ok(())
    } else {
        Err(error(StatusCode::UNAUTHORIZED, "Token is invalid"))
    }
}

async fn login(Json(body): Json<Value>) -> Response {
    if body["username"] == "admin" && body["password"] == "admin" {
        Json(json!({
            "message": "Login successful",
            "token": "t1",
            "user": { "username": "admin", "role": "admin" }
        }))
        .into_response()
    } else {
        error(StatusCode::UNAUTHORIZED, "Invalid credentials")
    }
}

async fn register(Json(body): Json<Value>) -> Response {
    if body["username"] == "taken" {
        return error(StatusCode::BAD_REQUEST, "User already exists");
    }
    Json(json!({
        "message": "User created successfully",
        "token": "t-reg",
        "user": {
            "id": 2,
            "username": body["username"],
            "email": body["email"],
            "full_name": body["full_name"],
            "role": body["role"]
        }
    }))
    .into_response()
}

async fn dashboard(State(state): State<Shared>, headers: HeaderMap) -> Response {
    if let Err(rejection) = authorize(&state, &headers) {
        return rejection;
    }
    Json(json!({
        "alerts": [{
            "id": 1,
            "title": "Quarterly Compliance Report Due",
            "description": "SEBI quarterly report submission in 7 days",
            "severity": "high",
            "deadline": "2026-10-26T09:00:00"
        }],
        "anomalies": [
            { "ticker": "TSLA", "anomaly_score": 0.91, "risk_level": "Critical", "timestamp": "2026-10-19T09:00:00" }
        ],
        "stats": { "total_checks": 500, "anomalies_found": 1, "high_risk_count": 1 }
    }))
    .into_response()
}

async fn detect(State(state): State<Shared>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    if let Err(rejection) = authorize(&state, &headers) {
        return rejection;
    }
    let tickers: Vec<String> = serde_json::from_value(body["tickers"].clone()).unwrap_or_default();
    if tickers.iter().any(|t| t == "BOOM") {
        return error(StatusCode::INTERNAL_SERVER_ERROR, "detector offline");
    }
    let results: Vec<Value> = tickers
        .iter()
        .filter(|t| t.as_str() == "AAPL")
        .map(|t| {
            json!({
                "ticker": t,
                "anomaly_score": 0.85,
                "risk_level": "Critical",
                "price": 190.12,
                "volume": 1000000
            })
        })
        .collect();
    Json(Value::Array(results)).into_response()
}

async fn verify(State(state): State<Shared>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    if let Err(rejection) = authorize(&state, &headers) {
        return rejection;
    }
    let number = body["document_data"]["number"].as_str().unwrap_or_default();
    if number.is_empty() {
        return error(StatusCode::BAD_REQUEST, "Document number is required");
    }
    Json(json!({
        "success": true,
        "verification_id": 1,
        "status": "verified",
        "score": 0.8,
        "timestamp": "2026-10-19T10:00:00"
    }))
    .into_response()
}

async fn audit_trail(
    State(state): State<Shared>,
    headers: HeaderMap,
    RawQuery(query): RawQuery,
) -> Response {
    if let Err(rejection) = authorize(&state, &headers) {
        return rejection;
    }
    state.lock().unwrap().last_query = query.clone();

    let limit = query
        .as_deref()
        .and_then(|q| q.strip_prefix("limit="))
        .and_then(|n| n.parse::<usize>().ok())
        .unwrap_or(50);
    let entries: Vec<Value> = (0..limit.min(3))
        .map(|i| {
            json!({
                "timestamp": format!("2026-10-19 10:0{}:00", i),
                "username": if i == 0 { Value::Null } else { json!("admin") },
                "action_type": "user_login",
                "details": null
            })
        })
        .collect();
    let total = entries.len();
    Json(json!({ "entries": entries, "total": total })).into_response()
}

async fn report(State(state): State<Shared>, headers: HeaderMap) -> Response {
    if let Err(rejection) = authorize(&state, &headers) {
        return rejection;
    }
    Json(json!({
        "report": "BROKERMINT COMPLIANCE REPORT\nGenerated by: admin\n",
        "filename": "compliance_report_20261019_101500.txt"
    }))
    .into_response()
}

/// Session store that refuses writes to one key.
pub(crate) struct FailingStore {
    inner: MemoryStore,
    fail_key: &'static str,
}

impl FailingStore {
    pub fn new(inner: MemoryStore, fail_key: &'static str) -> Self {
        Self { inner, fail_key }
    }
}

impl KeyValueStore for FailingStore {
    fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        self.inner.get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> anyhow::Result<()> {
        if key == self.fail_key {
            anyhow::bail!("write refused: {}", key);
        }
        self.inner.set(key, value)
    }

    fn remove(&mut self, key: &str) -> anyhow::Result<()> {
        self.inner.remove(key)
    }
}
