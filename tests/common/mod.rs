#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use axum::extract::{Path, Request, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};

use qa_console::client::ApiClient;
use qa_console::config::ApiSettings;
use qa_console::middleware::{MemoryNavigator, MemoryNotifier, Navigator};
use qa_console::session::TokenStore;

/// In-process stand-in for the platform backend, served under `/api`
pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    pub state: Arc<MockState>,
}

#[derive(Default)]
pub struct MockState {
    calls: Mutex<Vec<String>>,
    tokens: Mutex<HashMap<String, Value>>,
    config: Mutex<Value>,
    running: AtomicBool,
    failing: Mutex<Vec<String>>,
    delay_unauthorized: AtomicBool,
    response_delay_ms: AtomicU64,
}

impl MockState {
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, call: &str) -> usize {
        self.calls().iter().filter(|c| c.as_str() == call).count()
    }

    pub fn reset_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    /// Make `"METHOD /path"` answer 500
    pub fn fail(&self, call: &str) {
        self.failing.lock().unwrap().push(call.to_string());
    }

    /// Hold 401 answers briefly so concurrent callers overlap
    pub fn slow_unauthorized(&self) {
        self.delay_unauthorized.store(true, Ordering::SeqCst);
    }

    /// Delay every authorized answer by `delay`
    pub fn slow_responses(&self, delay: Duration) {
        self.response_delay_ms.store(delay.as_millis() as u64, Ordering::SeqCst);
    }

    pub fn config(&self) -> Value {
        self.config.lock().unwrap().clone()
    }

    fn user_for(&self, headers: &HeaderMap) -> Option<Value> {
        let token = headers
            .get(header::AUTHORIZATION)?
            .to_str()
            .ok()?
            .strip_prefix("Bearer ")?;
        self.tokens.lock().unwrap().get(token).cloned()
    }
}

impl TestServer {
    async fn spawn() -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        let state = Arc::new(MockState::default());
        *state.config.lock().unwrap() = json!({
            "scheduler_enabled": true,
            "auto_process_on_startup": false,
            "workflow_interval_minutes": 3,
            "batch_size": 100,
            "min_batch_size": 1,
            "api_timeout": 30
        });

        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
            .await
            .with_context(|| format!("failed to bind port {}", port))?;
        let app = app(state.clone());
        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                eprintln!("mock backend stopped: {}", e);
            }
        });

        Ok(Self { port, base_url, state })
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let client = reqwest::Client::new();
        let deadline = Instant::now() + timeout;
        loop {
            if Instant::now() > deadline {
                break;
            }
            let url = format!("{}/health", self.base_url);
            if let Ok(resp) = client.get(&url).send().await {
                if resp.status() == reqwest::StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        anyhow::bail!("mock backend did not become ready on {} within {:?}", self.base_url, timeout)
    }

    pub fn api_settings(&self) -> ApiSettings {
        ApiSettings {
            base_url: format!("{}/api", self.base_url),
            timeout_secs: 5,
            success_code: 200,
        }
    }

    /// Facade over the real HTTP transport, with recording effects
    pub fn client(&self, store: &TokenStore) -> (ApiClient, Arc<MemoryNotifier>, Arc<MemoryNavigator>) {
        self.client_with_settings(store, self.api_settings())
    }

    pub fn client_with_settings(
        &self,
        store: &TokenStore,
        settings: ApiSettings,
    ) -> (ApiClient, Arc<MemoryNotifier>, Arc<MemoryNavigator>) {
        let notifier = Arc::new(MemoryNotifier::new());
        let navigator = Arc::new(MemoryNavigator::new());
        let client = ApiClient::builder(settings, store.clone())
            .notifier(notifier.clone())
            .navigator(navigator.clone())
            .build();
        (client, notifier, navigator)
    }

    pub fn client_with_navigator(&self, store: &TokenStore, navigator: Arc<dyn Navigator>) -> ApiClient {
        ApiClient::builder(self.api_settings(), store.clone())
            .notifier(Arc::new(MemoryNotifier::new()))
            .navigator(navigator)
            .build()
    }
}

/// A fresh backend per test; each test runs on its own runtime
pub async fn ensure_server() -> Result<TestServer> {
    let server = TestServer::spawn().await?;
    server.wait_ready(Duration::from_secs(5)).await?;
    Ok(server)
}

fn app(state: Arc<MockState>) -> Router {
    let api = Router::new()
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
        .route("/auth/verify", get(verify))
        .route("/auth/profile", get(verify))
        .route("/scheduler/status", get(scheduler_status))
        .route("/scheduler/enable", post(enable))
        .route("/scheduler/disable", post(disable))
        .route("/scheduler/workflow/status", get(workflow_status))
        .route("/scheduler/workflow/phases/:phase/execute", post(execute_phase))
        .route("/scheduler/jobs", get(jobs))
        .route("/scheduler/jobs/:id/pause", post(job_ok))
        .route("/scheduler/jobs/:id/resume", post(job_ok))
        .route("/scheduler/config", get(get_config).put(put_config))
        .route("/questions", get(questions))
        .route("/questions/export", get(export_questions))
        .route("/dashboard", get(dashboard));

    Router::new()
        .route("/health", get(|| async { Json(json!({"status": "ok"})) }))
        .nest("/api", api)
        .layer(middleware::from_fn_with_state(state.clone(), record))
        .with_state(state)
}

async fn record(State(state): State<Arc<MockState>>, req: Request, next: Next) -> Response {
    let path = req.uri().path().to_string();
    if path == "/health" {
        return next.run(req).await;
    }

    let call = format!("{} {}", req.method(), path.trim_start_matches("/api"));
    state.calls.lock().unwrap().push(call.clone());

    if state.failing.lock().unwrap().contains(&call) {
        return (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({"message": "boom"}))).into_response();
    }

    let public = matches!(call.as_str(), "POST /auth/login" | "POST /auth/logout");
    if !public && state.user_for(req.headers()).is_none() {
        if state.delay_unauthorized.load(Ordering::SeqCst) {
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"success": false, "message": "Token验证失败"})),
        )
            .into_response();
    }

    let delay = state.response_delay_ms.load(Ordering::SeqCst);
    if !public && delay > 0 {
        tokio::time::sleep(Duration::from_millis(delay)).await;
    }

    next.run(req).await
}

fn ok(data: Value) -> Json<Value> {
    Json(json!({"success": true, "code": 200, "message": "ok", "data": data}))
}

async fn login(State(state): State<Arc<MockState>>, Json(body): Json<Value>) -> Json<Value> {
    let username = body["username"].as_str().unwrap_or_default();
    let password = body["password"].as_str().unwrap_or_default();

    let user = match (username, password) {
        ("alice", "secret") => json!({"id": 1, "username": "alice", "display_name": "Alice", "role": "user"}),
        ("root", "secret") => json!({"id": 2, "username": "root", "display_name": "Root", "role": "admin"}),
        _ => return Json(json!({"success": false, "code": 401, "message": "用户名或密码错误"})),
    };

    let token = format!("token-{}", username);
    state.tokens.lock().unwrap().insert(token.clone(), user.clone());
    ok(json!({"token": token, "user": user}))
}

async fn logout(State(state): State<Arc<MockState>>, headers: HeaderMap) -> Json<Value> {
    if let Some(token) = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
    {
        state.tokens.lock().unwrap().remove(token);
    }
    ok(json!({}))
}

async fn verify(State(state): State<Arc<MockState>>, headers: HeaderMap) -> Json<Value> {
    ok(json!({"user": state.user_for(&headers)}))
}

async fn scheduler_status(State(state): State<Arc<MockState>>) -> Json<Value> {
    ok(json!({
        "scheduler_running": state.running.load(Ordering::SeqCst),
        "current_time": "2024-05-01T10:00:00",
        "scheduled_jobs": {"count": 0, "jobs": {}, "scheduler_jobs": []},
        "workflow": {
            "phases": {},
            "execution_history": [
                {"workflow_id": "w1", "execution_time": "2024-05-01T09:54:00", "success": true},
                {"workflow_id": "w2", "execution_time": "2024-05-01T09:57:00", "success": true}
            ]
        },
        // unrelated to the editable settings; must not leak into them
        "workflow_interval_minutes": 99
    }))
}

async fn enable(State(state): State<Arc<MockState>>) -> Json<Value> {
    state.running.store(true, Ordering::SeqCst);
    ok(json!({"scheduler_running": true}))
}

async fn disable(State(state): State<Arc<MockState>>) -> Json<Value> {
    state.running.store(false, Ordering::SeqCst);
    ok(json!({"scheduler_running": false}))
}

async fn workflow_status() -> Json<Value> {
    ok(json!({
        "phases": {
            "data_sync": {"status": "success", "can_execute": true},
            "classification": {"status": "running"},
            "answer_generation": {"status": "disabled"},
            "scoring": {"status": "pending"},
            "archival": {"status": "failed"}
        },
        "execution_history": []
    }))
}

async fn execute_phase(Path(phase): Path<String>) -> Json<Value> {
    ok(json!({"phase": phase, "processed": 4}))
}

async fn jobs() -> Json<Value> {
    ok(json!({
        "count": 1,
        "jobs": {"workflow_job": {"name": "工作流调度", "enabled": true}},
        "scheduler_jobs": [
            {"id": "workflow_job", "name": "工作流调度", "next_run_time": "2024-05-01T10:03:00", "trigger": "interval[0:03:00]"}
        ]
    }))
}

async fn job_ok(Path(id): Path<String>) -> Json<Value> {
    ok(json!({"job_id": id}))
}

async fn get_config(State(state): State<Arc<MockState>>) -> Json<Value> {
    ok(state.config())
}

async fn put_config(State(state): State<Arc<MockState>>, Json(body): Json<Value>) -> Json<Value> {
    let mut config = state.config.lock().unwrap();
    let mut updated = Vec::new();
    if let (Some(current), Some(changes)) = (config.as_object_mut(), body.as_object()) {
        for (key, value) in changes {
            current.insert(key.clone(), value.clone());
            updated.push(key.clone());
        }
    }
    ok(json!({"updated_configs": updated, "note": "部分配置需要重启服务才能生效"}))
}

async fn questions() -> Json<Value> {
    ok(json!({
        "items": [
            {"id": 1, "question": "如何重置密码", "classification": "账户"},
            {"id": 2, "question": "退款多久到账", "classification": "支付"}
        ],
        "total": 2,
        "page": 1
    }))
}

async fn export_questions() -> Response {
    (
        [
            (header::CONTENT_TYPE, "text/csv"),
            (header::CONTENT_DISPOSITION, "attachment; filename=\"questions.csv\""),
        ],
        "id,question\n1,如何重置密码\n",
    )
        .into_response()
}

async fn dashboard() -> Json<Value> {
    ok(json!({"total_questions": 2, "total_answers": 6}))
}
