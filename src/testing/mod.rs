use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::client::{ApiClient, ApiRequest, RawResponse, Transport};
use crate::config::ApiSettings;
use crate::error::ClientResult;
use crate::middleware::{MemoryNavigator, MemoryNotifier};
use crate::session::{TokenStore, UserProfile};

/// Transport answering from a table keyed by `"METHOD /path"`.
///
/// Unrouted calls answer 404. Every call is recorded.
#[derive(Default)]
pub struct ScriptedTransport {
    routes: Mutex<HashMap<String, ClientResult<RawResponse>>>,
    calls: Mutex<Vec<ApiRequest>>,
}

impl ScriptedTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn route(&self, key: &str, response: ClientResult<RawResponse>) {
        self.routes.lock().unwrap().insert(key.to_string(), response);
    }

    /// Successful envelope around `data`
    pub fn ok(&self, key: &str, data: Value) {
        self.json(key, 200, json!({"success": true, "code": 200, "data": data}));
    }

    pub fn json(&self, key: &str, status: u16, body: Value) {
        let bytes = serde_json::to_vec(&body).unwrap();
        self.route(key, Ok(RawResponse::new(status, bytes)));
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|r| format!("{} {}", r.method, r.url))
            .collect()
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, key: &str) -> usize {
        self.calls().iter().filter(|c| c.as_str() == key).count()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: &ApiRequest, _settings: &ApiSettings) -> ClientResult<RawResponse> {
        let key = format!("{} {}", request.method, request.url);
        self.calls.lock().unwrap().push(request.clone());
        self.routes
            .lock()
            .unwrap()
            .get(&key)
            .cloned()
            .unwrap_or_else(|| Ok(RawResponse::new(404, Vec::new())))
    }
}

/// A facade wired to in-memory collaborators
pub struct TestContext {
    pub transport: Arc<ScriptedTransport>,
    pub store: TokenStore,
    pub notifier: Arc<MemoryNotifier>,
    pub navigator: Arc<MemoryNavigator>,
    pub client: ApiClient,
}

impl TestContext {
    pub fn new() -> Self {
        let transport = ScriptedTransport::new();
        let store = TokenStore::in_memory();
        let notifier = Arc::new(MemoryNotifier::new());
        let navigator = Arc::new(MemoryNavigator::new());
        let client = ApiClient::builder(ApiSettings::default(), store.clone())
            .transport(transport.clone())
            .notifier(notifier.clone())
            .navigator(navigator.clone())
            .build();

        Self {
            transport,
            store,
            notifier,
            navigator,
            client,
        }
    }

    /// Same as `new`, with a session already stored
    pub fn logged_in(role: &str) -> Self {
        let ctx = Self::new();
        let user = UserProfile::with_role(role);
        ctx.store.set("test-token", &user).unwrap();
        ctx
    }
}
