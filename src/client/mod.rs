// HTTP client facade: one configured transport, a request pipeline, envelope
// normalization and centralized failure side effects

pub mod request;
pub mod transport;

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::config::ApiSettings;
use crate::error::{ClientError, ClientResult};
use crate::middleware::{
    normalize, BearerAuth, Navigator, NoopNavigator, Notifier, RequestStage, SessionTeardown,
    TracingNotifier,
};
use crate::session::TokenStore;

pub use request::{ApiRequest, RawResponse, ResponseType};
pub use transport::{build_url, ReqwestTransport, Transport};

#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    settings: ApiSettings,
    transport: Arc<dyn Transport>,
    stages: Vec<Arc<dyn RequestStage>>,
    store: TokenStore,
    notifier: Arc<dyn Notifier>,
    teardown: SessionTeardown,
}

pub struct ApiClientBuilder {
    settings: ApiSettings,
    store: TokenStore,
    transport: Option<Arc<dyn Transport>>,
    notifier: Option<Arc<dyn Notifier>>,
    navigator: Option<Arc<dyn Navigator>>,
    extra_stages: Vec<Arc<dyn RequestStage>>,
}

impl ApiClientBuilder {
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub fn navigator(mut self, navigator: Arc<dyn Navigator>) -> Self {
        self.navigator = Some(navigator);
        self
    }

    /// Extra request stage, run after bearer auth
    pub fn stage(mut self, stage: Arc<dyn RequestStage>) -> Self {
        self.extra_stages.push(stage);
        self
    }

    pub fn build(self) -> ApiClient {
        let navigator = self
            .navigator
            .unwrap_or_else(|| Arc::new(NoopNavigator) as Arc<dyn Navigator>);
        let teardown = SessionTeardown::new(self.store.clone(), navigator);

        let mut stages: Vec<Arc<dyn RequestStage>> =
            vec![Arc::new(BearerAuth::new(self.store.clone()))];
        stages.extend(self.extra_stages);

        ApiClient {
            inner: Arc::new(ClientInner {
                settings: self.settings,
                transport: self
                    .transport
                    .unwrap_or_else(|| Arc::new(ReqwestTransport::new()) as Arc<dyn Transport>),
                stages,
                store: self.store,
                notifier: self
                    .notifier
                    .unwrap_or_else(|| Arc::new(TracingNotifier) as Arc<dyn Notifier>),
                teardown,
            }),
        }
    }
}

impl ApiClient {
    pub fn builder(settings: ApiSettings, store: TokenStore) -> ApiClientBuilder {
        ApiClientBuilder {
            settings,
            store,
            transport: None,
            notifier: None,
            navigator: None,
            extra_stages: Vec::new(),
        }
    }

    pub fn settings(&self) -> &ApiSettings {
        &self.inner.settings
    }

    pub fn store(&self) -> &TokenStore {
        &self.inner.store
    }

    pub fn notifier(&self) -> Arc<dyn Notifier> {
        self.inner.notifier.clone()
    }

    fn prepare(&self, request: &mut ApiRequest) {
        for stage in &self.inner.stages {
            stage.apply(request);
            tracing::trace!("Request stage {} applied to {}", stage.name(), request.url);
        }
    }

    /// Send a JSON call and return the envelope's `data` payload
    pub async fn send(&self, mut request: ApiRequest) -> ClientResult<Value> {
        request.response_type = ResponseType::Json;
        self.prepare(&mut request);

        let result = match self.inner.transport.send(&request, &self.inner.settings).await {
            Ok(raw) => normalize(raw.status, &raw.body, self.inner.settings.success_code),
            Err(err) => Err(err),
        };

        if let Err(err) = &result {
            self.on_error(&request, err);
        }
        result
    }

    /// Binary download: the raw response comes back whatever its status or body
    pub async fn download(&self, mut request: ApiRequest) -> ClientResult<RawResponse> {
        request.response_type = ResponseType::Blob;
        self.prepare(&mut request);

        match self.inner.transport.send(&request, &self.inner.settings).await {
            Ok(raw) => {
                if raw.status == 401 {
                    self.inner.teardown.handle_unauthorized(request.epoch);
                }
                Ok(raw)
            }
            Err(err) => {
                self.on_error(&request, &err);
                Err(err)
            }
        }
    }

    fn on_error(&self, request: &ApiRequest, err: &ClientError) {
        tracing::warn!(
            "{} {} failed: {} ({})",
            request.method,
            request.url,
            err,
            err.error_code()
        );

        if err.is_unauthorized() {
            self.inner.teardown.handle_unauthorized(request.epoch);
        }
        self.inner.notifier.error(&err.message());
    }

    /// Decode a payload into a typed value, surfacing failures like any other error
    pub fn decode<T: DeserializeOwned>(&self, value: Value) -> ClientResult<T> {
        serde_json::from_value(value).map_err(|e| {
            let err = ClientError::Decode(e.to_string());
            tracing::warn!("Failed to decode response payload: {}", e);
            self.inner.notifier.error(&err.message());
            err
        })
    }

    pub async fn get_json<T: DeserializeOwned>(&self, url: &str, params: Value) -> ClientResult<T> {
        let value = self.send(ApiRequest::get(url).query(params)).await?;
        self.decode(value)
    }

    pub async fn post_json<B: Serialize, T: DeserializeOwned>(&self, url: &str, body: &B) -> ClientResult<T> {
        let value = self.send(ApiRequest::post(url).json(body)).await?;
        self.decode(value)
    }

    pub async fn put_json<B: Serialize, T: DeserializeOwned>(&self, url: &str, body: &B) -> ClientResult<T> {
        let value = self.send(ApiRequest::put(url).json(body)).await?;
        self.decode(value)
    }

    pub async fn delete_json<T: DeserializeOwned>(&self, url: &str) -> ClientResult<T> {
        let value = self.send(ApiRequest::delete(url)).await?;
        self.decode(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middleware::{MemoryNavigator, MemoryNotifier, LOGIN_PATH};
    use crate::session::UserProfile;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;

    /// Replays one canned response and records what it was asked to send
    struct CannedTransport {
        response: ClientResult<RawResponse>,
        seen: Mutex<Vec<ApiRequest>>,
    }

    impl CannedTransport {
        fn new(response: ClientResult<RawResponse>) -> Arc<Self> {
            Arc::new(Self {
                response,
                seen: Mutex::new(Vec::new()),
            })
        }

        fn json(status: u16, body: Value) -> Arc<Self> {
            Self::new(Ok(RawResponse::new(status, serde_json::to_vec(&body).unwrap())))
        }
    }

    #[async_trait]
    impl Transport for CannedTransport {
        async fn send(&self, request: &ApiRequest, _settings: &ApiSettings) -> ClientResult<RawResponse> {
            self.seen.lock().unwrap().push(request.clone());
            self.response.clone()
        }
    }

    struct Harness {
        client: ApiClient,
        store: TokenStore,
        notifier: Arc<MemoryNotifier>,
        navigator: Arc<MemoryNavigator>,
    }

    fn harness(transport: Arc<CannedTransport>) -> Harness {
        let store = TokenStore::in_memory();
        store.set("tok", &UserProfile::with_role("user")).unwrap();
        let notifier = Arc::new(MemoryNotifier::new());
        let navigator = Arc::new(MemoryNavigator::new());
        let client = ApiClient::builder(ApiSettings::default(), store.clone())
            .transport(transport)
            .notifier(notifier.clone())
            .navigator(navigator.clone())
            .build();
        Harness {
            client,
            store,
            notifier,
            navigator,
        }
    }

    #[tokio::test]
    async fn attaches_token_and_returns_data() {
        let transport = CannedTransport::json(200, json!({"success": true, "data": {"ok": 1}}));
        let h = harness(transport.clone());

        let data = h.client.send(ApiRequest::get("/scheduler/status")).await.unwrap();
        assert_eq!(data, json!({"ok": 1}));

        let seen = transport.seen.lock().unwrap();
        assert_eq!(seen[0].header_value("Authorization"), Some("Bearer tok"));
        assert!(h.notifier.messages().is_empty());
    }

    #[tokio::test]
    async fn business_failure_notifies_without_teardown() {
        let transport = CannedTransport::json(200, json!({"code": 500, "message": "保存失败"}));
        let h = harness(transport);

        let err = h.client.send(ApiRequest::put("/scheduler/config")).await.unwrap_err();
        assert_eq!(err.message(), "保存失败");
        assert_eq!(h.notifier.errors(), vec!["保存失败".to_string()]);
        assert_eq!(h.store.get().as_deref(), Some("tok"));
    }

    #[tokio::test]
    async fn unauthorized_clears_session_and_redirects() {
        let transport = CannedTransport::json(401, json!({"message": "Token验证失败"}));
        let h = harness(transport);

        let err = h.client.send(ApiRequest::get("/auth/verify")).await.unwrap_err();
        assert_eq!(err, ClientError::Unauthorized);
        assert_eq!(h.store.get(), None);
        assert_eq!(h.navigator.redirects(), vec![LOGIN_PATH.to_string()]);
        assert_eq!(h.notifier.errors(), vec!["未授权，请重新登录".to_string()]);
    }

    #[tokio::test]
    async fn transport_failures_are_notified() {
        let h = harness(CannedTransport::new(Err(ClientError::Timeout)));
        assert_eq!(h.client.send(ApiRequest::get("/dashboard")).await.unwrap_err(), ClientError::Timeout);
        assert_eq!(h.notifier.errors(), vec!["请求超时".to_string()]);
    }

    #[tokio::test]
    async fn blob_bypasses_envelope_and_notifications() {
        let transport = CannedTransport::json(200, json!({"code": 500, "message": "导出失败"}));
        let h = harness(transport);

        let raw = h.client.download(ApiRequest::get("/questions/export")).await.unwrap();
        assert_eq!(raw.status, 200);
        assert!(h.notifier.messages().is_empty());

        let transport = CannedTransport::json(404, json!({"message": "missing"}));
        let h = harness(transport);
        let raw = h.client.download(ApiRequest::get("/questions/export")).await.unwrap();
        assert_eq!(raw.status, 404);
        assert!(h.notifier.messages().is_empty());
    }

    #[tokio::test]
    async fn decode_mismatch_surfaces_decode_error() {
        let transport = CannedTransport::json(200, json!({"data": "not a number"}));
        let h = harness(transport);

        let err = h.client.get_json::<u32>("/x", Value::Null).await.unwrap_err();
        assert!(matches!(err, ClientError::Decode(_)));
        assert_eq!(h.notifier.errors().len(), 1);
    }
}
