use async_trait::async_trait;
use url::Url;

use super::request::{ApiRequest, RawResponse};
use crate::config::ApiSettings;
use crate::error::{ClientError, ClientResult};

/// Moves a prepared request over the wire
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: &ApiRequest, settings: &ApiSettings) -> ClientResult<RawResponse>;
}

/// Join the API base and a request path, then append query pairs
pub fn build_url(base_url: &str, request: &ApiRequest) -> ClientResult<Url> {
    let path = request.url.trim_start_matches('/');
    let joined = format!("{}/{}", base_url.trim_end_matches('/'), path);
    let mut url = Url::parse(&joined)
        .map_err(|e| ClientError::Network(format!("invalid request URL '{}': {}", joined, e)))?;

    let pairs = request.query_pairs();
    if !pairs.is_empty() {
        url.query_pairs_mut().extend_pairs(pairs);
    }
    Ok(url)
}

/// HTTP transport backed by a shared reqwest client
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: &ApiRequest, settings: &ApiSettings) -> ClientResult<RawResponse> {
        let url = build_url(&settings.base_url, request)?;
        tracing::debug!("{} {}", request.method, url);

        let mut builder = self
            .client
            .request(request.method.clone(), url)
            .timeout(settings.timeout());

        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(map_reqwest_error)?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = response.bytes().await.map_err(map_reqwest_error)?.to_vec();

        Ok(RawResponse {
            status,
            headers,
            body,
        })
    }
}

fn map_reqwest_error(err: reqwest::Error) -> ClientError {
    if err.is_timeout() {
        ClientError::Timeout
    } else {
        ClientError::Network(err.to_string())
    }
}
