// /stats endpoints (admin only)
use serde_json::Value;

use crate::client::{ApiClient, ApiRequest};
use crate::error::ClientResult;

#[derive(Clone)]
pub struct StatsApi {
    client: ApiClient,
}

impl StatsApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn access(&self) -> ClientResult<Value> {
        self.client.send(ApiRequest::get("/stats/access")).await
    }

    pub async fn access_logs(&self, params: Value) -> ClientResult<Value> {
        self.client
            .send(ApiRequest::get("/stats/access-logs").query(params))
            .await
    }
}
