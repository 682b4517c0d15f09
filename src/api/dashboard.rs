// Dashboard widgets; most of them read other modules' statistics
use serde_json::Value;

use crate::client::{ApiClient, ApiRequest};
use crate::error::ClientResult;

#[derive(Clone)]
pub struct DashboardApi {
    client: ApiClient,
}

impl DashboardApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn summary(&self, params: Value) -> ClientResult<Value> {
        self.client.send(ApiRequest::get("/dashboard").query(params)).await
    }

    pub async fn system_health(&self) -> ClientResult<Value> {
        self.client.send(ApiRequest::get("/scheduler/status")).await
    }

    pub async fn sync_status(&self) -> ClientResult<Value> {
        self.client.send(ApiRequest::get("/sync/status")).await
    }

    pub async fn trends(&self, params: Value) -> ClientResult<Value> {
        self.client
            .send(ApiRequest::get("/questions/statistics").query(params))
            .await
    }

    pub async fn process_statistics(&self) -> ClientResult<Value> {
        self.client.send(ApiRequest::get("/process/statistics")).await
    }
}
