// /scores endpoints
use serde_json::Value;

use crate::client::{ApiClient, ApiRequest};
use crate::error::ClientResult;

#[derive(Clone)]
pub struct ScoresApi {
    client: ApiClient,
}

impl ScoresApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn list(&self, params: Value) -> ClientResult<Value> {
        self.client.send(ApiRequest::get("/scores").query(params)).await
    }

    pub async fn statistics(&self) -> ClientResult<Value> {
        self.client.send(ApiRequest::get("/scores/statistics")).await
    }

    pub async fn model_comparison(&self, params: Value) -> ClientResult<Value> {
        self.client
            .send(ApiRequest::get("/scores/model-comparison").query(params))
            .await
    }
}
