// /badcase endpoints: review workflow and analysis views for low-scoring answers
use serde_json::Value;

use crate::client::{ApiClient, ApiRequest, RawResponse};
use crate::error::ClientResult;

#[derive(Clone)]
pub struct BadcaseApi {
    client: ApiClient,
}

impl BadcaseApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn statistics(&self, params: Value) -> ClientResult<Value> {
        self.get("/badcase/statistics", params).await
    }

    pub async fn list(&self, params: Value) -> ClientResult<Value> {
        self.get("/badcase/list", params).await
    }

    pub async fn detail(&self, id: i64) -> ClientResult<Value> {
        self.get(&format!("/badcase/detail/{}", id), Value::Null).await
    }

    pub async fn review(&self, id: i64, data: &Value) -> ClientResult<Value> {
        self.client
            .send(ApiRequest::put(format!("/badcase/review/{}", id)).json(data))
            .await
    }

    pub async fn category_distribution(&self, params: Value) -> ClientResult<Value> {
        self.get("/badcase/category-distribution", params).await
    }

    pub async fn trend(&self, params: Value) -> ClientResult<Value> {
        self.get("/badcase/trend", params).await
    }

    pub async fn model_comparison(&self, params: Value) -> ClientResult<Value> {
        self.get("/badcase/model-comparison", params).await
    }

    pub async fn resolve(&self, id: i64, data: &Value) -> ClientResult<Value> {
        self.post(&format!("/badcase/{}/resolve", id), data).await
    }

    pub async fn optimize(&self, id: i64, data: &Value) -> ClientResult<Value> {
        self.post(&format!("/badcase/{}/optimize", id), data).await
    }

    pub async fn batch_process(&self, data: &Value) -> ClientResult<Value> {
        self.post("/badcase/batch-process", data).await
    }

    pub async fn export(&self, params: Value) -> ClientResult<RawResponse> {
        self.client
            .download(ApiRequest::get("/badcase/export").query(params))
            .await
    }

    pub async fn suggestions(&self, id: i64) -> ClientResult<Value> {
        self.get(&format!("/badcase/{}/suggestions", id), Value::Null).await
    }

    pub async fn feedback(&self, id: i64, data: &Value) -> ClientResult<Value> {
        self.post(&format!("/badcase/{}/feedback", id), data).await
    }

    pub async fn dimension_analysis(&self, params: Value) -> ClientResult<Value> {
        self.get("/badcase/dimension-analysis", params).await
    }

    pub async fn top_categories(&self, params: Value) -> ClientResult<Value> {
        self.get("/badcase/top-categories-analysis", params).await
    }

    async fn get(&self, url: &str, params: Value) -> ClientResult<Value> {
        self.client.send(ApiRequest::get(url).query(params)).await
    }

    async fn post(&self, url: &str, data: &Value) -> ClientResult<Value> {
        self.client.send(ApiRequest::post(url).json(data)).await
    }
}
