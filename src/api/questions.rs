// /questions endpoints
use serde_json::Value;

use crate::client::{ApiClient, ApiRequest, RawResponse};
use crate::error::ClientResult;

#[derive(Clone)]
pub struct QuestionsApi {
    client: ApiClient,
}

impl QuestionsApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Paged listing; `params` carries `page`, `page_size` and filters
    pub async fn list(&self, params: Value) -> ClientResult<Value> {
        self.client.send(ApiRequest::get("/questions").query(params)).await
    }

    pub async fn detail(&self, id: i64) -> ClientResult<Value> {
        self.client.send(ApiRequest::get(format!("/questions/{}", id))).await
    }

    pub async fn update(&self, id: i64, data: &Value) -> ClientResult<Value> {
        self.client
            .send(ApiRequest::put(format!("/questions/{}", id)).json(data))
            .await
    }

    pub async fn batch_update(&self, data: &Value) -> ClientResult<Value> {
        self.client
            .send(ApiRequest::post("/questions/batch").json(data))
            .await
    }

    pub async fn export(&self, params: Value) -> ClientResult<RawResponse> {
        self.client
            .download(ApiRequest::get("/questions/export").query(params))
            .await
    }

    pub async fn categories(&self) -> ClientResult<Value> {
        self.client.send(ApiRequest::get("/questions/categories")).await
    }

    pub async fn reclassify(&self, id: i64) -> ClientResult<Value> {
        self.client
            .send(ApiRequest::post(format!("/questions/{}/reclassify", id)))
            .await
    }
}
