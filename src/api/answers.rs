// /answers endpoints
use serde_json::{json, Value};

use crate::client::{ApiClient, ApiRequest, RawResponse};
use crate::error::ClientResult;

#[derive(Clone)]
pub struct AnswersApi {
    client: ApiClient,
}

impl AnswersApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn list(&self, params: Value) -> ClientResult<Value> {
        self.client.send(ApiRequest::get("/answers").query(params)).await
    }

    pub async fn detail(&self, answer_id: i64) -> ClientResult<Value> {
        self.client
            .send(ApiRequest::get(format!("/answers/{}", answer_id)))
            .await
    }

    /// Every model's answer to one question, side by side
    pub async fn comparison(&self, question_id: i64) -> ClientResult<Value> {
        self.client
            .send(ApiRequest::get("/answers/comparison").query(json!({ "question_id": question_id })))
            .await
    }

    pub async fn batch_score(&self, data: &Value) -> ClientResult<Value> {
        self.client
            .send(ApiRequest::post("/answers/batch-score").json(data))
            .await
    }

    /// The export filters travel in the POST body
    pub async fn export(&self, params: &Value) -> ClientResult<RawResponse> {
        self.client
            .download(ApiRequest::post("/answers/export").json(params))
            .await
    }

    pub async fn statistics(&self, params: Value) -> ClientResult<Value> {
        self.client
            .send(ApiRequest::get("/answers/statistics").query(params))
            .await
    }

    pub async fn update_status(&self, answer_id: i64, data: &Value) -> ClientResult<Value> {
        self.client
            .send(ApiRequest::put(format!("/answers/{}/status", answer_id)).json(data))
            .await
    }
}
