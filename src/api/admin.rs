// /admin endpoints: role applications and user management
use serde_json::{json, Value};

use crate::client::{ApiClient, ApiRequest};
use crate::error::ClientResult;

#[derive(Clone)]
pub struct AdminApi {
    client: ApiClient,
}

impl AdminApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn applications(&self, params: Value) -> ClientResult<Value> {
        self.client
            .send(ApiRequest::get("/admin/applications").query(params))
            .await
    }

    pub async fn approve_application(&self, id: i64) -> ClientResult<Value> {
        self.client
            .send(ApiRequest::post(format!("/admin/applications/{}/approve", id)))
            .await
    }

    pub async fn reject_application(&self, id: i64) -> ClientResult<Value> {
        self.client
            .send(ApiRequest::post(format!("/admin/applications/{}/reject", id)))
            .await
    }

    pub async fn users(&self, params: Value) -> ClientResult<Value> {
        self.client.send(ApiRequest::get("/admin/users").query(params)).await
    }

    /// `status` is `active` or `inactive`
    pub async fn update_user_status(&self, id: i64, status: &str) -> ClientResult<Value> {
        self.client
            .send(ApiRequest::put(format!("/admin/users/{}", id)).json(&json!({ "status": status })))
            .await
    }

    pub async fn delete_user(&self, id: i64) -> ClientResult<Value> {
        self.client
            .send(ApiRequest::delete(format!("/admin/users/{}", id)))
            .await
    }
}
