// /auth endpoints
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::client::{ApiClient, ApiRequest};
use crate::error::ClientResult;
use crate::session::UserProfile;

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserProfile,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub username: String,
    pub display_name: String,
    pub password: String,
    /// `admin` or `user`
    pub apply_role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterResponse {
    pub application_id: i64,
}

#[derive(Debug, Clone, Deserialize)]
struct UserEnvelope {
    user: UserProfile,
}

#[derive(Debug, Clone, Deserialize)]
struct Availability {
    available: bool,
}

#[derive(Clone)]
pub struct AuthApi {
    client: ApiClient,
}

impl AuthApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn login(&self, request: &LoginRequest) -> ClientResult<LoginResponse> {
        self.client.post_json("/auth/login", request).await
    }

    pub async fn logout(&self) -> ClientResult<Value> {
        self.client.send(ApiRequest::post("/auth/logout")).await
    }

    pub async fn verify(&self) -> ClientResult<UserProfile> {
        let envelope: UserEnvelope = self.client.get_json("/auth/verify", Value::Null).await?;
        Ok(envelope.user)
    }

    pub async fn register(&self, request: &RegisterRequest) -> ClientResult<RegisterResponse> {
        self.client.post_json("/auth/register", request).await
    }

    pub async fn profile(&self) -> ClientResult<UserProfile> {
        let envelope: UserEnvelope = self.client.get_json("/auth/profile", Value::Null).await?;
        Ok(envelope.user)
    }

    pub async fn check_username(&self, username: &str) -> ClientResult<bool> {
        let availability: Availability = self
            .client
            .post_json("/auth/check-username", &json!({ "username": username }))
            .await?;
        Ok(availability.available)
    }
}
