// Session lifecycle on top of the auth endpoints and the token store

use thiserror::Error;

use crate::api::{AuthApi, LoginRequest};
use crate::client::ApiClient;
use crate::error::{ClientError, StorageError};
use crate::session::{TokenStore, UserProfile};

#[derive(Debug, Error)]
pub enum AuthError {
    #[error(transparent)]
    Client(#[from] ClientError),

    #[error("Failed to persist session: {0}")]
    Storage(#[from] StorageError),
}

pub type AuthResult<T> = Result<T, AuthError>;

#[derive(Clone)]
pub struct AuthService {
    api: AuthApi,
    store: TokenStore,
}

impl AuthService {
    pub fn new(client: ApiClient) -> Self {
        let store = client.store().clone();
        Self {
            api: AuthApi::new(client),
            store,
        }
    }

    pub fn api(&self) -> &AuthApi {
        &self.api
    }

    pub async fn login(&self, username: &str, password: &str) -> AuthResult<UserProfile> {
        let request = LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        };
        let response = self.api.login(&request).await?;
        self.store.set(&response.token, &response.user)?;
        tracing::info!("Signed in as {} ({})", response.user.label(), response.user.role_or_guest());
        Ok(response.user)
    }

    /// Best effort on the server; the local session is always cleared
    pub async fn logout(&self) {
        if self.store.get().is_some() {
            if let Err(e) = self.api.logout().await {
                tracing::warn!("Logout request failed, clearing local session anyway: {}", e);
            }
        }
        self.store.clear();
    }

    pub async fn verify(&self) -> AuthResult<UserProfile> {
        let user = self.api.verify().await?;
        self.store.update_user(Some(&user))?;
        Ok(user)
    }

    pub async fn refresh_profile(&self) -> AuthResult<UserProfile> {
        let user = self.api.profile().await?;
        self.store.update_user(Some(&user))?;
        Ok(user)
    }
}
