use crate::client::ApiRequest;
use crate::session::TokenStore;

use super::RequestStage;

/// Attaches `Authorization: Bearer <token>` when a session token exists and
/// stamps the request with the session epoch it was issued under
#[derive(Clone, Debug)]
pub struct BearerAuth {
    store: TokenStore,
}

impl BearerAuth {
    pub fn new(store: TokenStore) -> Self {
        Self { store }
    }
}

impl RequestStage for BearerAuth {
    fn name(&self) -> &'static str {
        "bearer_auth"
    }

    fn apply(&self, request: &mut ApiRequest) {
        let (token, epoch) = self.store.token_with_epoch();
        request.epoch = Some(epoch);

        // A missing token is not an error; the backend answers 401 if it cares
        if let Some(token) = token {
            request.set_header("Authorization", format!("Bearer {}", token));
        }
    }
}
