use std::sync::Arc;

use anyhow::Context;

use crate::client::ApiClient;
use crate::config::{self, ConsoleConfig};
use crate::middleware::{Navigator, TracingNotifier};
use crate::router::Router;
use crate::session::{FileStorage, SessionGate, TokenStore};

/// Everything a command needs: the persisted session, the configured client
/// and the router the client sends forced logouts through
pub struct ConsoleContext {
    pub config: &'static ConsoleConfig,
    pub store: TokenStore,
    pub gate: SessionGate,
    pub router: Router,
    pub client: ApiClient,
}

impl ConsoleContext {
    pub fn open() -> anyhow::Result<Self> {
        let config = config::config();
        let dir = config
            .config_dir()
            .context("Failed to prepare the console config directory")?;
        let storage = FileStorage::open(&dir);
        tracing::debug!("Using session file {}", storage.path().display());

        Ok(Self::with_store(config, TokenStore::new(storage)))
    }

    pub fn with_store(config: &'static ConsoleConfig, store: TokenStore) -> Self {
        let gate = SessionGate::new(store.clone());
        let router = Router::console(gate.clone());
        let client = ApiClient::builder(config.api.clone(), store.clone())
            .notifier(Arc::new(TracingNotifier))
            .navigator(Arc::new(router.clone()) as Arc<dyn Navigator>)
            .build();

        Self {
            config,
            store,
            gate,
            router,
            client,
        }
    }

    /// Fail early with a hint instead of letting the backend answer 401
    pub fn require_session(&self) -> anyhow::Result<()> {
        if !self.gate.is_logged_in() {
            anyhow::bail!("Not logged in. Run `qa-console auth login <username>` first");
        }
        Ok(())
    }
}
