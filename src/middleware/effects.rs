// Side effects the request pipeline triggers: user notifications, navigation
// and session teardown on 401

use std::sync::{Arc, Mutex};

use serde::Serialize;

use crate::session::TokenStore;

pub const LOGIN_PATH: &str = "/login";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotifyLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// Transient user-visible notification (toast)
pub trait Notifier: Send + Sync {
    fn notify(&self, level: NotifyLevel, message: &str);

    fn success(&self, message: &str) {
        self.notify(NotifyLevel::Success, message);
    }

    fn error(&self, message: &str) {
        self.notify(NotifyLevel::Error, message);
    }
}

/// Routes notifications into the log
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, level: NotifyLevel, message: &str) {
        match level {
            NotifyLevel::Error => tracing::error!(target: "qa_console::notify", "{}", message),
            NotifyLevel::Warning => tracing::warn!(target: "qa_console::notify", "{}", message),
            _ => tracing::info!(target: "qa_console::notify", "{}", message),
        }
    }
}

/// Keeps every notification, newest last
#[derive(Debug, Default)]
pub struct MemoryNotifier {
    messages: Mutex<Vec<(NotifyLevel, String)>>,
}

impl MemoryNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<(NotifyLevel, String)> {
        self.messages.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn errors(&self) -> Vec<String> {
        self.messages()
            .into_iter()
            .filter(|(level, _)| *level == NotifyLevel::Error)
            .map(|(_, message)| message)
            .collect()
    }

    pub fn take(&self) -> Vec<(NotifyLevel, String)> {
        std::mem::take(&mut *self.messages.lock().unwrap_or_else(|e| e.into_inner()))
    }
}

impl Notifier for MemoryNotifier {
    fn notify(&self, level: NotifyLevel, message: &str) {
        self.messages
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push((level, message.to_string()));
    }
}

/// Hard navigation triggered outside the normal route flow
pub trait Navigator: Send + Sync {
    fn redirect(&self, path: &str);
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopNavigator;

impl Navigator for NoopNavigator {
    fn redirect(&self, path: &str) {
        tracing::debug!("Redirect to {} requested with no navigator attached", path);
    }
}

/// Records redirects in order
#[derive(Debug, Default)]
pub struct MemoryNavigator {
    redirects: Mutex<Vec<String>>,
}

impl MemoryNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn redirects(&self) -> Vec<String> {
        self.redirects.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

impl Navigator for MemoryNavigator {
    fn redirect(&self, path: &str) {
        self.redirects
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(path.to_string());
    }
}

/// Forced logout after the backend rejects the session
#[derive(Clone)]
pub struct SessionTeardown {
    store: TokenStore,
    navigator: Arc<dyn Navigator>,
}

impl SessionTeardown {
    pub fn new(store: TokenStore, navigator: Arc<dyn Navigator>) -> Self {
        Self { store, navigator }
    }

    /// Clear the session the failed request was issued under and send the user
    /// to the login page. Only the first 401 of a session does anything; later
    /// ones, or ones from a session already replaced, are ignored.
    pub fn handle_unauthorized(&self, request_epoch: Option<u64>) -> bool {
        let epoch = request_epoch.unwrap_or_else(|| self.store.epoch());
        if !self.store.invalidate_if_current(epoch) {
            tracing::debug!("Ignoring 401 from session epoch {} (already torn down)", epoch);
            return false;
        }

        tracing::warn!("Session rejected by backend, redirecting to {}", LOGIN_PATH);
        self.navigator.redirect(LOGIN_PATH);
        true
    }
}
