// Request/response pipeline around the HTTP transport

pub mod auth;
pub mod effects;
pub mod response;

use crate::client::ApiRequest;

/// A step applied to every outbound request before it is sent
pub trait RequestStage: Send + Sync {
    fn name(&self) -> &'static str;
    fn apply(&self, request: &mut ApiRequest);
}

pub use auth::BearerAuth;
pub use effects::{
    MemoryNavigator, MemoryNotifier, Navigator, NoopNavigator, NotifyLevel, Notifier,
    SessionTeardown, TracingNotifier, LOGIN_PATH,
};
pub use response::{normalize, Envelope};
