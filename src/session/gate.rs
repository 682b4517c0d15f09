use tokio::sync::watch;

use super::profile::{UserProfile, GUEST_ROLE};
use super::store::TokenStore;

/// Route name to the permissions any one of which grants access
pub const ROUTE_PERMISSIONS: &[(&str, &[&str])] = &[
    ("Dashboard", &["view_dashboard"]),
    ("Questions", &["view_questions"]),
    ("Answers", &["view_answers"]),
    ("Scores", &["view_scores"]),
    ("Settings", &["admin"]),
    ("Monitor", &["view_monitor"]),
];

pub fn required_permissions(route_name: &str) -> &'static [&'static str] {
    ROUTE_PERMISSIONS
        .iter()
        .find(|(name, _)| *name == route_name)
        .map(|(_, perms)| *perms)
        .unwrap_or(&[])
}

/// Read-only session predicates over the token store
#[derive(Clone, Debug)]
pub struct SessionGate {
    store: TokenStore,
}

impl SessionGate {
    pub fn new(store: TokenStore) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &TokenStore {
        &self.store
    }

    pub fn is_logged_in(&self) -> bool {
        self.store.get().is_some()
    }

    /// Profile of the active session; a profile without a token is ignored
    pub fn current_user(&self) -> Option<UserProfile> {
        if !self.is_logged_in() {
            return None;
        }
        self.store.get_user()
    }

    pub fn is_admin(&self) -> bool {
        self.current_user()
            .map(|user| user.is_admin_effective())
            .unwrap_or(false)
    }

    pub fn has_permission(&self, permission: &str) -> bool {
        match self.current_user() {
            Some(user) => user.is_admin_effective() || user.holds(permission),
            None => false,
        }
    }

    /// Routes missing from the table carry no permission requirement
    pub fn can_access_route(&self, route_name: &str) -> bool {
        let Some(user) = self.current_user() else {
            return false;
        };
        if user.is_admin_effective() {
            return true;
        }

        let required = required_permissions(route_name);
        required.is_empty() || required.iter().any(|perm| user.holds(perm))
    }

    pub fn user_role(&self) -> String {
        self.current_user()
            .map(|user| user.role_or_guest().to_string())
            .unwrap_or_else(|| GUEST_ROLE.to_string())
    }

    /// Derived admin flag that follows profile replacements
    pub fn watch_admin(&self) -> AdminWatch {
        AdminWatch {
            rx: self.store.subscribe(),
        }
    }
}

pub struct AdminWatch {
    rx: watch::Receiver<Option<UserProfile>>,
}

impl AdminWatch {
    pub fn current(&self) -> bool {
        self.rx
            .borrow()
            .as_ref()
            .map(UserProfile::is_admin_effective)
            .unwrap_or(false)
    }

    /// Wait for the next profile replacement; `None` once the store is gone
    pub async fn changed(&mut self) -> Option<bool> {
        self.rx.changed().await.ok()?;
        Some(self.current())
    }
}
