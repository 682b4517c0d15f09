use serde::{Deserialize, Serialize};

/// Cached profile of the signed-in user, always replaced wholesale
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default)]
    pub role: String,
    #[serde(default, rename = "isAdmin", skip_serializing_if = "Option::is_none")]
    pub is_admin: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permissions: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

pub const ADMIN_ROLE: &str = "admin";
pub const GUEST_ROLE: &str = "guest";

impl UserProfile {
    pub fn with_role(role: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            ..Self::default()
        }
    }

    pub fn admin_flag(mut self, is_admin: bool) -> Self {
        self.is_admin = Some(is_admin);
        self
    }

    pub fn with_permissions<I, S>(mut self, permissions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.permissions = Some(permissions.into_iter().map(Into::into).collect());
        self
    }

    pub fn is_admin_effective(&self) -> bool {
        self.role == ADMIN_ROLE || self.is_admin == Some(true)
    }

    pub fn holds(&self, permission: &str) -> bool {
        self.permissions
            .as_deref()
            .map(|perms| perms.iter().any(|p| p == permission))
            .unwrap_or(false)
    }

    pub fn role_or_guest(&self) -> &str {
        if self.role.is_empty() {
            GUEST_ROLE
        } else {
            &self.role
        }
    }

    /// Name shown in the console header
    pub fn label(&self) -> &str {
        self.display_name
            .as_deref()
            .or(self.username.as_deref())
            .unwrap_or(GUEST_ROLE)
    }
}
