use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsoleConfig {
    pub environment: Environment,
    pub api: ApiSettings,
    pub session: SessionSettings,
    pub ui: UiSettings,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

/// Backend connection settings shared by every request the console issues
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiSettings {
    pub base_url: String,
    pub timeout_secs: u64,
    /// Envelope `code` value the backend uses for success
    pub success_code: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSettings {
    pub config_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiSettings {
    pub title_suffix: String,
    pub refresh_interval_secs: u64,
    pub notify_success: bool,
}

impl ApiSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000/api".to_string(),
            timeout_secs: 30,
            success_code: 200,
        }
    }
}

impl UiSettings {
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            title_suffix: "AI问答平台管理后台".to_string(),
            refresh_interval_secs: 30,
            notify_success: true,
        }
    }
}

impl ConsoleConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // API overrides
        if let Ok(v) = env::var("QA_API_BASE_URL") {
            let trimmed = v.trim();
            if !trimmed.is_empty() {
                self.api.base_url = trimmed.to_string();
            }
        }
        if let Ok(v) = env::var("QA_API_TIMEOUT_SECS") {
            self.api.timeout_secs = v.parse().unwrap_or(self.api.timeout_secs);
        }
        if let Ok(v) = env::var("QA_API_SUCCESS_CODE") {
            self.api.success_code = v.parse().unwrap_or(self.api.success_code);
        }

        // Session overrides
        if let Ok(v) = env::var("QA_CONSOLE_CONFIG_DIR") {
            if !v.trim().is_empty() {
                self.session.config_dir = Some(PathBuf::from(v));
            }
        }

        // UI overrides
        if let Ok(v) = env::var("QA_TITLE_SUFFIX") {
            self.ui.title_suffix = v;
        }
        if let Ok(v) = env::var("QA_REFRESH_INTERVAL_SECS") {
            self.ui.refresh_interval_secs = v.parse().unwrap_or(self.ui.refresh_interval_secs);
        }
        if let Ok(v) = env::var("QA_NOTIFY_SUCCESS") {
            self.ui.notify_success = v.parse().unwrap_or(self.ui.notify_success);
        }

        self
    }

    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            api: ApiSettings::default(),
            session: SessionSettings { config_dir: None },
            ui: UiSettings::default(),
        }
    }

    pub fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            api: ApiSettings {
                base_url: "https://staging.example.com/api".to_string(),
                ..ApiSettings::default()
            },
            session: SessionSettings { config_dir: None },
            ui: UiSettings::default(),
        }
    }

    pub fn production() -> Self {
        Self {
            environment: Environment::Production,
            api: ApiSettings {
                base_url: "https://qa.example.com/api".to_string(),
                ..ApiSettings::default()
            },
            session: SessionSettings { config_dir: None },
            ui: UiSettings {
                notify_success: false,
                ..UiSettings::default()
            },
        }
    }

    /// Directory holding the persisted session, created on demand
    pub fn config_dir(&self) -> anyhow::Result<PathBuf> {
        let dir = match &self.session.config_dir {
            Some(dir) => dir.clone(),
            None => {
                let home = env::var("HOME")
                    .map_err(|_| anyhow::anyhow!("HOME environment variable not set"))?;
                PathBuf::from(home).join(".config").join("qa-console")
            }
        };

        if !dir.exists() {
            std::fs::create_dir_all(&dir)?;
        }

        Ok(dir)
    }
}

// Global singleton config - initialized on first access
pub static CONFIG: Lazy<ConsoleConfig> = Lazy::new(ConsoleConfig::from_env);

pub fn config() -> &'static ConsoleConfig {
    &CONFIG
}

#[macro_export]
macro_rules! is_production {
    () => {
        matches!($crate::config::CONFIG.environment, $crate::config::Environment::Production)
    };
}
