// Client-side error taxonomy for calls made through the API facade
use thiserror::Error;

pub const MSG_REQUEST_FAILED: &str = "请求失败";
pub const MSG_UNAUTHORIZED: &str = "未授权，请重新登录";
pub const MSG_FORBIDDEN: &str = "拒绝访问";
pub const MSG_NOT_FOUND: &str = "请求地址不存在";
pub const MSG_SERVER_ERROR: &str = "服务器内部错误";
pub const MSG_TIMEOUT: &str = "请求超时";
pub const MSG_NETWORK: &str = "网络连接失败";
pub const MSG_DECODE: &str = "响应解析失败";

/// Failure of a single backend call, already resolved to a user-facing message
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ClientError {
    // Envelope carried a non-success code or `success: false`
    #[error("{message}")]
    Business { code: Option<i64>, message: String },

    // 401 - session is gone, teardown already triggered
    #[error("{}", MSG_UNAUTHORIZED)]
    Unauthorized,

    // 403
    #[error("{}", MSG_FORBIDDEN)]
    Forbidden,

    // 404
    #[error("{}", MSG_NOT_FOUND)]
    NotFound,

    // 5xx
    #[error("{}", MSG_SERVER_ERROR)]
    Server { status: u16 },

    // Any other non-2xx status
    #[error("{message}")]
    Status { status: u16, message: String },

    #[error("{}", MSG_TIMEOUT)]
    Timeout,

    #[error("{}", MSG_NETWORK)]
    Network(String),

    #[error("{}", MSG_DECODE)]
    Decode(String),
}

impl ClientError {
    pub fn business(message: impl Into<String>) -> Self {
        ClientError::Business {
            code: None,
            message: message.into(),
        }
    }

    /// Map a transport status to its error, preferring the server's message for
    /// statuses without a fixed one
    pub fn from_status(status: u16, server_message: Option<&str>) -> Self {
        match status {
            401 => ClientError::Unauthorized,
            403 => ClientError::Forbidden,
            404 => ClientError::NotFound,
            500..=599 => ClientError::Server { status },
            _ => ClientError::Status {
                status,
                message: server_message
                    .filter(|m| !m.is_empty())
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("{} ({})", MSG_REQUEST_FAILED, status)),
            },
        }
    }

    /// Message surfaced to the user in notifications
    pub fn message(&self) -> String {
        self.to_string()
    }

    /// Transport status associated with the error, if any
    pub fn status_code(&self) -> Option<u16> {
        match self {
            ClientError::Unauthorized => Some(401),
            ClientError::Forbidden => Some(403),
            ClientError::NotFound => Some(404),
            ClientError::Server { status } => Some(*status),
            ClientError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Stable code for JSON output
    pub fn error_code(&self) -> &'static str {
        match self {
            ClientError::Business { .. } => "BUSINESS_ERROR",
            ClientError::Unauthorized => "UNAUTHORIZED",
            ClientError::Forbidden => "FORBIDDEN",
            ClientError::NotFound => "NOT_FOUND",
            ClientError::Server { .. } => "SERVER_ERROR",
            ClientError::Status { .. } => "HTTP_ERROR",
            ClientError::Timeout => "TIMEOUT",
            ClientError::Network(_) => "NETWORK_ERROR",
            ClientError::Decode(_) => "DECODE_ERROR",
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ClientError::Unauthorized)
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::Decode(err.to_string())
    }
}

pub type ClientResult<T> = Result<T, ClientError>;

/// Failures of the persisted key/value storage behind the token store
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}
