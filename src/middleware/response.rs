use serde::Deserialize;
use serde_json::Value;

use crate::error::{ClientError, ClientResult, MSG_REQUEST_FAILED};

/// Uniform backend wrapper `{success?, code?, message?, data}`
#[derive(Debug, Default, Deserialize)]
pub struct Envelope {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub code: Option<Value>,
    #[serde(default)]
    pub message: Option<String>,
}

impl Envelope {
    fn from_body(body: &[u8]) -> Option<Self> {
        serde_json::from_slice(body).ok()
    }

    fn failure_message(&self) -> String {
        self.message
            .clone()
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| MSG_REQUEST_FAILED.to_string())
    }
}

/// Turn a transport response into the payload or a classified error.
///
/// Non-2xx statuses map by status. For 2xx bodies, a present `code` other than
/// `success_code` or `success: false` is a business failure; otherwise `data`
/// is returned (the whole body when the backend sent no `data` field).
pub fn normalize(status: u16, body: &[u8], success_code: i64) -> ClientResult<Value> {
    if !(200..300).contains(&status) {
        let message = Envelope::from_body(body).and_then(|env| env.message);
        return Err(ClientError::from_status(status, message.as_deref()));
    }

    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Null);
    }

    let value: Value = serde_json::from_slice(body)?;
    let Value::Object(mut map) = value else {
        return Ok(value);
    };

    let envelope: Envelope = serde_json::from_value(Value::Object(map.clone()))?;

    if let Some(code) = &envelope.code {
        if code.as_i64() != Some(success_code) {
            return Err(ClientError::Business {
                code: code.as_i64(),
                message: envelope.failure_message(),
            });
        }
    }

    if envelope.success == Some(false) {
        return Err(ClientError::Business {
            code: None,
            message: envelope.failure_message(),
        });
    }

    match map.remove("data") {
        Some(data) => Ok(data),
        None => Ok(Value::Object(map)),
    }
}
