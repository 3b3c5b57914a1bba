//! One-shot messages carried across a redirect in a cookie.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashLevel {
    Success,
    Info,
    Error,
}

impl FlashLevel {
    pub fn css_class(&self) -> &'static str {
        match self {
            FlashLevel::Success => "flash-success",
            FlashLevel::Info => "flash-info",
            FlashLevel::Error => "flash-error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlashMessage {
    pub level: FlashLevel,
    pub text: String,
}

impl FlashMessage {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            level: FlashLevel::Success,
            text: text.into(),
        }
    }

    pub fn info(text: impl Into<String>) -> Self {
        Self {
            level: FlashLevel::Info,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            level: FlashLevel::Error,
            text: text.into(),
        }
    }
}

/// Encodes messages as URL-safe base64 JSON, which is valid cookie text.
pub fn encode(messages: &[FlashMessage]) -> String {
    let json = serde_json::to_vec(messages).unwrap_or_default();
    URL_SAFE_NO_PAD.encode(json)
}

/// Decodes a cookie value. Anything malformed yields no messages.
pub fn decode(raw: &str) -> Vec<FlashMessage> {
    URL_SAFE_NO_PAD
        .decode(raw)
        .ok()
        .and_then(|bytes| serde_json::from_slice(&bytes).ok())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_is_cookie_safe() {
        let encoded = encode(&[FlashMessage::success("Reservation created; see you!")]);
        assert!(encoded
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }

    #[test]
    fn test_decode_restores_messages() {
        let messages = vec![
            FlashMessage::info("This reservation was already cancelled."),
            FlashMessage::error("Nope"),
        ];
        assert_eq!(decode(&encode(&messages)), messages);
    }

    #[test]
    fn test_decode_garbage() {
        assert!(decode("%%%").is_empty());
        assert!(decode(&URL_SAFE_NO_PAD.encode(b"not json")).is_empty());
    }

    #[test]
    fn test_css_class() {
        assert_eq!(FlashLevel::Info.css_class(), "flash-info");
    }
}
