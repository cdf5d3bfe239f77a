use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque identifier the backend hands out to correlate exchanges.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionToken(String);

impl SessionToken {
    /// Wraps a raw token. Empty strings carry no session and yield `None`.
    pub fn new(raw: impl Into<String>) -> Option<Self> {
        let raw = raw.into();
        if raw.is_empty() { None } else { Some(Self(raw)) }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionToken {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.0)
    }
}

/// Wire payload returned by `POST /api/send-message`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendMessageResponse {
    #[serde(default)]
    pub user_message: String,
    pub bot_response: String,
    #[serde(default)]
    pub session_id: Option<String>,
}

/// Transport-level result of one exchange, decoupled from the wire names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExchangeReply {
    pub user_text: String,
    pub bot_text: String,
    pub session_token: Option<SessionToken>,
}

impl From<SendMessageResponse> for ExchangeReply {
    fn from(response: SendMessageResponse) -> Self {
        Self {
            user_text: response.user_message,
            bot_text: response.bot_response,
            session_token: response.session_id.and_then(SessionToken::new),
        }
    }
}
