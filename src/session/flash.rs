//! One-shot notifications carried across a redirect in the `flash-data` cookie.
//!
//! The server keeps no flash state. The cookie value is a JSON array of
//! `{"kind": .., "text": ..}` objects, URL-safe base64 encoded and signed by
//! the cookie jar.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

use super::cookies::CookieCarrier;

/// Form field a data flash re-populates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlashField {
    Email,
    Username,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum FlashKind {
    Info,
    Error,
    Data(FlashField),
}

impl fmt::Display for FlashKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => f.write_str("info"),
            Self::Error => f.write_str("error"),
            Self::Data(FlashField::Email) => f.write_str("data:email"),
            Self::Data(FlashField::Username) => f.write_str("data:username"),
        }
    }
}

impl FromStr for FlashKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "info" => Ok(Self::Info),
            "error" => Ok(Self::Error),
            "data:email" => Ok(Self::Data(FlashField::Email)),
            "data:username" => Ok(Self::Data(FlashField::Username)),
            other => Err(format!("unknown flash kind: {other}")),
        }
    }
}

impl TryFrom<String> for FlashKind {
    type Error = String;

    fn try_from(value: String) -> Result<Self, <FlashKind as TryFrom<String>>::Error> {
        value.parse()
    }
}

impl From<FlashKind> for String {
    fn from(kind: FlashKind) -> Self {
        kind.to_string()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlashMessage {
    pub kind: FlashKind,
    pub text: String,
}

impl FlashMessage {
    #[must_use]
    pub fn new(kind: FlashKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }

    /// Data flashes fill a form field instead of showing a banner.
    #[must_use]
    pub const fn is_banner(&self) -> bool {
        !matches!(self.kind, FlashKind::Data(_))
    }
}

#[must_use]
pub fn encode(messages: &[FlashMessage]) -> String {
    // Serializing plain strings cannot fail.
    let json = serde_json::to_vec(messages).unwrap_or_default();
    URL_SAFE_NO_PAD.encode(json)
}

/// Decode a cookie value. Anything malformed decodes to an empty queue.
#[must_use]
pub fn decode(value: &str) -> Vec<FlashMessage> {
    let Ok(bytes) = URL_SAFE_NO_PAD.decode(value) else {
        debug!("Discarding flash cookie that is not base64");
        return Vec::new();
    };
    serde_json::from_slice(&bytes).unwrap_or_else(|err| {
        debug!("Discarding undecodable flash cookie: {err}");
        Vec::new()
    })
}

impl CookieCarrier {
    /// Messages waiting in the flash cookie, oldest first.
    #[must_use]
    pub fn pending_flashes(&self) -> Vec<FlashMessage> {
        self.flash_value()
            .map(|value| decode(&value))
            .unwrap_or_default()
    }

    /// Append a message to the outgoing flash cookie.
    #[must_use]
    pub fn enqueue_flash(self, kind: FlashKind, text: impl Into<String>) -> Self {
        let mut messages = self.pending_flashes();
        messages.push(FlashMessage::new(kind, text));
        let value = encode(&messages);
        self.with_flash_value(value)
    }

    /// Take every pending message and expire the flash cookie in the same
    /// response.
    #[must_use]
    pub fn drain_flashes(self) -> (Self, Vec<FlashMessage>) {
        if self.flash_value().is_none() {
            return (self, Vec::new());
        }
        let messages = self.pending_flashes();
        (self.without_flash(), messages)
    }
}

/// Drained flashes split for rendering.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FlashView {
    pub banners: Vec<FlashMessage>,
    pub email: Option<String>,
    pub username: Option<String>,
}

impl From<Vec<FlashMessage>> for FlashView {
    fn from(messages: Vec<FlashMessage>) -> Self {
        let mut view = Self::default();
        for message in messages {
            match message.kind {
                FlashKind::Data(FlashField::Email) => view.email = Some(message.text),
                FlashKind::Data(FlashField::Username) => view.username = Some(message.text),
                FlashKind::Info | FlashKind::Error => view.banners.push(message),
            }
        }
        view
    }
}
