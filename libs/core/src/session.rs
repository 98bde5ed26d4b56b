use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::destination::ChatId;

/// Shared session client handle held by the HTTP layer for the process lifetime.
pub type SharedSessionClient = Arc<dyn SessionClient>;

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("session transport error: {0}")]
    Transport(String),
    #[error("session bridge returned {status}: {body}")]
    Remote { status: u16, body: String },
    #[error("invalid session bridge response: {0}")]
    Decode(String),
    #[error("{0}")]
    Rejected(String),
}

/// Message received on the chat network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundMessage {
    pub id: String,
    pub from: ChatId,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub from_me: bool,
}

/// Lifecycle and message notifications emitted by the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    /// Pairing is required; `payload` is rendered as a QR code and scanned
    /// from the phone.
    Qr { payload: String },
    Ready,
    Disconnected {
        #[serde(default)]
        reason: Option<String>,
    },
    Message(InboundMessage),
}

impl SessionEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            SessionEvent::Qr { .. } => "qr",
            SessionEvent::Ready => "ready",
            SessionEvent::Disconnected { .. } => "disconnected",
            SessionEvent::Message(_) => "message",
        }
    }
}

/// Authenticated connection to the chat network.
///
/// Implementations own whatever transport drives the session; callers only
/// await the individual operations.
#[async_trait]
pub trait SessionClient: Send + Sync {
    /// Starts the session. Pairing and readiness are reported later as
    /// [`SessionEvent`]s.
    async fn initialize(&self) -> Result<(), SessionError>;

    async fn is_registered_user(&self, id: &ChatId) -> Result<bool, SessionError>;

    async fn send_message(&self, id: &ChatId, text: &str) -> Result<(), SessionError>;

    /// Sends `text` to the sender of `message`, quoting it.
    async fn reply(&self, message: &InboundMessage, text: &str) -> Result<(), SessionError>;
}
