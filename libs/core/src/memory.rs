use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::destination::ChatId;
use crate::session::{InboundMessage, SessionClient, SessionError};

/// Message handed to [`InMemorySessionClient::send_message`] or `reply`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    pub to: ChatId,
    pub text: String,
    pub quoted: Option<String>,
}

#[derive(Default)]
struct Inner {
    registered: HashSet<ChatId>,
    accept_all: bool,
    send_failure: Option<String>,
    initialized: bool,
    checked: Vec<ChatId>,
    sent: Vec<SentMessage>,
}

/// Session client that keeps everything in process. Sends are recorded
/// instead of delivered.
#[derive(Clone, Default)]
pub struct InMemorySessionClient {
    inner: Arc<Mutex<Inner>>,
}

impl InMemorySessionClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Treats every identifier as a registered user.
    pub fn accepting_all() -> Self {
        let inner = Inner {
            accept_all: true,
            ..Inner::default()
        };
        Self {
            inner: Arc::new(Mutex::new(inner)),
        }
    }

    pub async fn register(&self, id: ChatId) {
        self.inner.lock().await.registered.insert(id);
    }

    /// Makes every following send fail with `detail`.
    pub async fn fail_sends_with(&self, detail: impl Into<String>) {
        self.inner.lock().await.send_failure = Some(detail.into());
    }

    pub async fn is_initialized(&self) -> bool {
        self.inner.lock().await.initialized
    }

    pub async fn checked(&self) -> Vec<ChatId> {
        self.inner.lock().await.checked.clone()
    }

    pub async fn take_sent(&self) -> Vec<SentMessage> {
        let mut guard = self.inner.lock().await;
        std::mem::take(&mut guard.sent)
    }

    async fn record(&self, message: SentMessage) -> Result<(), SessionError> {
        let mut guard = self.inner.lock().await;
        if let Some(detail) = guard.send_failure.clone() {
            return Err(SessionError::Rejected(detail));
        }
        guard.sent.push(message);
        Ok(())
    }
}

#[async_trait]
impl SessionClient for InMemorySessionClient {
    async fn initialize(&self) -> Result<(), SessionError> {
        self.inner.lock().await.initialized = true;
        Ok(())
    }

    async fn is_registered_user(&self, id: &ChatId) -> Result<bool, SessionError> {
        let mut guard = self.inner.lock().await;
        guard.checked.push(id.clone());
        Ok(guard.accept_all || guard.registered.contains(id))
    }

    async fn send_message(&self, id: &ChatId, text: &str) -> Result<(), SessionError> {
        self.record(SentMessage {
            to: id.clone(),
            text: text.to_string(),
            quoted: None,
        })
        .await
    }

    async fn reply(&self, message: &InboundMessage, text: &str) -> Result<(), SessionError> {
        self.record(SentMessage {
            to: message.from.clone(),
            text: text.to_string(),
            quoted: Some(message.id.clone()),
        })
        .await
    }
}
