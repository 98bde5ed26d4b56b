//! [`SessionClient`] backed by a browser automation bridge.
//!
//! The bridge drives WhatsApp Web in a headless browser and keeps the
//! authenticated session cached per client id. This module only speaks its
//! small REST surface; lifecycle and inbound messages come back through the
//! `/session/events` webhook.

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response};
use serde::{Deserialize, Serialize};
use tracing::debug;
use wa_relay_core::{ChatId, InboundMessage, SessionClient, SessionError};

use crate::config::RelayConfig;

/// Browser flags passed on session start.
pub const DEFAULT_BROWSER_ARGS: &[&str] = &[
    "--no-sandbox",
    "--disable-setuid-sandbox",
    "--disable-dev-shm-usage",
    "--disable-accelerated-2d-canvas",
    "--no-first-run",
    "--no-zygote",
    // not supported on Windows hosts
    "--single-process",
    "--disable-gpu",
];

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct StartOptions {
    pub headless: bool,
    pub args: Vec<String>,
    pub webhook_url: String,
}

impl StartOptions {
    pub fn new(headless: bool, webhook_url: impl Into<String>) -> Self {
        Self {
            headless,
            args: DEFAULT_BROWSER_ARGS.iter().map(|a| a.to_string()).collect(),
            webhook_url: webhook_url.into(),
        }
    }
}

#[derive(Serialize)]
struct OutgoingMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    quoted_message_id: Option<&'a str>,
}

#[derive(Deserialize)]
struct RegisteredResponse {
    registered: bool,
}

#[derive(Deserialize)]
struct SentResponse {
    #[serde(default)]
    id: Option<String>,
}

pub struct BridgeSessionClient {
    http: reqwest::Client,
    base: String,
    client_id: String,
    token: Option<String>,
    start: StartOptions,
}

impl BridgeSessionClient {
    pub fn new(
        http: reqwest::Client,
        base: impl Into<String>,
        client_id: impl Into<String>,
        token: Option<String>,
        start: StartOptions,
    ) -> Self {
        let base: String = base.into();
        Self {
            http,
            base: base.trim_end_matches('/').to_string(),
            client_id: client_id.into(),
            token,
            start,
        }
    }

    pub fn from_config(config: &RelayConfig) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(config.bridge_timeout())
            .build()?;
        Ok(Self::new(
            http,
            config.bridge_url.clone(),
            config.client_id.clone(),
            config.bridge_token.clone(),
            StartOptions::new(config.headless, config.webhook_url()),
        ))
    }

    fn url(&self, path: &str) -> String {
        format!(
            "{}/sessions/{}/{}",
            self.base,
            urlencoding::encode(&self.client_id),
            path
        )
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self.http.request(method, self.url(path));
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn execute(&self, builder: RequestBuilder) -> Result<Response, SessionError> {
        let response = builder
            .send()
            .await
            .map_err(|err| SessionError::Transport(err.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SessionError::Remote {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    async fn post_message(&self, message: OutgoingMessage<'_>) -> Result<(), SessionError> {
        let response = self
            .execute(self.request(Method::POST, "messages").json(&message))
            .await?;
        // The message id is informational; an empty body still means accepted.
        if let Ok(SentResponse { id: Some(id) }) = response.json::<SentResponse>().await {
            debug!(message_id = %id, "bridge accepted message");
        }
        Ok(())
    }
}

#[async_trait]
impl SessionClient for BridgeSessionClient {
    async fn initialize(&self) -> Result<(), SessionError> {
        self.execute(self.request(Method::POST, "start").json(&self.start))
            .await?;
        Ok(())
    }

    async fn is_registered_user(&self, id: &ChatId) -> Result<bool, SessionError> {
        let path = format!("contacts/{}/registered", urlencoding::encode(id.as_str()));
        let response = self.execute(self.request(Method::GET, &path)).await?;
        let body: RegisteredResponse = response
            .json()
            .await
            .map_err(|err| SessionError::Decode(err.to_string()))?;
        Ok(body.registered)
    }

    async fn send_message(&self, id: &ChatId, text: &str) -> Result<(), SessionError> {
        self.post_message(OutgoingMessage {
            chat_id: id.as_str(),
            text,
            quoted_message_id: None,
        })
        .await
    }

    async fn reply(&self, message: &InboundMessage, text: &str) -> Result<(), SessionError> {
        self.post_message(OutgoingMessage {
            chat_id: message.from.as_str(),
            text,
            quoted_message_id: Some(&message.id),
        })
        .await
    }
}
