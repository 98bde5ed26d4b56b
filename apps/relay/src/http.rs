use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    Form, Json, Router,
    body::Bytes,
    extract::{FromRequest, Request, State},
    http::header::CONTENT_TYPE,
    middleware,
    routing::{get, post},
};
use serde_json::{Map, Value};
use tracing::{error, info, warn};
use wa_relay_core::{DestinationNormalizer, PingCommand, SharedSessionClient};
use wa_relay_telemetry::{SendOutcome, record_send};

use crate::config::RelayConfig;
use crate::error::{ApiResponse, FieldErrors, RelayError};
use crate::events::{EventDispatcher, receive_event};
use crate::middleware::{verify_bridge_token, with_request_id};

const INVALID_VALUE: &str = "Invalid value";

#[derive(Clone)]
pub struct RelayState {
    pub session: SharedSessionClient,
    pub normalizer: DestinationNormalizer,
    pub events: Arc<EventDispatcher>,
    pub bridge_token: Option<String>,
}

impl RelayState {
    pub fn new(session: SharedSessionClient) -> Self {
        Self {
            events: Arc::new(EventDispatcher::new(session.clone(), PingCommand::default())),
            session,
            normalizer: DestinationNormalizer::default(),
            bridge_token: None,
        }
    }

    pub fn from_config(config: &RelayConfig, session: SharedSessionClient) -> Self {
        let ping = PingCommand::new(config.ping_command.clone(), config.ping_reply.clone());
        Self {
            events: Arc::new(EventDispatcher::new(session.clone(), ping)),
            session,
            normalizer: DestinationNormalizer::new(config.country_code.clone()),
            bridge_token: config.bridge_token.clone(),
        }
    }

    pub fn with_bridge_token(mut self, token: impl Into<String>) -> Self {
        self.bridge_token = Some(token.into());
        self
    }
}

pub fn build_router(state: RelayState) -> Router {
    let session_events = Router::new()
        .route("/session/events", post(receive_event))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            verify_bridge_token,
        ));

    Router::new()
        .route("/send/message", post(send_message))
        .route("/healthz", get(healthz))
        .merge(session_events)
        .layer(middleware::from_fn(with_request_id))
        .with_state(state)
}

async fn healthz() -> &'static str {
    "ok"
}

/// Request body accepted as JSON or url-encoded form, kept untyped until
/// validation.
#[derive(Debug, Default)]
pub struct UntypedBody(pub Map<String, Value>);

impl<S> FromRequest<S> for UntypedBody
where
    S: Send + Sync,
{
    type Rejection = RelayError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_ascii_lowercase();

        if content_type.starts_with("application/x-www-form-urlencoded") {
            let Form(fields) = Form::<HashMap<String, String>>::from_request(req, state)
                .await
                .map_err(|rejection| RelayError::BadBody(rejection.body_text()))?;
            let map = fields
                .into_iter()
                .map(|(key, value)| (key, Value::String(value)))
                .collect();
            return Ok(Self(map));
        }

        if content_type.starts_with("application/json") {
            let bytes = Bytes::from_request(req, state)
                .await
                .map_err(|rejection| RelayError::BadBody(rejection.body_text()))?;
            if bytes.is_empty() {
                return Ok(Self::default());
            }
            let value: Value = serde_json::from_slice(&bytes)
                .map_err(|err| RelayError::BadBody(err.to_string()))?;
            return Ok(match value {
                Value::Object(map) => Self(map),
                _ => Self::default(),
            });
        }

        // Unparsed content types leave every field missing.
        Ok(Self::default())
    }
}

/// Validated `/send/message` input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundRequest {
    pub number: String,
    pub message: String,
}

impl OutboundRequest {
    pub fn from_body(body: &Map<String, Value>) -> Result<Self, RelayError> {
        let number = required_field(body, "number");
        let message = required_field(body, "message");

        match (number, message) {
            (Some(number), Some(message)) => Ok(Self { number, message }),
            (number, message) => {
                let mut fields = FieldErrors::new();
                if number.is_none() {
                    fields.insert("number".into(), INVALID_VALUE.into());
                }
                if message.is_none() {
                    fields.insert("message".into(), INVALID_VALUE.into());
                }
                Err(RelayError::Validation(fields))
            }
        }
    }
}

fn required_field(body: &Map<String, Value>, name: &str) -> Option<String> {
    match body.get(name)? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        // Only integral numbers; floats would leak `.0` or exponent digits.
        Value::Number(n) => n
            .as_u64()
            .map(|v| v.to_string())
            .or_else(|| n.as_i64().map(|v| v.to_string())),
        _ => None,
    }
}

/// `POST /send/message`.
pub async fn send_message(
    State(state): State<RelayState>,
    UntypedBody(body): UntypedBody,
) -> Result<Json<ApiResponse>, RelayError> {
    let request = OutboundRequest::from_body(&body)?;
    let destination = state.normalizer.normalize(&request.number);

    let registered = match state.session.is_registered_user(&destination).await {
        Ok(registered) => registered,
        Err(err) => {
            error!(
                destination = destination.display_number(),
                error = %err,
                "request: failed to check registration of {}",
                destination.display_number()
            );
            record_send(SendOutcome::Failed);
            return Err(RelayError::Delivery(err));
        }
    };
    if !registered {
        warn!(
            destination = destination.display_number(),
            "request: {} is not registered in whatsapp",
            destination.display_number()
        );
        record_send(SendOutcome::Unregistered);
        return Err(RelayError::NotRegistered);
    }

    match state
        .session
        .send_message(&destination, &request.message)
        .await
    {
        Ok(()) => {
            info!(
                destination = destination.display_number(),
                "request: send message to {}",
                destination.display_number()
            );
            record_send(SendOutcome::Success);
            Ok(Json(ApiResponse::success()))
        }
        Err(err) => {
            error!(
                destination = destination.display_number(),
                error = %err,
                "request: failed send a message to {}",
                destination.display_number()
            );
            record_send(SendOutcome::Failed);
            Err(RelayError::Delivery(err))
        }
    }
}
