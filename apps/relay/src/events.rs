//! Session events pushed by the automation bridge.
//!
//! Pairing, ready and disconnect notifications are only logged. Inbound chat
//! messages go through the [`PingCommand`] rule and may trigger a reply.

use std::io::Write;

use axum::{
    Extension, Json,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::json;
use tracing::{debug, info, warn};
use wa_relay_core::{InboundMessage, PingCommand, SessionEvent, SharedSessionClient};
use wa_relay_telemetry::record_session_event;

use crate::http::RelayState;
use crate::middleware::RequestId;
use crate::pairing::render_pairing_code;

pub struct EventDispatcher {
    session: SharedSessionClient,
    ping: PingCommand,
}

impl EventDispatcher {
    pub fn new(session: SharedSessionClient, ping: PingCommand) -> Self {
        Self { session, ping }
    }

    pub async fn dispatch(&self, event: SessionEvent) {
        record_session_event(event.kind());
        match event {
            SessionEvent::Qr { payload } => {
                warn!("whatsapp need authentication");
                show_pairing_code(&payload);
            }
            SessionEvent::Ready => info!("whatsapp is running"),
            SessionEvent::Disconnected { reason } => match reason {
                Some(reason) => warn!(%reason, "whatsapp disconnected"),
                None => warn!("whatsapp disconnected"),
            },
            SessionEvent::Message(message) => self.on_message(&message).await,
        }
    }

    async fn on_message(&self, message: &InboundMessage) {
        let Some(reply) = self.ping.reply_for(message) else {
            return;
        };
        debug!(from = %message.from, command = self.ping.command(), "answering command");
        if let Err(err) = self.session.reply(message, &reply).await {
            warn!(from = %message.from, error = %err, "failed to reply to command");
        }
    }
}

fn show_pairing_code(payload: &str) {
    match render_pairing_code(payload) {
        Ok(rendered) => {
            let mut out = std::io::stdout().lock();
            if let Err(err) = writeln!(out, "{rendered}") {
                warn!(error = %err, "failed to print pairing code");
            }
        }
        Err(err) => warn!(error = %err, "failed to render pairing code"),
    }
}

/// `POST /session/events`: dispatch one event, then acknowledge.
pub async fn receive_event(
    State(state): State<RelayState>,
    Extension(RequestId(request_id)): Extension<RequestId>,
    Json(event): Json<SessionEvent>,
) -> impl IntoResponse {
    state.events.dispatch(event).await;
    (
        StatusCode::ACCEPTED,
        Json(json!({ "ok": true, "request_id": request_id })),
    )
}
