//! HTTP relay in front of a WhatsApp session.
//!
//! `POST /send/message` validates and normalizes the destination, checks that it
//! is a registered WhatsApp user and forwards the text through the configured
//! [`SessionClient`](wa_relay_core::SessionClient). `POST /session/events`
//! receives lifecycle and inbound-message events from the automation bridge.
pub mod bridge;
pub mod config;
pub mod error;
pub mod events;
pub mod http;
pub mod middleware;
pub mod pairing;

pub use bridge::{BridgeSessionClient, StartOptions};
pub use config::RelayConfig;
pub use error::{ApiResponse, RelayError};
pub use http::{RelayState, build_router};
