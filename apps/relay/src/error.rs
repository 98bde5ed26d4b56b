use std::collections::BTreeMap;

use axum::response::{IntoResponse, Response};
use axum::{Json, http::StatusCode};
use serde::Serialize;
use wa_relay_core::SessionError;

pub const NOT_REGISTERED_MESSAGE: &str = "number phone is not registered in whatsapp";

/// Field name to failure reason.
pub type FieldErrors = BTreeMap<String, String>;

#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    #[error("invalid request fields")]
    Validation(FieldErrors),
    #[error("unreadable request body: {0}")]
    BadBody(String),
    #[error("{}", NOT_REGISTERED_MESSAGE)]
    NotRegistered,
    #[error("delivery failed")]
    Delivery(#[source] SessionError),
}

impl RelayError {
    pub fn status(&self) -> StatusCode {
        match self {
            RelayError::Validation(_) | RelayError::NotRegistered => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            RelayError::BadBody(_) => StatusCode::BAD_REQUEST,
            RelayError::Delivery(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message(self) -> ReplyMessage {
        match self {
            RelayError::Validation(fields) => ReplyMessage::Fields(fields),
            RelayError::BadBody(detail) => ReplyMessage::Text(detail),
            RelayError::NotRegistered => ReplyMessage::Text(NOT_REGISTERED_MESSAGE.into()),
            RelayError::Delivery(err) => ReplyMessage::Text(format!("fail{err}")),
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(ApiResponse {
            status: "failed",
            message: self.message(),
        });
        (status, body).into_response()
    }
}

/// `{status, message}` envelope shared by every `/send/message` response.
#[derive(Debug, Serialize)]
pub struct ApiResponse {
    pub status: &'static str,
    pub message: ReplyMessage,
}

impl ApiResponse {
    pub fn success() -> Self {
        Self {
            status: "success",
            message: ReplyMessage::Text("successful".into()),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum ReplyMessage {
    Text(String),
    Fields(FieldErrors),
}
