use axum::{
    body::Body,
    extract::State,
    http::{HeaderValue, Request, StatusCode, header::AUTHORIZATION, header::HeaderName},
    middleware::Next,
    response::{IntoResponse, Response},
};
use subtle::ConstantTimeEq;
use uuid::Uuid;

use crate::http::RelayState;

/// Per-request identifier, stored as a request extension.
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

pub async fn with_request_id(mut req: Request<Body>, next: Next) -> Response {
    let rid = Uuid::new_v4().to_string();
    req.extensions_mut().insert(RequestId(rid.clone()));

    let mut res = next.run(req).await;
    if let Ok(value) = HeaderValue::from_str(&rid) {
        res.headers_mut()
            .insert(HeaderName::from_static("x-request-id"), value);
    }
    res
}

/// Requires `Authorization: Bearer <token>` when the relay has a bridge token.
pub async fn verify_bridge_token(
    State(state): State<RelayState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    if let Some(expected) = state.bridge_token.as_deref() {
        let provided = req
            .headers()
            .get(AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .and_then(|s| s.strip_prefix("Bearer "))
            .unwrap_or("");
        if !bool::from(provided.as_bytes().ct_eq(expected.as_bytes())) {
            tracing::warn!("rejected session event with missing or wrong bridge token");
            return StatusCode::UNAUTHORIZED.into_response();
        }
    }
    next.run(req).await
}
