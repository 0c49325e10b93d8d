//! Envelopes as HTTP responses.
//!
//! The envelope is always the JSON body. By default the HTTP status is 200
//! whatever the envelope code, the way a client-side interceptor answers;
//! with `mirror_status` the envelope code becomes the status when it is a
//! final status that may carry a body (200-599 except 204, 205 and 304).

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::envelope::Envelope;
use crate::error::MockError;

/// Status to send for an envelope.
pub fn status_for(envelope: &Envelope, mirror_status: bool) -> StatusCode {
    if !mirror_status {
        return StatusCode::OK;
    }
    u16::try_from(envelope.code())
        .ok()
        .filter(|code| (200..=599).contains(code) && !matches!(code, 204 | 205 | 304))
        .and_then(|code| StatusCode::from_u16(code).ok())
        .unwrap_or(StatusCode::OK)
}

pub fn envelope_response(envelope: Envelope, mirror_status: bool) -> Response {
    (status_for(&envelope, mirror_status), Json(envelope)).into_response()
}

/// Response for a dispatch that did not produce an envelope.
pub fn error_response(error: &MockError) -> Response {
    let status = match error {
        MockError::MalformedQuery { .. } | MockError::UnsupportedMethod(_) => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    let envelope = Envelope::fail(i32::from(status.as_u16()), error.to_string());
    (status, Json(envelope)).into_response()
}
