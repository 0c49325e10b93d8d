//! Response envelope shared by every handler and by the dispatcher fallback.
//!
//! On the wire an envelope is always the flat object
//! `{ "code": <int>, "message": <string>, "data": <value|null> }`.
//! In Rust it is a tagged enum so "code 200 means success" is decided by the
//! variant, not by callers remembering a convention.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Code carried by every successful envelope.
pub const SUCCESS_CODE: i32 = 200;

/// Default message of a successful envelope.
pub const SUCCESS_MESSAGE: &str = "success";

/// Canonical `{code, message, data}` response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "WireEnvelope", from = "WireEnvelope")]
pub enum Envelope {
    /// Code 200 with domain data.
    Success { message: String, data: Value },
    /// Any other code. `data` is null unless a handler attaches something.
    Failure {
        code: i32,
        message: String,
        data: Value,
    },
}

impl Envelope {
    /// Success with the default `"success"` message.
    pub fn ok(data: impl Into<Value>) -> Self {
        Self::ok_with_message(data, SUCCESS_MESSAGE)
    }

    /// Success with a custom message, e.g. `"created"`.
    pub fn ok_with_message(data: impl Into<Value>, message: impl Into<String>) -> Self {
        Envelope::Success {
            message: message.into(),
            data: data.into(),
        }
    }

    /// Envelope with `data: null`, usually a failure; 400, 401 and 404 are
    /// conventions of the handlers. Code 200 gives a `Success` carrying the
    /// message, the same envelope the wire form decodes to.
    pub fn fail(code: i32, message: impl Into<String>) -> Self {
        if code == SUCCESS_CODE {
            return Envelope::Success {
                message: message.into(),
                data: Value::Null,
            };
        }
        Envelope::Failure {
            code,
            message: message.into(),
            data: Value::Null,
        }
    }

    /// Fallback returned when no route answers `method url`.
    pub fn route_not_found(method: &str, url: &str) -> Self {
        Self::fail(404, format!("mock route not defined: {} {}", method, url))
    }

    /// Replace the data, keeping code and message.
    pub fn with_data(self, data: impl Into<Value>) -> Self {
        match self {
            Envelope::Success { message, .. } => Envelope::Success {
                message,
                data: data.into(),
            },
            Envelope::Failure { code, message, .. } => Envelope::Failure {
                code,
                message,
                data: data.into(),
            },
        }
    }

    pub fn code(&self) -> i32 {
        match self {
            Envelope::Success { .. } => SUCCESS_CODE,
            Envelope::Failure { code, .. } => *code,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Envelope::Success { message, .. } | Envelope::Failure { message, .. } => message,
        }
    }

    pub fn data(&self) -> &Value {
        match self {
            Envelope::Success { data, .. } | Envelope::Failure { data, .. } => data,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Envelope::Success { .. })
    }

    /// Surface a non-success envelope as an application-level error.
    pub fn into_result(self) -> Result<Value, ApplicationError> {
        match self {
            Envelope::Success { data, .. } => Ok(data),
            Envelope::Failure { code, message, .. } => Err(ApplicationError { code, message }),
        }
    }
}

/// A failure envelope seen from a caller that wants `?` propagation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("request failed with code {code}: {message}")]
pub struct ApplicationError {
    pub code: i32,
    pub message: String,
}

#[derive(Serialize, Deserialize)]
struct WireEnvelope {
    code: i32,
    #[serde(default)]
    message: String,
    #[serde(default)]
    data: Value,
}

impl From<Envelope> for WireEnvelope {
    fn from(envelope: Envelope) -> Self {
        match envelope {
            Envelope::Success { message, data } => WireEnvelope {
                code: SUCCESS_CODE,
                message,
                data,
            },
            Envelope::Failure { code, message, data } => WireEnvelope { code, message, data },
        }
    }
}

impl From<WireEnvelope> for Envelope {
    fn from(wire: WireEnvelope) -> Self {
        if wire.code == SUCCESS_CODE {
            Envelope::Success {
                message: wire.message,
                data: wire.data,
            }
        } else {
            Envelope::Failure {
                code: wire.code,
                message: wire.message,
                data: wire.data,
            }
        }
    }
}
