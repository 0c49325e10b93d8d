//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware)
//!     → request.rs (request ID, trace span)
//!     → admin routes under the prefix, or
//!     → mock fallback → Dispatcher
//!     → response.rs (envelope → JSON response)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{request_id, request_span, UuidRequestId, X_REQUEST_ID};
pub use server::{AppState, HttpServer};
