//! Mock request router and dispatcher.
//!
//! Resolves `(method, url)` pairs against an ordered table of path patterns,
//! merges query and path parameters, runs the matched handler and returns a
//! `{code, message, data}` envelope. A config-driven HTTP front serves the
//! same dispatcher over the network.
//!
//! # Architecture Overview
//!
//! ```text
//!     mock.toml ──▶ config ──▶ fixtures ──▶ RouteTable
//!                    │  ▲          │             │
//!                    │  └ watcher  ▼             ▼
//!                    │          store ◀─── Dispatcher ◀── http (axum fallback)
//!                    ▼                           │             ▲
//!               observability                    ▼             │
//!                                             Envelope ────────┘
//! ```

// Core engine
pub mod envelope;
pub mod error;
pub mod handler;
pub mod routing;

// Fixture data
pub mod fixtures;
pub mod store;

// Serving
pub mod admin;
pub mod config;
pub mod http;

// Cross-cutting concerns
pub mod lifecycle;
pub mod observability;

pub use config::schema::MockConfig;
pub use envelope::{ApplicationError, Envelope};
pub use error::{MockError, MockResult};
pub use handler::{delay, with_latency, BoxedHandler, Handler, Latency};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use routing::{
    match_path, parse_query, DispatchRequest, Dispatcher, DuplicatePolicy, Method, Params,
    RouteTable,
};
pub use store::MemoryStore;
