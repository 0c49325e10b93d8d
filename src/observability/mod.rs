//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! routing / http / config produce:
//!     → logging.rs (structured tracing events)
//!     → metrics.rs (counters, gauges, histograms)
//!
//! Consumers:
//!     → stdout (pretty or JSON)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Every dispatch logs method, url and matched route
//! - Request ID from the HTTP front appears in the trace span
//! - Metrics are cheap and optional

pub mod logging;
pub mod metrics;
