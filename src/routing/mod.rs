//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Mock request (method, url, body)
//!     → query.rs (decode query component)
//!     → router.rs (scan table in registration order)
//!     → matcher.rs (evaluate pattern against path)
//!     → dispatcher.rs (merge params, pick body, await handler)
//!     → Return: handler Envelope, or 404 Envelope on NoMatch
//!
//! Route Table construction (before first dispatch):
//!     register(method, pattern, handler)
//!     → Parse pattern
//!     → Check duplicates / shadowing / overlap
//!     → Append in order
//! ```
//!
//! # Design Decisions
//! - Tables are immutable once handed to the dispatcher; reload swaps them
//! - No regex, no wildcards: fixed segment counts only
//! - Deterministic: same input always matches same route
//! - First match wins (ordered by registration)

pub mod dispatcher;
pub mod matcher;
pub mod method;
pub mod params;
pub mod query;
pub mod router;

pub use dispatcher::{DispatchRequest, Dispatcher};
pub use matcher::{match_path, RoutePattern, Segment};
pub use method::Method;
pub use params::Params;
pub use query::parse_query;
pub use router::{ConflictKind, DuplicatePolicy, RouteConflict, RouteEntry, RouteTable};
