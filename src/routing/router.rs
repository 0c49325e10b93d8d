//! Route table: registration and lookup.
//!
//! # Responsibilities
//! - Store `(method, pattern, handler)` entries in registration order
//! - Detect duplicate, shadowed and overlapping registrations
//! - Return the first entry matching a method and path, or explicit NoMatch
//!
//! # Design Decisions
//! - First match wins; order of registration is the only precedence
//! - Read-only once built; a reload builds a fresh table instead of mutating
//! - O(n) scan (mock tables are small)
//! - Conflicts are reported at registration, never silently resolved

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{MockError, MockResult};
use crate::handler::{BoxedHandler, Handler};
use crate::routing::matcher::RoutePattern;
use crate::routing::{Method, Params};

/// What to do when a method + pattern shape is registered twice.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DuplicatePolicy {
    /// Log, record and append; the later entry is unreachable.
    #[default]
    Warn,
    /// Refuse the registration.
    Reject,
}

/// How a later registration relates to an earlier one with the same method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConflictKind {
    /// Same pattern shape; the later entry can never be reached.
    Duplicate,
    /// Earlier pattern matches everything the later one does.
    Shadowed,
    /// Some paths match both; the earlier entry takes them.
    Overlap,
}

/// A registration conflict, kept for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteConflict {
    pub kind: ConflictKind,
    pub method: Method,
    pub earlier: usize,
    pub earlier_pattern: String,
    pub later: usize,
    pub later_pattern: String,
}

/// One registered route.
#[derive(Clone)]
pub struct RouteEntry {
    method: Method,
    pattern: RoutePattern,
    handler: BoxedHandler,
}

impl RouteEntry {
    pub fn method(&self) -> Method {
        self.method
    }

    pub fn pattern(&self) -> &RoutePattern {
        &self.pattern
    }

    pub fn handler(&self) -> &BoxedHandler {
        &self.handler
    }
}

impl fmt::Debug for RouteEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteEntry")
            .field("method", &self.method)
            .field("pattern", &self.pattern.as_str())
            .finish_non_exhaustive()
    }
}

/// Ordered route table.
#[derive(Debug, Default)]
pub struct RouteTable {
    entries: Vec<RouteEntry>,
    conflicts: Vec<RouteConflict>,
    policy: DuplicatePolicy,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(policy: DuplicatePolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    /// Append a route. Fails on a bad pattern, or on a duplicate under
    /// [`DuplicatePolicy::Reject`].
    pub fn register<H: Handler>(
        &mut self,
        method: Method,
        pattern: &str,
        handler: H,
    ) -> MockResult<&mut Self> {
        let pattern = RoutePattern::parse(pattern)?;
        let index = self.entries.len();
        let conflicts = self.conflicts_with(method, &pattern, index);

        if self.policy == DuplicatePolicy::Reject {
            if let Some(dup) = conflicts.iter().find(|c| c.kind == ConflictKind::Duplicate) {
                return Err(MockError::DuplicateRoute {
                    method,
                    pattern: pattern.as_str().to_string(),
                    existing: dup.earlier,
                });
            }
        }

        for conflict in &conflicts {
            match conflict.kind {
                ConflictKind::Duplicate | ConflictKind::Shadowed => tracing::warn!(
                    method = %method,
                    route = %conflict.later_pattern,
                    earlier = %conflict.earlier_pattern,
                    kind = ?conflict.kind,
                    "Route is unreachable, an earlier route always matches first"
                ),
                ConflictKind::Overlap => tracing::warn!(
                    method = %method,
                    route = %conflict.later_pattern,
                    earlier = %conflict.earlier_pattern,
                    "Ambiguous routes, first registered wins for shared paths"
                ),
            }
        }

        tracing::debug!(method = %method, route = %pattern, index, "Route registered");
        self.conflicts.extend(conflicts);
        self.entries.push(RouteEntry {
            method,
            pattern,
            handler: Arc::new(handler),
        });
        Ok(self)
    }

    /// Register using a `"METHOD /path"` key.
    pub fn register_key<H: Handler>(&mut self, key: &str, handler: H) -> MockResult<&mut Self> {
        let (method, pattern) = key
            .trim()
            .split_once(' ')
            .ok_or_else(|| MockError::InvalidRouteKey(key.to_string()))?;
        let method: Method = method.parse()?;
        self.register(method, pattern.trim(), handler)
    }

    /// First entry, in registration order, whose method and pattern match.
    pub fn find(&self, method: Method, path: &str) -> Option<(&RouteEntry, Params)> {
        self.entries
            .iter()
            .filter(|entry| entry.method == method)
            .find_map(|entry| entry.pattern.matches(path).map(|params| (entry, params)))
    }

    pub fn entries(&self) -> &[RouteEntry] {
        &self.entries
    }

    pub fn conflicts(&self) -> &[RouteConflict] {
        &self.conflicts
    }

    pub fn policy(&self) -> DuplicatePolicy {
        self.policy
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn conflicts_with(&self, method: Method, pattern: &RoutePattern, index: usize) -> Vec<RouteConflict> {
        self.entries
            .iter()
            .enumerate()
            .filter(|(_, entry)| entry.method == method)
            .filter_map(|(earlier, entry)| {
                let kind = if entry.pattern.same_shape(pattern) {
                    ConflictKind::Duplicate
                } else if entry.pattern.covers(pattern) {
                    ConflictKind::Shadowed
                } else if entry.pattern.overlaps(pattern) {
                    ConflictKind::Overlap
                } else {
                    return None;
                };
                Some(RouteConflict {
                    kind,
                    method,
                    earlier,
                    earlier_pattern: entry.pattern.as_str().to_string(),
                    later: index,
                    later_pattern: pattern.as_str().to_string(),
                })
            })
            .collect()
    }
}
