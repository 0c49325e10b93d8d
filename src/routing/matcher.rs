//! Path pattern matching.
//!
//! # Responsibilities
//! - Parse route patterns such as `/api/resources/:id`
//! - Match a concrete path against a pattern, binding `:name` segments
//! - Compare patterns with each other for conflict detection
//!
//! # Design Decisions
//! - Segment counts must be equal; no optional or catch-all segments
//! - Literal comparison is case-sensitive
//! - Bound values stay percent-encoded; decoding is the handler's call
//! - All-segments-or-nothing, never prefix matching

use std::collections::HashSet;
use std::fmt;

use crate::error::{MockError, MockResult};
use crate::routing::Params;

const SEPARATOR: char = '/';
const PARAM_MARKER: char = ':';

/// One `/`-separated piece of a pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Literal(String),
    Param(String),
}

/// A parsed path template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutePattern {
    raw: String,
    segments: Vec<Segment>,
}

impl RoutePattern {
    /// Parse a pattern. Failures here are registration defects.
    pub fn parse(pattern: &str) -> MockResult<Self> {
        let invalid = |reason: &str| MockError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: reason.to_string(),
        };

        if !pattern.starts_with(SEPARATOR) {
            return Err(invalid("must start with '/'"));
        }
        if let Some(c) = pattern.chars().find(|c| matches!(c, '?' | '#' | '*')) {
            return Err(invalid(&format!("'{}' is not allowed in a pattern", c)));
        }

        let mut seen = HashSet::new();
        let mut segments = Vec::new();
        for part in pattern.split(SEPARATOR) {
            match part.strip_prefix(PARAM_MARKER) {
                Some("") => return Err(invalid("parameter segment without a name")),
                Some(name) => {
                    if !seen.insert(name) {
                        return Err(invalid(&format!("parameter `{}` appears twice", name)));
                    }
                    segments.push(Segment::Param(name.to_string()));
                }
                None => segments.push(Segment::Literal(part.to_string())),
            }
        }

        Ok(Self {
            raw: pattern.to_string(),
            segments,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn param_names(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Param(name) => Some(name.as_str()),
            Segment::Literal(_) => None,
        })
    }

    /// Match a concrete path (query component ignored).
    ///
    /// `None` means no match; `Some` with an empty map is a match of a
    /// pattern without parameters.
    pub fn matches(&self, path: &str) -> Option<Params> {
        let path = path_portion(path);
        if path.split(SEPARATOR).count() != self.segments.len() {
            return None;
        }

        let mut params = Params::new();
        for (segment, part) in self.segments.iter().zip(path.split(SEPARATOR)) {
            match segment {
                Segment::Param(name) => params.insert(name.as_str(), part),
                Segment::Literal(literal) if literal == part => {}
                Segment::Literal(_) => return None,
            }
        }
        Some(params)
    }

    /// Identical up to parameter names: `/users/:id` and `/users/:uid`.
    pub fn same_shape(&self, other: &RoutePattern) -> bool {
        self.pairwise(other, |a, b| match (a, b) {
            (Segment::Param(_), Segment::Param(_)) => true,
            (Segment::Literal(x), Segment::Literal(y)) => x == y,
            _ => false,
        })
    }

    /// Every path matched by `other` is also matched by `self`.
    pub fn covers(&self, other: &RoutePattern) -> bool {
        self.pairwise(other, |a, b| match (a, b) {
            (Segment::Param(_), _) => true,
            (Segment::Literal(x), Segment::Literal(y)) => x == y,
            (Segment::Literal(_), Segment::Param(_)) => false,
        })
    }

    /// At least one path is matched by both patterns.
    pub fn overlaps(&self, other: &RoutePattern) -> bool {
        self.pairwise(other, |a, b| match (a, b) {
            (Segment::Literal(x), Segment::Literal(y)) => x == y,
            _ => true,
        })
    }

    fn pairwise(&self, other: &RoutePattern, f: impl Fn(&Segment, &Segment) -> bool) -> bool {
        self.segments.len() == other.segments.len()
            && self.segments.iter().zip(&other.segments).all(|(a, b)| f(a, b))
    }
}

impl fmt::Display for RoutePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// The part of a URL before the first `?`.
pub fn path_portion(url: &str) -> &str {
    url.split_once('?').map_or(url, |(path, _)| path)
}

/// One-shot form of [`RoutePattern::matches`].
pub fn match_path(pattern: &str, path: &str) -> MockResult<Option<Params>> {
    Ok(RoutePattern::parse(pattern)?.matches(path))
}
