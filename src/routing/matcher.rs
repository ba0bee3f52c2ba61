//! Path pattern matching.
//!
//! # Responsibilities
//! - Parse patterns like `deleteBook/{bookName}` into segments
//! - Match request paths segment by segment
//! - Capture the value of the route variable, percent-decoded
//!
//! # Design Decisions
//! - Literal segments compare ASCII case-insensitively; captured values keep their case
//! - Segment counts must be equal; no prefix or wildcard matching
//! - At most one route variable per pattern
//! - A trailing slash on the request path is ignored

use std::collections::HashMap;
use std::fmt;

use percent_encoding::percent_decode_str;

use crate::routing::router::RouteTableError;

/// One segment of a path pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Matches exactly this text.
    Literal(String),
    /// Matches any text and captures it under this name.
    Variable(String),
}

impl Segment {
    /// Whether two segments can match the same request segment.
    fn overlaps(&self, other: &Segment) -> bool {
        match (self, other) {
            (Segment::Literal(a), Segment::Literal(b)) => a.eq_ignore_ascii_case(b),
            _ => true,
        }
    }
}

/// A parsed path pattern, relative to the controller base path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPattern {
    raw: String,
    segments: Vec<Segment>,
}

impl PathPattern {
    /// Parse a pattern. The empty pattern addresses the controller root.
    pub fn parse(raw: &str) -> Result<Self, RouteTableError> {
        let mut segments = Vec::new();
        for part in split_path(raw) {
            let segment = match part.strip_prefix('{').and_then(|p| p.strip_suffix('}')) {
                Some("") => return Err(RouteTableError::EmptyVariable(raw.to_string())),
                Some(name) => Segment::Variable(name.to_string()),
                None if part.is_empty() => {
                    return Err(RouteTableError::EmptySegment(raw.to_string()));
                }
                None => Segment::Literal(part.to_string()),
            };
            segments.push(segment);
        }

        let variables = segments
            .iter()
            .filter(|s| matches!(s, Segment::Variable(_)))
            .count();
        if variables > 1 {
            return Err(RouteTableError::MultipleVariables(raw.to_string()));
        }

        Ok(Self {
            raw: raw.trim_matches('/').to_string(),
            segments,
        })
    }

    /// Parsed segments, in path order.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Name of the route variable, if the pattern declares one.
    pub fn variable(&self) -> Option<&str> {
        self.segments.iter().find_map(|s| match s {
            Segment::Variable(name) => Some(name.as_str()),
            Segment::Literal(_) => None,
        })
    }

    /// Match a request path (relative to the controller base).
    ///
    /// Returns the captured route values on success.
    pub fn matches(&self, path: &str) -> Option<RouteValues> {
        let parts: Vec<&str> = split_path(path).collect();
        if parts.len() != self.segments.len() {
            return None;
        }

        let mut values = RouteValues::default();
        for (segment, part) in self.segments.iter().zip(parts) {
            let decoded = percent_decode_str(part).decode_utf8_lossy();
            match segment {
                Segment::Literal(lit) => {
                    if !lit.eq_ignore_ascii_case(&decoded) {
                        return None;
                    }
                }
                Segment::Variable(name) => {
                    values.insert(name.clone(), decoded.into_owned());
                }
            }
        }
        Some(values)
    }

    /// Whether some request path could match both patterns.
    pub fn overlaps(&self, other: &PathPattern) -> bool {
        self.segments.len() == other.segments.len()
            && self
                .segments
                .iter()
                .zip(&other.segments)
                .all(|(a, b)| a.overlaps(b))
    }
}

impl fmt::Display for PathPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}", self.raw)
    }
}

/// Split a path into segments, ignoring a leading and a trailing slash.
/// The root path yields no segments.
fn split_path(path: &str) -> impl Iterator<Item = &str> {
    let trimmed = path.strip_prefix('/').unwrap_or(path);
    let trimmed = trimmed.strip_suffix('/').unwrap_or(trimmed);
    trimmed.split('/').filter(move |_| !trimmed.is_empty())
}

/// Values captured from route variables for one matched request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteValues {
    values: HashMap<String, String>,
}

impl RouteValues {
    /// Record the value captured for `name`.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values.insert(name.into(), value.into());
    }

    /// Captured value for `name`; `None` when the pattern has no such variable.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    /// Whether nothing was captured.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
