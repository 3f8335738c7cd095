//! URL template parsing, matching and expansion.
//!
//! # Responsibilities
//! - Parse `{param}` placeholders out of a template
//! - Match a request path and bind parameters
//! - Expand a template back into a concrete path
//!
//! # Design Decisions
//! - A parameter binds exactly one non-empty segment
//! - A segment holds at most one parameter, with optional literal
//!   prefix/suffix (`{id}.json`)
//! - Trailing slashes are insignificant on both sides
//! - Literals match the raw segment, bound values are percent-decoded
//! - No regex, O(segments) matching

use std::fmt;

use percent_encoding::percent_decode_str;

use crate::http::PathParams;
use crate::routing::RoutingError;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Param {
        prefix: String,
        name: String,
        suffix: String,
    },
}

/// A parsed URL template such as `/v2/{tenant_id}/servers/{server_id}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlTemplate {
    raw: String,
    segments: Vec<Segment>,
}

impl UrlTemplate {
    pub fn parse(template: &str) -> Result<Self, RoutingError> {
        let raw = normalize(template);
        let segments = split(&raw)
            .map(|segment| parse_segment(segment, &raw))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { raw, segments })
    }

    /// Parse `prefix` followed by `template`, e.g. a mount plus a route.
    pub fn join(prefix: &str, template: &str) -> Result<Self, RoutingError> {
        let prefix = prefix.trim_end_matches('/');
        Self::parse(&format!("{prefix}{template}"))
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn param_names(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|segment| match segment {
            Segment::Param { name, .. } => Some(name.as_str()),
            Segment::Literal(_) => None,
        })
    }

    /// Number of fully literal segments, used to rank overlapping matches.
    pub fn literal_count(&self) -> usize {
        self.segments
            .iter()
            .filter(|s| matches!(s, Segment::Literal(_)))
            .count()
    }

    /// The same template with `suffix` appended to its last segment.
    pub fn with_suffix(&self, suffix: &str) -> Self {
        let mut alias = self.clone();
        alias.raw.push_str(suffix);
        match alias.segments.last_mut() {
            Some(Segment::Literal(text)) => text.push_str(suffix),
            Some(Segment::Param { suffix: tail, .. }) => tail.push_str(suffix),
            None => alias.segments.push(Segment::Literal(suffix.to_string())),
        }
        alias
    }

    /// Bind parameters if `path` matches this template.
    pub fn matches(&self, path: &str) -> Option<PathParams> {
        let path = normalize(path);
        let parts: Vec<&str> = split(&path).collect();
        if parts.len() != self.segments.len() {
            return None;
        }

        let mut params = PathParams::new();
        for (segment, part) in self.segments.iter().zip(parts) {
            match segment {
                Segment::Literal(text) => {
                    if text != part {
                        return None;
                    }
                }
                Segment::Param {
                    prefix,
                    name,
                    suffix,
                } => {
                    if part.len() <= prefix.len() + suffix.len()
                        || !part.starts_with(prefix.as_str())
                        || !part.ends_with(suffix.as_str())
                    {
                        return None;
                    }
                    let value = &part[prefix.len()..part.len() - suffix.len()];
                    params.insert(name.clone(), percent_decode_str(value).decode_utf8_lossy());
                }
            }
        }
        Some(params)
    }

    /// Substitute parameters. The error names the first parameter `lookup`
    /// could not supply.
    pub fn expand<F>(&self, mut lookup: F) -> Result<String, String>
    where
        F: FnMut(&str) -> Option<String>,
    {
        let mut parts = Vec::with_capacity(self.segments.len());
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => parts.push(text.clone()),
                Segment::Param {
                    prefix,
                    name,
                    suffix,
                } => {
                    let value = lookup(name).ok_or_else(|| name.clone())?;
                    parts.push(format!("{prefix}{value}{suffix}"));
                }
            }
        }
        Ok(format!("/{}", parts.join("/")))
    }
}

impl fmt::Display for UrlTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

fn normalize(path: &str) -> String {
    let mut path = if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{path}")
    };
    while path.len() > 1 && path.ends_with('/') {
        path.pop();
    }
    path
}

fn split(path: &str) -> impl Iterator<Item = &str> {
    path.strip_prefix('/').unwrap_or(path).split('/')
}

fn parse_segment(segment: &str, template: &str) -> Result<Segment, RoutingError> {
    let invalid = |reason: &str| RoutingError::InvalidTemplate {
        template: template.to_string(),
        reason: reason.to_string(),
    };

    let Some(open) = segment.find('{') else {
        if segment.contains('}') {
            return Err(invalid("unmatched '}'"));
        }
        return Ok(Segment::Literal(segment.to_string()));
    };

    let prefix = &segment[..open];
    let rest = &segment[open + 1..];
    let close = rest.find('}').ok_or_else(|| invalid("unclosed '{'"))?;
    let name = &rest[..close];
    let suffix = &rest[close + 1..];

    if prefix.contains('}') {
        return Err(invalid("unmatched '}'"));
    }
    if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(invalid("parameter names must be non-empty identifiers"));
    }
    if suffix.contains('{') || suffix.contains('}') {
        return Err(invalid("only one parameter per segment"));
    }

    Ok(Segment::Param {
        prefix: prefix.to_string(),
        name: name.to_string(),
        suffix: suffix.to_string(),
    })
}
