//! Paths into a JSON document

use serde::{Serialize, Serializer};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// One step from a container to a child
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

impl PathSegment {
    /// Keys that would be ambiguous in dotted form render bracket-quoted
    fn needs_quoting(key: &str) -> bool {
        key.is_empty() || key.contains(['.', '[', ']', '"', '$'])
    }
}

/// Location of a node, as the sequence of keys and indices from the root
///
/// Renders as `items[2]`, `data.users[0].name`, and `$` for the root. Keys
/// that are empty or contain `.`, `[`, `]`, `"` or `$` render as a quoted
/// JSON string in brackets, so `{"a.b": 1}` gives `["a.b"]` while
/// `{"a": {"b": 1}}` gives `a.b`. Every rendering parses back to the same
/// path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct JsonPath(Vec<PathSegment>);

/// A string that is not a rendered [`JsonPath`]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid JSON path '{0}'")]
pub struct PathParseError(pub String);

impl JsonPath {
    pub fn root() -> Self {
        Self(Vec::new())
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }

    /// Path of an object member below this one
    pub fn key(&self, key: &str) -> Self {
        let mut segments = self.0.clone();
        segments.push(PathSegment::Key(key.to_string()));
        Self(segments)
    }

    /// Path of an array element below this one
    pub fn index(&self, index: usize) -> Self {
        let mut segments = self.0.clone();
        segments.push(PathSegment::Index(index));
        Self(segments)
    }

    /// Parse the rendered form
    ///
    /// Accepts `$`, bare or dotted keys, `[n]` indices and `["quoted"]` keys,
    /// with an optional leading `$` as in `$.meta.id`.
    pub fn parse(input: &str) -> Result<Self, PathParseError> {
        let invalid = || PathParseError(input.to_string());

        let (mut rest, mut bare_allowed) = match input.strip_prefix('$') {
            Some(rest) => (rest, false),
            None if input.is_empty() => return Err(invalid()),
            None => (input, true),
        };

        let mut segments = Vec::new();
        while !rest.is_empty() {
            if let Some(bracketed) = rest.strip_prefix('[') {
                let (segment, after) = parse_bracketed(bracketed).ok_or_else(invalid)?;
                segments.push(segment);
                rest = after;
            } else {
                let body = if bare_allowed {
                    rest
                } else {
                    rest.strip_prefix('.').ok_or_else(invalid)?
                };
                let end = body.find(['.', '[']).unwrap_or(body.len());
                let key = &body[..end];
                if PathSegment::needs_quoting(key) {
                    return Err(invalid());
                }
                segments.push(PathSegment::Key(key.to_string()));
                rest = &body[end..];
            }
            bare_allowed = false;
        }

        Ok(Self(segments))
    }
}

/// Parse `n]` or `"key"]`, the part of a segment after its opening bracket
fn parse_bracketed(input: &str) -> Option<(PathSegment, &str)> {
    if input.starts_with('"') {
        let close = closing_quote(input)?;
        let key: String = serde_json::from_str(&input[..=close]).ok()?;
        let rest = input[close + 1..].strip_prefix(']')?;
        return Some((PathSegment::Key(key), rest));
    }

    let close = input.find(']')?;
    let digits = &input[..close];
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let index = digits.parse().ok()?;
    Some((PathSegment::Index(index), &input[close + 1..]))
}

/// Byte offset of the quote ending the JSON string that opens `input`
fn closing_quote(input: &str) -> Option<usize> {
    let mut escaped = false;
    for (i, c) in input.char_indices().skip(1) {
        match c {
            _ if escaped => escaped = false,
            '\\' => escaped = true,
            '"' => return Some(i),
            _ => {}
        }
    }
    None
}

impl fmt::Display for JsonPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return write!(f, "$");
        }

        for (i, segment) in self.0.iter().enumerate() {
            match segment {
                PathSegment::Key(key) if PathSegment::needs_quoting(key) => {
                    write!(f, "[{}]", Value::from(key.as_str()))?
                }
                PathSegment::Key(key) if i == 0 => write!(f, "{}", key)?,
                PathSegment::Key(key) => write!(f, ".{}", key)?,
                PathSegment::Index(index) => write!(f, "[{}]", index)?,
            }
        }
        Ok(())
    }
}

impl FromStr for JsonPath {
    type Err = PathParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for JsonPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
