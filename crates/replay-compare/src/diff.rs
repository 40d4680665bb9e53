//! Comparison result tree

use crate::path::JsonPath;
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use serde_json::Value;
use std::fmt;

/// Classification of a single node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum DiffKind {
    /// Equal in both documents, including every descendant
    Match,
    /// Same kind, different value; containers with differing descendants
    ValueMismatch,
    /// Present in both documents with different JSON kinds
    TypeMismatch,
    /// Only present in the live document
    Added,
    /// Only present in the baseline document
    Removed,
}

impl fmt::Display for DiffKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiffKind::Match => write!(f, "MATCH"),
            DiffKind::ValueMismatch => write!(f, "VALUE"),
            DiffKind::TypeMismatch => write!(f, "TYPE"),
            DiffKind::Added => write!(f, "ADDED"),
            DiffKind::Removed => write!(f, "REMOVED"),
        }
    }
}

/// The kind of a JSON value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JsonKind {
    Null,
    Boolean,
    Number,
    String,
    Array,
    Object,
}

impl JsonKind {
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Null => JsonKind::Null,
            Value::Bool(_) => JsonKind::Boolean,
            Value::Number(_) => JsonKind::Number,
            Value::String(_) => JsonKind::String,
            Value::Array(_) => JsonKind::Array,
            Value::Object(_) => JsonKind::Object,
        }
    }
}

impl fmt::Display for JsonKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            JsonKind::Null => "null",
            JsonKind::Boolean => "boolean",
            JsonKind::Number => "number",
            JsonKind::String => "string",
            JsonKind::Array => "array",
            JsonKind::Object => "object",
        };
        f.write_str(name)
    }
}

/// One node of the comparison tree
///
/// Leaves that differ carry the conflicting values: both for mismatches, the
/// baseline value for `Removed`, the live value for `Added`. Containers only
/// carry their children.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiffNode {
    pub path: JsonPath,
    pub kind: DiffKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub baseline: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub live: Option<Value>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<DiffNode>,
}

impl DiffNode {
    pub(crate) fn matched(path: JsonPath) -> Self {
        Self::leaf(path, DiffKind::Match, None, None)
    }

    pub(crate) fn leaf(
        path: JsonPath,
        kind: DiffKind,
        baseline: Option<Value>,
        live: Option<Value>,
    ) -> Self {
        Self {
            path,
            kind,
            baseline,
            live,
            children: Vec::new(),
        }
    }

    /// Container node; its kind is derived from the children
    pub(crate) fn container(path: JsonPath, children: Vec<DiffNode>) -> Self {
        let kind = if children.iter().all(DiffNode::is_match) {
            DiffKind::Match
        } else {
            DiffKind::ValueMismatch
        };

        Self {
            path,
            kind,
            baseline: None,
            live: None,
            children,
        }
    }

    pub fn is_match(&self) -> bool {
        self.kind == DiffKind::Match
    }

    /// Differing leaves of this subtree in depth-first order
    pub fn differences(&self) -> Vec<&DiffNode> {
        let mut out = Vec::new();
        self.collect_differences(&mut out);
        out
    }

    fn collect_differences<'a>(&'a self, out: &mut Vec<&'a DiffNode>) {
        if self.is_match() {
            return;
        }
        if self.children.is_empty() {
            out.push(self);
            return;
        }
        for child in &self.children {
            child.collect_differences(out);
        }
    }

    /// One-line description of a differing leaf
    pub fn describe(&self) -> String {
        let value = |v: &Option<Value>| v.as_ref().map(Value::to_string).unwrap_or_default();

        match self.kind {
            DiffKind::Match => format!("{}: unchanged", self.path),
            DiffKind::ValueMismatch if !self.children.is_empty() => {
                format!("{}: contents changed", self.path)
            }
            DiffKind::ValueMismatch => format!(
                "{}: value changed from {} to {}",
                self.path,
                value(&self.baseline),
                value(&self.live)
            ),
            DiffKind::TypeMismatch => {
                let kind = |v: &Option<Value>| {
                    v.as_ref()
                        .map(|v| JsonKind::of(v).to_string())
                        .unwrap_or_default()
                };
                format!(
                    "{}: type changed from {} {} to {} {}",
                    self.path,
                    kind(&self.baseline),
                    value(&self.baseline),
                    kind(&self.live),
                    value(&self.live)
                )
            }
            DiffKind::Added => format!("{}: added {}", self.path, value(&self.live)),
            DiffKind::Removed => format!("{}: removed {}", self.path, value(&self.baseline)),
        }
    }
}

/// Whole-document classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Classification {
    FullMatch,
    NoMatch,
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Classification::FullMatch => write!(f, "FullMatch"),
            Classification::NoMatch => write!(f, "NoMatch"),
        }
    }
}

/// Result of comparing a baseline document against a live one
#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    root: DiffNode,
}

impl Comparison {
    pub(crate) fn new(root: DiffNode) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &DiffNode {
        &self.root
    }

    pub fn into_root(self) -> DiffNode {
        self.root
    }

    pub fn classification(&self) -> Classification {
        if self.root.is_match() {
            Classification::FullMatch
        } else {
            Classification::NoMatch
        }
    }

    pub fn is_full_match(&self) -> bool {
        self.classification() == Classification::FullMatch
    }

    /// Every differing leaf in document order
    pub fn differences(&self) -> Vec<&DiffNode> {
        self.root.differences()
    }

    /// First line of the explanation: `FullMatch` or `NoMatch (N differences)`
    pub fn headline(&self) -> String {
        headline_for(self.differences().len())
    }

    /// Human-readable explanation
    ///
    /// The headline on its own for a full match, otherwise followed by one
    /// line per differing leaf.
    pub fn explanation(&self) -> String {
        let differences = self.differences();
        let mut out = headline_for(differences.len());
        for diff in differences {
            out.push_str("\n  ");
            out.push_str(&diff.describe());
        }
        out
    }
}

fn headline_for(differences: usize) -> String {
    match differences {
        0 => Classification::FullMatch.to_string(),
        1 => format!("{} (1 difference)", Classification::NoMatch),
        n => format!("{} ({} differences)", Classification::NoMatch, n),
    }
}

impl Serialize for Comparison {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Comparison", 2)?;
        state.serialize_field("classification", &self.classification())?;
        state.serialize_field("differences", &self.differences())?;
        state.end()
    }
}
