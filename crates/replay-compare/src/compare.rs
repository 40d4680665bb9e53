//! Structural JSON comparison

use crate::diff::{Comparison, DiffKind, DiffNode, JsonKind};
use crate::path::JsonPath;
use serde_json::{Number, Value};
use std::collections::HashSet;
use std::fmt;
use thiserror::Error;

/// Which document failed to parse
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Baseline,
    Live,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Baseline => write!(f, "baseline"),
            Side::Live => write!(f, "live"),
        }
    }
}

/// One of the documents is not valid JSON
#[derive(Debug, Error)]
#[error("{side} body is not valid JSON: {source}")]
pub struct MalformedInputError {
    pub side: Side,
    #[source]
    pub source: serde_json::Error,
}

/// Options for comparing documents
#[derive(Debug, Clone, Default)]
pub struct CompareOptions {
    /// Paths to treat as matching regardless of content (e.g. timestamps)
    ///
    /// Matched segment by segment, so ignoring `a.b` does not ignore the
    /// top-level key `"a.b"`, which is written `["a.b"]`.
    pub ignore_paths: HashSet<JsonPath>,
}

impl CompareOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ignore_path(mut self, path: JsonPath) -> Self {
        self.ignore_paths.insert(path);
        self
    }

    fn is_ignored(&self, path: &JsonPath) -> bool {
        self.ignore_paths.contains(path)
    }
}

/// Compare two documents with default options
pub fn compare(baseline: &Value, live: &Value) -> Comparison {
    compare_with(baseline, live, &CompareOptions::default())
}

/// Compare two documents
pub fn compare_with(baseline: &Value, live: &Value, options: &CompareOptions) -> Comparison {
    Comparison::new(diff_value(JsonPath::root(), baseline, live, options))
}

/// Parse and compare two raw documents
///
/// Fails without comparing anything if either side is not valid JSON.
pub fn compare_bytes(baseline: &[u8], live: &[u8]) -> Result<Comparison, MalformedInputError> {
    let baseline = parse(Side::Baseline, baseline)?;
    let live = parse(Side::Live, live)?;

    Ok(compare(&baseline, &live))
}

fn parse(side: Side, bytes: &[u8]) -> Result<Value, MalformedInputError> {
    serde_json::from_slice(bytes).map_err(|source| MalformedInputError { side, source })
}

fn diff_value(
    path: JsonPath,
    baseline: &Value,
    live: &Value,
    options: &CompareOptions,
) -> DiffNode {
    if options.is_ignored(&path) {
        return DiffNode::matched(path);
    }

    match (baseline, live) {
        (Value::Array(base_arr), Value::Array(live_arr)) => {
            let mut children = Vec::with_capacity(base_arr.len().max(live_arr.len()));

            for (i, (base_elem, live_elem)) in base_arr.iter().zip(live_arr).enumerate() {
                children.push(diff_value(path.index(i), base_elem, live_elem, options));
            }
            for (i, base_elem) in base_arr.iter().enumerate().skip(live_arr.len()) {
                children.push(removed(path.index(i), base_elem, options));
            }
            for (i, live_elem) in live_arr.iter().enumerate().skip(base_arr.len()) {
                children.push(added(path.index(i), live_elem, options));
            }

            DiffNode::container(path, children)
        }
        (Value::Object(base_obj), Value::Object(live_obj)) => {
            let mut children = Vec::with_capacity(base_obj.len().max(live_obj.len()));

            for (key, base_value) in base_obj {
                let child = path.key(key);
                children.push(match live_obj.get(key) {
                    Some(live_value) => diff_value(child, base_value, live_value, options),
                    None => removed(child, base_value, options),
                });
            }
            for (key, live_value) in live_obj {
                if !base_obj.contains_key(key) {
                    children.push(added(path.key(key), live_value, options));
                }
            }

            DiffNode::container(path, children)
        }
        _ if JsonKind::of(baseline) != JsonKind::of(live) => DiffNode::leaf(
            path,
            DiffKind::TypeMismatch,
            Some(baseline.clone()),
            Some(live.clone()),
        ),
        _ if scalars_equal(baseline, live) => DiffNode::matched(path),
        _ => DiffNode::leaf(
            path,
            DiffKind::ValueMismatch,
            Some(baseline.clone()),
            Some(live.clone()),
        ),
    }
}

/// Node for a value only the baseline has
fn removed(path: JsonPath, value: &Value, options: &CompareOptions) -> DiffNode {
    if options.is_ignored(&path) {
        return DiffNode::matched(path);
    }
    DiffNode::leaf(path, DiffKind::Removed, Some(value.clone()), None)
}

/// Node for a value only the live document has
fn added(path: JsonPath, value: &Value, options: &CompareOptions) -> DiffNode {
    if options.is_ignored(&path) {
        return DiffNode::matched(path);
    }
    DiffNode::leaf(path, DiffKind::Added, None, Some(value.clone()))
}

/// Equality of two scalars of the same kind
fn scalars_equal(baseline: &Value, live: &Value) -> bool {
    match (baseline, live) {
        (Value::Number(a), Value::Number(b)) => numbers_equal(a, b),
        _ => baseline == live,
    }
}

/// Numbers are equal by value, so `1` and `1.0` match
///
/// Integers compare exactly. An integer equals a float only when the float
/// is integral and converts to exactly that integer, so precision lost by
/// the float never produces a match. Only two floats compare as f64.
fn numbers_equal(a: &Number, b: &Number) -> bool {
    match (integer(a), integer(b)) {
        (Some(x), Some(y)) => x == y,
        (Some(x), None) => float_equals_integer(b.as_f64(), x),
        (None, Some(y)) => float_equals_integer(a.as_f64(), y),
        (None, None) => a.as_f64() == b.as_f64(),
    }
}

fn integer(n: &Number) -> Option<i128> {
    match n.as_i64() {
        Some(i) => Some(i128::from(i)),
        None => n.as_u64().map(i128::from),
    }
}

fn float_equals_integer(float: Option<f64>, int: i128) -> bool {
    // Integral floats below 2^65 convert to i128 exactly
    const LIMIT: f64 = 36_893_488_147_419_103_232.0; // 2^65

    match float {
        Some(f) if f.is_finite() && f.fract() == 0.0 && f.abs() < LIMIT => f as i128 == int,
        _ => false,
    }
}
