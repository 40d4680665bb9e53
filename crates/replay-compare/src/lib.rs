//! Structural comparison of JSON response bodies
//!
//! Compares a recorded baseline document against a live one and produces a
//! tree of classified nodes mirroring the compared structure:
//!
//! ```text
//! baseline: {"status": "ok", "items": [1, 2]}
//! live:     {"status": "ok", "items": [1, 2, 3]}
//!
//! $                 ValueMismatch (container)
//! ├── status        Match
//! └── items         ValueMismatch (container)
//!     ├── items[0]  Match
//!     ├── items[1]  Match
//!     └── items[2]  Added 3
//! ```
//!
//! Comparison is pure: no I/O, no shared state, safe to run from any number
//! of threads at once.
//!
//! # Example
//!
//! ```
//! use replay_compare::{compare, Classification, DiffKind};
//! use serde_json::json;
//!
//! let result = compare(&json!({"a": 1}), &json!({"a": 1, "b": null}));
//! assert_eq!(result.classification(), Classification::NoMatch);
//!
//! let diffs = result.differences();
//! assert_eq!(diffs.len(), 1);
//! assert_eq!(diffs[0].kind, DiffKind::Added);
//! assert_eq!(diffs[0].path.to_string(), "b");
//! ```

mod compare;
mod diff;
mod path;

pub use compare::{
    compare, compare_bytes, compare_with, CompareOptions, MalformedInputError, Side,
};
pub use diff::{Classification, Comparison, DiffKind, DiffNode, JsonKind};
pub use path::{JsonPath, PathParseError, PathSegment};
