//! Recorded fixtures and live responses

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// The request as it was recorded
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordedRequest {
    pub url: String,
    pub method: String,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
}

/// The response the service gave when the fixture was recorded
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordedResponse {
    pub status: u16,
    /// Baseline body, the source of truth for comparison
    pub body: Value,
}

/// A recorded request and its expected response
///
/// Fixtures are immutable once loaded. The `id` identifies the fixture in
/// reports; fixtures loaded from disk use their file path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fixture {
    #[serde(skip)]
    pub id: String,
    pub request: RecordedRequest,
    pub response: RecordedResponse,
}

impl Fixture {
    pub fn new(
        id: impl Into<String>,
        request: RecordedRequest,
        response: RecordedResponse,
    ) -> Self {
        Self {
            id: id.into(),
            request,
            response,
        }
    }
}

/// Response obtained by replaying a fixture's request
#[derive(Debug, Clone, PartialEq)]
pub struct LiveResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl LiveResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: body.into(),
        }
    }

    /// Check if the status is in the 2xx class
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Body as text, with invalid UTF-8 replaced
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Get a header value
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}
