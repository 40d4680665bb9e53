//! Per-fixture outcomes and run totals

use crate::transport::TransportError;
use chrono::{DateTime, Utc};
use replay_compare::{Comparison, MalformedInputError};
use replay_core::{FixtureLoadError, LiveResponse, RecordedRequest};
use serde::Serialize;
use std::fmt;

/// Final state of one fixture
#[derive(Debug)]
pub enum Outcome {
    /// Bodies were compared; the comparison may or may not be a full match
    Compared(Comparison),
    /// The fixture file could not be loaded
    LoadFailed(FixtureLoadError),
    /// The live request failed at the network level
    TransportFailed(TransportError),
    /// The live status was not accepted, so the body was not compared.
    /// `expected` is `None` when any 2xx status was acceptable.
    StatusRejected { expected: Option<u16>, actual: u16 },
    /// The live body is not JSON
    MalformedBody(MalformedInputError),
}

impl Outcome {
    pub fn kind(&self) -> OutcomeKind {
        match self {
            Outcome::Compared(c) if c.is_full_match() => OutcomeKind::Matched,
            Outcome::Compared(_) => OutcomeKind::Mismatched,
            Outcome::LoadFailed(_) => OutcomeKind::LoadError,
            Outcome::TransportFailed(_) => OutcomeKind::TransportError,
            Outcome::StatusRejected { .. } => OutcomeKind::StatusError,
            Outcome::MalformedBody(_) => OutcomeKind::MalformedBody,
        }
    }

    pub fn is_pass(&self) -> bool {
        self.kind() == OutcomeKind::Matched
    }

    /// Error message for failed fixtures, `None` for compared ones
    pub fn error_message(&self) -> Option<String> {
        match self {
            Outcome::Compared(_) => None,
            Outcome::LoadFailed(e) => Some(e.to_string()),
            Outcome::TransportFailed(e) => Some(e.to_string()),
            Outcome::StatusRejected { expected, actual } => Some(match expected {
                Some(expected) => format!("expected status {}, got {}", expected, actual),
                None => format!("expected a 2xx status, got {}", actual),
            }),
            Outcome::MalformedBody(e) => Some(e.to_string()),
        }
    }
}

/// Outcome category used for counting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeKind {
    Matched,
    Mismatched,
    LoadError,
    TransportError,
    StatusError,
    MalformedBody,
}

impl fmt::Display for OutcomeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutcomeKind::Matched => write!(f, "FullMatch"),
            OutcomeKind::Mismatched => write!(f, "NoMatch"),
            OutcomeKind::LoadError => write!(f, "Load error"),
            OutcomeKind::TransportError => write!(f, "Transport error"),
            OutcomeKind::StatusError => write!(f, "HTTP status error"),
            OutcomeKind::MalformedBody => write!(f, "Malformed body"),
        }
    }
}

/// Everything known about one fixture once it has been processed
#[derive(Debug)]
pub struct FixtureReport {
    pub id: String,
    /// Absent when the fixture failed to load
    pub request: Option<RecordedRequest>,
    /// Absent when no response was obtained
    pub live: Option<LiveResponse>,
    pub outcome: Outcome,
}

/// Counts per outcome kind
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Tally {
    pub matched: usize,
    pub mismatched: usize,
    pub load_errors: usize,
    pub transport_errors: usize,
    pub status_errors: usize,
    pub malformed: usize,
}

impl Tally {
    pub fn record(&mut self, outcome: &Outcome) {
        match outcome.kind() {
            OutcomeKind::Matched => self.matched += 1,
            OutcomeKind::Mismatched => self.mismatched += 1,
            OutcomeKind::LoadError => self.load_errors += 1,
            OutcomeKind::TransportError => self.transport_errors += 1,
            OutcomeKind::StatusError => self.status_errors += 1,
            OutcomeKind::MalformedBody => self.malformed += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.matched + self.mismatched + self.errors()
    }

    pub fn errors(&self) -> usize {
        self.load_errors + self.transport_errors + self.status_errors + self.malformed
    }

    pub fn failed(&self) -> usize {
        self.total() - self.matched
    }

    pub fn all_passed(&self) -> bool {
        self.failed() == 0
    }
}

/// Serializable record of one fixture, kept in the run summary
#[derive(Debug, Serialize)]
pub struct FixtureRecord {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    pub outcome: OutcomeKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comparison: Option<Comparison>,
}

impl From<FixtureReport> for FixtureRecord {
    fn from(report: FixtureReport) -> Self {
        let outcome = report.outcome.kind();
        let error = report.outcome.error_message();
        let comparison = match report.outcome {
            Outcome::Compared(comparison) => Some(comparison),
            _ => None,
        };

        Self {
            id: report.id,
            method: report.request.as_ref().map(|r| r.method.clone()),
            url: report.request.map(|r| r.url),
            status: report.live.map(|l| l.status),
            outcome,
            error,
            comparison,
        }
    }
}

/// Result of a whole run
#[derive(Debug, Serialize)]
pub struct RunSummary {
    pub run_id: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub tally: Tally,
    pub fixtures: Vec<FixtureRecord>,
}

impl RunSummary {
    /// Every fixture fully matched and nothing failed
    pub fn all_passed(&self) -> bool {
        self.tally.all_passed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use replay_compare::compare;
    use serde_json::json;
    use std::time::Duration;

    #[test]
    fn test_outcome_kinds() {
        let matched = Outcome::Compared(compare(&json!(1), &json!(1)));
        let mismatched = Outcome::Compared(compare(&json!(1), &json!(2)));
        let timeout = Outcome::TransportFailed(TransportError::Timeout(Duration::from_secs(30)));
        let status = Outcome::StatusRejected {
            expected: None,
            actual: 503,
        };

        assert_eq!(matched.kind(), OutcomeKind::Matched);
        assert!(matched.is_pass());
        assert_eq!(mismatched.kind(), OutcomeKind::Mismatched);
        assert!(!mismatched.is_pass());
        assert_eq!(timeout.kind(), OutcomeKind::TransportError);
        assert_eq!(status.kind(), OutcomeKind::StatusError);
    }

    #[test]
    fn test_status_error_messages() {
        let any_success = Outcome::StatusRejected {
            expected: None,
            actual: 500,
        };
        assert_eq!(
            any_success.error_message().as_deref(),
            Some("expected a 2xx status, got 500")
        );

        let strict = Outcome::StatusRejected {
            expected: Some(200),
            actual: 201,
        };
        assert_eq!(
            strict.error_message().as_deref(),
            Some("expected status 200, got 201")
        );
    }

    #[test]
    fn test_tally() {
        let mut tally = Tally::default();
        tally.record(&Outcome::Compared(compare(&json!([]), &json!([]))));
        tally.record(&Outcome::Compared(compare(&json!([]), &json!([1]))));
        tally.record(&Outcome::TransportFailed(TransportError::Timeout(
            Duration::from_secs(1),
        )));

        assert_eq!(tally.matched, 1);
        assert_eq!(tally.mismatched, 1);
        assert_eq!(tally.transport_errors, 1);
        assert_eq!(tally.total(), 3);
        assert_eq!(tally.errors(), 1);
        assert_eq!(tally.failed(), 2);
        assert!(!tally.all_passed());
        assert!(Tally::default().all_passed());
    }

    #[test]
    fn test_record_serialization() {
        let report = FixtureReport {
            id: "requests/items.json".to_string(),
            request: Some(RecordedRequest {
                url: "http://localhost/items".to_string(),
                method: "GET".to_string(),
                headers: Default::default(),
            }),
            live: Some(LiveResponse::new(200, "[1,2,3]")),
            outcome: Outcome::Compared(compare(&json!([1, 2]), &json!([1, 2, 3]))),
        };

        let value = serde_json::to_value(FixtureRecord::from(report)).unwrap();
        assert_eq!(
            value,
            json!({
                "id": "requests/items.json",
                "method": "GET",
                "url": "http://localhost/items",
                "status": 200,
                "outcome": "mismatched",
                "comparison": {
                    "classification": "NoMatch",
                    "differences": [{"path": "[2]", "kind": "Added", "live": 3}]
                }
            })
        );
    }
}
