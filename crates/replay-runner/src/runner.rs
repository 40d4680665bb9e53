//! Replay runner

use crate::config::RunnerConfig;
use crate::outcome::{FixtureRecord, FixtureReport, Outcome, RunSummary, Tally};
use crate::report::Reporter;
use crate::transport::{OutboundRequest, Transport, TransportError};
use chrono::Utc;
use futures::stream::{self, StreamExt};
use replay_compare::{compare_with, MalformedInputError, Side};
use replay_core::{Credential, Fixture, LiveResponse, LoadResult};
use serde_json::Value;
use tracing::{debug, info, warn};
use ulid::Ulid;

/// Replays fixtures and reports each outcome as soon as it is known
pub struct Runner<T, R> {
    config: RunnerConfig,
    transport: T,
    credential: Credential,
    reporter: R,
}

impl<T: Transport, R: Reporter> Runner<T, R> {
    pub fn new(config: RunnerConfig, transport: T, credential: Credential, reporter: R) -> Self {
        Self {
            config,
            transport,
            credential,
            reporter,
        }
    }

    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn reporter(&self) -> &R {
        &self.reporter
    }

    /// Run every fixture
    ///
    /// Fixtures that failed to load are reported and counted like any other
    /// failure. With `concurrency > 1` fixtures are processed in parallel and
    /// reported in completion order; each is reported exactly once.
    pub async fn run<I>(&self, fixtures: I) -> RunSummary
    where
        I: IntoIterator<Item = LoadResult<Fixture>>,
    {
        let run_id = Ulid::new().to_string();
        let started_at = Utc::now();
        let fixtures: Vec<_> = fixtures.into_iter().collect();
        let concurrency = self.config.concurrency.max(1);

        info!(
            "Starting run {} with {} fixtures (concurrency {})",
            run_id,
            fixtures.len(),
            concurrency
        );

        let mut reports = stream::iter(fixtures)
            .map(|entry| self.process_entry(entry))
            .buffer_unordered(concurrency);

        let mut tally = Tally::default();
        let mut records = Vec::new();
        while let Some(report) = reports.next().await {
            self.reporter.fixture(&report);
            tally.record(&report.outcome);
            records.push(FixtureRecord::from(report));
        }

        let summary = RunSummary {
            run_id,
            started_at,
            finished_at: Utc::now(),
            tally,
            fixtures: records,
        };

        info!(
            "Run {} finished: {}/{} fixtures matched",
            summary.run_id,
            summary.tally.matched,
            summary.tally.total()
        );
        self.reporter.summary(&summary);

        summary
    }

    async fn process_entry(&self, entry: LoadResult<Fixture>) -> FixtureReport {
        match entry {
            Ok(fixture) => {
                let (live, outcome) = self.process(&fixture).await;
                FixtureReport {
                    id: fixture.id,
                    request: Some(fixture.request),
                    live,
                    outcome,
                }
            }
            Err(err) => {
                warn!("Skipping fixture: {}", err);
                FixtureReport {
                    id: err.path().display().to_string(),
                    request: None,
                    live: None,
                    outcome: Outcome::LoadFailed(err),
                }
            }
        }
    }

    /// Replay one fixture and classify the result
    ///
    /// Returns the live response when one was obtained.
    pub async fn process(&self, fixture: &Fixture) -> (Option<LiveResponse>, Outcome) {
        let request = OutboundRequest::from_fixture(&fixture.request, &self.credential);
        let timeout = self.config.request_timeout;

        debug!("{}: {} {}", fixture.id, request.method, request.url);

        let sent = tokio::time::timeout(timeout, self.transport.send(&request));
        let live = match sent.await {
            Ok(Ok(live)) => live,
            Ok(Err(err)) => {
                warn!("{}: {}", fixture.id, err);
                return (None, Outcome::TransportFailed(err));
            }
            Err(_) => {
                warn!("{}: request timed out after {:?}", fixture.id, timeout);
                let err = TransportError::Timeout(timeout);
                return (None, Outcome::TransportFailed(err));
            }
        };

        let policy = self.config.status_policy;
        if !policy.accepts(fixture.response.status, &live) {
            warn!(
                "{}: status {} rejected (recorded {})",
                fixture.id, live.status, fixture.response.status
            );
            let outcome = Outcome::StatusRejected {
                expected: policy.expected(fixture.response.status),
                actual: live.status,
            };
            return (Some(live), outcome);
        }

        let body: Value = match serde_json::from_slice(&live.body) {
            Ok(body) => body,
            Err(source) => {
                warn!("{}: live body is not JSON: {}", fixture.id, source);
                let err = MalformedInputError {
                    side: Side::Live,
                    source,
                };
                return (Some(live), Outcome::MalformedBody(err));
            }
        };

        let comparison = compare_with(&fixture.response.body, &body, &self.config.compare);
        debug!("{}: {}", fixture.id, comparison.classification());

        (Some(live), Outcome::Compared(comparison))
    }
}
