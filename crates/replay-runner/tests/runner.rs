//! Runner scenarios driven by a scripted transport
//!
//! No network is involved: each fixture URL maps to a canned response, a
//! failure, or a request that never completes.

use async_trait::async_trait;
use replay_core::{
    load_fixtures, Credential, Fixture, LiveResponse, LoadResult, RecordedRequest,
    RecordedResponse,
};
use replay_runner::{
    FixtureReport, OutboundRequest, OutcomeKind, Reporter, RunSummary, Runner, RunnerConfig,
    Transport, TransportError,
};
use serde_json::{json, Value};
use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;
use std::time::Duration;
use tempfile::TempDir;

enum Script {
    Respond(u16, &'static str),
    Hang,
    /// Fails before anything is sent
    Reject,
}

#[derive(Default)]
struct ScriptedTransport {
    scripts: HashMap<String, Script>,
    sent: Mutex<Vec<OutboundRequest>>,
}

impl ScriptedTransport {
    fn with(mut self, url: &str, script: Script) -> Self {
        self.scripts.insert(url.to_string(), script);
        self
    }

    fn sent(&self) -> Vec<OutboundRequest> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: &OutboundRequest) -> Result<LiveResponse, TransportError> {
        self.sent.lock().unwrap().push(request.clone());

        match self.scripts.get(&request.url) {
            Some(Script::Respond(status, body)) => Ok(LiveResponse::new(*status, *body)),
            Some(Script::Hang) => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                unreachable!("the runner timeout fires first")
            }
            Some(Script::Reject) | None => {
                Err(TransportError::InvalidMethod(request.method.clone()))
            }
        }
    }
}

#[derive(Default)]
struct CollectingReporter {
    fixtures: Mutex<Vec<(String, OutcomeKind)>>,
    summaries: Mutex<usize>,
}

impl CollectingReporter {
    fn fixtures(&self) -> Vec<(String, OutcomeKind)> {
        self.fixtures.lock().unwrap().clone()
    }
}

impl Reporter for CollectingReporter {
    fn fixture(&self, report: &FixtureReport) {
        self.fixtures
            .lock()
            .unwrap()
            .push((report.id.clone(), report.outcome.kind()));
    }

    fn summary(&self, _summary: &RunSummary) {
        *self.summaries.lock().unwrap() += 1;
    }
}

fn fixture(id: &str, url: &str, status: u16, body: Value) -> LoadResult<Fixture> {
    Ok(Fixture::new(
        id,
        RecordedRequest {
            url: url.to_string(),
            method: "GET".to_string(),
            headers: BTreeMap::new(),
        },
        RecordedResponse { status, body },
    ))
}

fn runner(
    config: RunnerConfig,
    transport: ScriptedTransport,
) -> Runner<ScriptedTransport, CollectingReporter> {
    Runner::new(
        config,
        transport,
        Credential::new("Bearer test-token"),
        CollectingReporter::default(),
    )
}

#[tokio::test]
async fn test_timeout_is_isolated() {
    let transport = ScriptedTransport::default()
        .with("http://svc/one", Script::Respond(200, r#"{"ok": true}"#))
        .with("http://svc/two", Script::Hang)
        .with("http://svc/three", Script::Respond(200, r#"{"ok": false}"#));
    let config = RunnerConfig::default().with_timeout(Duration::from_millis(50));
    let runner = runner(config, transport);

    let summary = runner
        .run(vec![
            fixture("one", "http://svc/one", 200, json!({"ok": true})),
            fixture("two", "http://svc/two", 200, json!({"ok": true})),
            fixture("three", "http://svc/three", 200, json!({"ok": true})),
        ])
        .await;

    assert_eq!(
        runner.reporter().fixtures(),
        vec![
            ("one".to_string(), OutcomeKind::Matched),
            ("two".to_string(), OutcomeKind::TransportError),
            ("three".to_string(), OutcomeKind::Mismatched),
        ]
    );
    assert_eq!(summary.tally.matched, 1);
    assert_eq!(summary.tally.transport_errors, 1);
    assert_eq!(summary.tally.mismatched, 1);
    assert_eq!(summary.tally.total(), 3);
    assert!(!summary.all_passed());
    assert_eq!(*runner.reporter().summaries.lock().unwrap(), 1);
}

#[tokio::test]
async fn test_end_to_end_added_item() {
    let transport = ScriptedTransport::default().with(
        "http://svc/items",
        Script::Respond(200, r#"{"status":"ok","items":[1,2,3]}"#),
    );
    let runner = runner(RunnerConfig::default(), transport);

    let summary = runner
        .run(vec![fixture(
            "items",
            "http://svc/items",
            200,
            json!({"status": "ok", "items": [1, 2]}),
        )])
        .await;

    let record = &summary.fixtures[0];
    assert_eq!(record.outcome, OutcomeKind::Mismatched);
    assert_eq!(record.status, Some(200));

    let comparison = record.comparison.as_ref().unwrap();
    let diffs = comparison.differences();
    assert_eq!(diffs.len(), 1);
    assert_eq!(diffs[0].path.to_string(), "items[2]");
    assert_eq!(diffs[0].live, Some(json!(3)));
}

#[tokio::test]
async fn test_all_matched_passes() {
    let transport = ScriptedTransport::default()
        .with("http://svc/a", Script::Respond(200, r#"{"x": 1.0}"#))
        .with("http://svc/b", Script::Respond(201, r#"[]"#));
    let runner = runner(RunnerConfig::default(), transport);

    let summary = runner
        .run(vec![
            fixture("a", "http://svc/a", 200, json!({"x": 1})),
            fixture("b", "http://svc/b", 201, json!([])),
        ])
        .await;

    assert_eq!(summary.tally.matched, 2);
    assert!(summary.all_passed());
}

#[tokio::test]
async fn test_non_success_status_skips_comparison() {
    let transport = ScriptedTransport::default()
        .with("http://svc/down", Script::Respond(503, "not json"));
    let runner = runner(RunnerConfig::default(), transport);

    let summary = runner
        .run(vec![fixture("down", "http://svc/down", 200, json!({}))])
        .await;

    let record = &summary.fixtures[0];
    assert_eq!(record.outcome, OutcomeKind::StatusError);
    assert_eq!(record.status, Some(503));
    assert!(record.comparison.is_none());
    assert_eq!(
        record.error.as_deref(),
        Some("expected a 2xx status, got 503")
    );
}

#[tokio::test]
async fn test_strict_status_requires_recorded_status() {
    const GONE: &str = r#"{"error": "gone"}"#;
    let gone = json!({"error": "gone"});
    let transport = ScriptedTransport::default()
        .with("http://svc/created", Script::Respond(200, "{}"))
        .with("http://svc/missing", Script::Respond(404, GONE));
    let config = RunnerConfig::default().with_strict_status(true);
    let runner = runner(config, transport);

    let summary = runner
        .run(vec![
            fixture("created", "http://svc/created", 201, json!({})),
            fixture("missing", "http://svc/missing", 404, gone),
        ])
        .await;

    assert_eq!(summary.fixtures[0].outcome, OutcomeKind::StatusError);
    assert_eq!(
        summary.fixtures[0].error.as_deref(),
        Some("expected status 201, got 200")
    );
    assert_eq!(summary.fixtures[1].outcome, OutcomeKind::Matched);
}

#[tokio::test]
async fn test_malformed_live_body() {
    let transport = ScriptedTransport::default()
        .with("http://svc/html", Script::Respond(200, "<html></html>"))
        .with("http://svc/json", Script::Respond(200, "{}"));
    let runner = runner(RunnerConfig::default(), transport);

    let summary = runner
        .run(vec![
            fixture("html", "http://svc/html", 200, json!({})),
            fixture("json", "http://svc/json", 200, json!({})),
        ])
        .await;

    assert_eq!(summary.fixtures[0].outcome, OutcomeKind::MalformedBody);
    assert!(summary.fixtures[0]
        .error
        .as_deref()
        .unwrap()
        .starts_with("live body is not valid JSON"));
    assert_eq!(summary.fixtures[1].outcome, OutcomeKind::Matched);
    assert_eq!(summary.tally.malformed, 1);
}

#[tokio::test]
async fn test_load_errors_are_reported_and_run_continues() {
    let temp_dir = TempDir::new().unwrap();
    std::fs::write(temp_dir.path().join("a_broken.json"), "{ nope").unwrap();
    std::fs::write(
        temp_dir.path().join("b_good.json"),
        r#"{
            "request": {"url": "http://svc/good", "method": "GET", "headers": {}},
            "response": {"status": 200, "body": {"n": 5}}
        }"#,
    )
    .unwrap();

    let transport = ScriptedTransport::default()
        .with("http://svc/good", Script::Respond(200, r#"{"n": 5}"#));
    let runner = runner(RunnerConfig::default(), transport);

    let fixtures = load_fixtures(&[temp_dir.path().to_path_buf()]).await;
    let summary = runner.run(fixtures).await;

    let reported = runner.reporter().fixtures();
    assert_eq!(reported.len(), 2);
    assert!(reported[0].0.ends_with("a_broken.json"));
    assert_eq!(reported[0].1, OutcomeKind::LoadError);
    assert_eq!(reported[1].1, OutcomeKind::Matched);
    assert_eq!(summary.tally.load_errors, 1);
    assert_eq!(summary.tally.matched, 1);
}

#[tokio::test]
async fn test_transport_failure_is_isolated() {
    let transport = ScriptedTransport::default()
        .with("http://svc/rejected", Script::Reject)
        .with("http://svc/ok", Script::Respond(200, "[]"));
    let runner = runner(RunnerConfig::default(), transport);

    let summary = runner
        .run(vec![
            fixture("rejected", "http://svc/rejected", 200, json!([])),
            fixture("ok", "http://svc/ok", 200, json!([])),
        ])
        .await;

    assert_eq!(summary.fixtures[0].outcome, OutcomeKind::TransportError);
    assert_eq!(summary.fixtures[0].status, None);
    assert_eq!(summary.fixtures[1].outcome, OutcomeKind::Matched);
}

#[tokio::test]
async fn test_credential_is_sent_and_overrides_recorded_header() {
    let transport = ScriptedTransport::default()
        .with("http://svc/me", Script::Respond(200, "{}"));
    let runner = runner(RunnerConfig::default(), transport);

    let mut headers = BTreeMap::new();
    headers.insert("AUTHORIZATION".to_string(), "Bearer recorded".to_string());
    headers.insert("Accept".to_string(), "application/json".to_string());
    let recorded = Fixture::new(
        "me",
        RecordedRequest {
            url: "http://svc/me".to_string(),
            method: "GET".to_string(),
            headers,
        },
        RecordedResponse {
            status: 200,
            body: json!({}),
        },
    );

    let (_, outcome) = runner.process(&recorded).await;
    assert!(outcome.is_pass());

    let sent = runner.transport().sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].header("authorization"), Some("Bearer test-token"));
    assert_eq!(sent[0].header("accept"), Some("application/json"));
    assert_eq!(
        sent[0]
            .headers
            .iter()
            .filter(|(k, _)| k.eq_ignore_ascii_case("authorization"))
            .count(),
        1
    );
}

#[tokio::test]
async fn test_ignored_paths_from_config() {
    let transport = ScriptedTransport::default().with(
        "http://svc/clock",
        Script::Respond(200, r#"{"now": "2025-06-30T10:00:00Z", "tz": "UTC"}"#),
    );
    let config = RunnerConfig::default().ignore_path("now".parse().unwrap());
    let runner = runner(config, transport);

    let summary = runner
        .run(vec![fixture(
            "clock",
            "http://svc/clock",
            200,
            json!({"now": "2024-01-01T00:00:00Z", "tz": "UTC"}),
        )])
        .await;

    assert!(summary.all_passed());
}

#[tokio::test]
async fn test_concurrent_run_reports_each_fixture_once() {
    let mut transport = ScriptedTransport::default();
    let mut fixtures = Vec::new();
    for i in 0..20 {
        let url = format!("http://svc/{}", i);
        let script = if i % 5 == 0 {
            Script::Hang
        } else {
            Script::Respond(200, r#"{"i": true}"#)
        };
        transport = transport.with(&url, script);
        fixtures.push(fixture(&format!("f{}", i), &url, 200, json!({"i": true})));
    }
    let config = RunnerConfig::default()
        .with_concurrency(4)
        .with_timeout(Duration::from_millis(50));
    let runner = runner(config, transport);

    let summary = runner.run(fixtures).await;

    let mut reported: Vec<String> = runner
        .reporter()
        .fixtures()
        .into_iter()
        .map(|(id, _)| id)
        .collect();
    reported.sort();
    reported.dedup();
    assert_eq!(reported.len(), 20);
    assert_eq!(summary.tally.total(), 20);
    assert_eq!(summary.tally.transport_errors, 4);
    assert_eq!(summary.tally.matched, 16);
}
