//! Console reporting of fixture outcomes

use crate::outcome::{FixtureReport, Outcome, OutcomeKind, RunSummary};
use colored::Colorize;
use replay_compare::DiffKind;
use std::fmt::Write as _;
use std::io::Write as _;

/// Applies terminal styling, or none at all when color is off
#[derive(Debug, Clone, Copy)]
pub struct Formatter {
    color: bool,
}

impl Formatter {
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    pub fn plain() -> Self {
        Self::new(false)
    }

    pub fn pass(&self, text: &str) -> String {
        if self.color {
            text.green().bold().to_string()
        } else {
            text.to_string()
        }
    }

    pub fn fail(&self, text: &str) -> String {
        if self.color {
            text.red().bold().to_string()
        } else {
            text.to_string()
        }
    }

    pub fn warn(&self, text: &str) -> String {
        if self.color {
            text.yellow().to_string()
        } else {
            text.to_string()
        }
    }

    pub fn dim(&self, text: &str) -> String {
        if self.color {
            text.dimmed().to_string()
        } else {
            text.to_string()
        }
    }

    fn diff_kind(&self, kind: DiffKind) -> String {
        let label = format!("[{:>7}]", kind.to_string());
        match kind {
            DiffKind::Match => self.dim(&label),
            DiffKind::Added => self.pass(&label),
            DiffKind::Removed => self.fail(&label),
            DiffKind::ValueMismatch | DiffKind::TypeMismatch => self.warn(&label),
        }
    }
}

impl Default for Formatter {
    fn default() -> Self {
        Self::new(true)
    }
}

/// Receives outcomes as the run progresses
pub trait Reporter: Send + Sync {
    /// Called once per fixture, as soon as it is done
    fn fixture(&self, report: &FixtureReport);

    /// Called once at the end of the run
    fn summary(&self, summary: &RunSummary);
}

/// Reporter printing to stdout
#[derive(Debug, Clone, Default)]
pub struct ConsoleReporter {
    formatter: Formatter,
    skip_body_logging: bool,
}

impl ConsoleReporter {
    pub fn new(formatter: Formatter) -> Self {
        Self {
            formatter,
            skip_body_logging: false,
        }
    }

    pub fn skip_body_logging(mut self, skip: bool) -> Self {
        self.skip_body_logging = skip;
        self
    }

    /// Text printed for one fixture
    pub fn render_fixture(&self, report: &FixtureReport) -> String {
        let fmt = &self.formatter;
        let mut out = String::new();

        let _ = writeln!(out, "── {}", report.id);

        if let Some(request) = &report.request {
            let headers: Vec<String> = request
                .headers
                .iter()
                .map(|(k, v)| format!("{}: {}", k, v))
                .collect();
            let _ = writeln!(out, "   Request URL: {}", request.url);
            let _ = writeln!(out, "   Request method: {}", request.method);
            let _ = writeln!(out, "   Request headers: {{{}}}", headers.join(", "));
        }

        if let Some(live) = &report.live {
            let _ = writeln!(out, "   Response status: {}", live.status);
            if let Some(content_type) = live.header("content-type") {
                let _ = writeln!(out, "   Response content type: {}", content_type);
            }
            if !self.skip_body_logging {
                let _ = writeln!(out, "   Response body: {}", fmt.dim(&live.body_text()));
            }
        }

        match &report.outcome {
            Outcome::Compared(comparison) if comparison.is_full_match() => {
                let _ = writeln!(out, "   ✅ {}", fmt.pass(&comparison.headline()));
            }
            Outcome::Compared(comparison) => {
                let _ = writeln!(out, "   ❌ {}", fmt.fail(&comparison.headline()));
                for diff in comparison.differences() {
                    let label = fmt.diff_kind(diff.kind);
                    let _ = writeln!(out, "      {} {}", label, diff.describe());
                }
            }
            other => {
                let message = other.error_message().unwrap_or_default();
                let _ = writeln!(
                    out,
                    "   ❌ {}: {}",
                    fmt.fail(&other.kind().to_string()),
                    message
                );
            }
        }

        out
    }

    /// Text printed at the end of the run
    pub fn render_summary(&self, summary: &RunSummary) -> String {
        let fmt = &self.formatter;
        let tally = &summary.tally;
        let mut out = String::new();

        let _ = writeln!(out);
        let _ = writeln!(out, "=== Replay Summary ===");
        let _ = writeln!(out, "Run: {}", summary.run_id);
        let _ = writeln!(out, "Fixtures: {}", tally.total());
        let rows = [
            (OutcomeKind::Matched, tally.matched),
            (OutcomeKind::Mismatched, tally.mismatched),
            (OutcomeKind::LoadError, tally.load_errors),
            (OutcomeKind::TransportError, tally.transport_errors),
            (OutcomeKind::StatusError, tally.status_errors),
            (OutcomeKind::MalformedBody, tally.malformed),
        ];
        for (kind, count) in rows {
            let _ = writeln!(out, "  {:<18} {}", format!("{}:", kind), count);
        }
        let _ = writeln!(out);

        if tally.all_passed() {
            let _ = writeln!(out, "✅ {}", fmt.pass("All fixtures matched!"));
        } else {
            let failed = format!("{} of {} fixtures failed", tally.failed(), tally.total());
            let _ = writeln!(out, "❌ {}", fmt.fail(&failed));
        }

        out
    }
}

impl Reporter for ConsoleReporter {
    fn fixture(&self, report: &FixtureReport) {
        let text = self.render_fixture(report);
        let mut stdout = std::io::stdout().lock();
        let _ = stdout.write_all(text.as_bytes());
        let _ = stdout.flush();
    }

    fn summary(&self, summary: &RunSummary) {
        print!("{}", self.render_summary(summary));
    }
}
