//! Fixture replay runner
//!
//! Drives the comparison of many fixtures against a live service:
//!
//! ```text
//! ┌──────────┐   ┌─────────────┐   ┌────────────┐   ┌──────────┐
//! │ Fixture  │──▶│  Transport  │──▶│ Comparator │──▶│ Reporter │
//! │ (loaded) │   │ (HTTP call) │   │ (diff)     │   │ (console)│
//! └──────────┘   └─────────────┘   └────────────┘   └──────────┘
//! ```
//!
//! Every fixture ends in exactly one [`Outcome`]. Failures are local to
//! their fixture: a timeout or a malformed body is reported and counted,
//! and the run moves on to the next fixture.

pub mod config;
pub mod outcome;
pub mod report;
pub mod runner;
pub mod transport;

pub use config::{RunnerConfig, StatusPolicy};
pub use outcome::{FixtureRecord, FixtureReport, Outcome, OutcomeKind, RunSummary, Tally};
pub use report::{ConsoleReporter, Formatter, Reporter};
pub use runner::Runner;
pub use transport::{HttpTransport, OutboundRequest, Transport, TransportError};
