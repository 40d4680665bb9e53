//! Runner configuration

use replay_compare::{CompareOptions, JsonPath};
use replay_core::LiveResponse;
use std::env;
use std::time::Duration;
use tracing::warn;

/// Default per-request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Which live status codes allow the body to be compared
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusPolicy {
    /// Any 2xx status
    #[default]
    SuccessOnly,
    /// Exactly the status recorded in the fixture
    MatchRecorded,
}

impl StatusPolicy {
    /// Whether the live response's body may be compared
    pub fn accepts(&self, recorded: u16, live: &LiveResponse) -> bool {
        match self {
            StatusPolicy::SuccessOnly => live.is_success(),
            StatusPolicy::MatchRecorded => recorded == live.status,
        }
    }

    /// The status the policy expected, `None` meaning any 2xx
    pub fn expected(&self, recorded: u16) -> Option<u16> {
        match self {
            StatusPolicy::SuccessOnly => None,
            StatusPolicy::MatchRecorded => Some(recorded),
        }
    }
}

/// Configuration for a replay run
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// Gate applied to the live status before comparing bodies
    pub status_policy: StatusPolicy,
    /// Timeout for each outbound request
    pub request_timeout: Duration,
    /// Don't print live response bodies
    pub skip_body_logging: bool,
    /// Maximum fixtures in flight at once; 1 runs them in order
    pub concurrency: usize,
    /// Options passed to the comparator
    pub compare: CompareOptions,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            status_policy: StatusPolicy::default(),
            request_timeout: DEFAULT_TIMEOUT,
            skip_body_logging: false,
            concurrency: 1,
            compare: CompareOptions::default(),
        }
    }
}

impl RunnerConfig {
    /// Load configuration from environment variables
    ///
    /// - `REPLAY_STRICT_STATUS`: require the recorded status
    /// - `REPLAY_TIMEOUT_SECS`: per-request timeout (default 30)
    /// - `REPLAY_SKIP_BODY_LOGGING`: don't print live bodies
    /// - `REPLAY_CONCURRENCY`: fixtures in flight (default 1)
    /// - `REPLAY_IGNORE`: comma-separated paths to ignore when comparing;
    ///   entries that don't parse as a path are skipped with a warning
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if env_flag("REPLAY_STRICT_STATUS") {
            config.status_policy = StatusPolicy::MatchRecorded;
        }
        if let Some(secs) = env::var("REPLAY_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.trim().parse::<u64>().ok())
        {
            config.request_timeout = Duration::from_secs(secs);
        }
        config.skip_body_logging = env_flag("REPLAY_SKIP_BODY_LOGGING");
        if let Some(n) = env::var("REPLAY_CONCURRENCY")
            .ok()
            .and_then(|v| v.trim().parse::<usize>().ok())
        {
            config.concurrency = n.max(1);
        }
        if let Ok(paths) = env::var("REPLAY_IGNORE") {
            for path in paths.split(',').map(str::trim).filter(|p| !p.is_empty()) {
                match JsonPath::parse(path) {
                    Ok(path) => config = config.ignore_path(path),
                    Err(err) => warn!("Skipping REPLAY_IGNORE entry: {}", err),
                }
            }
        }

        config
    }

    pub fn with_strict_status(mut self, strict: bool) -> Self {
        self.status_policy = if strict {
            StatusPolicy::MatchRecorded
        } else {
            StatusPolicy::SuccessOnly
        };
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn with_skip_body_logging(mut self, skip: bool) -> Self {
        self.skip_body_logging = skip;
        self
    }

    pub fn ignore_path(mut self, path: JsonPath) -> Self {
        self.compare = self.compare.ignore_path(path);
        self
    }
}

fn env_flag(name: &str) -> bool {
    let value = env::var(name).unwrap_or_default().to_ascii_lowercase();
    matches!(value.trim(), "1" | "true" | "yes" | "on")
}
