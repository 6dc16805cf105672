// src/core/config.rs

//! Defaults shared by the analyzer and the command line.

use std::time::Duration;

/// Overall budget for one domain scan.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Maximum number of distinct records retained per scan.
pub const DEFAULT_MAX_RECORDS: usize = 1000;

/// Share of the overall budget during which new queries may start.
pub const DEFAULT_QUERY_FRACTION: f64 = 0.5;

/// Per-query timeout for the priority wave.
pub const PRIORITY_QUERY_TIMEOUT: Duration = Duration::from_secs(3);

/// Per-query timeout for the secondary wave.
pub const SECONDARY_QUERY_TIMEOUT: Duration = Duration::from_secs(2);

/// TTL assigned to TXT records from the system resolver, which reports none.
pub const SYSTEM_TXT_TTL: u32 = 300;

/// Everything one `analyze_domain` call needs besides the catalog.
#[derive(Debug, Clone)]
pub struct AnalyzerConfig {
    pub domain: String,
    pub timeout: Duration,
    pub query_fraction: f64,
    pub max_records: usize,
    pub debug: bool,
    pub include_records: bool,
}

impl AnalyzerConfig {
    pub fn new(domain: &str) -> Self {
        Self {
            domain: domain.to_string(),
            timeout: DEFAULT_TIMEOUT,
            query_fraction: DEFAULT_QUERY_FRACTION,
            max_records: DEFAULT_MAX_RECORDS,
            debug: false,
            include_records: false,
        }
    }
}

/// Timing and budget for one collection session.
#[derive(Debug, Clone, PartialEq)]
pub struct CollectOptions {
    pub overall_timeout: Duration,
    /// Tasks stop issuing queries once this window closes.
    pub query_window: Duration,
    pub priority_query_timeout: Duration,
    pub secondary_query_timeout: Duration,
    pub max_records: usize,
    pub debug: bool,
}

impl CollectOptions {
    /// Derives the query window and per-query timeouts from the overall budget.
    ///
    /// The query window is `overall_timeout * query_fraction`. Both per-query
    /// timeouts are capped at the window and the secondary one never exceeds
    /// the priority one. A fraction outside `(0, 1)`, NaN included, falls back
    /// to [`DEFAULT_QUERY_FRACTION`].
    pub fn new(overall_timeout: Duration, query_fraction: f64, max_records: usize, debug: bool) -> Self {
        let fraction = if query_fraction > 0.0 && query_fraction < 1.0 {
            query_fraction
        } else {
            DEFAULT_QUERY_FRACTION
        };
        let query_window =
            Duration::try_from_secs_f64(overall_timeout.as_secs_f64() * fraction).unwrap_or(overall_timeout);
        let priority_query_timeout = PRIORITY_QUERY_TIMEOUT.min(query_window);
        let secondary_query_timeout = SECONDARY_QUERY_TIMEOUT.min(priority_query_timeout);
        Self {
            overall_timeout,
            query_window,
            priority_query_timeout,
            secondary_query_timeout,
            max_records,
            debug,
        }
    }
}

impl From<&AnalyzerConfig> for CollectOptions {
    fn from(config: &AnalyzerConfig) -> Self {
        Self::new(config.timeout, config.query_fraction, config.max_records, config.debug)
    }
}
