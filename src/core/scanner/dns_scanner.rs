// src/core/scanner/dns_scanner.rs

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use strum::Display;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::record_store::RecordStore;
use super::records::{PRIORITY_TYPES, extract, record_type_name, secondary_types, to_record_type};
use super::resolvers::{DnsExchange, ResolverSet, SystemTxtLookup};
use crate::core::config::{CollectOptions, SYSTEM_TXT_TTL};
use crate::core::models::{CollectionResult, ResolvedRecord};

/// The two query passes issued against every resolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum QueryWave {
    /// A, AAAA, CNAME, MX, TXT, NS, SOA, SRV, CAA.
    Priority,
    /// The rest of the type table, minus OPT and NULL.
    Secondary,
}

impl QueryWave {
    pub fn record_types(self) -> Vec<u16> {
        match self {
            QueryWave::Priority => PRIORITY_TYPES.to_vec(),
            QueryWave::Secondary => secondary_types().collect(),
        }
    }
}

/// Appends the root label terminator if it is missing.
pub fn to_fqdn(domain: &str) -> String {
    let domain = domain.trim();
    if domain.ends_with('.') {
        domain.to_string()
    } else {
        format!("{domain}.")
    }
}

/// Strips the root label terminator for reporting.
pub fn strip_fqdn(domain: &str) -> &str {
    domain.strip_suffix('.').unwrap_or(domain)
}

/// Shared state handed to every task of one session.
#[derive(Clone)]
struct TaskContext {
    fqdn: Arc<str>,
    store: Arc<RecordStore>,
    /// Cancelled when the query window closes or the session deadline fires.
    cancel: CancellationToken,
    debug: bool,
}

impl TaskContext {
    /// Tasks poll this between work units: query window closed or budget spent.
    fn should_stop(&self) -> bool {
        self.cancel.is_cancelled() || self.store.is_exhausted()
    }

    fn record(&self, record_type: &str, ttl: u32, value: &str, source: &str) {
        let record = ResolvedRecord::new(&self.fqdn, record_type, ttl, value);
        if self.store.insert(record) && self.debug {
            debug!(source, record_type, value, "Found record.");
        }
    }
}

/// Collects every record the resolver set can see for `domain`.
///
/// One task runs per resolver and wave, plus one for the system resolver's
/// TXT lookup. Tasks may start queries until the query window closes, after
/// which they wind down on their own. The overall deadline bounds the whole
/// session: when it fires the session aborts the tasks and returns what the
/// store holds, with `timed_out` set. Neither is an error.
///
/// # Arguments
/// * `domain` - The domain to scan, with or without the trailing dot.
/// * `resolvers` - The resolvers to fan out to.
/// * `options` - Deadline, per-query timeouts and record budget.
///
/// # Returns
/// A `CollectionResult` with deduplicated records in unspecified order.
pub async fn collect(domain: &str, resolvers: &ResolverSet, options: &CollectOptions) -> CollectionResult {
    let session = CancellationToken::new();
    let ctx = TaskContext {
        fqdn: Arc::from(to_fqdn(domain)),
        store: Arc::new(RecordStore::new(options.max_records)),
        cancel: session.child_token(),
        debug: options.debug,
    };

    info!(domain = %ctx.fqdn, resolvers = resolvers.exchanges.len(), max_records = options.max_records, "Starting DNS collection.");

    let mut tasks = JoinSet::new();
    if let Some(system) = &resolvers.system {
        tasks.spawn(query_system_resolver(ctx.clone(), Arc::clone(system)));
    }
    for exchange in &resolvers.exchanges {
        tasks.spawn(query_wave(
            ctx.clone(),
            Arc::clone(exchange),
            QueryWave::Priority,
            options.priority_query_timeout,
        ));
        tasks.spawn(query_wave(
            ctx.clone(),
            Arc::clone(exchange),
            QueryWave::Secondary,
            options.secondary_query_timeout,
        ));
    }

    let query_cancel = ctx.cancel.clone();
    let all_done = async {
        let query_window = tokio::time::sleep(options.query_window);
        tokio::pin!(query_window);
        loop {
            tokio::select! {
                joined = tasks.join_next() => match joined {
                    Some(Err(e)) => warn!(error = %e, "Collection task failed."),
                    Some(Ok(())) => {}
                    None => break,
                },
                _ = &mut query_window, if !query_cancel.is_cancelled() => {
                    debug!(window = ?options.query_window, "Query window closed, no new queries.");
                    query_cancel.cancel();
                }
            }
        }
    };
    let timed_out = tokio::time::timeout(options.overall_timeout, all_done).await.is_err();

    if timed_out {
        session.cancel();
        tasks.abort_all();
        warn!(domain = %ctx.fqdn, timeout = ?options.overall_timeout, "Query timeout reached, returning partial results.");
    } else {
        debug!(domain = %ctx.fqdn, "All queries completed.");
    }

    let records = ctx.store.snapshot();
    if ctx.debug {
        log_type_counts(&records);
    }
    info!(domain = %ctx.fqdn, records = records.len(), timed_out, "DNS collection finished.");

    CollectionResult { records, timed_out }
}

/// Queries one wave of record types against one resolver.
///
/// Failed, empty and non-success answers skip the type without retrying.
async fn query_wave(ctx: TaskContext, exchange: Arc<dyn DnsExchange>, wave: QueryWave, timeout: Duration) {
    let resolver = exchange.label();
    debug!(resolver, %wave, "Querying record wave.");

    for code in wave.record_types() {
        if ctx.should_stop() {
            return;
        }
        let type_name = record_type_name(code);

        let response = tokio::select! {
            _ = ctx.cancel.cancelled() => return,
            response = exchange.exchange(&ctx.fqdn, to_record_type(code), timeout) => response,
        };
        let answers = match response {
            Ok(answers) => answers,
            Err(e) => {
                debug!(resolver, record_type = %type_name, error = %e, "Query skipped.");
                continue;
            }
        };

        for answer in &answers {
            let Some(extracted) = extract(answer) else {
                continue;
            };
            if ctx.should_stop() {
                return;
            }
            ctx.record(&extracted.record_type, extracted.ttl, &extracted.value, resolver);
        }
    }
}

/// Streams the system resolver's TXT strings into the store.
///
/// All or nothing: a failed lookup contributes no records.
async fn query_system_resolver(ctx: TaskContext, system: Arc<dyn SystemTxtLookup>) {
    let domain = strip_fqdn(&ctx.fqdn).to_string();
    debug!(domain = %domain, "Querying system resolver for TXT records.");

    let lookup = tokio::select! {
        _ = ctx.cancel.cancelled() => return,
        lookup = system.lookup_txt(&domain) => lookup,
    };
    let values = match lookup {
        Ok(values) => values,
        Err(e) => {
            debug!(domain = %domain, error = %e, "System resolver TXT lookup failed.");
            return;
        }
    };

    for value in values {
        if ctx.should_stop() {
            if ctx.store.is_exhausted() {
                debug!(max_records = ctx.store.max_records(), "Record limit reached, stopping collection.");
            }
            return;
        }
        if !value.is_empty() {
            ctx.record("TXT", SYSTEM_TXT_TTL, &value, "system");
        }
    }
}

fn log_type_counts(records: &[ResolvedRecord]) {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for record in records {
        *counts.entry(record.record_type.as_str()).or_default() += 1;
    }
    for (record_type, count) in &counts {
        debug!(record_type, count, "Records by type.");
    }
    debug!(total = records.len(), "Total records collected.");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::RecordKey;
    use crate::core::scanner::test_support::*;
    use hickory_resolver::proto::rr::RecordType;
    use std::collections::HashSet;

    fn options(max_records: usize) -> CollectOptions {
        CollectOptions::new(Duration::from_secs(5), 0.5, max_records, true)
    }

    fn keys(records: &[ResolvedRecord]) -> HashSet<RecordKey> {
        records.iter().map(ResolvedRecord::key).collect()
    }

    fn linode_exchange(label: &str, ttl: u32) -> StaticExchange {
        StaticExchange::new(label)
            .answer(RecordType::NS, vec![ns_record("ns1.linode.com.", ttl), ns_record("ns2.linode.com.", ttl)])
            .answer(RecordType::A, vec![a_record([192, 0, 2, 1], ttl)])
            .answer(RecordType::MX, vec![mx_record(10, "mx.example.com.", ttl)])
    }

    #[test]
    fn fqdn_round_trip() {
        assert_eq!(to_fqdn("example.com"), "example.com.");
        assert_eq!(to_fqdn("example.com."), "example.com.");
        assert_eq!(to_fqdn(" example.com "), "example.com.");
        assert_eq!(strip_fqdn("example.com."), "example.com");
        assert_eq!(strip_fqdn("example.com"), "example.com");
    }

    #[test]
    fn waves_cover_type_table_without_overlap() {
        let priority = QueryWave::Priority.record_types();
        let secondary = QueryWave::Secondary.record_types();
        assert_eq!(priority, vec![1, 28, 5, 15, 16, 2, 6, 33, 257]);
        assert!(secondary.iter().all(|code| !priority.contains(code)));
        assert!(!secondary.contains(&10) && !secondary.contains(&41));
    }

    #[tokio::test]
    async fn deduplicates_answers_across_resolvers() {
        let first = Arc::new(linode_exchange("first", 300));
        let second = Arc::new(linode_exchange("second", 60));
        let set = resolver_set(vec![first, second], None);

        let result = collect("example.com", &set, &options(100)).await;

        assert!(!result.timed_out);
        assert_eq!(result.records.len(), 4);
        assert_eq!(keys(&result.records).len(), result.records.len());
        assert!(result.records.iter().all(|r| r.domain == "example.com."));
        let mx = result.records.iter().find(|r| r.record_type == "MX").unwrap();
        assert_eq!(mx.value, "10 mx.example.com.");
        // Either resolver may win the race for a shared key.
        assert!(result.records.iter().all(|r| r.ttl == 300 || r.ttl == 60));
    }

    #[tokio::test]
    async fn zero_budget_returns_empty_without_querying() {
        let exchange = Arc::new(linode_exchange("only", 300));
        let set = resolver_set(vec![Arc::clone(&exchange)], Some(StaticSystem(Ok(vec!["v=spf1 -all".into()]))));

        let result = collect("example.com", &set, &options(0)).await;

        assert!(result.records.is_empty());
        assert!(!result.timed_out);
        assert_eq!(exchange.calls(), 0);
    }

    #[tokio::test]
    async fn budget_caps_collection() {
        for cap in [1, 2, 3] {
            let set = resolver_set(
                vec![Arc::new(linode_exchange("a", 300)), Arc::new(linode_exchange("b", 300))],
                Some(StaticSystem(Ok(vec!["v=spf1 -all".into(), "google-site-verification=x".into()]))),
            );
            let result = collect("example.com", &set, &options(cap)).await;
            assert_eq!(result.records.len(), cap, "cap {cap}");
        }
    }

    #[tokio::test]
    async fn full_budget_stops_further_queries() {
        let first_secondary = to_record_type(QueryWave::Secondary.record_types()[0]);
        let exchange = Arc::new(
            StaticExchange::new("only")
                .answer(RecordType::A, vec![a_record([192, 0, 2, 1], 300)])
                .answer(first_secondary, vec![txt_record("v=spf1 -all", 300)]),
        );
        let set = resolver_set(vec![Arc::clone(&exchange)], None);

        let result = collect("example.com", &set, &options(1)).await;

        assert_eq!(result.records.len(), 1);
        assert!(!result.timed_out);
        // Whichever wave fills the budget first, the other issues at most one query.
        assert!(exchange.calls() <= 2, "calls: {}", exchange.calls());
    }

    #[tokio::test]
    async fn unresponsive_resolver_ends_at_query_window() {
        let dead = Arc::new(StaticExchange::new("dead").stall(Duration::from_secs(60)));
        let set = resolver_set(vec![Arc::clone(&dead)], None);
        let mut opts = CollectOptions::new(Duration::from_secs(4), 0.25, 100, false);
        opts.priority_query_timeout = Duration::from_secs(30);
        opts.secondary_query_timeout = Duration::from_secs(30);

        let started = tokio::time::Instant::now();
        let result = collect("example.com", &set, &opts).await;
        let elapsed = started.elapsed();

        assert!(!result.timed_out);
        assert!(result.records.is_empty());
        assert!(elapsed >= opts.query_window, "elapsed {elapsed:?}");
        assert!(elapsed < opts.overall_timeout, "elapsed {elapsed:?}");
        assert_eq!(dead.calls(), 2);
    }

    #[tokio::test]
    async fn system_resolver_records_use_default_ttl() {
        let set = resolver_set(
            Vec::new(),
            Some(StaticSystem(Ok(vec!["v=spf1 include:_spf.google.com ~all".into(), String::new()]))),
        );

        let result = collect("example.com.", &set, &options(10)).await;

        assert_eq!(result.records, vec![ResolvedRecord::new(
            "example.com.",
            "TXT",
            SYSTEM_TXT_TTL,
            "v=spf1 include:_spf.google.com ~all"
        )]);
    }

    #[tokio::test]
    async fn system_resolver_failure_contributes_nothing() {
        let set = resolver_set(
            vec![Arc::new(StaticExchange::new("empty"))],
            Some(StaticSystem(Err("SERVFAIL".into()))),
        );

        let result = collect("example.com", &set, &options(10)).await;

        assert!(result.records.is_empty());
        assert!(!result.timed_out);
    }

    #[tokio::test]
    async fn failed_types_are_skipped_not_retried() {
        let exchange = Arc::new(StaticExchange::new("sparse").answer(RecordType::TXT, vec![txt_record("hello", 30)]));
        let set = resolver_set(vec![Arc::clone(&exchange)], None);

        let result = collect("example.com", &set, &options(10)).await;

        assert_eq!(result.records.len(), 1);
        let expected_calls = QueryWave::Priority.record_types().len() + QueryWave::Secondary.record_types().len();
        assert_eq!(exchange.calls(), expected_calls);
    }

    #[tokio::test]
    async fn deadline_returns_partial_subset() {
        let fast = linode_exchange("fast", 300);
        let full = collect("example.com", &resolver_set(vec![Arc::new(fast)], None), &options(100)).await;

        // Same answers, but the MX query hangs far past the session deadline.
        let slow = Arc::new(linode_exchange("slow", 300).delay(RecordType::MX, Duration::from_secs(30)));
        let mut opts = options(100);
        opts.overall_timeout = Duration::from_millis(200);
        opts.priority_query_timeout = Duration::from_secs(10);

        let partial = collect("example.com", &resolver_set(vec![slow], None), &opts).await;

        assert!(partial.timed_out);
        assert!(!partial.records.is_empty());
        assert!(keys(&partial.records).is_subset(&keys(&full.records)));
        assert!(partial.records.iter().all(|r| r.record_type != "MX"));
    }
}
