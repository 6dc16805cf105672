// src/core/scanner/mod.rs

// Public interface of the `scanner` module: record collection, record
// extraction, resolvers and technology matching.
pub mod dns_scanner;
pub mod fingerprint_scanner;
pub mod record_store;
pub mod records;
pub mod resolvers;

#[cfg(test)]
mod test_support;

use tracing::{info, warn};

use self::dns_scanner::{collect, strip_fqdn, to_fqdn};
use self::fingerprint_scanner::detect_technologies;
use self::resolvers::ResolverSet;
use crate::core::config::{AnalyzerConfig, CollectOptions};
use crate::core::error::RadarError;
use crate::core::knowledge_base::CompiledCatalog;
use crate::core::models::AnalysisResult;

/// Runs a full analysis of one domain against the public resolver set.
///
/// See [`analyze_domain`] for the semantics.
pub async fn analyze_domain_default(config: &AnalyzerConfig, catalog: &CompiledCatalog) -> Result<AnalysisResult, RadarError> {
    validate(config)?;
    let options = CollectOptions::from(config);
    let resolvers = ResolverSet::public(options.priority_query_timeout)?;
    analyze_domain(config, catalog, &resolvers).await
}

/// Collects DNS records for a domain and matches them against the catalog.
///
/// Only invalid input fails. A session that runs out of time still produces
/// a result from whatever was collected, as does one that hits the record
/// budget.
///
/// # Arguments
/// * `config` - Domain, timeout, budget and output options.
/// * `catalog` - The compiled signature catalog.
/// * `resolvers` - The resolvers to query.
///
/// # Returns
/// The `AnalysisResult`, with the domain reported without its trailing dot.
pub async fn analyze_domain(
    config: &AnalyzerConfig,
    catalog: &CompiledCatalog,
    resolvers: &ResolverSet,
) -> Result<AnalysisResult, RadarError> {
    validate(config)?;
    let domain = to_fqdn(&config.domain);
    info!(domain = %domain, "Starting analysis.");

    let collection = collect(&domain, resolvers, &CollectOptions::from(config)).await;
    if collection.timed_out {
        warn!(domain = %domain, records = collection.records.len(), "Query timeout reached, proceeding with collected records.");
    }

    let detected_technologies = detect_technologies(&collection.records, catalog);
    info!(domain = %domain, technologies = detected_technologies.len(), "Analysis finished.");

    Ok(AnalysisResult {
        domain: strip_fqdn(&domain).to_string(),
        detected_technologies,
        all_records: config.include_records.then_some(collection.records),
    })
}

fn validate(config: &AnalyzerConfig) -> Result<(), RadarError> {
    let domain = strip_fqdn(config.domain.trim());
    if domain.is_empty() || domain.contains(char::is_whitespace) || domain.split('.').any(str::is_empty) {
        return Err(RadarError::InvalidDomain(config.domain.clone()));
    }
    if config.timeout.is_zero() {
        return Err(RadarError::InvalidConfig("timeout must be greater than zero".to_string()));
    }
    if !(config.query_fraction > 0.0 && config.query_fraction < 1.0) {
        return Err(RadarError::InvalidConfig(format!(
            "per-query timeout fraction must be between 0 and 1, got {}",
            config.query_fraction
        )));
    }
    Ok(())
}
