// src/core/scanner/resolvers.rs

//! The resolvers a collection session fans out to.
//!
//! Each public endpoint is wrapped in its own [`HickoryExchange`] so a slow or
//! rate-limiting resolver only ever delays its own tasks. The ambient system
//! resolver is used separately, for TXT records only.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use hickory_resolver::TokioAsyncResolver;
use hickory_resolver::config::{NameServerConfig, Protocol, ResolverConfig, ResolverOpts};
use hickory_resolver::proto::rr::{Record, RecordType};
use tracing::{debug, warn};

use crate::core::error::{ExchangeError, RadarError};

/// Public resolvers queried on every scan.
pub const PUBLIC_RESOLVERS: &[(&str, &str)] = &[
    ("Google", "8.8.8.8:53"),
    ("Cloudflare", "1.1.1.1:53"),
    ("Quad9", "9.9.9.9:53"),
    ("OpenDNS", "208.67.222.222:53"),
];

/// Performs a single DNS query against one resolver endpoint.
///
/// Implementations return the answer section on success. A failed exchange,
/// an empty answer or a non-success response code are all reported as an
/// error; the caller skips the type without retrying.
#[async_trait]
pub trait DnsExchange: Send + Sync {
    /// Human-readable label used in diagnostics.
    fn label(&self) -> &str;

    async fn exchange(
        &self,
        fqdn: &str,
        record_type: RecordType,
        timeout: Duration,
    ) -> Result<Vec<Record>, ExchangeError>;
}

/// TXT lookups through the host's own resolver configuration.
///
/// The ambient resolver does not expose TTLs, so callers receive plain strings.
#[async_trait]
pub trait SystemTxtLookup: Send + Sync {
    async fn lookup_txt(&self, domain: &str) -> Result<Vec<String>, ExchangeError>;
}

/// [`DnsExchange`] backed by a single-server hickory resolver.
pub struct HickoryExchange {
    label: String,
    resolver: TokioAsyncResolver,
}

impl HickoryExchange {
    /// Builds a resolver that talks to `address` only, over UDP, with caching
    /// disabled and a single attempt per query.
    pub fn new(label: &str, address: SocketAddr, timeout: Duration) -> Self {
        let mut config = ResolverConfig::new();
        config.add_name_server(NameServerConfig::new(address, Protocol::Udp));

        let mut opts = ResolverOpts::default();
        opts.timeout = timeout;
        opts.attempts = 1;
        opts.cache_size = 0;
        opts.use_hosts_file = false;
        opts.validate = false;

        Self {
            label: format!("{label} ({address})"),
            resolver: TokioAsyncResolver::tokio(config, opts),
        }
    }
}

#[async_trait]
impl DnsExchange for HickoryExchange {
    fn label(&self) -> &str {
        &self.label
    }

    async fn exchange(
        &self,
        fqdn: &str,
        record_type: RecordType,
        timeout: Duration,
    ) -> Result<Vec<Record>, ExchangeError> {
        match tokio::time::timeout(timeout, self.resolver.lookup(fqdn, record_type)).await {
            Ok(Ok(lookup)) => Ok(lookup.records().to_vec()),
            Ok(Err(e)) => Err(ExchangeError::Resolve(e.to_string())),
            Err(_) => Err(ExchangeError::Timeout(timeout)),
        }
    }
}

/// [`SystemTxtLookup`] using the resolver configured for this host
/// (`/etc/resolv.conf` or the platform equivalent).
pub struct SystemResolver {
    resolver: TokioAsyncResolver,
}

impl SystemResolver {
    pub fn from_system_conf() -> Result<Self, RadarError> {
        let resolver = TokioAsyncResolver::tokio_from_system_conf()
            .map_err(|e| RadarError::ResolverSetup(e.to_string()))?;
        Ok(Self { resolver })
    }
}

#[async_trait]
impl SystemTxtLookup for SystemResolver {
    async fn lookup_txt(&self, domain: &str) -> Result<Vec<String>, ExchangeError> {
        let lookup = self
            .resolver
            .txt_lookup(domain)
            .await
            .map_err(|e| ExchangeError::Resolve(e.to_string()))?;

        // One string per TXT record, character-strings concatenated.
        Ok(lookup
            .iter()
            .map(|txt| {
                txt.txt_data()
                    .iter()
                    .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
                    .collect::<String>()
            })
            .collect())
    }
}

/// The independent resolvers one collection session queries.
#[derive(Clone)]
pub struct ResolverSet {
    pub exchanges: Vec<Arc<dyn DnsExchange>>,
    pub system: Option<Arc<dyn SystemTxtLookup>>,
}

impl ResolverSet {
    pub fn new(exchanges: Vec<Arc<dyn DnsExchange>>, system: Option<Arc<dyn SystemTxtLookup>>) -> Self {
        Self { exchanges, system }
    }

    /// The fixed public resolvers plus the system resolver.
    ///
    /// A host without a usable resolver configuration only loses the ambient
    /// TXT task; the public resolvers are still queried.
    pub fn public(query_timeout: Duration) -> Result<Self, RadarError> {
        let mut exchanges: Vec<Arc<dyn DnsExchange>> = Vec::with_capacity(PUBLIC_RESOLVERS.len());
        for (label, address) in PUBLIC_RESOLVERS {
            let address: SocketAddr = address
                .parse()
                .map_err(|e| RadarError::ResolverSetup(format!("{label} address {address}: {e}")))?;
            exchanges.push(Arc::new(HickoryExchange::new(label, address, query_timeout)));
        }

        let system: Option<Arc<dyn SystemTxtLookup>> = match SystemResolver::from_system_conf() {
            Ok(resolver) => Some(Arc::new(resolver)),
            Err(e) => {
                warn!(error = %e, "System resolver unavailable, skipping ambient TXT lookup.");
                None
            }
        };

        debug!(resolvers = exchanges.len(), system = system.is_some(), "Resolver set ready.");
        Ok(Self::new(exchanges, system))
    }
}
