// src/core/scanner/test_support.rs

//! In-process resolvers for exercising the collection engine without network.

use std::collections::HashMap;
use std::net::Ipv4Addr;
use std::str::FromStr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use hickory_resolver::proto::rr::rdata::{A, MX, NS, TXT};
use hickory_resolver::proto::rr::{Name, RData, Record, RecordType};

use super::resolvers::{DnsExchange, ResolverSet, SystemTxtLookup};
use crate::core::error::ExchangeError;

pub fn a_record(ip: [u8; 4], ttl: u32) -> Record {
    rr(ttl, RData::A(A(Ipv4Addr::from(ip))))
}

pub fn ns_record(host: &str, ttl: u32) -> Record {
    rr(ttl, RData::NS(NS(Name::from_str(host).unwrap())))
}

pub fn mx_record(preference: u16, host: &str, ttl: u32) -> Record {
    rr(ttl, RData::MX(MX::new(preference, Name::from_str(host).unwrap())))
}

pub fn txt_record(value: &str, ttl: u32) -> Record {
    rr(ttl, RData::TXT(TXT::new(vec![value.to_string()])))
}

fn rr(ttl: u32, rdata: RData) -> Record {
    Record::from_rdata(Name::from_str("example.com.").unwrap(), ttl, rdata)
}

/// Answers from a fixed table; unknown types fail like an NXDOMAIN would.
#[derive(Default)]
pub struct StaticExchange {
    label: String,
    answers: HashMap<RecordType, Vec<Record>>,
    delays: HashMap<RecordType, Duration>,
    stall: Option<Duration>,
    pub calls: AtomicUsize,
}

impl StaticExchange {
    pub fn new(label: &str) -> Self {
        Self { label: label.to_string(), ..Default::default() }
    }

    pub fn answer(mut self, record_type: RecordType, records: Vec<Record>) -> Self {
        self.answers.insert(record_type, records);
        self
    }

    /// Makes queries for `record_type` take `delay` before answering.
    pub fn delay(mut self, record_type: RecordType, delay: Duration) -> Self {
        self.delays.insert(record_type, delay);
        self
    }

    /// Makes every query take `delay`, like a resolver that stopped answering.
    pub fn stall(mut self, delay: Duration) -> Self {
        self.stall = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DnsExchange for StaticExchange {
    fn label(&self) -> &str {
        &self.label
    }

    async fn exchange(
        &self,
        _fqdn: &str,
        record_type: RecordType,
        timeout: Duration,
    ) -> Result<Vec<Record>, ExchangeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.stall.or_else(|| self.delays.get(&record_type).copied()) {
            if delay >= timeout {
                tokio::time::sleep(timeout).await;
                return Err(ExchangeError::Timeout(timeout));
            }
            tokio::time::sleep(delay).await;
        }
        self.answers
            .get(&record_type)
            .cloned()
            .ok_or_else(|| ExchangeError::Resolve("no records found".to_string()))
    }
}

/// System resolver stand-in returning fixed TXT strings, or an error.
pub struct StaticSystem(pub Result<Vec<String>, String>);

#[async_trait]
impl SystemTxtLookup for StaticSystem {
    async fn lookup_txt(&self, _domain: &str) -> Result<Vec<String>, ExchangeError> {
        self.0.clone().map_err(ExchangeError::Resolve)
    }
}

pub fn resolver_set(exchanges: Vec<Arc<StaticExchange>>, system: Option<StaticSystem>) -> ResolverSet {
    ResolverSet::new(
        exchanges.into_iter().map(|e| e as Arc<dyn DnsExchange>).collect(),
        system.map(|s| Arc::new(s) as Arc<dyn SystemTxtLookup>),
    )
}
