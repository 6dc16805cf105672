// src/core/scanner/records.rs

//! Record type table and the extractor that turns raw answers into
//! `(type, ttl, value)` triples.

use hickory_resolver::proto::rr::{RData, Record, RecordType};
use once_cell::sync::Lazy;
use std::collections::HashMap;

/// The standard DNS type table, ordered by type code.
pub const RECORD_TYPES: &[(u16, &str)] = &[
    (1, "A"),
    (2, "NS"),
    (3, "MD"),
    (4, "MF"),
    (5, "CNAME"),
    (6, "SOA"),
    (7, "MB"),
    (8, "MG"),
    (9, "MR"),
    (10, "NULL"),
    (11, "WKS"),
    (12, "PTR"),
    (13, "HINFO"),
    (14, "MINFO"),
    (15, "MX"),
    (16, "TXT"),
    (17, "RP"),
    (18, "AFSDB"),
    (19, "X25"),
    (20, "ISDN"),
    (21, "RT"),
    (22, "NSAP"),
    (23, "NSAPPTR"),
    (24, "SIG"),
    (25, "KEY"),
    (26, "PX"),
    (27, "GPOS"),
    (28, "AAAA"),
    (29, "LOC"),
    (30, "NXT"),
    (31, "EID"),
    (32, "NIMLOC"),
    (33, "SRV"),
    (34, "ATMA"),
    (35, "NAPTR"),
    (36, "KX"),
    (37, "CERT"),
    (39, "DNAME"),
    (41, "OPT"),
    (42, "APL"),
    (43, "DS"),
    (44, "SSHFP"),
    (46, "RRSIG"),
    (47, "NSEC"),
    (48, "DNSKEY"),
    (49, "DHCID"),
    (50, "NSEC3"),
    (51, "NSEC3PARAM"),
    (52, "TLSA"),
    (53, "SMIMEA"),
    (55, "HIP"),
    (56, "NINFO"),
    (57, "RKEY"),
    (58, "TALINK"),
    (59, "CDS"),
    (60, "CDNSKEY"),
    (61, "OPENPGPKEY"),
    (62, "CSYNC"),
    (99, "SPF"),
    (100, "UINFO"),
    (101, "UID"),
    (102, "GID"),
    (103, "UNSPEC"),
    (104, "NID"),
    (105, "L32"),
    (106, "L64"),
    (107, "LP"),
    (108, "EUI48"),
    (109, "EUI64"),
    (256, "URI"),
    (257, "CAA"),
    (258, "AVC"),
    (259, "DOA"),
    (260, "AMTRELAY"),
    (32768, "TA"),
    (32769, "DLV"),
];

/// High-value types queried first against every resolver, in this order.
pub const PRIORITY_TYPES: &[u16] = &[1, 28, 5, 15, 16, 2, 6, 33, 257];

/// Meta types that never carry signature-relevant payload.
pub const SKIPPED_TYPES: &[u16] = &[10, 41];

static TYPE_NAMES: Lazy<HashMap<u16, &'static str>> =
    Lazy::new(|| RECORD_TYPES.iter().copied().collect());

/// Returns the mnemonic for a type code, or `TYPE<n>` for codes outside the table.
pub fn record_type_name(code: u16) -> String {
    TYPE_NAMES
        .get(&code)
        .map(|name| name.to_string())
        .unwrap_or_else(|| format!("TYPE{code}"))
}

/// Every type in the table that is neither a priority type nor a skipped meta type.
pub fn secondary_types() -> impl Iterator<Item = u16> {
    RECORD_TYPES
        .iter()
        .map(|(code, _)| *code)
        .filter(|code| !PRIORITY_TYPES.contains(code) && !SKIPPED_TYPES.contains(code))
}

/// A normalized answer, before it is tagged with the queried domain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedValue {
    pub record_type: String,
    pub ttl: u32,
    pub value: String,
}

/// Maps a raw answer record to its normalized triple.
///
/// Returns `None` for records without data or whose formatted value is empty.
pub fn extract(record: &Record) -> Option<ExtractedValue> {
    let value = format_rdata(record.data()?);
    if value.is_empty() {
        return None;
    }
    Some(ExtractedValue {
        record_type: record_type_name(u16::from(record.record_type())),
        ttl: record.ttl(),
        value,
    })
}

/// Type-specific presentation of the answer payload.
pub fn format_rdata(rdata: &RData) -> String {
    match rdata {
        RData::A(a) => a.to_string(),
        RData::AAAA(aaaa) => aaaa.to_string(),
        RData::CNAME(cname) => cname.0.to_string(),
        RData::NS(ns) => ns.0.to_string(),
        RData::PTR(ptr) => ptr.0.to_string(),
        RData::MX(mx) => format!("{} {}", mx.preference(), mx.exchange()),
        RData::SOA(soa) => format!(
            "{} {} {} {} {} {} {}",
            soa.mname(),
            soa.rname(),
            soa.serial(),
            soa.refresh(),
            soa.retry(),
            soa.expire(),
            soa.minimum()
        ),
        RData::SRV(srv) => format!(
            "{} {} {} {}",
            srv.priority(),
            srv.weight(),
            srv.port(),
            srv.target()
        ),
        RData::TXT(txt) => txt
            .txt_data()
            .iter()
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
            .collect::<Vec<_>>()
            .join(" "),
        other => other.to_string(),
    }
}

/// Converts a table code into the resolver library's type.
pub fn to_record_type(code: u16) -> RecordType {
    RecordType::from(code)
}
