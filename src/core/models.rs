// src/core/models.rs

use serde::{Deserialize, Serialize};

// --- Record Models ---

/// A single DNS answer, normalized to its textual form.
///
/// Two records are the same record when `domain`, `record_type` and `value`
/// match; the TTL is carried along but never compared (see [`RecordKey`]).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedRecord {
    pub domain: String,
    pub record_type: String,
    pub ttl: u32,
    pub value: String,
}

impl ResolvedRecord {
    pub fn new(domain: &str, record_type: &str, ttl: u32, value: &str) -> Self {
        Self {
            domain: domain.to_string(),
            record_type: record_type.to_string(),
            ttl,
            value: value.to_string(),
        }
    }

    /// The deduplication identity of this record.
    pub fn key(&self) -> RecordKey {
        RecordKey {
            domain: self.domain.clone(),
            record_type: self.record_type.clone(),
            value: self.value.clone(),
        }
    }
}

/// Identity triple used by the record store. TTL is deliberately absent.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecordKey {
    pub domain: String,
    pub record_type: String,
    pub value: String,
}

/// The outcome of one collection session.
#[derive(Debug, Clone, Default)]
pub struct CollectionResult {
    /// Deduplicated records, in no particular order.
    pub records: Vec<ResolvedRecord>,
    /// Set when the session deadline fired before every task finished.
    pub timed_out: bool,
}

// --- Signature Models ---

/// A technology signature as it appears in the catalog file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Signature {
    pub name: String,
    pub category: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub website: String,
    /// Record types this signature applies to; `"*"` matches every type.
    pub record_types: Vec<String>,
    /// Regular expressions tested against record values, in order.
    pub patterns: Vec<String>,
}

/// Top-level shape of the signature catalog file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SignatureFile {
    pub signatures: Vec<Signature>,
}

// --- Detection Models ---

/// A technology matched against the collected records.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DetectedTechnology {
    pub name: String,
    pub category: String,
    pub description: String,
    pub website: String,
    /// The value of the first record that matched.
    pub evidence: String,
    pub record_type: String,
}

// --- Main Report ---

/// Final per-domain report, serialized as the tool's JSON output.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub domain: String,
    pub detected_technologies: Vec<DetectedTechnology>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub all_records: Option<Vec<ResolvedRecord>>,
}
