// src/core/scanner/fingerprint_scanner.rs

use std::collections::HashSet;

use tracing::{debug, info};

use crate::core::knowledge_base::CompiledCatalog;
use crate::core::models::{DetectedTechnology, ResolvedRecord};

/// Matches collected records against the signature catalog.
///
/// Walks records in the order given and, for each one, every signature that
/// applies to its type. The first record that matches a signature becomes its
/// evidence; later matches for the same signature name are ignored, so the
/// result never holds two detections with the same name.
///
/// # Arguments
/// * `records` - The deduplicated records of one scan.
/// * `catalog` - The compiled signature catalog.
///
/// # Returns
/// One `DetectedTechnology` per matching signature name.
pub fn detect_technologies(records: &[ResolvedRecord], catalog: &CompiledCatalog) -> Vec<DetectedTechnology> {
    let mut detected = Vec::new();
    let mut seen: HashSet<&str> = HashSet::new();

    debug!(records = records.len(), signatures = catalog.signatures().len(), "Applying signatures.");
    for record in records {
        for compiled in catalog.signatures() {
            let signature = &compiled.signature;
            if seen.contains(signature.name.as_str()) || !compiled.applies_to(&record.record_type) {
                continue;
            }
            if compiled.matches(&record.value) {
                debug!(tech = %signature.name, record_type = %record.record_type, evidence = %record.value, "Signature matched.");
                seen.insert(signature.name.as_str());
                detected.push(DetectedTechnology {
                    name: signature.name.clone(),
                    category: signature.category.clone(),
                    description: signature.description.clone(),
                    website: signature.website.clone(),
                    evidence: record.value.clone(),
                    record_type: record.record_type.clone(),
                });
            }
        }
    }

    info!(count = detected.len(), "Technology detection finished.");
    detected
}
