// src/core/scanner/record_store.rs

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::core::models::{RecordKey, ResolvedRecord};

/// Deduplicating, budget-capped record store shared by every task of one
/// collection session.
///
/// All writers go through a single mutex. The budget check and the insert
/// happen under that lock, so the store can never exceed `max_records`.
/// `count` mirrors the map size in an atomic so tasks can poll the budget
/// between queries without taking the lock.
#[derive(Debug)]
pub struct RecordStore {
    records: Mutex<HashMap<RecordKey, ResolvedRecord>>,
    count: AtomicUsize,
    max_records: usize,
}

impl RecordStore {
    pub fn new(max_records: usize) -> Self {
        Self {
            records: Mutex::new(HashMap::new()),
            count: AtomicUsize::new(0),
            max_records,
        }
    }

    /// Inserts `record` unless its identity is already present or the budget
    /// is spent. Returns whether the record was stored.
    pub fn insert(&self, record: ResolvedRecord) -> bool {
        let mut records = self.lock();
        if records.len() >= self.max_records {
            return false;
        }
        let key = record.key();
        if records.contains_key(&key) {
            return false;
        }
        records.insert(key, record);
        self.count.store(records.len(), Ordering::Release);
        true
    }

    /// Number of records stored so far.
    pub fn count(&self) -> usize {
        self.count.load(Ordering::Acquire)
    }

    pub fn max_records(&self) -> usize {
        self.max_records
    }

    /// True once the budget is spent; tasks stop issuing work at this point.
    pub fn is_exhausted(&self) -> bool {
        self.count() >= self.max_records
    }

    /// Copies the current contents. Order is unspecified.
    pub fn snapshot(&self) -> Vec<ResolvedRecord> {
        self.lock().values().cloned().collect()
    }

    // insert is the only mutation, so a poisoned map is still consistent.
    fn lock(&self) -> MutexGuard<'_, HashMap<RecordKey, ResolvedRecord>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
