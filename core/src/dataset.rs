//! The immutable base dataset.
//!
//! Built once by the loader and then only read. Callers share it through
//! an `Arc<Dataset>`; there is no write path after construction.

use chrono::{DateTime, Utc};

use crate::types::Record;

#[derive(Debug, Clone)]
pub struct Dataset {
    records:   Vec<Record>,
    loaded_at: DateTime<Utc>,
}

impl Dataset {
    pub fn new(records: Vec<Record>) -> Self {
        Self {
            records,
            loaded_at: Utc::now(),
        }
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// When the snapshot was taken. Shown as the "data as of" stamp.
    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }
}

impl From<Vec<Record>> for Dataset {
    fn from(records: Vec<Record>) -> Self {
        Dataset::new(records)
    }
}
