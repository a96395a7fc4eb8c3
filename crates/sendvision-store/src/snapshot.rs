// SPDX-FileCopyrightText: 2026 SendVision Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The materialized view a store publishes.

use std::sync::Arc;

use sendvision_core::{Filter, Record, RecordId, SendvisionError};

/// Records matching a filter as of the last successful query, plus loading
/// and error state.
///
/// Snapshots are replaced wholesale and never edited in place, so a clone
/// is always internally consistent.
#[derive(Debug, Clone)]
pub struct StoreSnapshot {
    /// Matching records in the order the source returned them.
    pub records: Arc<[Record]>,
    /// True while the current query is outstanding.
    pub is_loading: bool,
    /// Error from the most recent query, cleared by the next success.
    pub last_error: Option<Arc<SendvisionError>>,
    /// Generation of the query that produced `records`; 0 before the first result.
    pub generation: u64,
    /// Filter `records` were queried with.
    pub filter: Filter,
}

impl StoreSnapshot {
    pub(crate) fn initial(filter: Filter) -> Self {
        Self {
            records: Arc::from(Vec::new()),
            is_loading: false,
            last_error: None,
            generation: 0,
            filter,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Record> {
        self.records.iter()
    }

    pub fn get(&self, id: &RecordId) -> Option<&Record> {
        self.records.iter().find(|r| &r.id == id)
    }

    pub fn ids(&self) -> Vec<RecordId> {
        self.records.iter().map(|r| r.id.clone()).collect()
    }

    /// Whether at least one query result has been applied.
    pub fn is_populated(&self) -> bool {
        self.generation > 0
    }
}
