// SPDX-FileCopyrightText: 2026 SendVision Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-process [`RecordSource`] backed by a map of collections.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use sendvision_core::{
    ChangeEvent, ChangeKind, FieldSet, Record, RecordId, RecordQuery, RecordSource,
    SendvisionError, Subscription, SubscriptionId, columns,
};
use serde_json::Value;
use tokio::sync::{RwLock, mpsc};
use tracing::{debug, trace};

/// Per-subscriber event buffer. A full buffer drops further events; the
/// subscriber re-queries everything anyway.
const EVENT_BUFFER: usize = 16;

struct Subscriber {
    collection: String,
    events: mpsc::Sender<ChangeEvent>,
}

/// Record source holding every collection in memory.
///
/// Queries are evaluated with [`RecordQuery::select`], so filter semantics
/// match the reference evaluation exactly.
pub struct MemorySource {
    name: String,
    collections: RwLock<HashMap<String, Vec<Record>>>,
    subscribers: Mutex<HashMap<SubscriptionId, Subscriber>>,
    next_subscription: AtomicU64,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::named("memory")
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            collections: RwLock::new(HashMap::new()),
            subscribers: Mutex::new(HashMap::new()),
            next_subscription: AtomicU64::new(1),
        }
    }

    /// Adds or replaces a record, keyed by id.
    pub async fn insert(&self, collection: &str, record: Record) {
        let kind = {
            let mut collections = self.collections.write().await;
            let records = collections.entry(collection.to_string()).or_default();
            match records.iter_mut().find(|r| r.id == record.id) {
                Some(existing) => {
                    *existing = record;
                    ChangeKind::Update
                }
                None => {
                    records.push(record);
                    ChangeKind::Insert
                }
            }
        };
        self.notify(collection, kind);
    }

    /// Loads records without emitting change events.
    pub async fn seed(&self, collection: &str, records: impl IntoIterator<Item = Record>) {
        let mut collections = self.collections.write().await;
        collections
            .entry(collection.to_string())
            .or_default()
            .extend(records);
    }

    /// Removes a record. Returns whether it existed.
    pub async fn remove(&self, collection: &str, id: &RecordId) -> bool {
        let removed = {
            let mut collections = self.collections.write().await;
            match collections.get_mut(collection) {
                Some(records) => {
                    let before = records.len();
                    records.retain(|r| &r.id != id);
                    records.len() != before
                }
                None => false,
            }
        };
        if removed {
            self.notify(collection, ChangeKind::Delete);
        }
        removed
    }

    /// Emits a change event without touching any data, as a source does
    /// when a row changes in a way the consumer cannot see.
    pub fn touch(&self, collection: &str, kind: ChangeKind) {
        self.notify(collection, kind);
    }

    /// Copy of a record as currently stored.
    pub async fn get(&self, collection: &str, id: &RecordId) -> Option<Record> {
        self.collections
            .read()
            .await
            .get(collection)
            .and_then(|records| records.iter().find(|r| &r.id == id))
            .cloned()
    }

    /// Every record in a collection, in insertion order.
    pub async fn records(&self, collection: &str) -> Vec<Record> {
        self.collections
            .read()
            .await
            .get(collection)
            .cloned()
            .unwrap_or_default()
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn notify(&self, collection: &str, kind: ChangeKind) {
        let mut subscribers = self
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        subscribers.retain(|id, sub| {
            if sub.collection != collection {
                return true;
            }
            let event = ChangeEvent {
                collection: collection.to_string(),
                kind,
            };
            match sub.events.try_send(event) {
                Ok(()) => true,
                Err(mpsc::error::TrySendError::Full(_)) => {
                    trace!(subscription = %id, "event buffer full, dropping event");
                    true
                }
                Err(mpsc::error::TrySendError::Closed(_)) => {
                    debug!(subscription = %id, "subscriber gone, pruning");
                    false
                }
            }
        });
    }
}

impl Default for MemorySource {
    fn default() -> Self {
        Self::new()
    }
}

/// Assigns `fields` onto `record` by round-tripping it through JSON, so
/// typed columns are validated the same way a loaded record is.
fn apply_fields(record: &Record, fields: &FieldSet) -> Result<Record, SendvisionError> {
    let mut value = serde_json::to_value(record).map_err(|e| SendvisionError::Remote {
        message: format!("failed to encode record {}", record.id),
        source: Some(Box::new(e)),
    })?;
    let Value::Object(object) = &mut value else {
        return Err(SendvisionError::Internal(format!(
            "record {} did not encode as an object",
            record.id
        )));
    };
    for (column, v) in fields.iter() {
        if column == columns::ID || column == columns::CREATED_AT {
            return Err(SendvisionError::remote(format!(
                "column `{column}` is read-only"
            )));
        }
        object.insert(column.to_string(), v.clone());
    }
    serde_json::from_value(value).map_err(|e| SendvisionError::Remote {
        message: format!("update rejected for record {}", record.id),
        source: Some(Box::new(e)),
    })
}

#[async_trait]
impl RecordSource for MemorySource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn query(
        &self,
        collection: &str,
        query: &RecordQuery,
    ) -> Result<Vec<Record>, SendvisionError> {
        let collections = self.collections.read().await;
        let records = collections
            .get(collection)
            .map(|records| query.select(records))
            .unwrap_or_default();
        trace!(collection, filter = %query.filter, count = records.len(), "query answered");
        Ok(records)
    }

    async fn subscribe(&self, collection: &str) -> Result<Subscription, SendvisionError> {
        let id = SubscriptionId(self.next_subscription.fetch_add(1, Ordering::Relaxed));
        let (tx, rx) = mpsc::channel(EVENT_BUFFER);
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(
                id,
                Subscriber {
                    collection: collection.to_string(),
                    events: tx,
                },
            );
        debug!(collection, subscription = %id, "subscribed");
        Ok(Subscription { id, events: rx })
    }

    async fn unsubscribe(&self, subscription: SubscriptionId) -> Result<(), SendvisionError> {
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&subscription);
        debug!(%subscription, "unsubscribed");
        Ok(())
    }

    async fn mutate(
        &self,
        collection: &str,
        id: &RecordId,
        fields: &FieldSet,
    ) -> Result<(), SendvisionError> {
        {
            let mut collections = self.collections.write().await;
            let record = collections
                .get_mut(collection)
                .and_then(|records| records.iter_mut().find(|r| &r.id == id))
                .ok_or_else(|| {
                    SendvisionError::remote(format!("no record {id} in `{collection}`"))
                })?;
            *record = apply_fields(record, fields)?;
        }
        debug!(collection, %id, columns = fields.len(), "record updated");
        self.notify(collection, ChangeKind::Update);
        Ok(())
    }
}
