// SPDX-FileCopyrightText: 2026 SendVision Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Record source trait: the remote table the dashboard reads from and writes to.

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use tokio::sync::mpsc;

use crate::error::SendvisionError;
use crate::filter::RecordQuery;
use crate::types::{FieldSet, Record, RecordId};

/// Kind of change a source observed on a collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum ChangeKind {
    Insert,
    Update,
    Delete,
}

/// Notification that something in a collection changed.
///
/// Consumers treat it as a refresh trigger only. Sources make no promise
/// that any payload they attach is complete or consistent with a filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    pub collection: String,
    pub kind: ChangeKind,
}

/// Handle identifying one subscription on a source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(pub u64);

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub-{}", self.0)
    }
}

/// A live subscription. Events arrive on `events` until it is unsubscribed
/// or the source goes away, at which point the channel closes.
#[derive(Debug)]
pub struct Subscription {
    pub id: SubscriptionId,
    pub events: mpsc::Receiver<ChangeEvent>,
}

/// Remote table offering filtered queries, change subscriptions and
/// single-record field updates.
///
/// A single source may be shared by any number of stores and executors.
/// Sources may drop change events when a subscriber's buffer is full, since
/// one pending event is as good as many.
#[async_trait]
pub trait RecordSource: Send + Sync + 'static {
    /// Human-readable name used in logs.
    fn name(&self) -> &str;

    /// Point-in-time query of every record in `collection` matching `query`.
    async fn query(
        &self,
        collection: &str,
        query: &RecordQuery,
    ) -> Result<Vec<Record>, SendvisionError>;

    /// Starts delivering change events for `collection`.
    async fn subscribe(&self, collection: &str) -> Result<Subscription, SendvisionError>;

    /// Stops a subscription. Unknown ids are not an error.
    async fn unsubscribe(&self, subscription: SubscriptionId) -> Result<(), SendvisionError>;

    /// Atomically assigns `fields` on the record keyed by `id`.
    async fn mutate(
        &self,
        collection: &str,
        id: &RecordId,
        fields: &FieldSet,
    ) -> Result<(), SendvisionError>;
}
