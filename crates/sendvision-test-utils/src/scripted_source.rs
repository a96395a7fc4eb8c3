// SPDX-FileCopyrightText: 2026 SendVision Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Scripted record source for deterministic store and workflow tests.
//!
//! `ScriptedSource` wraps a [`MemorySource`] and adds control over timing
//! and failures:
//! - **held queries** wait until released individually, so tests can
//!   complete them in any order
//! - **held mutations** wait until the gate is reopened
//! - **injected failures** make the next query, mutation or subscribe fail
//!   (a query can also be made to panic)
//! - **recording** captures every query and mutation for assertions

use std::collections::{BTreeMap, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use sendvision_core::{
    ChangeKind, FieldSet, Record, RecordId, RecordQuery, RecordSource, SendvisionError,
    Subscription, SubscriptionId,
};
use sendvision_source::MemorySource;
use tokio::sync::{oneshot, watch};
use tracing::trace;

/// One call to [`RecordSource::mutate`].
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedMutation {
    pub collection: String,
    pub id: RecordId,
    pub fields: FieldSet,
}

#[derive(Default)]
struct Script {
    query_failures: VecDeque<String>,
    query_panics: usize,
    mutation_failures: VecDeque<String>,
    subscribe_failures: VecDeque<String>,
    /// Held queries keyed by 1-based sequence number.
    held: BTreeMap<usize, oneshot::Sender<()>>,
    queries: Vec<RecordQuery>,
    mutations: Vec<RecordedMutation>,
}

/// A record source whose timing and failures are driven by the test.
pub struct ScriptedSource {
    inner: MemorySource,
    hold_queries: AtomicBool,
    script: Mutex<Script>,
    queries_started: watch::Sender<usize>,
    mutations_started: watch::Sender<usize>,
    mutation_gate: watch::Sender<bool>,
}

impl ScriptedSource {
    /// Queries and mutations pass straight through until told otherwise.
    pub fn new() -> Self {
        Self {
            inner: MemorySource::named("scripted"),
            hold_queries: AtomicBool::new(false),
            script: Mutex::new(Script::default()),
            queries_started: watch::Sender::new(0),
            mutations_started: watch::Sender::new(0),
            mutation_gate: watch::Sender::new(true),
        }
    }

    /// The backing store, for seeding and inspecting data.
    pub fn memory(&self) -> &MemorySource {
        &self.inner
    }

    pub async fn seed(&self, collection: &str, records: impl IntoIterator<Item = Record>) {
        self.inner.seed(collection, records).await;
    }

    /// Emits a change event for `collection`.
    pub fn touch(&self, collection: &str) {
        self.inner.touch(collection, ChangeKind::Update);
    }

    fn script(&self) -> MutexGuard<'_, Script> {
        self.script.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Queries started from now on wait for [`release_query`](Self::release_query).
    pub fn hold_queries(&self) {
        self.hold_queries.store(true, Ordering::SeqCst);
    }

    /// Stops holding new queries. Already held ones stay held.
    pub fn pass_queries(&self) {
        self.hold_queries.store(false, Ordering::SeqCst);
    }

    /// Lets held query number `seq` (1-based, in start order) finish.
    /// Returns `false` if no such query is held.
    pub fn release_query(&self, seq: usize) -> bool {
        match self.script().held.remove(&seq) {
            Some(gate) => gate.send(()).is_ok(),
            None => false,
        }
    }

    /// Releases every held query, oldest first.
    pub fn release_all(&self) -> usize {
        let held = std::mem::take(&mut self.script().held);
        let count = held.len();
        for (_, gate) in held {
            let _ = gate.send(());
        }
        count
    }

    pub fn held_queries(&self) -> Vec<usize> {
        self.script().held.keys().copied().collect()
    }

    /// Number of queries started so far.
    pub fn query_count(&self) -> usize {
        *self.queries_started.borrow()
    }

    /// Waits until at least `n` queries have started.
    pub async fn wait_for_queries(&self, n: usize) {
        let mut rx = self.queries_started.subscribe();
        let _ = rx.wait_for(|count| *count >= n).await;
    }

    /// Every query received, in start order.
    pub fn queries(&self) -> Vec<RecordQuery> {
        self.script().queries.clone()
    }

    pub fn fail_next_query(&self, message: impl Into<String>) {
        self.script().query_failures.push_back(message.into());
    }

    /// The next query panics instead of returning.
    pub fn panic_next_query(&self) {
        self.script().query_panics += 1;
    }

    pub fn fail_next_mutation(&self, message: impl Into<String>) {
        self.script().mutation_failures.push_back(message.into());
    }

    pub fn fail_next_subscribe(&self, message: impl Into<String>) {
        self.script().subscribe_failures.push_back(message.into());
    }

    /// Mutations started from now on wait for [`pass_mutations`](Self::pass_mutations).
    pub fn hold_mutations(&self) {
        self.mutation_gate.send_replace(false);
    }

    pub fn pass_mutations(&self) {
        self.mutation_gate.send_replace(true);
    }

    pub fn mutation_count(&self) -> usize {
        *self.mutations_started.borrow()
    }

    pub async fn wait_for_mutations(&self, n: usize) {
        let mut rx = self.mutations_started.subscribe();
        let _ = rx.wait_for(|count| *count >= n).await;
    }

    pub fn mutations(&self) -> Vec<RecordedMutation> {
        self.script().mutations.clone()
    }
}

impl Default for ScriptedSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RecordSource for ScriptedSource {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn query(
        &self,
        collection: &str,
        query: &RecordQuery,
    ) -> Result<Vec<Record>, SendvisionError> {
        let (seq, panics, failure, gate) = {
            let mut script = self.script();
            script.queries.push(query.clone());
            let seq = script.queries.len();
            let panics = script.query_panics > 0;
            if panics {
                script.query_panics -= 1;
            }
            let failure = script.query_failures.pop_front();
            let gate = if self.hold_queries.load(Ordering::SeqCst) {
                let (tx, rx) = oneshot::channel();
                script.held.insert(seq, tx);
                Some(rx)
            } else {
                None
            };
            (seq, panics, failure, gate)
        };
        self.queries_started.send_modify(|count| *count += 1);
        trace!(seq, filter = %query.filter, held = gate.is_some(), "scripted query started");

        if let Some(gate) = gate {
            // A dropped gate means the source is going away; finish anyway.
            let _ = gate.await;
        }
        if panics {
            panic!("scripted query {seq} panicked");
        }
        if let Some(message) = failure {
            return Err(SendvisionError::remote(message));
        }
        self.inner.query(collection, query).await
    }

    async fn subscribe(&self, collection: &str) -> Result<Subscription, SendvisionError> {
        if let Some(message) = self.script().subscribe_failures.pop_front() {
            return Err(SendvisionError::remote(message));
        }
        self.inner.subscribe(collection).await
    }

    async fn unsubscribe(&self, subscription: SubscriptionId) -> Result<(), SendvisionError> {
        self.inner.unsubscribe(subscription).await
    }

    async fn mutate(
        &self,
        collection: &str,
        id: &RecordId,
        fields: &FieldSet,
    ) -> Result<(), SendvisionError> {
        let failure = {
            let mut script = self.script();
            script.mutations.push(RecordedMutation {
                collection: collection.to_string(),
                id: id.clone(),
                fields: fields.clone(),
            });
            script.mutation_failures.pop_front()
        };
        self.mutations_started.send_modify(|count| *count += 1);

        let mut gate = self.mutation_gate.subscribe();
        let _ = gate.wait_for(|open| *open).await;

        if let Some(message) = failure {
            return Err(SendvisionError::remote(message));
        }
        self.inner.mutate(collection, id, fields).await
    }
}
