// SPDX-FileCopyrightText: 2026 SendVision Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! [`FilteredStore`]: a snapshot of one collection kept in sync by re-query.
//!
//! Every trigger (open, change notification, manual refresh, filter change)
//! re-fetches everything matching the filter. Change events are never
//! applied as deltas. Each query is tagged with a generation; only the
//! result of the newest generation may replace the snapshot.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use sendvision_core::{
    ChangeEvent, Filter, Order, Record, RecordQuery, RecordSource, SendvisionError,
    SubscriptionId,
};
use tokio::runtime::Handle;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use crate::recording;
use crate::refresh::{Completion, DiscardReason, Issue, RefreshState, Trigger};
use crate::snapshot::StoreSnapshot;

/// How a store queries and reacts to change notifications.
#[derive(Debug, Clone, Copy)]
pub struct StoreOptions {
    /// Ordering requested from the source.
    pub order: Option<Order>,
    /// Refresh on change notifications. Manual refreshes and filter
    /// changes always query.
    pub realtime_enabled: bool,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            order: None,
            realtime_enabled: true,
        }
    }
}

/// State shared between the store handle, the event driver and query tasks.
struct Shared {
    source: Arc<dyn RecordSource>,
    collection: String,
    order: Option<Order>,
    runtime: Handle,
    state: Mutex<RefreshState>,
    snapshot: watch::Sender<StoreSnapshot>,
}

impl Shared {
    fn state(&self) -> MutexGuard<'_, RefreshState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn request(self: &Arc<Self>, trigger: Trigger) -> Result<(), SendvisionError> {
        let mut state = self.state();
        if state.is_closed() {
            return Err(SendvisionError::Closed);
        }
        match state.request(trigger) {
            Some(issue) => self.start(issue),
            None => trace!(
                collection = %self.collection,
                ?trigger,
                owed = state.refresh_owed(),
                "refresh coalesced"
            ),
        }
        Ok(())
    }

    fn replace_filter(self: &Arc<Self>, filter: Filter) -> Result<(), SendvisionError> {
        let mut state = self.state();
        let issue = state.replace_filter(filter).ok_or(SendvisionError::Closed)?;
        self.start(issue);
        Ok(())
    }

    /// Publishes the loading flag and spawns the query. Called with the
    /// state lock held so publication order follows issue order.
    fn start(self: &Arc<Self>, issue: Issue) {
        recording::record_query(&self.collection);
        debug!(
            collection = %self.collection,
            generation = issue.generation,
            filter = %issue.filter,
            "issuing query"
        );
        self.snapshot.send_modify(|snap| snap.is_loading = true);

        let source = Arc::clone(&self.source);
        let collection = self.collection.clone();
        let query = RecordQuery {
            filter: issue.filter.clone(),
            order: self.order,
        };
        let task = self.runtime.spawn(async move {
            let started = Instant::now();
            let result = source.query(&collection, &query).await;
            recording::record_query_duration(&collection, started.elapsed().as_secs_f64());
            result
        });

        // A panicking source still completes its generation.
        let shared = Arc::clone(self);
        self.runtime.spawn(async move {
            let result = match task.await {
                Ok(result) => result,
                Err(err) => {
                    warn!(
                        collection = %shared.collection,
                        generation = issue.generation,
                        error = %err,
                        "query task ended abnormally"
                    );
                    Err(SendvisionError::Internal(format!("query task failed: {err}")))
                }
            };
            shared.finish(issue, result);
        });
    }

    fn finish(self: &Arc<Self>, issue: Issue, result: Result<Vec<Record>, SendvisionError>) {
        let mut state = self.state();
        let trailing = match state.complete(issue.generation) {
            Completion::Discard(DiscardReason::Closed) => {
                trace!(
                    collection = %self.collection,
                    generation = issue.generation,
                    "discarding result that arrived after close"
                );
                return;
            }
            Completion::Discard(DiscardReason::Stale { current }) => {
                recording::record_stale(&self.collection);
                debug!(
                    collection = %self.collection,
                    generation = issue.generation,
                    current,
                    "discarding stale query result"
                );
                return;
            }
            Completion::Apply { trailing } => trailing,
        };

        let still_loading = trailing.is_some();
        match result {
            Ok(records) => {
                debug!(
                    collection = %self.collection,
                    generation = issue.generation,
                    count = records.len(),
                    "snapshot replaced"
                );
                self.snapshot.send_modify(|snap| {
                    snap.records = Arc::from(records);
                    snap.generation = issue.generation;
                    snap.filter = issue.filter;
                    snap.last_error = None;
                    snap.is_loading = still_loading;
                });
            }
            Err(err) => {
                recording::record_query_error(&self.collection);
                warn!(
                    collection = %self.collection,
                    generation = issue.generation,
                    error = %err,
                    "query failed; keeping previous snapshot"
                );
                self.snapshot.send_modify(|snap| {
                    snap.last_error = Some(Arc::new(err));
                    snap.is_loading = still_loading;
                });
            }
        }

        if let Some(next) = trailing {
            self.start(next);
        }
    }
}

/// Listens for change notifications until cancelled or the source hangs up.
async fn drive(
    shared: Arc<Shared>,
    mut events: mpsc::Receiver<ChangeEvent>,
    cancel: CancellationToken,
) {
    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            event = events.recv() => match event {
                Some(event) => {
                    trace!(collection = %shared.collection, kind = %event.kind, "change notification");
                    if shared.request(Trigger::Change).is_err() {
                        break;
                    }
                }
                None => {
                    warn!(
                        collection = %shared.collection,
                        "change subscription ended by source; only manual refreshes remain"
                    );
                    break;
                }
            }
        }
    }
}

/// A live, filtered view of one collection.
///
/// Holds at most one current query. A filter change supersedes it; change
/// notifications and manual refreshes that arrive while it runs are folded
/// into a single trailing refresh.
pub struct FilteredStore {
    shared: Arc<Shared>,
    subscription: SubscriptionId,
    cancel: CancellationToken,
    driver: Mutex<Option<JoinHandle<()>>>,
}

impl FilteredStore {
    /// Subscribes to `collection` and issues the initial query.
    ///
    /// Must be called from within a tokio runtime. The runtime is retained
    /// so the other methods may be called from any thread.
    pub async fn open(
        source: Arc<dyn RecordSource>,
        collection: impl Into<String>,
        filter: Filter,
        options: StoreOptions,
    ) -> Result<Self, SendvisionError> {
        let collection = collection.into();
        let subscription = source.subscribe(&collection).await?;

        let (snapshot, _) = watch::channel(StoreSnapshot::initial(filter.clone()));
        let shared = Arc::new(Shared {
            source,
            collection,
            order: options.order,
            runtime: Handle::current(),
            state: Mutex::new(RefreshState::new(filter, options.realtime_enabled)),
            snapshot,
        });

        let cancel = CancellationToken::new();
        let driver = tokio::spawn(drive(
            Arc::clone(&shared),
            subscription.events,
            cancel.clone(),
        ));

        info!(
            collection = %shared.collection,
            source = shared.source.name(),
            subscription = %subscription.id,
            "store opened"
        );
        shared.request(Trigger::Open)?;

        Ok(Self {
            shared,
            subscription: subscription.id,
            cancel,
            driver: Mutex::new(Some(driver)),
        })
    }

    pub fn collection(&self) -> &str {
        &self.shared.collection
    }

    /// Replaces the active filter and queries for it immediately. Any
    /// result still pending for an earlier filter will be discarded.
    pub fn set_filter(&self, filter: Filter) -> Result<(), SendvisionError> {
        self.shared.replace_filter(filter)
    }

    /// The filter the next query will use (not necessarily the one the
    /// current snapshot was built from).
    pub fn filter(&self) -> Filter {
        self.shared.state().filter().clone()
    }

    /// Manual pull-to-refresh, coalesced with in-flight work.
    pub fn refresh(&self) -> Result<(), SendvisionError> {
        self.shared.request(Trigger::Manual)
    }

    /// Turns change-driven refresh on or off. Turning it back on refreshes
    /// once to pick up changes missed while it was off.
    pub fn set_realtime_enabled(&self, enabled: bool) -> Result<(), SendvisionError> {
        let resumed = {
            let mut state = self.shared.state();
            if state.is_closed() {
                return Err(SendvisionError::Closed);
            }
            state.set_realtime(enabled)
        };
        debug!(collection = %self.shared.collection, enabled, "realtime toggled");
        if resumed {
            self.shared.request(Trigger::RealtimeResumed)?;
        }
        Ok(())
    }

    /// Generation of the most recently issued query.
    pub fn generation(&self) -> u64 {
        self.shared.state().generation()
    }

    /// Whether a query is outstanding right now.
    pub fn is_loading(&self) -> bool {
        self.shared.state().is_loading()
    }

    pub fn realtime_enabled(&self) -> bool {
        self.shared.state().realtime()
    }

    /// Latest published snapshot. Never blocks on I/O.
    pub fn current_snapshot(&self) -> StoreSnapshot {
        self.shared.snapshot.borrow().clone()
    }

    /// Receiver notified whenever the snapshot is replaced.
    pub fn watch(&self) -> watch::Receiver<StoreSnapshot> {
        self.shared.snapshot.subscribe()
    }

    pub fn is_closed(&self) -> bool {
        self.shared.state().is_closed()
    }

    /// Stops the store. After this returns no query is issued and late
    /// results are dropped. Calling it again is a no-op.
    pub async fn close(&self) {
        {
            let mut state = self.shared.state();
            if !state.close() {
                return;
            }
            self.shared.snapshot.send_modify(|snap| snap.is_loading = false);
        }
        self.cancel.cancel();

        let driver = self
            .driver
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(driver) = driver {
            if let Err(err) = driver.await {
                warn!(collection = %self.shared.collection, error = %err, "event driver ended abnormally");
            }
        }

        if let Err(err) = self.shared.source.unsubscribe(self.subscription).await {
            warn!(
                collection = %self.shared.collection,
                subscription = %self.subscription,
                error = %err,
                "unsubscribe failed"
            );
        }
        info!(collection = %self.shared.collection, "store closed");
    }
}

impl Drop for FilteredStore {
    fn drop(&mut self) {
        self.shared.state().close();
        self.cancel.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sendvision_core::Status;
    use sendvision_test_utils::ScriptedSource;
    use sendvision_test_utils::fixtures::{EMAILS, email, with_status};
    use tracing_test::traced_test;

    async fn settled(store: &FilteredStore, generation: u64) -> StoreSnapshot {
        let mut rx = store.watch();
        rx.wait_for(|s| s.generation >= generation && !s.is_loading)
            .await
            .map(|s| s.clone())
            .unwrap()
    }

    #[tokio::test]
    #[traced_test]
    async fn stale_result_is_logged_and_dropped() {
        let source = Arc::new(ScriptedSource::new());
        source
            .seed(EMAILS, [email("1"), with_status("2", Status::Approval)])
            .await;
        source.hold_queries();

        let store = FilteredStore::open(source.clone(), EMAILS, Filter::all(), StoreOptions::default())
            .await
            .unwrap();
        source.wait_for_queries(1).await;
        store
            .set_filter(Filter::all().status(Status::Approval))
            .unwrap();
        source.wait_for_queries(2).await;

        source.release_query(2);
        let snap = settled(&store, 2).await;
        assert_eq!(snap.ids(), vec![sendvision_core::RecordId::from("2")]);

        source.release_query(1);
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        assert_eq!(store.current_snapshot().generation, 2);
        assert!(logs_contain("discarding stale query result"));
        store.close().await;
    }

    #[tokio::test]
    #[traced_test]
    async fn failed_query_is_logged() {
        let source = Arc::new(ScriptedSource::new());
        source.fail_next_query("timeout");
        let store = FilteredStore::open(source.clone(), EMAILS, Filter::all(), StoreOptions::default())
            .await
            .unwrap();
        let mut rx = store.watch();
        let snap = rx
            .wait_for(|s| s.last_error.is_some())
            .await
            .map(|s| s.clone())
            .unwrap();
        assert!(!snap.is_loading);
        assert!(logs_contain("query failed; keeping previous snapshot"));
        store.close().await;
    }

    #[tokio::test]
    async fn operations_after_close_are_rejected() {
        let source = Arc::new(ScriptedSource::new());
        let store = FilteredStore::open(source.clone(), EMAILS, Filter::all(), StoreOptions::default())
            .await
            .unwrap();
        store.close().await;
        store.close().await;

        assert!(store.is_closed());
        assert!(matches!(store.refresh(), Err(SendvisionError::Closed)));
        assert!(matches!(
            store.set_filter(Filter::all()),
            Err(SendvisionError::Closed)
        ));
        assert!(matches!(
            store.set_realtime_enabled(false),
            Err(SendvisionError::Closed)
        ));
        assert_eq!(source.memory().subscriber_count(), 0);
    }

    #[tokio::test]
    async fn subscribe_failure_fails_open() {
        let source = Arc::new(ScriptedSource::new());
        source.fail_next_subscribe("forbidden");
        let result =
            FilteredStore::open(source.clone(), EMAILS, Filter::all(), StoreOptions::default())
                .await;
        assert!(matches!(result, Err(SendvisionError::Remote { .. })));
        assert_eq!(source.query_count(), 0);
    }
}
