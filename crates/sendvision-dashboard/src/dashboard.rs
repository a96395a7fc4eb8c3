// SPDX-FileCopyrightText: 2026 SendVision Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! [`Dashboard`]: one store, its aggregates and the actions on its records.

use std::sync::{Arc, Mutex, PoisonError};

use sendvision_config::SendvisionConfig;
use sendvision_core::{Filter, RecordId, RecordSource, SendvisionError, TimeRange};
use sendvision_stats::{AggregateResult, Breakdown, aggregate};
use sendvision_store::{FilteredStore, StoreOptions, StoreSnapshot};
use sendvision_workflow::{WorkflowAction, WorkflowExecutor};
use serde_json::Value;
use tokio::sync::watch;
use tracing::{debug, info};

use crate::view::View;

/// Settings a dashboard is opened with.
#[derive(Debug, Clone)]
pub struct DashboardOptions {
    pub collection: String,
    pub realtime_enabled: bool,
}

impl DashboardOptions {
    pub fn from_config(config: &SendvisionConfig) -> Self {
        Self {
            collection: config.source.collection.clone(),
            realtime_enabled: config.dashboard.realtime_enabled,
        }
    }
}

impl Default for DashboardOptions {
    fn default() -> Self {
        Self::from_config(&SendvisionConfig::default())
    }
}

/// Aggregates computed for one snapshot generation.
struct Memo {
    generation: u64,
    result: Arc<AggregateResult>,
}

/// A live view plus the operations an operator can perform on it.
pub struct Dashboard {
    view: View,
    store: FilteredStore,
    executor: WorkflowExecutor,
    memo: Mutex<Option<Memo>>,
}

impl Dashboard {
    /// Opens a store for `view` on `source`.
    pub async fn open(
        source: Arc<dyn RecordSource>,
        view: View,
        options: DashboardOptions,
    ) -> Result<Self, SendvisionError> {
        let store = FilteredStore::open(
            Arc::clone(&source),
            options.collection.clone(),
            view.filter(),
            StoreOptions {
                order: view.order(),
                realtime_enabled: options.realtime_enabled,
            },
        )
        .await?;
        let executor = WorkflowExecutor::new(source, options.collection);
        info!(%view, "dashboard opened");
        Ok(Self {
            view,
            store,
            executor,
            memo: Mutex::new(None),
        })
    }

    pub fn view(&self) -> View {
        self.view
    }

    /// Waits for the first query to settle and returns its snapshot. A
    /// failed first query is returned as an error.
    pub async fn ready(&self) -> Result<StoreSnapshot, SendvisionError> {
        let mut rx = self.store.watch();
        let snapshot = rx
            .wait_for(|s| !s.is_loading && (s.is_populated() || s.last_error.is_some()))
            .await
            .map_err(|_| SendvisionError::Closed)?
            .clone();
        match &snapshot.last_error {
            Some(err) if !snapshot.is_populated() => {
                Err(SendvisionError::remote(format!("initial query failed: {err}")))
            }
            _ => Ok(snapshot),
        }
    }

    pub fn get_snapshot(&self) -> StoreSnapshot {
        self.store.current_snapshot()
    }

    /// Aggregates over the current snapshot. Recomputed only when the
    /// snapshot generation changes.
    pub fn get_aggregates(&self) -> Arc<AggregateResult> {
        let snapshot = self.store.current_snapshot();
        let mut memo = self.memo.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(cached) = memo.as_ref() {
            if cached.generation == snapshot.generation {
                return Arc::clone(&cached.result);
            }
        }
        let result = Arc::new(aggregate(&snapshot.records));
        debug!(
            generation = snapshot.generation,
            records = snapshot.len(),
            "aggregates recomputed"
        );
        *memo = Some(Memo {
            generation: snapshot.generation,
            result: Arc::clone(&result),
        });
        result
    }

    pub fn permission_breakdown(&self) -> Breakdown {
        self.get_aggregates().permission_breakdown()
    }

    pub fn overall_breakdown(&self) -> Breakdown {
        self.get_aggregates().overall_breakdown()
    }

    /// Applies `action`, then asks the store to refresh so the change is
    /// visible even without a change notification.
    pub async fn dispatch_action(&self, action: &WorkflowAction) -> Result<(), SendvisionError> {
        self.executor.dispatch(action).await?;
        match self.store.refresh() {
            Ok(()) | Err(SendvisionError::Closed) => Ok(()),
            Err(err) => Err(err),
        }
    }

    /// Parses a loosely typed request (`resolveEscalation`,
    /// `submit_manual_reply`, ...) and dispatches it.
    pub async fn dispatch_request(
        &self,
        name: &str,
        id: impl Into<RecordId>,
        payload: &Value,
    ) -> Result<(), SendvisionError> {
        let action = WorkflowAction::from_request(name, id, payload)?;
        self.dispatch_action(&action).await
    }

    pub fn set_filter(&self, filter: Filter) -> Result<(), SendvisionError> {
        self.store.set_filter(filter)
    }

    /// Keeps the field conditions and replaces only the creation window.
    pub fn set_time_range(&self, range: TimeRange) -> Result<(), SendvisionError> {
        self.store.set_filter(self.store.filter().created_within(range))
    }

    pub fn refresh(&self) -> Result<(), SendvisionError> {
        self.store.refresh()
    }

    pub fn set_realtime_enabled(&self, enabled: bool) -> Result<(), SendvisionError> {
        self.store.set_realtime_enabled(enabled)
    }

    pub fn watch(&self) -> watch::Receiver<StoreSnapshot> {
        self.store.watch()
    }

    pub fn executor(&self) -> &WorkflowExecutor {
        &self.executor
    }

    pub async fn close(&self) {
        self.store.close().await;
    }
}
