// SPDX-FileCopyrightText: 2026 SendVision Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! [`WorkflowExecutor`]: validates actions and applies them to the source.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};

use sendvision_core::{RecordId, RecordSource, SendvisionError};
use tracing::{debug, info, warn};

use crate::action::WorkflowAction;
use crate::recording::record_action;

/// Applies workflow actions as single atomic mutations.
///
/// Validation runs before any I/O. At most one submission per record id
/// is in flight at a time; a concurrent second submission is refused with
/// [`SendvisionError::SubmissionInFlight`] instead of being queued.
///
/// There is no read-modify-write and no version check. If two operators
/// act on the same record from different processes, the last write wins.
pub struct WorkflowExecutor {
    source: Arc<dyn RecordSource>,
    collection: String,
    in_flight: Mutex<HashSet<RecordId>>,
}

/// Marks a record id as in flight until dropped.
struct InFlight<'a> {
    set: &'a Mutex<HashSet<RecordId>>,
    id: RecordId,
}

impl<'a> InFlight<'a> {
    fn acquire(set: &'a Mutex<HashSet<RecordId>>, id: &RecordId) -> Option<Self> {
        let mut ids = set.lock().unwrap_or_else(PoisonError::into_inner);
        if !ids.insert(id.clone()) {
            return None;
        }
        Some(Self {
            set,
            id: id.clone(),
        })
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.set
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.id);
    }
}

impl WorkflowExecutor {
    pub fn new(source: Arc<dyn RecordSource>, collection: impl Into<String>) -> Self {
        Self {
            source,
            collection: collection.into(),
            in_flight: Mutex::new(HashSet::new()),
        }
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Whether a submission for `id` is currently outstanding.
    pub fn is_in_flight(&self, id: &RecordId) -> bool {
        self.in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(id)
    }

    /// Sets `Escalated_reply` and clears the escalation flag.
    pub async fn resolve_escalation(
        &self,
        id: impl Into<RecordId>,
        reply: impl Into<String>,
    ) -> Result<(), SendvisionError> {
        self.dispatch(&WorkflowAction::ResolveEscalation {
            id: id.into(),
            reply: reply.into(),
        })
        .await
    }

    /// Sets `human_reply`, `human_name` and moves the record to `Replied`.
    pub async fn submit_manual_reply(
        &self,
        id: impl Into<RecordId>,
        reply: impl Into<String>,
        author: Option<String>,
    ) -> Result<(), SendvisionError> {
        self.dispatch(&WorkflowAction::SubmitManualReply {
            id: id.into(),
            reply: reply.into(),
            author,
        })
        .await
    }

    /// Validates and applies `action`.
    pub async fn dispatch(&self, action: &WorkflowAction) -> Result<(), SendvisionError> {
        let kind = action.kind();
        let id = action.id();

        if let Err(err) = action.validate() {
            debug!(action = %kind, record_id = %id, error = %err, "action rejected locally");
            record_action(kind, "invalid");
            return Err(err);
        }

        let Some(_guard) = InFlight::acquire(&self.in_flight, id) else {
            debug!(action = %kind, record_id = %id, "submission already in flight");
            record_action(kind, "in_flight");
            return Err(SendvisionError::SubmissionInFlight { id: id.to_string() });
        };

        let fields = action.fields();
        match self.source.mutate(&self.collection, id, &fields).await {
            Ok(()) => {
                info!(
                    action = %kind,
                    record_id = %id,
                    collection = %self.collection,
                    "workflow action applied"
                );
                record_action(kind, "ok");
                Ok(())
            }
            Err(err) => {
                warn!(
                    action = %kind,
                    record_id = %id,
                    collection = %self.collection,
                    error = %err,
                    "workflow action failed"
                );
                record_action(kind, "error");
                Err(err)
            }
        }
    }
}
