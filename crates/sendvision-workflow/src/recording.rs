// SPDX-FileCopyrightText: 2026 SendVision Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Workflow action metrics.

use metrics::describe_counter;

use crate::action::ActionKind;

/// Register descriptions for every workflow metric.
pub fn describe_metrics() {
    describe_counter!(
        "sendvision_workflow_actions_total",
        "Workflow actions by kind and outcome"
    );
}

pub(crate) fn record_action(kind: ActionKind, outcome: &'static str) {
    metrics::counter!(
        "sendvision_workflow_actions_total",
        "action" => kind.to_string(),
        "outcome" => outcome
    )
    .increment(1);
}
