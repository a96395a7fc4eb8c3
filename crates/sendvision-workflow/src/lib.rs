// SPDX-FileCopyrightText: 2026 SendVision Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Workflow actions: validated single-record updates that move a record out
//! of an operator queue.

pub mod action;
pub mod executor;
pub mod recording;

pub use action::{ActionKind, WorkflowAction};
pub use executor::WorkflowExecutor;
pub use recording::describe_metrics;
