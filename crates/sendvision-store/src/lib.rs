// SPDX-FileCopyrightText: 2026 SendVision Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Filtered record store kept in sync with a [`RecordSource`] by re-query.
//!
//! [`RecordSource`]: sendvision_core::RecordSource

pub mod recording;
mod refresh;
pub mod snapshot;
pub mod store;

pub use recording::describe_metrics;
pub use snapshot::StoreSnapshot;
pub use store::{FilteredStore, StoreOptions};
