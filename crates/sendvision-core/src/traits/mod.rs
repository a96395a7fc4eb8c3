// SPDX-FileCopyrightText: 2026 SendVision Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Capability traits the core consumes.
//!
//! Traits use `#[async_trait]` so implementations can be shared as
//! `Arc<dyn RecordSource>`.

pub mod source;

pub use source::{ChangeEvent, ChangeKind, RecordSource, Subscription, SubscriptionId};
