// SPDX-FileCopyrightText: 2026 SendVision Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Aggregation over record snapshots.
//!
//! Everything here is a pure function of its input: no clock, no I/O and
//! no state carried between calls.

pub mod aggregate;
pub mod category;

pub use aggregate::{AggregateResult, Breakdown, aggregate};
pub use category::Category;
