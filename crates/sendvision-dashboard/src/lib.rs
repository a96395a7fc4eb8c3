// SPDX-FileCopyrightText: 2026 SendVision Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The surface a presentation layer drives.
//!
//! A [`Dashboard`] pairs one live store with the aggregation engine and the
//! workflow executor. The monitoring page and both operator queues are the
//! same machinery opened with a different [`View`].

pub mod dashboard;
pub mod view;

pub use dashboard::{Dashboard, DashboardOptions};
pub use view::View;
