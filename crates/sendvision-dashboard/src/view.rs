// SPDX-FileCopyrightText: 2026 SendVision Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Predefined dashboard views.

use std::fmt;

use chrono::NaiveDate;
use sendvision_core::{Filter, Flag, Order, Status, TimeRange};
use serde::{Deserialize, Serialize};

/// What a dashboard shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum View {
    /// Every record in a creation-time window, unordered.
    Monitor { range: TimeRange },
    /// Escalated records awaiting a reply, oldest first.
    EscalationQueue,
    /// Records that need a human reply, oldest first.
    ManualReplyQueue,
}

impl View {
    /// Monitoring window covering the last `days` days through `today`.
    pub fn monitor(today: NaiveDate, days: u32) -> Self {
        View::Monitor {
            range: TimeRange::last_days(today, days),
        }
    }

    pub fn filter(&self) -> Filter {
        match self {
            View::Monitor { range } => Filter::all().created_within(*range),
            View::EscalationQueue => Filter::all().flag(Flag::Escalation, true),
            View::ManualReplyQueue => Filter::all().status(Status::ManualHandle),
        }
    }

    pub fn order(&self) -> Option<Order> {
        match self {
            View::Monitor { .. } => None,
            View::EscalationQueue | View::ManualReplyQueue => Some(Order::CreatedAtAscending),
        }
    }

    pub fn is_queue(&self) -> bool {
        !matches!(self, View::Monitor { .. })
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            View::Monitor { range } => write!(f, "monitor {range}"),
            View::EscalationQueue => f.write_str("escalation queue"),
            View::ManualReplyQueue => f.write_str("manual reply queue"),
        }
    }
}
