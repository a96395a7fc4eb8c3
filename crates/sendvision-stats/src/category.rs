// SPDX-FileCopyrightText: 2026 SendVision Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Counting categories.

use sendvision_core::{Flag, Record, Status};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

/// A bucket a record may be counted in.
///
/// Status categories are mutually exclusive; flag categories are not, so a
/// single record can count in one status bucket and any number of flag
/// buckets.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumString, EnumIter,
    AsRefStr, Serialize, Deserialize,
)]
pub enum Category {
    Approval,
    Objection,
    #[strum(serialize = "Manual Handle")]
    #[serde(rename = "Manual Handle")]
    ManualHandle,
    Waiting,
    Escalation,
    Cancel,
    Important,
    Bookcall,
}

impl Category {
    /// Categories of the status chart.
    pub const PERMISSION: [Category; 4] = [
        Category::Approval,
        Category::Objection,
        Category::ManualHandle,
        Category::Waiting,
    ];

    /// Categories of the flag chart.
    pub const OVERALL: [Category; 4] = [
        Category::Escalation,
        Category::Cancel,
        Category::Important,
        Category::Bookcall,
    ];

    /// Order of the live statistics tiles.
    pub const LIVE: [Category; 8] = [
        Category::Approval,
        Category::Objection,
        Category::ManualHandle,
        Category::Escalation,
        Category::Cancel,
        Category::Important,
        Category::Bookcall,
        Category::Waiting,
    ];

    /// The flag a category counts, if it is a flag category.
    pub fn flag(self) -> Option<Flag> {
        match self {
            Category::Escalation => Some(Flag::Escalation),
            Category::Cancel => Some(Flag::Cancel),
            Category::Important => Some(Flag::Important),
            Category::Bookcall => Some(Flag::Bookcall),
            _ => None,
        }
    }

    /// The status bucket `record` falls in, if any.
    ///
    /// Unset and `Waiting` share a bucket. `Replied`, the flag-named
    /// statuses and unrecognized values fall in none.
    pub fn status_bucket(record: &Record) -> Option<Category> {
        match &record.status {
            None | Some(Status::Waiting) => Some(Category::Waiting),
            Some(Status::Approval) => Some(Category::Approval),
            Some(Status::Objection) => Some(Category::Objection),
            Some(Status::ManualHandle) => Some(Category::ManualHandle),
            Some(_) => None,
        }
    }

    /// Whether `record` counts toward this category.
    pub fn counts(self, record: &Record) -> bool {
        match self.flag() {
            Some(flag) => record.flag(flag),
            None => Self::status_bucket(record) == Some(self),
        }
    }
}
