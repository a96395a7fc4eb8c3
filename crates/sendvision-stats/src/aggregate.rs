// SPDX-FileCopyrightText: 2026 SendVision Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! [`aggregate`] and the chart breakdowns derived from it.

use std::collections::BTreeMap;

use sendvision_core::Record;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use strum::IntoEnumIterator;

use crate::category::Category;

/// Per-category record counts for one snapshot.
///
/// Every category is always present, zero or not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregateResult {
    counts: BTreeMap<Category, u64>,
}

/// One chart: (category, count) pairs with zero counts dropped.
pub type Breakdown = Vec<(Category, u64)>;

/// Counts `records` into every category.
pub fn aggregate(records: &[Record]) -> AggregateResult {
    let mut counts: BTreeMap<Category, u64> = Category::iter().map(|c| (c, 0)).collect();
    for record in records {
        if let Some(bucket) = Category::status_bucket(record) {
            *counts.entry(bucket).or_default() += 1;
        }
        for category in Category::OVERALL {
            if category.counts(record) {
                *counts.entry(category).or_default() += 1;
            }
        }
    }
    AggregateResult { counts }
}

impl AggregateResult {
    pub fn get(&self, category: Category) -> u64 {
        self.counts.get(&category).copied().unwrap_or(0)
    }

    /// Sum over the status categories: the number of records with a
    /// recognized, unreplied status.
    pub fn status_total(&self) -> u64 {
        Category::PERMISSION.iter().map(|c| self.get(*c)).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.values().all(|n| *n == 0)
    }

    /// All eight counters in tile order, zeros included.
    pub fn live_stats(&self) -> Vec<(Category, u64)> {
        Category::LIVE.iter().map(|c| (*c, self.get(*c))).collect()
    }

    pub fn permission_breakdown(&self) -> Breakdown {
        self.breakdown(&Category::PERMISSION)
    }

    pub fn overall_breakdown(&self) -> Breakdown {
        self.breakdown(&Category::OVERALL)
    }

    fn breakdown(&self, categories: &[Category]) -> Breakdown {
        categories
            .iter()
            .map(|c| (*c, self.get(*c)))
            .filter(|(_, n)| *n > 0)
            .collect()
    }
}

impl Serialize for AggregateResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(Category::LIVE.len()))?;
        for (category, count) in self.live_stats() {
            map.serialize_entry(&category, &count)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sendvision_core::{Flag, Status};
    use sendvision_test_utils::fixtures::{email, with_status};

    #[test]
    fn empty_input_counts_zero_everywhere() {
        let result = aggregate(&[]);
        assert!(result.is_empty());
        for category in Category::iter() {
            assert_eq!(result.get(category), 0);
        }
        assert!(result.permission_breakdown().is_empty());
        assert!(result.overall_breakdown().is_empty());
    }

    #[test]
    fn unset_status_counts_as_waiting() {
        let result = aggregate(&[email("1"), with_status("2", Status::Waiting)]);
        assert_eq!(result.get(Category::Waiting), 2);
    }

    #[test]
    fn flagged_approval_counts_in_both_buckets() {
        let record = with_status("1", Status::Approval).with_flag(Flag::Escalation, true);
        let result = aggregate(&[record]);
        assert_eq!(result.get(Category::Approval), 1);
        assert_eq!(result.get(Category::Escalation), 1);
    }

    #[test]
    fn unrecognized_status_only_counts_flags() {
        let record = with_status("1", Status::Unrecognized("Spam".into()))
            .with_flag(Flag::Bookcall, true);
        let result = aggregate(&[record]);
        assert_eq!(result.status_total(), 0);
        assert_eq!(result.get(Category::Bookcall), 1);
    }

    #[test]
    fn replied_counts_in_no_status_bucket() {
        let result = aggregate(&[with_status("1", Status::Replied)]);
        assert!(result.is_empty());
    }

    #[test]
    fn status_named_like_a_flag_does_not_set_the_flag_bucket() {
        let result = aggregate(&[with_status("1", Status::Escalation)]);
        assert_eq!(result.get(Category::Escalation), 0);
    }

    #[test]
    fn breakdowns_drop_zeros_and_keep_chart_order() {
        let records = [
            with_status("1", Status::Objection),
            with_status("2", Status::Approval),
            with_status("3", Status::Approval).with_flag(Flag::Cancel, true),
        ];
        let result = aggregate(&records);
        assert_eq!(
            result.permission_breakdown(),
            vec![(Category::Approval, 2), (Category::Objection, 1)]
        );
        assert_eq!(result.overall_breakdown(), vec![(Category::Cancel, 1)]);
    }

    #[test]
    fn live_stats_keep_zeros_in_tile_order() {
        let result = aggregate(&[with_status("1", Status::ManualHandle)]);
        let live = result.live_stats();
        assert_eq!(live.len(), 8);
        assert_eq!(live[2], (Category::ManualHandle, 1));
        assert_eq!(live[7], (Category::Waiting, 0));
    }

    #[test]
    fn serializes_with_display_names() {
        let result = aggregate(&[with_status("1", Status::ManualHandle)]);
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["Manual Handle"], 1);
        assert_eq!(json["Waiting"], 0);
        assert_eq!(json.as_object().unwrap().len(), 8);
    }
}
