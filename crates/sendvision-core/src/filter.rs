// SPDX-FileCopyrightText: 2026 SendVision Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Declarative record filters and the query value handed to a record source.
//!
//! A [`Filter`] is an immutable mapping from a [`Field`] to a [`Condition`],
//! plus an optional [`TimeRange`] on `created_at`. Sources translate it into
//! their own query language; [`Filter::matches`] is the reference semantics.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Days, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

use crate::error::SendvisionError;
use crate::types::{Flag, Record, Status};

/// Attributes a filter may constrain.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumString, EnumIter,
    AsRefStr, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Field {
    #[strum(serialize = "permission")]
    #[serde(rename = "permission")]
    Status,
    Escalation,
    Cancel,
    Important,
    Bookcall,
}

impl Field {
    /// The boolean flag backing this field, if it is one.
    pub fn flag(self) -> Option<Flag> {
        match self {
            Field::Status => None,
            Field::Escalation => Some(Flag::Escalation),
            Field::Cancel => Some(Flag::Cancel),
            Field::Important => Some(Flag::Important),
            Field::Bookcall => Some(Flag::Bookcall),
        }
    }
}

impl From<Flag> for Field {
    fn from(flag: Flag) -> Self {
        match flag {
            Flag::Escalation => Field::Escalation,
            Flag::Cancel => Field::Cancel,
            Flag::Important => Field::Important,
            Flag::Bookcall => Field::Bookcall,
        }
    }
}

/// A literal a field is compared against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Bool(bool),
    Status(Status),
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Bool(b) => write!(f, "{b}"),
            FieldValue::Status(s) => write!(f, "{s}"),
        }
    }
}

/// Predicate on a single field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    Equals(FieldValue),
    IsNull,
}

/// Calendar-day window on `created_at`, in UTC.
///
/// `from` starts at midnight of that day. `to` covers the whole day: the
/// upper bound is widened to midnight of the following day, exclusive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl TimeRange {
    pub fn unbounded() -> Self {
        Self::default()
    }

    /// A closed day range. Rejects `from` after `to`.
    pub fn between(from: NaiveDate, to: NaiveDate) -> Result<Self, SendvisionError> {
        if from > to {
            return Err(SendvisionError::validation(format!(
                "time range start {from} is after its end {to}"
            )));
        }
        Ok(Self {
            from: Some(from),
            to: Some(to),
        })
    }

    /// `days` days back from `today`, through the end of `today`.
    pub fn last_days(today: NaiveDate, days: u32) -> Self {
        Self {
            from: today.checked_sub_days(Days::new(u64::from(days))),
            to: Some(today),
        }
    }

    pub fn is_unbounded(&self) -> bool {
        self.from.is_none() && self.to.is_none()
    }

    /// Inclusive lower instant.
    pub fn lower_bound(&self) -> Option<DateTime<Utc>> {
        self.from.map(|day| day.and_time(NaiveTime::MIN).and_utc())
    }

    /// Exclusive upper instant: midnight after the `to` day.
    pub fn upper_bound(&self) -> Option<DateTime<Utc>> {
        self.to
            .and_then(|day| day.checked_add_days(Days::new(1)))
            .map(|next| next.and_time(NaiveTime::MIN).and_utc())
    }

    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        if let Some(lower) = self.lower_bound() {
            if instant < lower {
                return false;
            }
        }
        if let Some(upper) = self.upper_bound() {
            if instant >= upper {
                return false;
            }
        }
        true
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bound = |d: Option<NaiveDate>| d.map_or_else(|| "*".to_string(), |d| d.to_string());
        write!(f, "[{}, {}]", bound(self.from), bound(self.to))
    }
}

/// Immutable set of field predicates plus a creation-time window.
///
/// At most one condition per field; setting a field again replaces it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filter {
    conditions: BTreeMap<Field, Condition>,
    created_at: TimeRange,
}

impl Filter {
    /// Matches every record.
    pub fn all() -> Self {
        Self::default()
    }

    /// Adds a condition after checking it fits the field's type.
    pub fn with(mut self, field: Field, condition: Condition) -> Result<Self, SendvisionError> {
        match (&condition, field.flag()) {
            (Condition::Equals(FieldValue::Status(_)), None) => {}
            (Condition::IsNull, None) => {}
            (Condition::Equals(FieldValue::Bool(_)), Some(_)) => {}
            (Condition::Equals(value), _) => {
                return Err(SendvisionError::validation(format!(
                    "field `{field}` cannot be compared with `{value}`"
                )));
            }
            (Condition::IsNull, Some(_)) => {
                return Err(SendvisionError::validation(format!(
                    "flag `{field}` is never null; compare it with true or false"
                )));
            }
        }
        self.conditions.insert(field, condition);
        Ok(self)
    }

    pub fn status(mut self, status: Status) -> Self {
        self.conditions
            .insert(Field::Status, Condition::Equals(FieldValue::Status(status)));
        self
    }

    pub fn status_unset(mut self) -> Self {
        self.conditions.insert(Field::Status, Condition::IsNull);
        self
    }

    pub fn flag(mut self, flag: Flag, value: bool) -> Self {
        self.conditions
            .insert(flag.into(), Condition::Equals(FieldValue::Bool(value)));
        self
    }

    pub fn created_within(mut self, range: TimeRange) -> Self {
        self.created_at = range;
        self
    }

    pub fn time_range(&self) -> TimeRange {
        self.created_at
    }

    pub fn condition(&self, field: Field) -> Option<&Condition> {
        self.conditions.get(&field)
    }

    pub fn conditions(&self) -> impl Iterator<Item = (Field, &Condition)> {
        self.conditions.iter().map(|(f, c)| (*f, c))
    }

    /// Reference evaluation of the filter against one record.
    ///
    /// Equality with `Waiting` also matches records whose status is unset.
    pub fn matches(&self, record: &Record) -> bool {
        if !self.created_at.contains(record.created_at) {
            return false;
        }
        self.conditions.iter().all(|(field, condition)| {
            match (field.flag(), condition) {
                (Some(flag), Condition::Equals(FieldValue::Bool(expected))) => {
                    record.flag(flag) == *expected
                }
                (None, Condition::Equals(FieldValue::Status(Status::Waiting))) => {
                    record.is_waiting()
                }
                (None, Condition::Equals(FieldValue::Status(expected))) => {
                    record.status.as_ref() == Some(expected)
                }
                (None, Condition::IsNull) => record.status.is_none(),
                _ => false,
            }
        })
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, condition) in &self.conditions {
            if !first {
                f.write_str(", ")?;
            }
            first = false;
            match condition {
                Condition::Equals(value) => write!(f, "{field}={value}")?,
                Condition::IsNull => write!(f, "{field} is null")?,
            }
        }
        if !self.created_at.is_unbounded() {
            if !first {
                f.write_str(", ")?;
            }
            first = false;
            write!(f, "created_at in {}", self.created_at)?;
        }
        if first {
            f.write_str("*")?;
        }
        Ok(())
    }
}

/// Result ordering on `created_at`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Order {
    CreatedAtAscending,
    CreatedAtDescending,
}

/// Everything a source needs to answer a point-in-time query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordQuery {
    pub filter: Filter,
    pub order: Option<Order>,
}

impl RecordQuery {
    pub fn new(filter: Filter) -> Self {
        Self {
            filter,
            order: None,
        }
    }

    pub fn ordered(mut self, order: Order) -> Self {
        self.order = Some(order);
        self
    }

    /// Applies filter and ordering to an in-memory record set.
    pub fn select<'a>(&self, records: impl IntoIterator<Item = &'a Record>) -> Vec<Record> {
        let mut selected: Vec<Record> = records
            .into_iter()
            .filter(|r| self.filter.matches(r))
            .cloned()
            .collect();
        match self.order {
            Some(Order::CreatedAtAscending) => selected.sort_by_key(|r| r.created_at),
            Some(Order::CreatedAtDescending) => {
                selected.sort_by(|a, b| b.created_at.cmp(&a.created_at))
            }
            None => {}
        }
        selected
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, s).unwrap()
    }

    #[test]
    fn to_day_is_inclusive_through_end_of_day() {
        let range = TimeRange::between(day(2026, 3, 1), day(2026, 3, 7)).unwrap();
        assert!(range.contains(at(2026, 3, 7, 23, 59, 59)));
        assert!(range.contains(at(2026, 3, 1, 0, 0, 0)));
        assert!(!range.contains(at(2026, 3, 8, 0, 0, 0)));
        assert!(!range.contains(at(2026, 2, 28, 23, 59, 59)));
    }

    #[test]
    fn upper_bound_is_widened_by_one_day() {
        let range = TimeRange {
            from: None,
            to: Some(day(2026, 12, 31)),
        };
        assert_eq!(range.upper_bound(), Some(at(2027, 1, 1, 0, 0, 0)));
        assert_eq!(range.lower_bound(), None);
    }

    #[test]
    fn inverted_range_is_rejected() {
        let err = TimeRange::between(day(2026, 3, 8), day(2026, 3, 1)).unwrap_err();
        assert!(matches!(err, SendvisionError::Validation { .. }));
    }

    #[test]
    fn last_days_spans_back_from_today() {
        let range = TimeRange::last_days(day(2026, 3, 8), 7);
        assert_eq!(range.from, Some(day(2026, 3, 1)));
        assert_eq!(range.to, Some(day(2026, 3, 8)));
    }

    #[test]
    fn mismatched_condition_types_are_rejected() {
        let err = Filter::all()
            .with(Field::Status, Condition::Equals(FieldValue::Bool(true)))
            .unwrap_err();
        assert!(matches!(err, SendvisionError::Validation { .. }));

        let err = Filter::all()
            .with(Field::Escalation, Condition::IsNull)
            .unwrap_err();
        assert!(matches!(err, SendvisionError::Validation { .. }));

        assert!(
            Filter::all()
                .with(Field::Cancel, Condition::Equals(FieldValue::Bool(false)))
                .is_ok()
        );
    }

    #[test]
    fn waiting_equality_matches_unset_status() {
        let filter = Filter::all().status(Status::Waiting);
        let unset = Record::new("a", at(2026, 3, 1, 9, 0, 0));
        let waiting = unset.clone().with_status(Status::Waiting);
        let approved = unset.clone().with_status(Status::Approval);
        assert!(filter.matches(&unset));
        assert!(filter.matches(&waiting));
        assert!(!filter.matches(&approved));

        let only_null = Filter::all().status_unset();
        assert!(only_null.matches(&unset));
        assert!(!only_null.matches(&waiting));
    }

    #[test]
    fn flag_and_status_conditions_combine() {
        let filter = Filter::all()
            .status(Status::ManualHandle)
            .flag(Flag::Bookcall, true);
        let base = Record::new("a", at(2026, 3, 1, 9, 0, 0)).with_status(Status::ManualHandle);
        assert!(!filter.matches(&base));
        assert!(filter.matches(&base.with_flag(Flag::Bookcall, true)));
    }

    #[test]
    fn select_orders_oldest_first() {
        let newer = Record::new("new", at(2026, 3, 2, 0, 0, 0));
        let older = Record::new("old", at(2026, 3, 1, 0, 0, 0));
        let query = RecordQuery::new(Filter::all()).ordered(Order::CreatedAtAscending);
        let ids: Vec<_> = query
            .select([&newer, &older])
            .into_iter()
            .map(|r| r.id.0)
            .collect();
        assert_eq!(ids, vec!["old", "new"]);
    }

    #[test]
    fn display_lists_conditions() {
        let filter = Filter::all()
            .flag(Flag::Escalation, true)
            .status(Status::ManualHandle)
            .created_within(TimeRange::between(day(2026, 3, 1), day(2026, 3, 2)).unwrap());
        assert_eq!(
            filter.to_string(),
            "permission=Manual Handle, escalation=true, created_at in [2026-03-01, 2026-03-02]"
        );
        assert_eq!(Filter::all().to_string(), "*");
    }
}
