// SPDX-FileCopyrightText: 2026 SendVision Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Record fixtures.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use sendvision_core::{Flag, Record, Status};

/// Default collection name used across tests.
pub const EMAILS: &str = "emails";

/// UTC instant; panics on an invalid date.
pub fn at(year: i32, month: u32, day: u32, hour: u32, min: u32, sec: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, min, sec)
        .single()
        .unwrap_or_else(|| panic!("invalid fixture instant {year}-{month}-{day} {hour}:{min}:{sec}"))
}

/// Calendar day; panics on an invalid date.
pub fn day(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day)
        .unwrap_or_else(|| panic!("invalid fixture day {year}-{month}-{day}"))
}

/// An unclassified record created at noon on 2024-05-01.
pub fn email(id: &str) -> Record {
    Record::new(id, at(2024, 5, 1, 12, 0, 0))
}

pub fn email_at(id: &str, created_at: DateTime<Utc>) -> Record {
    Record::new(id, created_at)
}

pub fn with_status(id: &str, status: Status) -> Record {
    email(id).with_status(status)
}

/// An escalated record awaiting a reply.
pub fn escalated(id: &str) -> Record {
    email(id)
        .with_flag(Flag::Escalation, true)
        .with_field("subject", format!("Escalated {id}"))
}

/// A record waiting for a manual reply.
pub fn manual(id: &str) -> Record {
    with_status(id, Status::ManualHandle).with_field("subject", format!("Manual {id}"))
}
