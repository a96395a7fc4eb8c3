// SPDX-FileCopyrightText: 2026 SendVision Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the SendVision dashboard.
//!
//! This crate provides the record model, declarative filters, the shared
//! error type and the [`RecordSource`] trait every other crate builds on.

pub mod error;
pub mod filter;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::SendvisionError;
pub use filter::{Condition, Field, FieldValue, Filter, Order, RecordQuery, TimeRange};
pub use traits::{ChangeEvent, ChangeKind, RecordSource, Subscription, SubscriptionId};
pub use types::{FieldSet, Flag, Record, RecordId, Status, columns};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sendvision_error_has_all_variants() {
        let _validation = SendvisionError::validation("empty reply");
        let _remote = SendvisionError::Remote {
            message: "permission denied".into(),
            source: Some(Box::new(std::io::Error::other("test"))),
        };
        let _in_flight = SendvisionError::SubmissionInFlight { id: "7".into() };
        let _closed = SendvisionError::Closed;
        let _config = SendvisionError::Config("test".into());
        let _internal = SendvisionError::Internal("test".into());
    }

    #[test]
    fn local_errors_are_distinguished_from_remote() {
        assert!(SendvisionError::validation("x").is_local());
        assert!(SendvisionError::Closed.is_local());
        assert!(!SendvisionError::remote("x").is_local());
    }

    #[test]
    fn change_kind_round_trips_through_display() {
        use std::str::FromStr;

        for kind in [ChangeKind::Insert, ChangeKind::Update, ChangeKind::Delete] {
            let parsed = ChangeKind::from_str(&kind.to_string()).expect("should parse back");
            assert_eq!(kind, parsed);
        }
    }

    #[test]
    fn record_source_is_object_safe() {
        fn _assert_dyn(_: &dyn RecordSource) {}
    }
}
