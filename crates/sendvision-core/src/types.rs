// SPDX-FileCopyrightText: 2026 SendVision Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Record model shared by the store, the aggregation engine and workflow actions.

use std::collections::BTreeMap;
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use strum::{AsRefStr, Display, EnumIter, EnumString};

/// Column names as the classification pipeline writes them.
pub mod columns {
    pub const ID: &str = "id";
    pub const CREATED_AT: &str = "created_at";
    pub const STATUS: &str = "permission";
    pub const ESCALATED_REPLY: &str = "Escalated_reply";
    pub const HUMAN_REPLY: &str = "human_reply";
    pub const HUMAN_NAME: &str = "human_name";
    pub const ESCALATION: &str = "escalation";
    pub const CANCEL: &str = "cancel";
    pub const IMPORTANT: &str = "important";
    pub const BOOKCALL: &str = "bookcall";
}

/// Opaque record identifier assigned by the record source.
///
/// Sources may hand out numeric keys; they are kept as their decimal text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct RecordId(pub String);

impl RecordId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RecordId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl<'de> Deserialize<'de> for RecordId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Text(String),
            Signed(i64),
            Unsigned(u64),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Text(s) => RecordId(s),
            RawId::Signed(n) => RecordId(n.to_string()),
            RawId::Unsigned(n) => RecordId(n.to_string()),
        })
    }
}

/// Workflow status of a record (the `permission` column).
///
/// Values the pipeline writes that this crate does not know are kept as
/// [`Status::Unrecognized`] so they survive a round trip untouched.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Status {
    Approval,
    Objection,
    ManualHandle,
    Waiting,
    Escalation,
    Cancel,
    Important,
    Bookcall,
    Replied,
    Unrecognized(String),
}

impl Status {
    /// Every status the workflow defines, in pipeline order.
    pub const KNOWN: [Status; 9] = [
        Status::Approval,
        Status::Objection,
        Status::ManualHandle,
        Status::Waiting,
        Status::Escalation,
        Status::Cancel,
        Status::Important,
        Status::Bookcall,
        Status::Replied,
    ];

    /// The wire representation of this status.
    pub fn as_str(&self) -> &str {
        match self {
            Status::Approval => "Approval",
            Status::Objection => "Objection",
            Status::ManualHandle => "Manual Handle",
            Status::Waiting => "Waiting",
            Status::Escalation => "Escalation",
            Status::Cancel => "Cancel",
            Status::Important => "Important",
            Status::Bookcall => "Bookcall",
            Status::Replied => "Replied",
            Status::Unrecognized(raw) => raw,
        }
    }

    pub fn is_recognized(&self) -> bool {
        !matches!(self, Status::Unrecognized(_))
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Status::KNOWN
            .iter()
            .find(|known| known.as_str() == s)
            .cloned()
            .unwrap_or_else(|| Status::Unrecognized(s.to_string())))
    }
}

impl Serialize for Status {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Status {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        let Ok(status) = raw.parse::<Status>();
        Ok(status)
    }
}

/// The four boolean flags a record carries independently of its status.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumString, EnumIter,
    AsRefStr, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Flag {
    Escalation,
    Cancel,
    Important,
    Bookcall,
}

/// One classified message as stored by the pipeline.
///
/// Only identity, creation time, status and flags are interpreted. Every
/// other column is carried in `payload` for the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: RecordId,
    pub created_at: DateTime<Utc>,
    #[serde(rename = "permission", default)]
    pub status: Option<Status>,
    #[serde(default, deserialize_with = "null_as_false")]
    pub escalation: bool,
    #[serde(default, deserialize_with = "null_as_false")]
    pub cancel: bool,
    #[serde(default, deserialize_with = "null_as_false")]
    pub important: bool,
    #[serde(default, deserialize_with = "null_as_false")]
    pub bookcall: bool,
    #[serde(flatten)]
    pub payload: Map<String, Value>,
}

fn null_as_false<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    Ok(Option::<bool>::deserialize(deserializer)?.unwrap_or(false))
}

impl Record {
    /// A record with no status, all flags cleared and an empty payload.
    pub fn new(id: impl Into<RecordId>, created_at: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            created_at,
            status: None,
            escalation: false,
            cancel: false,
            important: false,
            bookcall: false,
            payload: Map::new(),
        }
    }

    pub fn with_status(mut self, status: Status) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_flag(mut self, flag: Flag, value: bool) -> Self {
        *self.flag_mut(flag) = value;
        self
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.payload.insert(key.into(), value.into());
        self
    }

    pub fn flag(&self, flag: Flag) -> bool {
        match flag {
            Flag::Escalation => self.escalation,
            Flag::Cancel => self.cancel,
            Flag::Important => self.important,
            Flag::Bookcall => self.bookcall,
        }
    }

    fn flag_mut(&mut self, flag: Flag) -> &mut bool {
        match flag {
            Flag::Escalation => &mut self.escalation,
            Flag::Cancel => &mut self.cancel,
            Flag::Important => &mut self.important,
            Flag::Bookcall => &mut self.bookcall,
        }
    }

    /// Unset and explicit `Waiting` are the same state.
    pub fn is_waiting(&self) -> bool {
        matches!(self.status, None | Some(Status::Waiting))
    }

    /// Text value of an opaque payload column, if present and a string.
    pub fn text(&self, column: &str) -> Option<&str> {
        self.payload.get(column).and_then(Value::as_str)
    }
}

impl From<String> for RecordId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Column assignments applied atomically to a single record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldSet(BTreeMap<String, Value>);

impl FieldSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(column.into(), value.into());
        self
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.0.get(column)
    }

    pub fn contains(&self, column: &str) -> bool {
        self.0.contains_key(column)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
