// SPDX-FileCopyrightText: 2026 SendVision Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Workflow actions and their column assignments.

use std::str::FromStr;

use sendvision_core::{FieldSet, RecordId, SendvisionError, Status, columns};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::{AsRefStr, Display, EnumIter, EnumString};

/// Name of an action as the presentation layer sends it.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter, AsRefStr, Serialize,
    Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    #[strum(to_string = "resolve_escalation", serialize = "resolveEscalation")]
    ResolveEscalation,
    #[strum(to_string = "submit_manual_reply", serialize = "submitManualReply")]
    SubmitManualReply,
}

/// A fully specified operator action on one record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum WorkflowAction {
    /// Answer an escalated message and take it off the escalation queue.
    /// Status is left alone.
    ResolveEscalation { id: RecordId, reply: String },
    /// Answer a message that needed a human and mark it replied.
    SubmitManualReply {
        id: RecordId,
        reply: String,
        #[serde(default)]
        author: Option<String>,
    },
}

impl WorkflowAction {
    /// Builds an action from a loosely typed request.
    ///
    /// `payload` is a JSON object with `reply` and, for manual replies, an
    /// optional `author` (`human_name` is accepted as an alias).
    pub fn from_request(
        name: &str,
        id: impl Into<RecordId>,
        payload: &Value,
    ) -> Result<Self, SendvisionError> {
        let kind = ActionKind::from_str(name)
            .map_err(|_| SendvisionError::validation(format!("unknown action `{name}`")))?;
        let Some(payload) = payload.as_object() else {
            return Err(SendvisionError::validation(
                "action payload must be a JSON object",
            ));
        };
        let text = |key: &str| -> Result<Option<String>, SendvisionError> {
            match payload.get(key) {
                None | Some(Value::Null) => Ok(None),
                Some(Value::String(s)) => Ok(Some(s.clone())),
                Some(other) => Err(SendvisionError::validation(format!(
                    "`{key}` must be a string, got {other}"
                ))),
            }
        };
        let reply = text("reply")?.unwrap_or_default();
        let id = id.into();
        Ok(match kind {
            ActionKind::ResolveEscalation => WorkflowAction::ResolveEscalation { id, reply },
            ActionKind::SubmitManualReply => {
                let author = match text("author")? {
                    Some(author) => Some(author),
                    None => text(columns::HUMAN_NAME)?,
                };
                WorkflowAction::SubmitManualReply { id, reply, author }
            }
        })
    }

    pub fn kind(&self) -> ActionKind {
        match self {
            WorkflowAction::ResolveEscalation { .. } => ActionKind::ResolveEscalation,
            WorkflowAction::SubmitManualReply { .. } => ActionKind::SubmitManualReply,
        }
    }

    pub fn id(&self) -> &RecordId {
        match self {
            WorkflowAction::ResolveEscalation { id, .. }
            | WorkflowAction::SubmitManualReply { id, .. } => id,
        }
    }

    /// Checks local preconditions. Never touches the source.
    pub fn validate(&self) -> Result<(), SendvisionError> {
        let reply = match self {
            WorkflowAction::ResolveEscalation { reply, .. }
            | WorkflowAction::SubmitManualReply { reply, .. } => reply,
        };
        if reply.is_empty() {
            return Err(SendvisionError::validation("reply text must not be empty"));
        }
        if self.id().as_str().is_empty() {
            return Err(SendvisionError::validation("record id must not be empty"));
        }
        Ok(())
    }

    /// The exact columns this action assigns.
    pub fn fields(&self) -> FieldSet {
        match self {
            WorkflowAction::ResolveEscalation { reply, .. } => FieldSet::new()
                .set(columns::ESCALATED_REPLY, reply.as_str())
                .set(columns::ESCALATION, false),
            WorkflowAction::SubmitManualReply { reply, author, .. } => {
                let author = author.as_deref().map_or(Value::Null, Value::from);
                FieldSet::new()
                    .set(columns::HUMAN_REPLY, reply.as_str())
                    .set(columns::HUMAN_NAME, author)
                    .set(columns::STATUS, Status::Replied.as_str())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn escalation_fields_clear_flag_and_keep_status() {
        let action = WorkflowAction::ResolveEscalation {
            id: "7".into(),
            reply: "We'll handle this Friday".into(),
        };
        let fields = action.fields();
        assert_eq!(fields.len(), 2);
        assert_eq!(fields.get("escalation"), Some(&json!(false)));
        assert_eq!(
            fields.get(columns::ESCALATED_REPLY),
            Some(&json!("We'll handle this Friday"))
        );
        assert!(!fields.contains(columns::STATUS));
    }

    #[test]
    fn manual_reply_fields_mark_replied() {
        let action = WorkflowAction::SubmitManualReply {
            id: "7".into(),
            reply: "Thanks!".into(),
            author: Some("Dana".into()),
        };
        let fields = action.fields();
        assert_eq!(fields.len(), 3);
        assert_eq!(fields.get(columns::STATUS), Some(&json!("Replied")));
        assert_eq!(fields.get(columns::HUMAN_NAME), Some(&json!("Dana")));
    }

    #[test]
    fn missing_author_is_stored_as_null() {
        let action = WorkflowAction::SubmitManualReply {
            id: "7".into(),
            reply: "ok".into(),
            author: None,
        };
        assert_eq!(action.fields().get(columns::HUMAN_NAME), Some(&Value::Null));
    }

    #[test]
    fn author_is_written_as_typed() {
        for author in ["", "  Dana "] {
            let action = WorkflowAction::SubmitManualReply {
                id: "7".into(),
                reply: "ok".into(),
                author: Some(author.into()),
            };
            assert_eq!(action.fields().get(columns::HUMAN_NAME), Some(&json!(author)));
        }
    }

    #[test]
    fn empty_reply_fails_validation() {
        let action = WorkflowAction::ResolveEscalation {
            id: "7".into(),
            reply: String::new(),
        };
        assert!(matches!(
            action.validate(),
            Err(SendvisionError::Validation { .. })
        ));
    }

    #[test]
    fn whitespace_reply_passes_validation() {
        for reply in [" ", "   ", "\n\t"] {
            let action = WorkflowAction::SubmitManualReply {
                id: "7".into(),
                reply: reply.into(),
                author: None,
            };
            assert!(action.validate().is_ok(), "{reply:?} should be accepted");
        }
    }

    #[test]
    fn from_request_accepts_both_spellings() {
        let payload = json!({"reply": "hi", "human_name": "Sam"});
        let snake = WorkflowAction::from_request("submit_manual_reply", "3", &payload).unwrap();
        let camel = WorkflowAction::from_request("submitManualReply", "3", &payload).unwrap();
        assert_eq!(snake, camel);
        assert_eq!(
            snake,
            WorkflowAction::SubmitManualReply {
                id: "3".into(),
                reply: "hi".into(),
                author: Some("Sam".into()),
            }
        );
    }

    #[test]
    fn from_request_rejects_unknown_action() {
        let err = WorkflowAction::from_request("delete_everything", "3", &json!({})).unwrap_err();
        assert!(err.to_string().contains("unknown action"));
    }

    #[test]
    fn from_request_rejects_non_string_reply() {
        let err =
            WorkflowAction::from_request("resolve_escalation", "3", &json!({"reply": 5})).unwrap_err();
        assert!(matches!(err, SendvisionError::Validation { .. }));
    }

    #[test]
    fn missing_reply_parses_then_fails_validation() {
        let action = WorkflowAction::from_request("resolve_escalation", "3", &json!({})).unwrap();
        assert!(action.validate().is_err());
    }

    #[test]
    fn serde_uses_action_tag() {
        let action: WorkflowAction = serde_json::from_value(json!({
            "action": "resolve_escalation",
            "id": 12,
            "reply": "done"
        }))
        .unwrap();
        assert_eq!(action.kind(), ActionKind::ResolveEscalation);
        assert_eq!(action.id().as_str(), "12");
    }
}
