// SPDX-FileCopyrightText: 2026 SendVision Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `sendvision queue` command implementation.

use std::path::Path;

use clap::ValueEnum;
use sendvision_config::SendvisionConfig;
use sendvision_core::{Record, SendvisionError};
use sendvision_dashboard::{Dashboard, DashboardOptions, View};

use crate::export::load_source;

/// Operator queues that can be listed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum QueueKind {
    /// Escalated messages awaiting a reply.
    Escalations,
    /// Messages that need a human reply.
    ManualReplies,
}

impl QueueKind {
    fn view(self) -> View {
        match self {
            QueueKind::Escalations => View::EscalationQueue,
            QueueKind::ManualReplies => View::ManualReplyQueue,
        }
    }
}

/// Loads the export and returns the queue contents, oldest first.
pub async fn load_queue(
    config: &SendvisionConfig,
    records: &Path,
    kind: QueueKind,
) -> Result<Vec<Record>, SendvisionError> {
    let source = load_source(&config.source.collection, records).await?;
    let dashboard =
        Dashboard::open(source, kind.view(), DashboardOptions::from_config(config)).await?;
    let snapshot = dashboard.ready().await?;
    dashboard.close().await;
    Ok(snapshot.records.to_vec())
}

/// Run the `sendvision queue` command.
pub async fn run_queue(
    config: &SendvisionConfig,
    records: &Path,
    kind: QueueKind,
    json: bool,
) -> Result<(), SendvisionError> {
    let queue = load_queue(config, records, kind).await?;

    if json {
        let out = serde_json::to_string_pretty(&queue)
            .map_err(|e| SendvisionError::Internal(format!("failed to encode queue: {e}")))?;
        println!("{out}");
        return Ok(());
    }

    println!("{} ({} entries)", kind.view(), queue.len());
    for record in &queue {
        let status = record.status.as_ref().map_or("-", |s| s.as_str());
        let subject = record
            .text("subject")
            .or_else(|| record.text("Customer_Email"))
            .unwrap_or("");
        println!(
            "  {:<10} {}  {:<14} {}",
            record.id.as_str(),
            record.created_at.format("%Y-%m-%d %H:%M"),
            status,
            subject
        );
    }
    Ok(())
}
