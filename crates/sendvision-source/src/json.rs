// SPDX-FileCopyrightText: 2026 SendVision Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Loading records from a JSON export of the classification table.
//!
//! The export is a top-level array of row objects. Rows keep every column;
//! only `id`, `created_at`, `permission` and the four flags are typed.

use std::path::Path;

use sendvision_core::{Record, SendvisionError};
use tracing::debug;

/// Parses a JSON array of rows.
pub fn parse_records(json: &str) -> Result<Vec<Record>, SendvisionError> {
    serde_json::from_str(json).map_err(|e| SendvisionError::Remote {
        message: format!("malformed record export at line {} column {}", e.line(), e.column()),
        source: Some(Box::new(e)),
    })
}

/// Reads and parses an export file.
pub async fn load_records(path: &Path) -> Result<Vec<Record>, SendvisionError> {
    let json = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| SendvisionError::Remote {
            message: format!("failed to read {}", path.display()),
            source: Some(Box::new(e)),
        })?;
    let records = parse_records(&json)?;
    debug!(path = %path.display(), count = records.len(), "loaded record export");
    Ok(records)
}
