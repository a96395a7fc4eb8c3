// SPDX-FileCopyrightText: 2026 SendVision Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Building a record source from an export file.

use std::path::Path;
use std::sync::Arc;

use sendvision_core::SendvisionError;
use sendvision_source::{MemorySource, load_records};

/// Loads `path` into a fresh in-memory source under `collection`.
pub async fn load_source(
    collection: &str,
    path: &Path,
) -> Result<Arc<MemorySource>, SendvisionError> {
    let records = load_records(path).await?;
    let source = MemorySource::named(format!("export:{}", path.display()));
    source.seed(collection, records).await;
    Ok(Arc::new(source))
}
