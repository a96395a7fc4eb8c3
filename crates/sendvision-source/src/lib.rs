// SPDX-FileCopyrightText: 2026 SendVision Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Record sources that live in this process.
//!
//! [`MemorySource`] answers queries from a local table and fans change
//! events out to subscribers. [`json`] seeds one from an exported table.

pub mod json;
pub mod memory;

pub use json::{load_records, parse_records};
pub use memory::MemorySource;
