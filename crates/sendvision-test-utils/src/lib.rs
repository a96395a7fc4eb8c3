// SPDX-FileCopyrightText: 2026 SendVision Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for SendVision integration tests.
//!
//! # Components
//!
//! - [`ScriptedSource`] - record source whose queries and mutations can be
//!   held, released out of order, failed and recorded
//! - [`fixtures`] - record builders for common shapes

pub mod fixtures;
pub mod scripted_source;

pub use scripted_source::{RecordedMutation, ScriptedSource};
