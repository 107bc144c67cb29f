// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReasonerError {
    #[error("failed to start reasoner session: {0}")]
    SessionStart(String),

    #[error("reasoner stream error: {0}")]
    Stream(String),

    #[error("reasoner interrupt failed: {0}")]
    Interrupt(String),

    #[error("mock data file {path:?} unreadable: {reason}")]
    MockData { path: String, reason: String },
}
