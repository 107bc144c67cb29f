// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Opaque handle used to interrupt a running reasoner.

use serde::{Deserialize, Serialize};

/// Identifies the reasoner session backing a job, so the cancel path
/// can reach across instances and fire an interrupt without knowing
/// anything about the reasoner's transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReasonerSession {
    /// Which service instance opened the session.
    pub instance: String,
    /// The reasoner's own session identifier.
    pub session: String,
    /// Base URL of the backend the instance is talking to.
    pub backend_url: String,
}

impl ReasonerSession {
    pub fn new(instance: impl Into<String>, session: impl Into<String>, backend_url: impl Into<String>) -> Self {
        Self {
            instance: instance.into(),
            session: session.into(),
            backend_url: backend_url.into(),
        }
    }
}
