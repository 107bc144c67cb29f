// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The typed message shape produced by the external reasoner — the
//! tagged variant `{type, content, state, attachment?}`.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ReasonerMessageKind {
    Prologue,
    Annotation,
    Thinking,
    Conclusion,
    /// Anything the reasoner emits that isn't one of the four known
    /// kinds. The segmentation engine classifies this as
    /// `THINKING_TEXT` rather than rejecting the message outright.
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ReasonerState {
    Model,
    Done,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructureAttachment {
    pub path: String,
    pub label: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReasonerMessage {
    #[serde(rename = "type")]
    pub kind: ReasonerMessageKind,
    pub content: String,
    pub state: ReasonerState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachment: Option<StructureAttachment>,
}

impl ReasonerMessage {
    pub fn is_terminal(&self) -> bool {
        self.state == ReasonerState::Done
    }
}
