// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Structure artifacts synthesized from THINKING_PDB reasoner messages.

use crate::id::StructureId;
use serde::{Deserialize, Serialize};

/// A structure file (or inline payload) produced partway through a
/// job's reasoning trace, attached to the THINKING_PDB event that
/// closes its block.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructureArtifact {
    pub structure_id: StructureId,
    pub label: String,
    pub filename: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inline_pdb_data: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    pub created_at_ms: u64,
    /// The reasoner message text that produced this artifact.
    pub cot: String,
}
