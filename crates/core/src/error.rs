// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Validation failures for ids and domain inputs.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("invalid job id: {0}")]
    InvalidJobId(String),

    #[error("invalid event id: {0}")]
    InvalidEventId(String),

    #[error("invalid structure id: {0}")]
    InvalidStructureId(String),

    #[error("sequence length {len} outside the allowed range 10..=5000")]
    SequenceLength { len: usize },

    #[error("sequence contains non-amino-acid character {found:?} at position {pos}")]
    SequenceAlphabet { found: char, pos: usize },
}
