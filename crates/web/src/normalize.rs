// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Sequence normalization shared by the create and sequence
//! pre-registration endpoints.

use crate::error::ApiError;
use fj_core::validation::validate_sequence;

/// Strips a FASTA header line (if any) and whitespace, uppercasing
/// the rest. Not a FASTA parser — the Non-goals exclude that as
/// an external collaborator — just enough normalization to accept the
/// common single-record case a client might paste in directly.
pub fn strip_fasta(raw: &str) -> String {
    raw.lines().filter(|line| !line.starts_with('>')).collect::<Vec<_>>().join("")
}

pub fn normalize(raw: &str) -> String {
    raw.chars().filter(|c| !c.is_whitespace()).collect::<String>().to_uppercase()
}

/// Resolves the create-request body into a validated, normalized
/// sequence. Exactly one of `sequence`/`fasta_content` must be
/// present and non-empty.
pub fn resolve_create_sequence(sequence: Option<&str>, fasta_content: Option<&str>) -> Result<String, ApiError> {
    let has_sequence = sequence.map(|s| !s.trim().is_empty()).unwrap_or(false);
    let has_fasta = fasta_content.map(|s| !s.trim().is_empty()).unwrap_or(false);

    if has_sequence == has_fasta {
        return Err(ApiError::Validation {
            message: "exactly one of sequence or fastaContent must be present".to_string(),
            details: vec!["sequence and fastaContent are mutually exclusive and one is required".to_string()],
        });
    }

    let raw = if has_sequence {
        sequence.unwrap_or_default().to_string()
    } else {
        strip_fasta(fasta_content.unwrap_or_default())
    };

    let normalized = normalize(&raw);
    validate_sequence(&normalized)?;
    Ok(normalized)
}

pub fn validate_override_sequence(raw: &str) -> Result<String, ApiError> {
    let normalized = normalize(raw);
    validate_sequence(&normalized)?;
    Ok(normalized)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_fasta_header() {
        let out = strip_fasta(">sp|P69905|HBA\nmvlsp\nadktnv");
        assert_eq!(out, "mvlspadktnv");
    }

    #[test]
    fn rejects_both_sequence_and_fasta() {
        let err = resolve_create_sequence(Some("MVLSPADKTNVKAAWG"), Some(">h\nMVLSP"));
        assert!(err.is_err());
    }

    #[test]
    fn rejects_neither_sequence_nor_fasta() {
        let err = resolve_create_sequence(None, None);
        assert!(err.is_err());
    }

    #[test]
    fn normalizes_lowercase_with_whitespace() {
        let seq = resolve_create_sequence(Some(" mvlsp adktnv kaawg "), None).unwrap();
        assert_eq!(seq, "MVLSPADKTNVKAAWG");
    }
}
