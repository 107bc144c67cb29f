// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Input validation shared by the daemon's create-job endpoint and the
//! CLI's local pre-flight check.

use crate::error::ValidationError;

/// The standard 20-amino-acid alphabet, upper case single-letter codes.
const AMINO_ACIDS: &str = "ACDEFGHIKLMNPQRSTVWY";

const MIN_SEQUENCE_LEN: usize = 10;
const MAX_SEQUENCE_LEN: usize = 5000;

/// Validate a protein sequence: 10-5000 characters, every character an
/// upper-case standard amino acid code.
pub fn validate_sequence(sequence: &str) -> Result<(), ValidationError> {
    let len = sequence.chars().count();
    if !(MIN_SEQUENCE_LEN..=MAX_SEQUENCE_LEN).contains(&len) {
        return Err(ValidationError::SequenceLength { len });
    }
    for (pos, ch) in sequence.chars().enumerate() {
        if !AMINO_ACIDS.contains(ch) {
            return Err(ValidationError::SequenceAlphabet { found: ch, pos });
        }
    }
    Ok(())
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn alphabet_only_strings_in_range_always_validate(seq in "[ACDEFGHIKLMNPQRSTVWY]{10,200}") {
            prop_assert!(validate_sequence(&seq).is_ok());
        }

        #[test]
        fn validation_never_panics(input in "[ -~]{0,300}") {
            let _ = validate_sequence(&input);
        }

        #[test]
        fn too_short_is_always_a_length_error(seq in "[ACDEFGHIKLMNPQRSTVWY]{0,9}") {
            prop_assert!(matches!(validate_sequence(&seq), Err(ValidationError::SequenceLength { .. })));
        }
    }
}
