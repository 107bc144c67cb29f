// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Strongly-typed identifiers for jobs, events, and structure artifacts.
//!
//! Every id type enforces its wire format at
//! construction time rather than leaving callers to `format!` keys by
//! hand — the same discipline the key scheme (`fj-kv::keys`) applies to
//! Redis keys.

use crate::error::ValidationError;
use rand::Rng;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

fn job_id_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^job_[a-z0-9]+$").expect("valid regex"))
}

fn event_id_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^evt_job_[a-z0-9]+_\d{4}$").expect("valid regex"))
}

fn structure_id_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^str_job_[a-z0-9]+_\w+$").expect("valid regex"))
}

const ID_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";
const JOB_ID_SUFFIX_LEN: usize = 20;

/// Unique identifier for a job. Matches `^job_[a-z0-9]+$`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct JobId(String);

impl JobId {
    /// Generate a fresh, random job id.
    pub fn generate() -> Self {
        let mut rng = rand::thread_rng();
        let suffix: String = (0..JOB_ID_SUFFIX_LEN)
            .map(|_| ID_ALPHABET[rng.gen_range(0..ID_ALPHABET.len())] as char)
            .collect();
        Self(format!("job_{suffix}"))
    }

    /// Parse and validate a job id against the strict regex.
    pub fn parse(s: impl Into<String>) -> Result<Self, ValidationError> {
        let s = s.into();
        if job_id_re().is_match(&s) {
            Ok(Self(s))
        } else {
            Err(ValidationError::InvalidJobId(s))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for JobId {
    type Error = ValidationError;
    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(s)
    }
}

impl From<JobId> for String {
    fn from(id: JobId) -> Self {
        id.0
    }
}

impl std::borrow::Borrow<str> for JobId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Unique identifier for an event within a job's stream.
///
/// Format: `evt_<job_id>_<4-digit-sequence>`. Deterministic in
/// `(job_id, seq)`, which is what makes redelivery idempotent per
/// the at-least-once delivery non-goal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EventId(String);

impl EventId {
    pub fn new(job_id: &JobId, seq: u32) -> Self {
        Self(format!("evt_{job_id}_{seq:04}"))
    }

    pub fn parse(s: impl Into<String>) -> Result<Self, ValidationError> {
        let s = s.into();
        if event_id_re().is_match(&s) {
            Ok(Self(s))
        } else {
            Err(ValidationError::InvalidEventId(s))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for EventId {
    type Error = ValidationError;
    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(s)
    }
}

impl From<EventId> for String {
    fn from(id: EventId) -> Self {
        id.0
    }
}

/// Unique identifier for a synthesized structure artifact.
///
/// Format: `str_<job_id>_<ordinal>`. Ordinals are per-job and assigned
/// sequentially by the segmentation engine, starting at 1.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct StructureId(String);

impl StructureId {
    pub fn new(job_id: &JobId, ordinal: u32) -> Self {
        Self(format!("str_{job_id}_{ordinal}"))
    }

    pub fn parse(s: impl Into<String>) -> Result<Self, ValidationError> {
        let s = s.into();
        if structure_id_re().is_match(&s) {
            Ok(Self(s))
        } else {
            Err(ValidationError::InvalidStructureId(s))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StructureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for StructureId {
    type Error = ValidationError;
    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(s)
    }
}

impl From<StructureId> for String {
    fn from(id: StructureId) -> Self {
        id.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_job_id_matches_regex() {
        let id = JobId::generate();
        assert!(job_id_re().is_match(id.as_str()));
    }

    #[test]
    fn rejects_uppercase_job_id() {
        assert!(JobId::parse("job_ABC123").is_err());
    }

    #[test]
    fn rejects_missing_prefix() {
        assert!(JobId::parse("abc123").is_err());
    }

    #[test]
    fn event_id_round_trips() {
        let job = JobId::parse("job_abc123").unwrap();
        let evt = EventId::new(&job, 7);
        assert_eq!(evt.as_str(), "evt_job_abc123_0007");
        assert!(EventId::parse(evt.as_str()).is_ok());
    }

    #[test]
    fn structure_id_format() {
        let job = JobId::parse("job_abc123").unwrap();
        let sid = StructureId::new(&job, 3);
        assert_eq!(sid.as_str(), "str_job_abc123_3");
    }
}
