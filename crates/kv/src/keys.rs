// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The key scheme. This is the only module permitted to format a job
//! key; everything else goes through `KeySchema`.

use fj_core::JobId;

/// Builds the fully-prefixed keys for a single logical namespace.
///
/// All job state lives under one prefix with no numeric-database
/// split, so any service instance sharing the same prefix can read,
/// progress, or cancel any job regardless of which instance created
/// it.
#[derive(Debug, Clone)]
pub struct KeySchema {
    prefix: String,
}

impl KeySchema {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self { prefix: prefix.into() }
    }

    pub fn state(&self, job_id: &JobId) -> String {
        format!("{}:job:state:{job_id}", self.prefix)
    }

    pub fn meta(&self, job_id: &JobId) -> String {
        format!("{}:job:meta:{job_id}", self.prefix)
    }

    pub fn events(&self, job_id: &JobId) -> String {
        format!("{}:job:events:{job_id}", self.prefix)
    }

    pub fn reasoner(&self, job_id: &JobId) -> String {
        format!("{}:job:reasoner:{job_id}", self.prefix)
    }

    pub fn state_scan_pattern(&self) -> String {
        format!("{}:job:state:*", self.prefix)
    }

    pub fn meta_scan_pattern(&self) -> String {
        format!("{}:job:meta:*", self.prefix)
    }

    /// Recover the job id embedded in a key produced by `state()` or
    /// `meta()`. Returns `None` for keys that don't match this schema's
    /// prefix and typed segment.
    pub fn job_id_from_key(&self, key: &str) -> Option<JobId> {
        let rest = key
            .strip_prefix(&format!("{}:job:state:", self.prefix))
            .or_else(|| key.strip_prefix(&format!("{}:job:meta:", self.prefix)))?;
        JobId::parse(rest).ok()
    }
}
