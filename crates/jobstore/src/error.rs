// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use fj_core::JobId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum JobStoreError {
    #[error("kv error: {0}")]
    Kv(#[from] fj_kv::KvError),

    #[error("job {0} not found")]
    NotFound(JobId),

    #[error("malformed state record for job {job_id}: {reason}")]
    Malformed { job_id: JobId, reason: String },

    #[error("cas conflict on job {job_id}: expected version {expected}, found {found}")]
    CasConflict { job_id: JobId, expected: u64, found: u64 },
}
