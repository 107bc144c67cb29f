// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Conversion between `Job` and the flat string-keyed hash the KV
//! store persists. Kept separate from `state.rs` so the wire layout is
//! reviewable on its own.

use crate::error::JobStoreError;
use fj_core::{Job, JobId, ReasonerSession, Stage, Status};
use std::collections::HashMap;
use std::str::FromStr;

pub fn job_to_fields(job: &Job) -> HashMap<String, String> {
    let mut fields = HashMap::new();
    fields.insert("id".to_string(), job.id.to_string());
    fields.insert("sequence".to_string(), job.sequence.clone());
    fields.insert("status".to_string(), job.status.to_string());
    fields.insert("stage".to_string(), job.stage.to_string());
    fields.insert("progress".to_string(), job.progress.to_string());
    fields.insert("created_at_ms".to_string(), job.created_at_ms.to_string());
    fields.insert("updated_at_ms".to_string(), job.updated_at_ms.to_string());
    fields.insert("version".to_string(), job.version.to_string());
    if let Some(conversation_id) = &job.conversation_id {
        fields.insert("conversation_id".to_string(), conversation_id.clone());
    }
    if let Some(message) = &job.message {
        fields.insert("message".to_string(), message.clone());
    }
    if let Some(completed_at_ms) = job.completed_at_ms {
        fields.insert("completed_at_ms".to_string(), completed_at_ms.to_string());
    }
    if let Some(session) = &job.reasoner_session {
        if let Ok(json) = serde_json::to_string(session) {
            fields.insert("reasoner_session".to_string(), json);
        }
    }
    fields
}

pub fn fields_to_job(job_id: &JobId, fields: &HashMap<String, String>) -> Result<Job, JobStoreError> {
    let malformed = |reason: &str| JobStoreError::Malformed {
        job_id: job_id.clone(),
        reason: reason.to_string(),
    };

    let sequence = fields.get("sequence").ok_or_else(|| malformed("missing sequence"))?.clone();
    let status = fields
        .get("status")
        .ok_or_else(|| malformed("missing status"))
        .and_then(|s| Status::from_str(s).map_err(|e| malformed(&e)))?;
    let stage = fields
        .get("stage")
        .ok_or_else(|| malformed("missing stage"))
        .and_then(|s| Stage::from_str(s).map_err(|e| malformed(&e)))?;
    let progress = fields
        .get("progress")
        .and_then(|p| p.parse::<u8>().ok())
        .ok_or_else(|| malformed("missing or invalid progress"))?;
    let created_at_ms = fields
        .get("created_at_ms")
        .and_then(|v| v.parse::<u64>().ok())
        .ok_or_else(|| malformed("missing or invalid created_at_ms"))?;
    let updated_at_ms = fields
        .get("updated_at_ms")
        .and_then(|v| v.parse::<u64>().ok())
        .ok_or_else(|| malformed("missing or invalid updated_at_ms"))?;
    let version = fields
        .get("version")
        .and_then(|v| v.parse::<u64>().ok())
        .ok_or_else(|| malformed("missing or invalid version"))?;
    let completed_at_ms = fields.get("completed_at_ms").and_then(|v| v.parse::<u64>().ok());
    let conversation_id = fields.get("conversation_id").cloned();
    let message = fields.get("message").cloned();
    let reasoner_session = fields
        .get("reasoner_session")
        .and_then(|json| serde_json::from_str::<ReasonerSession>(json).ok());

    Ok(Job {
        id: job_id.clone(),
        sequence,
        conversation_id,
        status,
        stage,
        progress,
        message,
        created_at_ms,
        completed_at_ms,
        updated_at_ms,
        version,
        reasoner_session,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_fields() {
        let job = Job::new(JobId::parse("job_abc123").unwrap(), "A".repeat(15), Some("conv_1".into()), 1000);
        let fields = job_to_fields(&job);
        let restored = fields_to_job(&job.id, &fields).unwrap();
        assert_eq!(restored.sequence, job.sequence);
        assert_eq!(restored.status, job.status);
        assert_eq!(restored.version, job.version);
        assert_eq!(restored.conversation_id, job.conversation_id);
    }
}
