// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Wire shapes for the HTTP/SSE surface. Kept separate from
//! `fj-core`'s domain types so the internal `snake_case` field names
//! never leak into the camelCase JSON the API speaks.

use fj_core::{Event, Job, Stage, Status, StructureArtifact};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateJobRequest {
    pub sequence: Option<String>,
    pub fasta_content: Option<String>,
    pub conversation_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateJobResponse {
    pub job_id: String,
    pub job: JobDto,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetSequenceRequest {
    #[serde(default)]
    pub job_id: Option<String>,
    pub sequence: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SetSequenceResponse {
    pub job_id: String,
    pub sequence: String,
}

#[derive(Debug, Deserialize, Default)]
pub struct StreamQuery {
    pub sequence: Option<String>,
    pub mock: Option<bool>,
}

#[derive(Debug, Deserialize, Default)]
pub struct ReplayQuery {
    pub offset: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelResponse {
    pub ok: bool,
    pub job_id: String,
    pub status: Status,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplayResponse {
    pub job_id: String,
    pub count: usize,
    pub total: i64,
    pub offset: i64,
    pub events: Vec<EventDto>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StateResponse {
    pub job_id: String,
    pub state: JobStateDto,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobStateDto {
    pub status: Status,
    pub stage: Stage,
    pub progress: u8,
    pub message: Option<String>,
    pub updated_at: u64,
    pub version: u64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobDto {
    pub job_id: String,
    pub sequence: String,
    pub conversation_id: Option<String>,
    pub status: Status,
    pub stage: Stage,
    pub progress: u8,
    pub message: Option<String>,
    pub created_at: u64,
    pub completed_at: Option<u64>,
    pub updated_at: u64,
    pub version: u64,
}

impl From<&Job> for JobDto {
    fn from(job: &Job) -> Self {
        Self {
            job_id: job.id.as_str().to_string(),
            sequence: job.sequence.clone(),
            conversation_id: job.conversation_id.clone(),
            status: job.status,
            stage: job.stage,
            progress: job.progress,
            message: job.message.clone(),
            created_at: job.created_at_ms,
            completed_at: job.completed_at_ms,
            updated_at: job.updated_at_ms,
            version: job.version,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDto {
    pub event_id: String,
    pub job_id: String,
    pub seq: u32,
    pub ts: u64,
    pub event_type: fj_core::EventType,
    pub stage: Stage,
    pub status: Status,
    pub progress: u8,
    pub message: Option<String>,
    pub block_index: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artifacts: Option<Vec<StructureArtifactDto>>,
}

impl From<&Event> for EventDto {
    fn from(event: &Event) -> Self {
        Self {
            event_id: event.event_id.as_str().to_string(),
            job_id: event.job_id.as_str().to_string(),
            seq: event.seq,
            ts: event.ts_ms,
            event_type: event.event_type,
            stage: event.stage,
            status: event.status,
            progress: event.progress,
            message: event.message.clone(),
            block_index: event.block_index,
            artifacts: event.artifacts.as_ref().map(|a| a.iter().map(StructureArtifactDto::from).collect()),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StructureArtifactDto {
    pub structure_id: String,
    pub label: String,
    pub filename: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inline_pdb_data: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    pub created_at: u64,
    pub cot: String,
}

impl From<&StructureArtifact> for StructureArtifactDto {
    fn from(artifact: &StructureArtifact) -> Self {
        Self {
            structure_id: artifact.structure_id.as_str().to_string(),
            label: artifact.label.clone(),
            filename: artifact.filename.clone(),
            inline_pdb_data: artifact.inline_pdb_data.clone(),
            path: artifact.path.clone(),
            created_at: artifact.created_at_ms,
            cot: artifact.cot.clone(),
        }
    }
}
