// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job State Store: progress, stage, and status live
//! here, mutated only by the SSE driver and the cancel path.

use crate::codec::{fields_to_job, job_to_fields};
use crate::error::JobStoreError;
use fj_core::{now_ms, Job, JobId, Stage, Status};
use fj_kv::{CasOutcome, KeySchema, KvClient};
use std::collections::HashMap;
use std::sync::Arc;

pub struct JobStateStore {
    kv: Arc<dyn KvClient>,
    keys: KeySchema,
    ttl_secs: u64,
}

impl JobStateStore {
    pub fn new(kv: Arc<dyn KvClient>, keys: KeySchema, ttl_secs: u64) -> Self {
        Self { kv, keys, ttl_secs }
    }

    pub async fn create(&self, job: &Job) -> Result<(), JobStoreError> {
        let key = self.keys.state(&job.id);
        self.kv.set_hash_fields(&key, job_to_fields(job)).await?;
        self.kv.expire(&key, self.ttl_secs).await?;
        Ok(())
    }

    pub async fn get(&self, id: &JobId) -> Result<Option<Job>, JobStoreError> {
        let key = self.keys.state(id);
        match self.kv.get_hash(&key).await? {
            Some(fields) => Ok(Some(fields_to_job(id, &fields)?)),
            None => Ok(None),
        }
    }

    /// Raw field set, no optimistic-concurrency check. Used for
    /// one-shot writes where the caller already holds exclusivity
    /// (e.g. `create`'s own follow-up corrections).
    pub async fn set(&self, id: &JobId, fields: HashMap<String, String>) -> Result<(), JobStoreError> {
        let key = self.keys.state(id);
        self.kv.set_hash_fields(&key, fields).await?;
        self.kv.expire(&key, self.ttl_secs).await?;
        Ok(())
    }

    pub async fn exists(&self, id: &JobId) -> Result<bool, JobStoreError> {
        Ok(self.kv.exists(&self.keys.state(id)).await?)
    }

    pub async fn delete(&self, id: &JobId) -> Result<(), JobStoreError> {
        Ok(self.kv.delete(&self.keys.state(id)).await?)
    }

    pub async fn is_canceled(&self, id: &JobId) -> Result<bool, JobStoreError> {
        let status = self.kv.hash_field(&self.keys.state(id), "status").await?;
        Ok(status.as_deref() == Some("canceled"))
    }

    /// Versioned update this store's algorithm: WATCH, compare
    /// version, MULTI/EXEC the patch, loop on concurrent modification.
    /// `patch` must not set `version` or `updated_at_ms` — those are
    /// always owned by this call.
    pub async fn cas_update(&self, id: &JobId, expected_version: u64, mut patch: HashMap<String, String>) -> Result<(bool, u64), JobStoreError> {
        if let Some(p) = patch.get("progress").cloned() {
            if let Ok(v) = p.parse::<u8>() {
                patch.insert("progress".to_string(), v.min(100).to_string());
            }
        }
        patch.insert("version".to_string(), (expected_version + 1).to_string());
        patch.insert("updated_at_ms".to_string(), now_ms().to_string());

        let key = self.keys.state(id);
        match self.kv.cas_update(&key, expected_version, patch).await? {
            CasOutcome::Applied { new_version } => {
                self.kv.expire(&key, self.ttl_secs).await?;
                Ok((true, new_version))
            }
            CasOutcome::Conflict { current_version } => Ok((false, current_version)),
            CasOutcome::Missing => Ok((false, 0)),
        }
    }

    /// Retries `cas_update` against the job's live version until it
    /// either applies or the job has vanished. Every state-mutating
    /// helper below (`update_progress`, `update_stage`, `mark_*`)
    /// funnels through this so `version` always increments by exactly
    /// one per successful write.
    async fn apply<F>(&self, id: &JobId, build_patch: F) -> Result<Job, JobStoreError>
    where
        F: Fn() -> HashMap<String, String>,
    {
        loop {
            let job = self.get(id).await?.ok_or_else(|| JobStoreError::NotFound(id.clone()))?;
            let expected = job.version;
            let (applied, current) = self.cas_update(id, expected, build_patch()).await?;
            if applied {
                return self.get(id).await?.ok_or_else(|| JobStoreError::NotFound(id.clone()));
            }
            if current == 0 {
                return Err(JobStoreError::NotFound(id.clone()));
            }
            // lost the race to a concurrent writer; retry with fresh state
        }
    }

    pub async fn update_progress(&self, id: &JobId, n: u8, msg: Option<String>) -> Result<Job, JobStoreError> {
        let n = n.min(100);
        self.apply(id, || {
            let mut f = HashMap::new();
            f.insert("progress".to_string(), n.to_string());
            if let Some(m) = &msg {
                f.insert("message".to_string(), m.clone());
            }
            f
        })
        .await
    }

    pub async fn update_stage(&self, id: &JobId, stage: Stage, status: Option<Status>, msg: Option<String>) -> Result<Job, JobStoreError> {
        self.apply(id, || {
            let mut f = HashMap::new();
            f.insert("stage".to_string(), stage.to_string());
            if let Some(s) = status {
                f.insert("status".to_string(), s.to_string());
            }
            if let Some(m) = &msg {
                f.insert("message".to_string(), m.clone());
            }
            f
        })
        .await
    }

    pub async fn mark_complete(&self, id: &JobId, msg: Option<String>) -> Result<Job, JobStoreError> {
        self.apply(id, || {
            let mut f = HashMap::new();
            f.insert("status".to_string(), Status::Complete.to_string());
            f.insert("stage".to_string(), Stage::Done.to_string());
            f.insert("progress".to_string(), "100".to_string());
            f.insert("completed_at_ms".to_string(), now_ms().to_string());
            if let Some(m) = &msg {
                f.insert("message".to_string(), m.clone());
            }
            f
        })
        .await
    }

    pub async fn mark_failed(&self, id: &JobId, msg: Option<String>) -> Result<Job, JobStoreError> {
        self.apply(id, || {
            let mut f = HashMap::new();
            f.insert("status".to_string(), Status::Failed.to_string());
            f.insert("stage".to_string(), Stage::Error.to_string());
            f.insert("completed_at_ms".to_string(), now_ms().to_string());
            if let Some(m) = &msg {
                f.insert("message".to_string(), m.clone());
            }
            f
        })
        .await
    }

    /// Leaves `stage` untouched.
    pub async fn mark_canceled(&self, id: &JobId, msg: Option<String>) -> Result<Job, JobStoreError> {
        self.apply(id, || {
            let mut f = HashMap::new();
            f.insert("status".to_string(), Status::Canceled.to_string());
            f.insert("completed_at_ms".to_string(), now_ms().to_string());
            if let Some(m) = &msg {
                f.insert("message".to_string(), m.clone());
            }
            f
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fj_core::test_support::sample_job;
    use fj_kv::FakeKv;

    fn store() -> JobStateStore {
        JobStateStore::new(Arc::new(FakeKv::new()), KeySchema::new("foldjob"), 86_400)
    }

    fn job() -> Job {
        sample_job()
    }

    #[tokio::test]
    async fn create_then_get_round_trips() {
        let store = store();
        let job = job();
        store.create(&job).await.unwrap();
        let fetched = store.get(&job.id).await.unwrap().unwrap();
        assert_eq!(fetched.sequence, job.sequence);
        assert_eq!(fetched.version, 1);
    }

    #[tokio::test]
    async fn update_progress_clamps_and_bumps_version() {
        let store = store();
        let job = job();
        store.create(&job).await.unwrap();
        let updated = store.update_progress(&job.id, 250, None).await.unwrap();
        assert_eq!(updated.progress, 100);
        assert_eq!(updated.version, 2);
    }

    #[tokio::test]
    async fn mark_canceled_leaves_stage_untouched() {
        let store = store();
        let job = job();
        store.create(&job).await.unwrap();
        store.update_stage(&job.id, Stage::Msa, Some(Status::Running), None).await.unwrap();
        let canceled = store.mark_canceled(&job.id, Some("user requested".into())).await.unwrap();
        assert_eq!(canceled.status, Status::Canceled);
        assert_eq!(canceled.stage, Stage::Msa);
    }

    #[tokio::test]
    async fn mark_complete_sets_terminal_fields() {
        let store = store();
        let job = job();
        store.create(&job).await.unwrap();
        let done = store.mark_complete(&job.id, None).await.unwrap();
        assert_eq!(done.status, Status::Complete);
        assert_eq!(done.stage, Stage::Done);
        assert_eq!(done.progress, 100);
        assert!(done.completed_at_ms.is_some());
    }

    #[tokio::test]
    async fn cas_update_against_stale_version_fails_without_mutating() {
        let store = store();
        let job = job();
        store.create(&job).await.unwrap();
        let (applied, current) = store
            .cas_update(&job.id, 0, HashMap::from([("progress".to_string(), "50".to_string())]))
            .await
            .unwrap();
        assert!(!applied);
        assert_eq!(current, 1);
        let untouched = store.get(&job.id).await.unwrap().unwrap();
        assert_eq!(untouched.progress, 0);
    }
}
