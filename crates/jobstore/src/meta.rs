// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job Meta Store: the small, mostly-immutable inputs a
//! stream driver on any instance needs to reconstruct a job, plus the
//! reasoner session triple used by the cancellation path.

use crate::error::JobStoreError;
use fj_core::{now_ms, JobId, ReasonerSession};
use fj_kv::{KeySchema, KvClient};
use std::collections::HashMap;
use std::sync::Arc;

pub struct JobMetaStore {
    kv: Arc<dyn KvClient>,
    keys: KeySchema,
    ttl_secs: u64,
}

impl JobMetaStore {
    pub fn new(kv: Arc<dyn KvClient>, keys: KeySchema, ttl_secs: u64) -> Self {
        Self { kv, keys, ttl_secs }
    }

    pub async fn create(&self, job_id: &JobId, sequence: &str, conversation_id: Option<&str>) -> Result<(), JobStoreError> {
        let key = self.keys.meta(job_id);
        let mut fields = HashMap::from([
            ("sequence".to_string(), sequence.to_string()),
            ("created_at_ms".to_string(), now_ms().to_string()),
        ]);
        if let Some(conversation_id) = conversation_id {
            fields.insert("conversation_id".to_string(), conversation_id.to_string());
        }
        self.kv.set_hash_fields(&key, fields).await?;
        self.kv.expire(&key, self.ttl_secs).await?;
        Ok(())
    }

    /// Falls back to empty-as-none.
    pub async fn get_sequence(&self, job_id: &JobId) -> Result<Option<String>, JobStoreError> {
        let seq = self.kv.hash_field(&self.keys.meta(job_id), "sequence").await?;
        Ok(seq.filter(|s| !s.is_empty()))
    }

    pub async fn get_conversation_id(&self, job_id: &JobId) -> Result<Option<String>, JobStoreError> {
        let id = self.kv.hash_field(&self.keys.meta(job_id), "conversation_id").await?;
        Ok(id.filter(|s| !s.is_empty()))
    }

    pub async fn exists(&self, job_id: &JobId) -> Result<bool, JobStoreError> {
        Ok(self.kv.exists(&self.keys.meta(job_id)).await?)
    }

    pub async fn delete(&self, job_id: &JobId) -> Result<(), JobStoreError> {
        Ok(self.kv.delete(&self.keys.meta(job_id)).await?)
    }

    /// Registers the reasoner session in the dedicated `reasoner` hash.
    pub async fn set_reasoner_session(&self, job_id: &JobId, session: &ReasonerSession) -> Result<(), JobStoreError> {
        let key = self.keys.reasoner(job_id);
        let fields = HashMap::from([
            ("instance".to_string(), session.instance.clone()),
            ("session".to_string(), session.session.clone()),
            ("backend_url".to_string(), session.backend_url.clone()),
        ]);
        self.kv.set_hash_fields(&key, fields).await?;
        self.kv.expire(&key, self.ttl_secs).await?;
        Ok(())
    }

    pub async fn get_reasoner_session(&self, job_id: &JobId) -> Result<Option<ReasonerSession>, JobStoreError> {
        let Some(fields) = self.kv.get_hash(&self.keys.reasoner(job_id)).await? else {
            return Ok(None);
        };
        let (Some(instance), Some(session), Some(backend_url)) =
            (fields.get("instance"), fields.get("session"), fields.get("backend_url"))
        else {
            return Ok(None);
        };
        Ok(Some(ReasonerSession::new(instance.clone(), session.clone(), backend_url.clone())))
    }

    /// Drops the reasoner session record, so a retried or duplicate cancel can't fire a second
    /// interrupt at a session that's already gone.
    pub async fn delete_reasoner_session(&self, job_id: &JobId) -> Result<(), JobStoreError> {
        Ok(self.kv.delete(&self.keys.reasoner(job_id)).await?)
    }

    /// Registers (or overwrites) just the sequence on an
    /// already-`create`d meta record, for the sequence
    /// pre-registration endpoint where a job is known
    /// before its sequence is.
    pub async fn set_sequence(&self, job_id: &JobId, sequence: &str) -> Result<(), JobStoreError> {
        let key = self.keys.meta(job_id);
        self.kv
            .set_hash_fields(&key, HashMap::from([("sequence".to_string(), sequence.to_string())]))
            .await?;
        self.kv.expire(&key, self.ttl_secs).await?;
        Ok(())
    }
}
