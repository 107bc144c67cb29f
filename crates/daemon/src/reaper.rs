// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Background reaper: two SCAN passes, one over state
//! hashes to drop terminal jobs past the stale threshold, one over
//! meta hashes to drop orphans whose state row is already gone. A
//! SCAN-and-sweep shape reused from reconciling live session state
//! against stored records, here reaping terminal state and orphan
//! meta instead.

use fj_core::{now_ms, JobId, Status};
use fj_kv::{KeySchema, KvClient};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

const SCAN_PAGE_SIZE: u32 = 100;

pub struct ReaperConfig {
    pub interval: Duration,
    pub stale_terminal_secs: u64,
    pub orphan_meta_secs: u64,
}

/// Runs the reaper sweep forever on `interval`, never returning. Meant
/// to be `tokio::spawn`ed by the daemon binary alongside the HTTP
/// server; a sweep failure is logged and the loop continues on the
/// next tick rather than killing the task.
pub async fn run(kv: Arc<dyn KvClient>, keys: KeySchema, config: ReaperConfig) {
    let mut ticker = tokio::time::interval(config.interval);
    loop {
        ticker.tick().await;
        let swept = sweep_terminal_state(&kv, &keys, config.stale_terminal_secs).await;
        let orphaned = sweep_orphan_meta(&kv, &keys, config.orphan_meta_secs).await;
        info!(swept, orphaned, "reaper sweep complete");
    }
}

/// Pass 1: SCAN `<prefix>:job:state:*`; delete the
/// state and meta hashes for any job whose status is terminal and
/// whose `updated_at_ms` is older than `stale_terminal_secs`. Events
/// are left to expire under their own TTL. Never touches a
/// non-terminal job regardless of age — only the cancel path may
/// transition a job into `canceled`.
async fn sweep_terminal_state(kv: &Arc<dyn KvClient>, keys: &KeySchema, stale_terminal_secs: u64) -> usize {
    let pattern = keys.state_scan_pattern();
    let state_keys = match kv.scan(&pattern, SCAN_PAGE_SIZE).await {
        Ok(keys) => keys,
        Err(e) => {
            warn!(error = %e, "reaper: state scan failed");
            return 0;
        }
    };

    let now = now_ms();
    let stale_before = now.saturating_sub(stale_terminal_secs * 1000);
    let mut swept = 0usize;

    for key in state_keys {
        let Some(job_id) = keys.job_id_from_key(&key) else {
            continue;
        };
        let fields = match kv.get_hash(&key).await {
            Ok(Some(f)) => f,
            Ok(None) => continue,
            Err(e) => {
                warn!(error = %e, job_id = %job_id, "reaper: failed to read state hash");
                continue;
            }
        };
        let is_terminal = fields
            .get("status")
            .and_then(|s| s.parse::<Status>().ok())
            .map(|s| s.is_terminal())
            .unwrap_or(false);
        let updated_at_ms = fields.get("updated_at_ms").and_then(|v| v.parse::<u64>().ok()).unwrap_or(now);

        if is_terminal && updated_at_ms < stale_before {
            if let Err(e) = delete_job_state_and_meta(kv, keys, &job_id).await {
                warn!(error = %e, job_id = %job_id, "reaper: failed to delete stale terminal job");
                continue;
            }
            debug!(job_id = %job_id, "reaper: swept stale terminal job");
            swept += 1;
        }
    }

    swept
}

async fn delete_job_state_and_meta(kv: &Arc<dyn KvClient>, keys: &KeySchema, job_id: &JobId) -> Result<(), fj_kv::KvError> {
    kv.delete(&keys.state(job_id)).await?;
    kv.delete(&keys.meta(job_id)).await?;
    Ok(())
}

/// Pass 2: SCAN `<prefix>:job:meta:*`; delete any meta
/// hash whose corresponding state hash no longer exists AND whose
/// `created_at_ms` is older than `orphan_meta_secs`. A young orphan
/// (created moments ago) is left alone — the state write for a
/// just-created job may simply not have landed yet.
async fn sweep_orphan_meta(kv: &Arc<dyn KvClient>, keys: &KeySchema, orphan_meta_secs: u64) -> usize {
    let pattern = keys.meta_scan_pattern();
    let meta_keys = match kv.scan(&pattern, SCAN_PAGE_SIZE).await {
        Ok(keys) => keys,
        Err(e) => {
            warn!(error = %e, "reaper: meta scan failed");
            return 0;
        }
    };

    let now = now_ms();
    let stale_before = now.saturating_sub(orphan_meta_secs * 1000);
    let mut orphaned = 0usize;

    for key in meta_keys {
        let Some(job_id) = keys.job_id_from_key(&key) else {
            continue;
        };

        let state_exists = match kv.exists(&keys.state(&job_id)).await {
            Ok(exists) => exists,
            Err(e) => {
                warn!(error = %e, job_id = %job_id, "reaper: failed to check state existence");
                continue;
            }
        };
        if state_exists {
            continue;
        }

        let created_at_ms = match kv.hash_field(&key, "created_at_ms").await {
            Ok(Some(v)) => v.parse::<u64>().unwrap_or(now),
            Ok(None) => now,
            Err(e) => {
                warn!(error = %e, job_id = %job_id, "reaper: failed to read meta created_at_ms");
                continue;
            }
        };

        if created_at_ms < stale_before {
            if let Err(e) = kv.delete(&key).await {
                warn!(error = %e, job_id = %job_id, "reaper: failed to delete orphan meta");
                continue;
            }
            debug!(job_id = %job_id, "reaper: swept orphan meta");
            orphaned += 1;
        }
    }

    orphaned
}

#[cfg(test)]
mod tests {
    use super::*;
    use fj_core::{Job, JobId};
    use fj_kv::FakeKv;
    use fj_jobstore::{JobMetaStore, JobStateStore};
    use std::collections::HashMap;

    fn keys() -> KeySchema {
        KeySchema::new("foldjob")
    }

    #[tokio::test]
    async fn sweeps_stale_terminal_job() {
        let kv: Arc<dyn KvClient> = Arc::new(FakeKv::new());
        let schema = keys();
        let state = JobStateStore::new(kv.clone(), schema.clone(), 86_400);
        let meta = JobMetaStore::new(kv.clone(), schema.clone(), 86_400);

        let job_id = JobId::parse("job_stale1").unwrap();
        let mut job = Job::new(job_id.clone(), "A".repeat(15), None, 0);
        job.status = fj_core::Status::Complete;
        job.updated_at_ms = 0;
        state.create(&job).await.unwrap();
        meta.create(&job_id, "A".repeat(15).as_str(), None).await.unwrap();

        let swept = sweep_terminal_state(&kv, &schema, 1).await;
        assert_eq!(swept, 1);
        assert!(!state.exists(&job_id).await.unwrap());
        assert!(!meta.exists(&job_id).await.unwrap());
    }

    #[tokio::test]
    async fn leaves_non_terminal_job_alone_regardless_of_age() {
        let kv: Arc<dyn KvClient> = Arc::new(FakeKv::new());
        let schema = keys();
        let state = JobStateStore::new(kv.clone(), schema.clone(), 86_400);

        let job_id = JobId::parse("job_running1").unwrap();
        let mut job = Job::new(job_id.clone(), "A".repeat(15), None, 0);
        job.status = fj_core::Status::Running;
        job.updated_at_ms = 0;
        state.create(&job).await.unwrap();

        let swept = sweep_terminal_state(&kv, &schema, 1).await;
        assert_eq!(swept, 0);
        assert!(state.exists(&job_id).await.unwrap());
    }

    #[tokio::test]
    async fn sweeps_orphan_meta_without_state() {
        let kv: Arc<dyn KvClient> = Arc::new(FakeKv::new());
        let schema = keys();
        let meta_key = schema.meta(&JobId::parse("job_orphan1").unwrap());
        kv.set_hash_fields(&meta_key, HashMap::from([("created_at_ms".to_string(), "0".to_string())]))
            .await
            .unwrap();

        let orphaned = sweep_orphan_meta(&kv, &schema, 1).await;
        assert_eq!(orphaned, 1);
        assert!(!kv.exists(&meta_key).await.unwrap());
    }

    #[tokio::test]
    async fn leaves_young_orphan_meta_alone() {
        let kv: Arc<dyn KvClient> = Arc::new(FakeKv::new());
        let schema = keys();
        let meta_key = schema.meta(&JobId::parse("job_orphan2").unwrap());
        kv.set_hash_fields(&meta_key, HashMap::from([("created_at_ms".to_string(), now_ms().to_string())]))
            .await
            .unwrap();

        let orphaned = sweep_orphan_meta(&kv, &schema, 172_800).await;
        assert_eq!(orphaned, 0);
        assert!(kv.exists(&meta_key).await.unwrap());
    }
}
