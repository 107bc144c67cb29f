// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Event Queue: the bounded, replayable list each job's
//! events live in.

mod error;

pub use error::QueueError;

use fj_core::{Event, JobId};
use fj_kv::{KeySchema, KvClient};
use std::sync::Arc;
use tracing::warn;

/// Default bound on events retained per job; oldest events are
/// trimmed once a push exceeds it.
pub const DEFAULT_QUEUE_BOUND: i64 = 1000;

pub struct EventQueue {
    kv: Arc<dyn KvClient>,
    keys: KeySchema,
    bound: i64,
}

impl EventQueue {
    pub fn new(kv: Arc<dyn KvClient>, keys: KeySchema, bound: i64) -> Self {
        Self { kv, keys, bound }
    }

    /// Append, refresh TTL, then trim — in that order, so the event
    /// just appended is never the one a same-call trim discards.
    pub async fn push(&self, event: &Event, ttl_secs: u64) -> Result<i64, QueueError> {
        let raw = serde_json::to_string(event)?;
        self.push_raw(&event.job_id, raw, ttl_secs).await
    }

    pub async fn push_raw(&self, job_id: &JobId, raw: String, ttl_secs: u64) -> Result<i64, QueueError> {
        let key = self.keys.events(job_id);
        let len = self.kv.list_push(&key, raw).await?;
        self.kv.expire(&key, ttl_secs).await?;
        self.kv.list_trim_front(&key, self.bound).await?;
        Ok(len.min(self.bound))
    }

    /// Inclusive range with Redis's negative-index convention.
    pub async fn range(&self, job_id: &JobId, start: i64, stop: i64) -> Result<Vec<Event>, QueueError> {
        let raw = self.kv.list_range(&self.keys.events(job_id), start, stop).await?;
        Ok(raw
            .into_iter()
            .filter_map(|entry| match serde_json::from_str::<Event>(&entry) {
                Ok(event) => Some(event),
                Err(err) => {
                    warn!(%err, "dropping unparsable queue entry during range read");
                    None
                }
            })
            .collect())
    }

    /// `from_offset(n)` is `range(n, -1)`: every event from sequence
    /// `n` onward, regardless of which instance produced them.
    pub async fn from_offset(&self, job_id: &JobId, offset: i64) -> Result<Vec<Event>, QueueError> {
        self.range(job_id, offset, -1).await
    }

    pub async fn count(&self, job_id: &JobId) -> Result<i64, QueueError> {
        Ok(self.kv.list_len(&self.keys.events(job_id)).await?)
    }

    pub async fn latest(&self, job_id: &JobId) -> Result<Option<Event>, QueueError> {
        Ok(self.range(job_id, -1, -1).await?.into_iter().next())
    }

    pub async fn delete(&self, job_id: &JobId) -> Result<(), QueueError> {
        Ok(self.kv.delete(&self.keys.events(job_id)).await?)
    }

    pub async fn refresh_ttl(&self, job_id: &JobId, ttl_secs: u64) -> Result<(), QueueError> {
        Ok(self.kv.expire(&self.keys.events(job_id), ttl_secs).await?)
    }

    /// Called once a job reaches a terminal status, so disconnected
    /// clients keep a short replay window instead of the queue
    /// vanishing the instant the stream driver exits.
    pub async fn set_completion_ttl(&self, job_id: &JobId, ttl_secs: u64) -> Result<(), QueueError> {
        self.refresh_ttl(job_id, ttl_secs).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fj_core::test_support::{sample_event, sample_job_id};
    use fj_kv::FakeKv;

    fn queue(bound: i64) -> EventQueue {
        EventQueue::new(Arc::new(FakeKv::new()), KeySchema::new("foldjob"), bound)
    }

    #[tokio::test]
    async fn push_then_range_round_trips() {
        let q = queue(DEFAULT_QUEUE_BOUND);
        let job_id = sample_job_id();
        q.push(&sample_event(&job_id, 1), 86_400).await.unwrap();
        q.push(&sample_event(&job_id, 2), 86_400).await.unwrap();
        let events = q.range(&job_id, 0, -1).await.unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].seq, 1);
        assert_eq!(events[1].seq, 2);
    }

    #[tokio::test]
    async fn trims_to_bound_keeping_newest() {
        let q = queue(3);
        let job_id = sample_job_id();
        for seq in 1..=5 {
            q.push(&sample_event(&job_id, seq), 86_400).await.unwrap();
        }
        let events = q.range(&job_id, 0, -1).await.unwrap();
        let seqs: Vec<u32> = events.iter().map(|e| e.seq).collect();
        assert_eq!(seqs, vec![3, 4, 5]);
    }

    #[tokio::test]
    async fn from_offset_returns_suffix() {
        let q = queue(DEFAULT_QUEUE_BOUND);
        let job_id = sample_job_id();
        for seq in 1..=4 {
            q.push(&sample_event(&job_id, seq), 86_400).await.unwrap();
        }
        let events = q.from_offset(&job_id, 2).await.unwrap();
        let seqs: Vec<u32> = events.iter().map(|e| e.seq).collect();
        assert_eq!(seqs, vec![3, 4]);
    }

    #[tokio::test]
    async fn latest_returns_last_pushed() {
        let q = queue(DEFAULT_QUEUE_BOUND);
        let job_id = sample_job_id();
        q.push(&sample_event(&job_id, 1), 86_400).await.unwrap();
        q.push(&sample_event(&job_id, 2), 86_400).await.unwrap();
        assert_eq!(q.latest(&job_id).await.unwrap().unwrap().seq, 2);
    }
}
