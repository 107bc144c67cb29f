// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The `KvClient` abstraction every store (`fj-jobstore`, `fj-queue`)
//! builds on, so they're agnostic to whether they're talking to Redis
//! or the in-memory fake used in tests.

use crate::error::KvError;
use async_trait::async_trait;
use std::collections::HashMap;

/// Outcome of a `cas_update` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CasOutcome {
    /// The patch was applied; the hash's `version` field is now this.
    Applied { new_version: u64 },
    /// `expected_version` didn't match; the caller should re-read and
    /// retry with the version reported here.
    Conflict { current_version: u64 },
    /// The hash doesn't exist at all.
    Missing,
}

/// Backend-agnostic KV operations, scoped to exactly what the job
/// state store, job meta store, and event queue need: hashes, a
/// bounded list, TTL management, and a cursor-based scan for the
/// reaper.
#[async_trait]
pub trait KvClient: Send + Sync {
    async fn get_hash(&self, key: &str) -> Result<Option<HashMap<String, String>>, KvError>;

    async fn hash_field(&self, key: &str, field: &str) -> Result<Option<String>, KvError>;

    /// HSET every field in `fields`, creating the hash if absent.
    async fn set_hash_fields(&self, key: &str, fields: HashMap<String, String>) -> Result<(), KvError>;

    /// Optimistic-concurrency update: WATCH the key,
    /// compare the hash's `version` field to `expected_version`, and
    /// only apply `patch` (which must itself set `version`) inside a
    /// MULTI/EXEC if they still match.
    async fn cas_update(&self, key: &str, expected_version: u64, patch: HashMap<String, String>) -> Result<CasOutcome, KvError>;

    async fn expire(&self, key: &str, ttl_secs: u64) -> Result<(), KvError>;

    async fn exists(&self, key: &str) -> Result<bool, KvError>;

    async fn delete(&self, key: &str) -> Result<(), KvError>;

    /// RPUSH; returns the list's length after the push.
    async fn list_push(&self, key: &str, value: String) -> Result<i64, KvError>;

    /// LRANGE with Redis's inclusive, possibly-negative index semantics.
    async fn list_range(&self, key: &str, start: i64, stop: i64) -> Result<Vec<String>, KvError>;

    async fn list_len(&self, key: &str) -> Result<i64, KvError>;

    /// LTRIM to keep only the most recent `max_len` entries, dropping
    /// from the head (oldest first).
    async fn list_trim_front(&self, key: &str, max_len: i64) -> Result<(), KvError>;

    /// Collect every key matching `pattern` (a Redis glob). Used only
    /// by the reaper, which runs on a slow interval over a bounded
    /// keyspace, so returning the full match set rather than a lazy
    /// cursor stream is acceptable here.
    async fn scan(&self, pattern: &str, page_size: u32) -> Result<Vec<String>, KvError>;
}
