// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory `KvClient` used by every other crate's test suite, so
//! the store/queue/segmentation engine logic can be exercised without
//! a running Redis.

use crate::client::{CasOutcome, KvClient};
use crate::error::KvError;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};

#[derive(Default)]
struct Store {
    hashes: HashMap<String, HashMap<String, String>>,
    lists: HashMap<String, VecDeque<String>>,
    /// Recorded but not enforced — the fake has no clock of its own,
    /// so TTL expiry is a no-op; tests that care about TTL assert on
    /// the recorded value directly.
    ttls: HashMap<String, u64>,
}

pub struct FakeKv {
    store: Mutex<Store>,
}

impl FakeKv {
    pub fn new() -> Self {
        Self { store: Mutex::new(Store::default()) }
    }

    /// Test helper: read back the TTL most recently set on `key`, if any.
    pub fn ttl_of(&self, key: &str) -> Option<u64> {
        self.store.lock().ttls.get(key).copied()
    }
}

impl Default for FakeKv {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl KvClient for FakeKv {
    async fn get_hash(&self, key: &str) -> Result<Option<HashMap<String, String>>, KvError> {
        Ok(self.store.lock().hashes.get(key).cloned())
    }

    async fn hash_field(&self, key: &str, field: &str) -> Result<Option<String>, KvError> {
        Ok(self.store.lock().hashes.get(key).and_then(|h| h.get(field).cloned()))
    }

    async fn set_hash_fields(&self, key: &str, fields: HashMap<String, String>) -> Result<(), KvError> {
        self.store.lock().hashes.entry(key.to_string()).or_default().extend(fields);
        Ok(())
    }

    async fn cas_update(&self, key: &str, expected_version: u64, patch: HashMap<String, String>) -> Result<CasOutcome, KvError> {
        let mut store = self.store.lock();
        let Some(hash) = store.hashes.get(key) else {
            return Ok(CasOutcome::Missing);
        };
        let current_version = hash.get("version").and_then(|v| v.parse::<u64>().ok()).unwrap_or(0);
        if current_version != expected_version {
            return Ok(CasOutcome::Conflict { current_version });
        }
        let hash = store.hashes.get_mut(key).expect("checked above");
        hash.extend(patch);
        Ok(CasOutcome::Applied { new_version: expected_version + 1 })
    }

    async fn expire(&self, key: &str, ttl_secs: u64) -> Result<(), KvError> {
        self.store.lock().ttls.insert(key.to_string(), ttl_secs);
        Ok(())
    }

    async fn exists(&self, key: &str) -> Result<bool, KvError> {
        let store = self.store.lock();
        Ok(store.hashes.contains_key(key) || store.lists.contains_key(key))
    }

    async fn delete(&self, key: &str) -> Result<(), KvError> {
        let mut store = self.store.lock();
        store.hashes.remove(key);
        store.lists.remove(key);
        store.ttls.remove(key);
        Ok(())
    }

    async fn list_push(&self, key: &str, value: String) -> Result<i64, KvError> {
        let mut store = self.store.lock();
        let list = store.lists.entry(key.to_string()).or_default();
        list.push_back(value);
        Ok(list.len() as i64)
    }

    async fn list_range(&self, key: &str, start: i64, stop: i64) -> Result<Vec<String>, KvError> {
        let store = self.store.lock();
        let Some(list) = store.lists.get(key) else {
            return Ok(Vec::new());
        };
        let len = list.len() as i64;
        let norm = |idx: i64| -> i64 {
            if idx < 0 {
                (len + idx).max(0)
            } else {
                idx.min(len)
            }
        };
        let start = norm(start);
        let stop = norm(stop) + 1;
        if start >= stop || start >= len {
            return Ok(Vec::new());
        }
        Ok(list.iter().skip(start as usize).take((stop - start) as usize).cloned().collect())
    }

    async fn list_len(&self, key: &str) -> Result<i64, KvError> {
        Ok(self.store.lock().lists.get(key).map(|l| l.len() as i64).unwrap_or(0))
    }

    async fn list_trim_front(&self, key: &str, max_len: i64) -> Result<(), KvError> {
        let mut store = self.store.lock();
        if let Some(list) = store.lists.get_mut(key) {
            while list.len() as i64 > max_len {
                list.pop_front();
            }
        }
        Ok(())
    }

    async fn scan(&self, pattern: &str, _page_size: u32) -> Result<Vec<String>, KvError> {
        let prefix = pattern.trim_end_matches('*');
        let store = self.store.lock();
        Ok(store
            .hashes
            .keys()
            .chain(store.lists.keys())
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn cas_update_rejects_stale_version() {
        let kv = FakeKv::new();
        kv.set_hash_fields("k", HashMap::from([("version".into(), "1".into())])).await.unwrap();
        let outcome = kv
            .cas_update("k", 0, HashMap::from([("version".into(), "1".into())]))
            .await
            .unwrap();
        assert_eq!(outcome, CasOutcome::Conflict { current_version: 1 });
    }

    #[tokio::test]
    async fn cas_update_applies_matching_version() {
        let kv = FakeKv::new();
        kv.set_hash_fields("k", HashMap::from([("version".into(), "1".into())])).await.unwrap();
        let outcome = kv
            .cas_update("k", 1, HashMap::from([("version".into(), "2".into()), ("progress".into(), "50".into())]))
            .await
            .unwrap();
        assert_eq!(outcome, CasOutcome::Applied { new_version: 2 });
        assert_eq!(kv.hash_field("k", "progress").await.unwrap(), Some("50".into()));
    }

    #[tokio::test]
    async fn list_trim_front_keeps_most_recent() {
        let kv = FakeKv::new();
        for i in 0..5 {
            kv.list_push("q", i.to_string()).await.unwrap();
        }
        kv.list_trim_front("q", 3).await.unwrap();
        assert_eq!(kv.list_range("q", 0, -1).await.unwrap(), vec!["2", "3", "4"]);
    }

    #[tokio::test]
    async fn scan_matches_prefix() {
        let kv = FakeKv::new();
        kv.set_hash_fields("foldjob:job:state:job_a", HashMap::new()).await.unwrap();
        kv.set_hash_fields("foldjob:job:meta:job_a", HashMap::new()).await.unwrap();
        let matches = kv.scan("foldjob:job:state:*", 100).await.unwrap();
        assert_eq!(matches, vec!["foldjob:job:state:job_a".to_string()]);
    }
}
