// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Redis-backed `KvClient`.

use crate::client::{CasOutcome, KvClient};
use crate::error::KvError;
use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;
use tracing::warn;

/// Attempts before a command (or a whole `cas_update` round) gives up
/// and surfaces the failure as a `TransientStoreError` to the caller.
const MAX_ATTEMPTS: u32 = 4;
const INITIAL_BACKOFF: Duration = Duration::from_millis(50);
const MAX_BACKOFF: Duration = Duration::from_secs(2);

/// Runs `f` up to [`MAX_ATTEMPTS`] times, doubling the delay between
/// attempts up to [`MAX_BACKOFF`], the same bounded-exponential shape
/// the pack's lone Redis worker uses for its own reconnect loop.
async fn with_retry<T, F, Fut>(op: &'static str, mut f: F) -> Result<T, KvError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, KvError>>,
{
    let mut delay = INITIAL_BACKOFF;
    let mut attempt = 0u32;
    loop {
        match f().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                attempt += 1;
                if attempt >= MAX_ATTEMPTS {
                    return Err(err);
                }
                warn!(op, attempt, %err, delay_ms = delay.as_millis() as u64, "kv command failed, retrying after backoff");
                tokio::time::sleep(delay).await;
                delay = (delay * 2).min(MAX_BACKOFF);
            }
        }
    }
}

/// Connects once at startup and reconnects transparently on transport
/// failure for the multiplexed command path; `client` is kept
/// alongside it so `cas_update` can open a dedicated, non-multiplexed
/// connection per call instead of sharing the multiplexed one.
pub struct RedisKv {
    client: redis::Client,
    manager: ConnectionManager,
}

impl RedisKv {
    /// Connect with a short deadline on both the TCP connect and the
    /// first command, reconnecting with backoff on failure the way the
    /// pack's lone Redis worker does for its long-lived stream
    /// connection.
    pub async fn connect(url: &str, connect_timeout: Duration) -> Result<Self, KvError> {
        let client = redis::Client::open(url).map_err(KvError::from)?;
        let manager = tokio::time::timeout(connect_timeout, client.get_connection_manager())
            .await
            .map_err(|_| KvError::Connection(format!("timed out connecting to {url}")))?
            .map_err(KvError::from)?;
        Ok(Self { client, manager })
    }
}

#[async_trait]
impl KvClient for RedisKv {
    async fn get_hash(&self, key: &str) -> Result<Option<HashMap<String, String>>, KvError> {
        let map: HashMap<String, String> = with_retry("get_hash", || async {
            let mut conn = self.manager.clone();
            Ok(conn.hgetall(key).await?)
        })
        .await?;
        Ok(if map.is_empty() { None } else { Some(map) })
    }

    async fn hash_field(&self, key: &str, field: &str) -> Result<Option<String>, KvError> {
        with_retry("hash_field", || async {
            let mut conn = self.manager.clone();
            Ok(conn.hget(key, field).await?)
        })
        .await
    }

    async fn set_hash_fields(&self, key: &str, fields: HashMap<String, String>) -> Result<(), KvError> {
        let pairs: Vec<(String, String)> = fields.into_iter().collect();
        with_retry("set_hash_fields", || async {
            let mut conn = self.manager.clone();
            let _: () = conn.hset_multiple(key, &pairs).await?;
            Ok(())
        })
        .await
    }

    /// Runs WATCH/read/MULTI-pipe/EXEC over a fresh, dedicated
    /// connection opened for this call alone. `ConnectionManager` is a
    /// multiplexed connection: WATCH's dirty-key tracking is
    /// server-side state on one physical connection, and interleaving
    /// another caller's commands between this call's WATCH and EXEC
    /// would let one caller's EXEC resolve against another's WATCH set.
    /// A dedicated connection per call avoids that entirely.
    async fn cas_update(&self, key: &str, expected_version: u64, patch: HashMap<String, String>) -> Result<CasOutcome, KvError> {
        with_retry("cas_update", || async {
            let mut conn = self.client.get_async_connection().await?;

            redis::cmd("WATCH").arg(key).query_async::<_, ()>(&mut conn).await?;

            let current: HashMap<String, String> = conn.hgetall(key).await?;
            let Some(current_version) = current.get("version").and_then(|v| v.parse::<u64>().ok()) else {
                redis::cmd("UNWATCH").query_async::<_, ()>(&mut conn).await?;
                return Ok(CasOutcome::Missing);
            };
            if current_version != expected_version {
                redis::cmd("UNWATCH").query_async::<_, ()>(&mut conn).await?;
                return Ok(CasOutcome::Conflict { current_version });
            }

            let mut pipe = redis::pipe();
            pipe.atomic();
            for (field, value) in &patch {
                pipe.hset(key, field, value);
            }
            let result: Option<Vec<i64>> = pipe.query_async(&mut conn).await?;
            match result {
                Some(_) => Ok(CasOutcome::Applied {
                    new_version: expected_version + 1,
                }),
                None => {
                    warn!(key, "cas_update EXEC aborted by concurrent writer");
                    Ok(CasOutcome::Conflict { current_version })
                }
            }
        })
        .await
    }

    async fn expire(&self, key: &str, ttl_secs: u64) -> Result<(), KvError> {
        with_retry("expire", || async {
            let mut conn = self.manager.clone();
            let _: () = conn.expire(key, ttl_secs as i64).await?;
            Ok(())
        })
        .await
    }

    async fn exists(&self, key: &str) -> Result<bool, KvError> {
        with_retry("exists", || async {
            let mut conn = self.manager.clone();
            Ok(conn.exists(key).await?)
        })
        .await
    }

    async fn delete(&self, key: &str) -> Result<(), KvError> {
        with_retry("delete", || async {
            let mut conn = self.manager.clone();
            let _: () = conn.del(key).await?;
            Ok(())
        })
        .await
    }

    async fn list_push(&self, key: &str, value: String) -> Result<i64, KvError> {
        with_retry("list_push", || async {
            let mut conn = self.manager.clone();
            Ok(conn.rpush(key, value.clone()).await?)
        })
        .await
    }

    async fn list_range(&self, key: &str, start: i64, stop: i64) -> Result<Vec<String>, KvError> {
        with_retry("list_range", || async {
            let mut conn = self.manager.clone();
            Ok(conn.lrange(key, start as isize, stop as isize).await?)
        })
        .await
    }

    async fn list_len(&self, key: &str) -> Result<i64, KvError> {
        with_retry("list_len", || async {
            let mut conn = self.manager.clone();
            Ok(conn.llen(key).await?)
        })
        .await
    }

    async fn list_trim_front(&self, key: &str, max_len: i64) -> Result<(), KvError> {
        with_retry("list_trim_front", || async {
            let mut conn = self.manager.clone();
            let _: () = conn.ltrim(key, -max_len, -1).await?;
            Ok(())
        })
        .await
    }

    async fn scan(&self, pattern: &str, page_size: u32) -> Result<Vec<String>, KvError> {
        with_retry("scan", || async {
            let mut conn = self.manager.clone();
            let mut cursor: u64 = 0;
            let mut out = Vec::new();
            loop {
                let (next, batch): (u64, Vec<String>) = redis::cmd("SCAN")
                    .arg(cursor)
                    .arg("MATCH")
                    .arg(pattern)
                    .arg("COUNT")
                    .arg(page_size)
                    .query_async(&mut conn)
                    .await?;
                out.extend(batch);
                if next == 0 {
                    break;
                }
                cursor = next;
            }
            Ok(out)
        })
        .await
    }
}
