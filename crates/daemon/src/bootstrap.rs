// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Wires `Config` into the concrete adapters (`RedisKv` or `FakeKv`,
//! `HttpReasoner` or `MockReasoner`) and the stores built on top of
//! them, producing the one `fj_web::AppState` the router closes over.
//! Startup wiring follows the usual config -> adapters -> runtime
//! order.

use crate::config::Config;
use anyhow::Context;
use fj_jobstore::{JobMetaStore, JobStateStore};
use fj_kv::{KeySchema, KvClient, RedisKv};
use fj_queue::EventQueue;
use fj_reasoner::{HttpReasoner, MockReasoner, ReasonerClient};
use fj_web::AppState;
use std::sync::Arc;

/// Compiled-in default sequence, used when the stream endpoint has no
/// sequence anywhere in its precedence chain. A real, validation-passing
/// sequence (myoglobin), useful for local smoke-testing.
const DEFAULT_SEQUENCE: &str = "MVLSPADKTNVKAAWGKVGAHAGEYGAEALERMFLSFPTTKTYFPHFDLSH";

/// Builds the application's dependency container plus the raw
/// `KvClient` handle the daemon binary also needs for the reaper task
/// (the reaper talks to shared state directly via `KeySchema`, not
/// through the job stores).
pub async fn build_app_state(config: &Config) -> anyhow::Result<(AppState, Arc<dyn KvClient>)> {
    let kv: Arc<dyn KvClient> = Arc::new(
        RedisKv::connect(&config.redis_url, config.redis_connect_timeout)
            .await
            .context("connecting to shared KV store")?,
    );
    let keys = KeySchema::new(config.key_prefix.clone());

    let state_store = Arc::new(JobStateStore::new(kv.clone(), keys.clone(), config.state_ttl_secs));
    let meta_store = Arc::new(JobMetaStore::new(kv.clone(), keys.clone(), config.state_ttl_secs));
    let queue = Arc::new(EventQueue::new(kv.clone(), keys, config.max_events_per_job));

    let reasoner: Arc<dyn ReasonerClient> = if config.use_mock_reasoner {
        Arc::new(build_mock_reasoner(config)?)
    } else {
        Arc::new(
            HttpReasoner::new(config.reasoner_base_url.clone(), config.reasoner_connect_timeout, config.reasoner_timeout)
                .context("constructing reasoner HTTP client")?,
        )
    };

    let instance_id = uuid::Uuid::new_v4().to_string();

    let app_state = AppState::new(
        state_store,
        meta_store,
        queue,
        reasoner,
        instance_id,
        DEFAULT_SEQUENCE,
        config.state_ttl_secs,
        config.events_ttl_secs,
        config.use_mock_reasoner,
    );

    Ok((app_state, kv))
}

fn build_mock_reasoner(config: &Config) -> anyhow::Result<MockReasoner> {
    match &config.mock_data_file {
        Some(path) => MockReasoner::from_file(path, config.mock_delay_min, config.mock_delay_max, config.mock_delay_mode)
            .with_context(|| format!("loading mock reasoner data from {}", path.display())),
        None => Ok(MockReasoner::bundled_default(config.mock_delay_min, config.mock_delay_max, config.mock_delay_mode)),
    }
}
