// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Every `FOLDJOB_*` environment variable collected into one struct
//! loaded once at process start, using a plain-`env::var` pattern.

use fj_reasoner::DelayMode;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub redis_url: String,
    pub redis_socket_timeout: Duration,
    pub redis_connect_timeout: Duration,
    pub key_prefix: String,
    pub state_ttl_secs: u64,
    pub events_ttl_secs: u64,
    pub max_events_per_job: i64,
    pub stale_terminal_secs: u64,
    pub orphan_meta_secs: u64,
    pub reaper_interval_secs: u64,
    pub reasoner_base_url: String,
    pub reasoner_timeout: Duration,
    pub reasoner_connect_timeout: Duration,
    pub reasoner_interrupt_timeout: Duration,
    pub use_mock_reasoner: bool,
    pub mock_delay_min: Duration,
    pub mock_delay_max: Duration,
    pub mock_delay_mode: DelayMode,
    pub mock_data_file: Option<PathBuf>,
    pub bind_host: String,
    pub bind_port: u16,
    pub cors_origins: Vec<String>,
}

impl Config {
    pub fn load() -> Self {
        Self {
            redis_url: env_string("FOLDJOB_REDIS_URL", "redis://127.0.0.1:6379/0"),
            redis_socket_timeout: Duration::from_millis(env_u64("FOLDJOB_REDIS_SOCKET_TIMEOUT_MS", 2_000)),
            redis_connect_timeout: Duration::from_millis(env_u64("FOLDJOB_REDIS_CONNECT_TIMEOUT_MS", 2_000)),
            key_prefix: env_string("FOLDJOB_KEY_PREFIX", "foldjob"),
            state_ttl_secs: env_u64("FOLDJOB_STATE_TTL_SECS", 86_400),
            events_ttl_secs: env_u64("FOLDJOB_EVENTS_TTL_SECS", 86_400),
            max_events_per_job: env_u64("FOLDJOB_MAX_EVENTS_PER_JOB", 1_000) as i64,
            stale_terminal_secs: env_u64("FOLDJOB_STALE_TERMINAL_SECS", 259_200),
            orphan_meta_secs: env_u64("FOLDJOB_ORPHAN_META_SECS", 172_800),
            reaper_interval_secs: env_u64("FOLDJOB_REAPER_INTERVAL_SECS", 600),
            reasoner_base_url: env_string("FOLDJOB_REASONER_BASE_URL", "http://127.0.0.1:9001"),
            reasoner_timeout: Duration::from_secs(env_u64("FOLDJOB_REASONER_TIMEOUT_SECS", 300)),
            reasoner_connect_timeout: Duration::from_secs(env_u64("FOLDJOB_REASONER_CONNECT_TIMEOUT_SECS", 30)),
            reasoner_interrupt_timeout: Duration::from_secs(env_u64("FOLDJOB_REASONER_INTERRUPT_TIMEOUT_SECS", 10)),
            use_mock_reasoner: env_bool("FOLDJOB_USE_MOCK_REASONER", true),
            mock_delay_min: Duration::from_millis(env_u64("FOLDJOB_MOCK_DELAY_MIN_MS", 50)),
            mock_delay_max: Duration::from_millis(env_u64("FOLDJOB_MOCK_DELAY_MAX_MS", 250)),
            mock_delay_mode: env_delay_mode("FOLDJOB_MOCK_DELAY_MODE", DelayMode::Random),
            mock_data_file: std::env::var("FOLDJOB_MOCK_DATA_FILE").ok().map(PathBuf::from),
            bind_host: env_string("FOLDJOB_BIND_HOST", "0.0.0.0"),
            bind_port: env_u64("FOLDJOB_BIND_PORT", 8080) as u16,
            cors_origins: env_csv("FOLDJOB_CORS_ORIGINS"),
        }
    }
}

fn env_string(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_u64(key: &str, default: u64) -> u64 {
    std::env::var(key).ok().and_then(|s| s.parse().ok()).unwrap_or(default)
}

fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .and_then(|s| match s.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" => Some(true),
            "0" | "false" | "no" => Some(false),
            _ => None,
        })
        .unwrap_or(default)
}

fn env_delay_mode(key: &str, default: DelayMode) -> DelayMode {
    std::env::var(key).ok().and_then(|s| s.parse().ok()).unwrap_or(default)
}

fn env_csv(key: &str) -> Vec<String> {
    std::env::var(key)
        .ok()
        .map(|s| s.split(',').map(str::trim).filter(|p| !p.is_empty()).map(str::to_string).collect())
        .unwrap_or_default()
}
