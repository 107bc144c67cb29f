// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The dependency container every handler closes over.

use fj_jobstore::{JobMetaStore, JobStateStore};
use fj_queue::EventQueue;
use fj_reasoner::ReasonerClient;
use std::sync::Arc;

/// Shared, clonable handle to every store/client a handler needs plus
/// the small set of config values the HTTP layer itself reads (TTLs,
/// the default sequence, the mock-mode poll cadence).
#[derive(Clone)]
pub struct AppState {
    pub state_store: Arc<JobStateStore>,
    pub meta_store: Arc<JobMetaStore>,
    pub queue: Arc<EventQueue>,
    pub reasoner: Arc<dyn ReasonerClient>,
    pub instance_id: String,
    pub default_sequence: String,
    pub state_ttl_secs: u64,
    pub events_ttl_secs: u64,
    pub use_mock: bool,
}

impl AppState {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        state_store: Arc<JobStateStore>,
        meta_store: Arc<JobMetaStore>,
        queue: Arc<EventQueue>,
        reasoner: Arc<dyn ReasonerClient>,
        instance_id: impl Into<String>,
        default_sequence: impl Into<String>,
        state_ttl_secs: u64,
        events_ttl_secs: u64,
        use_mock: bool,
    ) -> Self {
        Self {
            state_store,
            meta_store,
            queue,
            reasoner,
            instance_id: instance_id.into(),
            default_sequence: default_sequence.into(),
            state_ttl_secs,
            events_ttl_secs,
            use_mock,
        }
    }
}
