// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `ReasonerClient`: the trait the segmentation engine drives,
//! independent of whether the backend is the mock generator or the
//! real HTTP reasoner.

use crate::error::ReasonerError;
use crate::ReasonerRun;
use async_trait::async_trait;
use fj_core::ReasonerSession;

#[async_trait]
pub trait ReasonerClient: Send + Sync {
    /// Open a reasoning run over `sequence` and return its session
    /// handle alongside the message stream. `instance` identifies this
    /// service instance, so the session triple recorded in the
    /// reasoner hash lets a cancel call on any other instance target
    /// the right backend.
    async fn start(&self, instance: &str, job_id: &str, sequence: &str) -> Result<ReasonerRun, ReasonerError>;

    /// Best-effort interrupt: cancellation is
    /// authoritative via shared state regardless of whether this call
    /// succeeds.
    async fn interrupt(&self, session: &ReasonerSession) -> Result<(), ReasonerError>;
}
