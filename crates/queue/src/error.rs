// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

#[derive(Debug, Error)]
pub enum QueueError {
    #[error("kv error: {0}")]
    Kv(#[from] fj_kv::KvError),

    #[error("failed to serialize event: {0}")]
    Serialize(#[from] serde_json::Error),
}
