// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Errors surfaced by `KvClient` implementations.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum KvError {
    #[error("kv backend connection error: {0}")]
    Connection(String),

    #[error("kv backend command error: {0}")]
    Command(String),

    #[error("kv entry not found: {0}")]
    NotFound(String),
}

impl From<redis::RedisError> for KvError {
    fn from(err: redis::RedisError) -> Self {
        if err.is_io_error() {
            KvError::Connection(err.to_string())
        } else {
            KvError::Command(err.to_string())
        }
    }
}
