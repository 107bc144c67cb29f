// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared KV abstraction. `KeySchema` owns the key scheme; `KvClient`
//! is the backend-agnostic trait `fj-jobstore` and `fj-queue` build
//! on; `RedisKv` and `FakeKv` are its two implementations.

mod client;
mod error;
mod fake;
mod keys;
mod redis_kv;

pub use client::{CasOutcome, KvClient};
pub use error::KvError;
pub use fake::FakeKv;
pub use keys::KeySchema;
pub use redis_kv::RedisKv;
