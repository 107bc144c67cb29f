// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Wiring for the `foldjobd` binary: environment-variable config
//! (`config`), adapter construction (`bootstrap`), and the
//! background reaper task.

pub mod bootstrap;
pub mod config;
pub mod reaper;

pub use bootstrap::build_app_state;
pub use config::Config;
