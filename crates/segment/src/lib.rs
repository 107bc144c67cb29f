// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Segmentation Engine: classifies the reasoner's typed
//! messages into the service's own event taxonomy, tracks thinking
//! blocks, and synthesizes structure artifacts.

mod ctx;
mod driver;

pub use ctx::{interpolate_progress, SegmentCtx};
pub use driver::drive;
