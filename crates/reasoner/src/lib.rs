// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Client abstraction over the external reasoner: the typed message shape it emits, the `ReasonerClient` trait
//! every driver depends on, and two implementations — a deterministic
//! file-backed mock and an HTTP client against the real backend.

mod client;
mod error;
mod http;
mod message;
mod mock;

pub use client::ReasonerClient;
pub use error::ReasonerError;
pub use http::HttpReasoner;
pub use message::{ReasonerMessage, ReasonerMessageKind, ReasonerState, StructureAttachment};
pub use mock::{DelayMode, MockReasoner};

use fj_core::ReasonerSession;
use futures::stream::BoxStream;

/// A reasoner message stream, boxed so callers don't need to name the
/// concrete stream type of whichever `ReasonerClient` they hold.
pub type ReasonerMessageStream = BoxStream<'static, ReasonerMessage>;

/// Everything the segmentation engine needs to open and later
/// interrupt a reasoning run: the session handle recorded in the
/// reasoner hash plus the message stream itself.
pub struct ReasonerRun {
    pub session: ReasonerSession,
    pub messages: ReasonerMessageStream,
    /// Total message count, when knowable up front (always for
    /// `MockReasoner`, which loads its trace eagerly; optionally for
    /// `HttpReasoner`, when the backend reports it at session start).
    /// Feeds the segmentation engine's progress interpolation;
    /// `None` falls back to an index-only estimate.
    pub total_hint: Option<u32>,
}
