// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Deterministic, file-backed reasoner used when `FOLDJOB_USE_MOCK_REASONER`
//! is set: a fake adapter that drives a channel, with the message
//! shape and delay ranges matching the real mock message generator.

use crate::client::ReasonerClient;
use crate::error::ReasonerError;
use crate::message::{ReasonerMessage, ReasonerMessageKind, ReasonerState, StructureAttachment};
use crate::ReasonerRun;
use async_trait::async_trait;
use fj_core::ReasonerSession;
use futures::StreamExt;
use rand::Rng;
use std::path::Path;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::warn;

/// Which delay profile a mock run uses. Both share the same uniform-random
/// sleep between `delay_min`/`delay_max`; the distinction is which values
/// the daemon's config passes in (`random`: small millisecond jitter suited
/// to tests; `real`: a multi-second delay meant to approximate actual
/// reasoner latency).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DelayMode {
    Random,
    Real,
}

impl std::str::FromStr for DelayMode {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "random" => Ok(DelayMode::Random),
            "real" => Ok(DelayMode::Real),
            other => Err(format!("unknown mock delay mode {other:?}")),
        }
    }
}

pub struct MockReasoner {
    messages: Vec<ReasonerMessage>,
    delay_min: Duration,
    delay_max: Duration,
    _mode: DelayMode,
    /// Holds any temp structure files created by `bundled_default` alive
    /// for the process lifetime so their attachment paths stay readable.
    _tempdir: Option<tempfile::TempDir>,
}

impl MockReasoner {
    /// Load reasoner messages from a JSONL file, one serialized
    /// `ReasonerMessage` per line.
    pub fn from_file(path: &Path, delay_min: Duration, delay_max: Duration, mode: DelayMode) -> Result<Self, ReasonerError> {
        let raw = std::fs::read_to_string(path).map_err(|e| ReasonerError::MockData {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        let mut messages = Vec::new();
        for (lineno, line) in raw.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let msg: ReasonerMessage = serde_json::from_str(line).map_err(|e| ReasonerError::MockData {
                path: path.display().to_string(),
                reason: format!("line {}: {e}", lineno + 1),
            })?;
            messages.push(msg);
        }
        Ok(Self {
            messages,
            delay_min,
            delay_max,
            _mode: mode,
            _tempdir: None,
        })
    }

    /// Built-in default trace used when no data file is configured, so
    /// the stream endpoint has something deterministic to drive in
    /// local smoke-testing.
    pub fn bundled_default(delay_min: Duration, delay_max: Duration, mode: DelayMode) -> Self {
        let tempdir = tempfile::tempdir().ok();
        let pdb_path = tempdir.as_ref().map(|dir| {
            let path = dir.path().join("block_0.pdb");
            let _ = std::fs::write(&path, BUNDLED_PDB_TEXT);
            path
        });

        let mut messages = vec![
            ReasonerMessage {
                kind: ReasonerMessageKind::Prologue,
                content: "Beginning structure analysis.".to_string(),
                state: ReasonerState::Model,
                attachment: None,
            },
            ReasonerMessage {
                kind: ReasonerMessageKind::Annotation,
                content: "Identified conserved fold motifs.".to_string(),
                state: ReasonerState::Model,
                attachment: None,
            },
            ReasonerMessage {
                kind: ReasonerMessageKind::Thinking,
                content: "Evaluating candidate backbone torsions.".to_string(),
                state: ReasonerState::Model,
                attachment: None,
            },
            ReasonerMessage {
                kind: ReasonerMessageKind::Thinking,
                content: "Refining side-chain packing.".to_string(),
                state: ReasonerState::Model,
                attachment: None,
            },
        ];

        if let Some(path) = pdb_path {
            messages.push(ReasonerMessage {
                kind: ReasonerMessageKind::Thinking,
                content: "Converged on a candidate fold.".to_string(),
                state: ReasonerState::Model,
                attachment: Some(StructureAttachment {
                    path: path.display().to_string(),
                    label: "candidate fold".to_string(),
                }),
            });
        }

        messages.push(ReasonerMessage {
            kind: ReasonerMessageKind::Conclusion,
            content: "Structure prediction complete.".to_string(),
            state: ReasonerState::Done,
            attachment: None,
        });

        Self {
            messages,
            delay_min,
            delay_max,
            _mode: mode,
            _tempdir: tempdir,
        }
    }
}

const BUNDLED_PDB_TEXT: &str = "HEADER    MOCK STRUCTURE\nATOM      1  CA  ALA A   1       0.000   0.000   0.000  1.00  0.00           C\nEND\n";

#[async_trait]
impl ReasonerClient for MockReasoner {
    async fn start(&self, instance: &str, job_id: &str, _sequence: &str) -> Result<ReasonerRun, ReasonerError> {
        let session = ReasonerSession::new(instance, format!("mock-{job_id}"), "mock://local");

        let (tx, rx) = mpsc::channel(8);
        let messages = self.messages.clone();
        let total_hint = Some(messages.len() as u32);
        let delay_min = self.delay_min;
        let delay_max = self.delay_max;
        tokio::spawn(async move {
            for msg in messages {
                let delay = if delay_max > delay_min {
                    let extra = rand::thread_rng().gen_range(0..=(delay_max - delay_min).as_millis() as u64);
                    delay_min + Duration::from_millis(extra)
                } else {
                    delay_min
                };
                tokio::time::sleep(delay).await;
                if tx.send(msg).await.is_err() {
                    warn!("mock reasoner stream dropped: receiver gone");
                    return;
                }
            }
        });

        Ok(ReasonerRun {
            session,
            messages: ReceiverStream::new(rx).boxed(),
            total_hint,
        })
    }

    async fn interrupt(&self, _session: &ReasonerSession) -> Result<(), ReasonerError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    #[tokio::test]
    async fn bundled_default_yields_prologue_then_conclusion() {
        let mock = MockReasoner::bundled_default(Duration::from_millis(0), Duration::from_millis(1), DelayMode::Random);
        let run = mock.start("inst-1", "job_abc123", &"A".repeat(15)).await.unwrap();
        let messages: Vec<_> = run.messages.collect().await;
        assert_eq!(messages.first().unwrap().kind, ReasonerMessageKind::Prologue);
        assert_eq!(messages.last().unwrap().kind, ReasonerMessageKind::Conclusion);
        assert!(messages.last().unwrap().is_terminal());
    }

    #[tokio::test]
    async fn bundled_default_includes_one_structure_attachment() {
        let mock = MockReasoner::bundled_default(Duration::from_millis(0), Duration::from_millis(1), DelayMode::Random);
        let run = mock.start("inst-1", "job_abc123", &"A".repeat(15)).await.unwrap();
        let messages: Vec<_> = run.messages.collect().await;
        let attached = messages.iter().filter(|m| m.attachment.is_some()).count();
        assert_eq!(attached, 1);
    }
}
