// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP-backed reasoner client: a real external-process adapter
//! alongside a fake, with a background task that streams parsed
//! records into an `mpsc::Sender` — here reading a chunked HTTP
//! response body instead of tailing a session log file.

use crate::client::ReasonerClient;
use crate::error::ReasonerError;
use crate::message::ReasonerMessage;
use crate::ReasonerRun;
use async_trait::async_trait;
use fj_core::ReasonerSession;
use futures::StreamExt;
use serde::Deserialize;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::warn;

pub struct HttpReasoner {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Deserialize)]
struct StartSessionResponse {
    session_id: String,
    #[serde(default)]
    total_messages: Option<u32>,
}

impl HttpReasoner {
    pub fn new(base_url: impl Into<String>, connect_timeout: Duration, read_timeout: Duration) -> Result<Self, ReasonerError> {
        let client = reqwest::Client::builder()
            .connect_timeout(connect_timeout)
            .timeout(read_timeout)
            .build()
            .map_err(|e| ReasonerError::SessionStart(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }
}

#[async_trait]
impl ReasonerClient for HttpReasoner {
    async fn start(&self, instance: &str, job_id: &str, sequence: &str) -> Result<ReasonerRun, ReasonerError> {
        let start_url = format!("{}/sessions", self.base_url);
        let resp = self
            .client
            .post(&start_url)
            .json(&serde_json::json!({ "jobId": job_id, "sequence": sequence }))
            .send()
            .await
            .map_err(|e| ReasonerError::SessionStart(e.to_string()))?
            .error_for_status()
            .map_err(|e| ReasonerError::SessionStart(e.to_string()))?;
        let parsed: StartSessionResponse = resp.json().await.map_err(|e| ReasonerError::SessionStart(e.to_string()))?;

        let session = ReasonerSession::new(instance, parsed.session_id.clone(), self.base_url.clone());

        let stream_url = format!("{}/sessions/{}/stream", self.base_url, parsed.session_id);
        let response = self
            .client
            .get(&stream_url)
            .send()
            .await
            .map_err(|e| ReasonerError::Stream(e.to_string()))?
            .error_for_status()
            .map_err(|e| ReasonerError::Stream(e.to_string()))?;

        let (tx, rx) = mpsc::channel(16);
        tokio::spawn(drain_ndjson_body(response, tx));

        Ok(ReasonerRun {
            session,
            messages: ReceiverStream::new(rx).boxed(),
            total_hint: parsed.total_messages,
        })
    }

    async fn interrupt(&self, session: &ReasonerSession) -> Result<(), ReasonerError> {
        let url = format!("{}/sessions/{}/interrupt", session.backend_url, session.session);
        match self.client.post(&url).send().await {
            Ok(resp) if resp.status().is_success() => Ok(()),
            Ok(resp) => Err(ReasonerError::Interrupt(format!("status {}", resp.status()))),
            Err(e) => Err(ReasonerError::Interrupt(e.to_string())),
        }
    }
}

/// Reads newline-delimited JSON messages out of a streaming response
/// body and forwards each parsed one over `tx`. Malformed lines are
/// logged and skipped rather than killing the whole stream, matching
/// the "never skip a reasoner message" rule applied at the
/// transport boundary: a malformed line is the reasoner's fault, not a
/// reason to stop relaying everything after it.
async fn drain_ndjson_body(response: reqwest::Response, tx: mpsc::Sender<ReasonerMessage>) {
    let mut stream = response.bytes_stream();
    let mut buf = String::new();
    loop {
        let chunk = match stream.next().await {
            Some(Ok(bytes)) => bytes,
            Some(Err(err)) => {
                warn!(%err, "reasoner stream read error");
                return;
            }
            None => break,
        };
        buf.push_str(&String::from_utf8_lossy(&chunk));
        while let Some(pos) = buf.find('\n') {
            let line = buf[..pos].trim().to_string();
            buf.drain(..=pos);
            if line.is_empty() {
                continue;
            }
            match serde_json::from_str::<ReasonerMessage>(&line) {
                Ok(msg) => {
                    if tx.send(msg).await.is_err() {
                        return;
                    }
                }
                Err(err) => warn!(%err, "dropping unparsable reasoner message"),
            }
        }
    }
    let tail = buf.trim();
    if !tail.is_empty() {
        if let Ok(msg) = serde_json::from_str::<ReasonerMessage>(tail) {
            let _ = tx.send(msg).await;
        }
    }
}
