// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Thin client wrapping the daemon's HTTP surface: one client type per
//! CLI process, with timeouts configurable via env vars, talking
//! REST/SSE instead of a Unix-socket line protocol.

use anyhow::{bail, Context, Result};
use futures::StreamExt;
use serde_json::Value;
use std::time::Duration;

fn timeout_connect() -> Duration {
    std::env::var("FOLDCTL_TIMEOUT_CONNECT_MS")
        .ok()
        .and_then(|s| s.parse().ok())
        .map(Duration::from_millis)
        .unwrap_or(Duration::from_secs(5))
}

/// A thin HTTP client against one `foldjobd` instance.
pub struct DaemonClient {
    base_url: String,
    http: reqwest::Client,
}

impl DaemonClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .connect_timeout(timeout_connect())
            .build()
            .context("building HTTP client")?;
        Ok(Self { base_url: base_url.into().trim_end_matches('/').to_string(), http })
    }

    pub async fn create_job(&self, sequence: &str, conversation_id: Option<&str>) -> Result<Value> {
        let body = serde_json::json!({
            "sequence": sequence,
            "conversationId": conversation_id,
        });
        let resp = self.http.post(format!("{}/jobs", self.base_url)).json(&body).send().await?;
        parse_json_or_bail(resp).await
    }

    pub async fn get_state(&self, job_id: &str) -> Result<Value> {
        let resp = self.http.get(format!("{}/jobs/{job_id}/state", self.base_url)).send().await?;
        parse_json_or_bail(resp).await
    }

    pub async fn get_events(&self, job_id: &str, offset: i64, limit: Option<i64>) -> Result<Value> {
        let mut url = format!("{}/jobs/{job_id}/events?offset={offset}", self.base_url);
        if let Some(limit) = limit {
            url.push_str(&format!("&limit={limit}"));
        }
        let resp = self.http.get(url).send().await?;
        parse_json_or_bail(resp).await
    }

    pub async fn cancel(&self, job_id: &str) -> Result<Value> {
        let resp = self.http.post(format!("{}/jobs/{job_id}/cancel", self.base_url)).send().await?;
        parse_json_or_bail(resp).await
    }

    /// Streams `event: step` / `event: done` / `event: canceled` SSE
    /// frames, invoking `on_frame` for every `data:` line encountered.
    /// The raw byte stream is parsed frame-by-frame rather than pulled
    /// through a dedicated SSE crate, since the CLI only needs to print
    /// each `data:` payload, not re-dispatch on `event:` types.
    pub async fn stream<F: FnMut(&str)>(&self, job_id: &str, sequence: Option<&str>, mut on_frame: F) -> Result<()> {
        let mut url = format!("{}/jobs/{job_id}/stream", self.base_url);
        if let Some(seq) = sequence {
            url.push_str(&format!("?sequence={seq}"));
        }
        let resp = self.http.get(url).send().await?;
        if !resp.status().is_success() {
            bail!("stream request failed with status {}", resp.status());
        }

        let mut buf = String::new();
        let mut bytes = resp.bytes_stream();
        while let Some(chunk) = bytes.next().await {
            let chunk = chunk.context("reading SSE chunk")?;
            buf.push_str(&String::from_utf8_lossy(&chunk));
            while let Some(idx) = buf.find("\n\n") {
                let frame = buf[..idx].to_string();
                buf.drain(..idx + 2);
                for line in frame.lines() {
                    if let Some(data) = line.strip_prefix("data: ") {
                        on_frame(data);
                    }
                }
            }
        }
        Ok(())
    }
}

async fn parse_json_or_bail(resp: reqwest::Response) -> Result<Value> {
    let status = resp.status();
    let body: Value = resp.json().await.context("parsing JSON response")?;
    if !status.is_success() {
        bail!("request failed with status {status}: {body}");
    }
    Ok(body)
}
