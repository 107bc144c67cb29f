// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Black-box HTTP scenarios against an in-process `foldjobd` surface,
//! driven over real HTTP rather than by calling route handlers
//! directly. Each scenario spins up its
//! own server bound to an ephemeral port, backed by `FakeKv` and a
//! `MockReasoner`, so the whole suite runs with no external services.

use fj_jobstore::{JobMetaStore, JobStateStore};
use fj_kv::{FakeKv, KeySchema};
use fj_queue::EventQueue;
use fj_reasoner::{DelayMode, MockReasoner};
use fj_web::AppState;
use futures::StreamExt;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

struct TestServer {
    base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Boots one router on `127.0.0.1:0`, wired the same way
/// `fj_daemon::bootstrap::build_app_state` wires the real binary,
/// except for `FakeKv` in place of `RedisKv` and a `MockReasoner` with
/// the given delay range in place of `HttpReasoner`.
async fn spawn_server(delay_min: Duration, delay_max: Duration) -> TestServer {
    let kv = Arc::new(FakeKv::new());
    let keys = KeySchema::new("foldjob");
    let state_store = Arc::new(JobStateStore::new(kv.clone(), keys.clone(), 86_400));
    let meta_store = Arc::new(JobMetaStore::new(kv.clone(), keys.clone(), 86_400));
    let queue = Arc::new(EventQueue::new(kv, keys, 1000));
    let reasoner = Arc::new(MockReasoner::bundled_default(delay_min, delay_max, DelayMode::Random));

    let state = AppState::new(
        state_store,
        meta_store,
        queue,
        reasoner,
        "test-instance",
        "A".repeat(15),
        86_400,
        86_400,
        true,
    );
    let router = fj_web::build_router(state, &[]);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });

    TestServer { base_url: format!("http://{addr}"), handle }
}

/// Splits a fully-buffered SSE body into `(event, data)` pairs, in the
/// same frame-delimiter convention the CLI's streaming client parses.
fn parse_sse_frames(body: &str) -> Vec<(String, String)> {
    body.split("\n\n")
        .filter(|frame| !frame.trim().is_empty())
        .map(|frame| {
            let mut event = String::new();
            let mut data = String::new();
            for line in frame.lines() {
                if let Some(e) = line.strip_prefix("event: ") {
                    event = e.to_string();
                } else if let Some(d) = line.strip_prefix("data: ") {
                    data = d.to_string();
                }
            }
            (event, data)
        })
        .collect()
}

async fn create_job(client: &reqwest::Client, base: &str, sequence: &str) -> Value {
    client
        .post(format!("{base}/jobs"))
        .json(&json!({ "sequence": sequence }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap()
}

#[tokio::test]
async fn queued_to_done_matches_seed_scenario_one() {
    let server = spawn_server(Duration::from_millis(0), Duration::from_millis(2)).await;
    let client = reqwest::Client::new();

    let created = create_job(&client, &server.base_url, "MVLSPADKTNVKAAWG").await;
    let job_id = created["jobId"].as_str().unwrap().to_string();

    let body = client
        .get(format!("{}/jobs/{job_id}/stream", server.base_url))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    let frames = parse_sse_frames(&body);

    let steps: Vec<&(String, String)> = frames.iter().filter(|(ev, _)| ev == "step").collect();
    assert_eq!(steps.len(), 7, "1 queued + 4 thinking/annotation + 1 thinking_pdb + 1 conclusion");

    let parsed: Vec<Value> = steps.iter().map(|(_, data)| serde_json::from_str(data).unwrap()).collect();

    assert_eq!(parsed[0]["stage"], "QUEUED");
    assert_eq!(parsed[0]["progress"], 0);

    for evt in &parsed[1..5] {
        assert_eq!(evt["blockIndex"], 0);
        let progress = evt["progress"].as_u64().unwrap();
        assert!((10..=95).contains(&progress), "progress {progress} out of [10,95]");
    }

    assert_eq!(parsed[5]["eventType"], "THINKING_PDB");
    assert_eq!(parsed[5]["blockIndex"], 0);
    assert_eq!(parsed[5]["artifacts"].as_array().unwrap().len(), 1);

    let last = &parsed[6];
    assert_eq!(last["eventType"], "CONCLUSION");
    assert_eq!(last["stage"], "DONE");
    assert_eq!(last["progress"], 100);
    assert_eq!(last["status"], "complete");

    let done_frames: Vec<&(String, String)> = frames.iter().filter(|(ev, _)| ev == "done").collect();
    assert_eq!(done_frames.len(), 1);
    let done_body: Value = serde_json::from_str(&done_frames[0].1).unwrap();
    assert_eq!(done_body["jobId"], job_id);

    let replay: Value = client
        .get(format!("{}/jobs/{job_id}/events?offset=0", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(replay["count"], 7);
    assert_eq!(replay["total"], 7);
    let replayed_events = replay["events"].as_array().unwrap();
    assert_eq!(replayed_events.len(), 7);
    for (from_stream, from_replay) in parsed.iter().zip(replayed_events.iter()) {
        assert_eq!(from_stream["eventId"], from_replay["eventId"]);
        assert_eq!(from_stream["seq"], from_replay["seq"]);
    }
}

#[tokio::test]
async fn mid_stream_cancel_matches_seed_scenario_two() {
    // Wide enough delays that there is a real window to cancel between
    // the queued bookkeeping event and the next reasoner message.
    let server = spawn_server(Duration::from_millis(40), Duration::from_millis(80)).await;
    let client = reqwest::Client::new();

    let created = create_job(&client, &server.base_url, "MVLSPADKTNVKAAWG").await;
    let job_id = created["jobId"].as_str().unwrap().to_string();

    let resp = client.get(format!("{}/jobs/{job_id}/stream", server.base_url)).send().await.unwrap();
    let mut byte_stream = resp.bytes_stream();
    let mut buf = String::new();
    let mut seen_events: Vec<String> = Vec::new();
    let mut canceled_triggered = false;

    while let Some(chunk) = byte_stream.next().await {
        let chunk = chunk.unwrap();
        buf.push_str(&String::from_utf8_lossy(&chunk));
        while let Some(idx) = buf.find("\n\n") {
            let frame = buf[..idx].to_string();
            buf.drain(..idx + 2);
            if frame.trim().is_empty() {
                continue;
            }
            let event = frame.lines().find_map(|l| l.strip_prefix("event: ")).unwrap_or_default().to_string();
            seen_events.push(event.clone());

            if event == "step" && !canceled_triggered {
                canceled_triggered = true;
                let cancel_base = server.base_url.clone();
                let cancel_job_id = job_id.clone();
                let cancel_client = client.clone();
                tokio::spawn(async move {
                    cancel_client.post(format!("{cancel_base}/jobs/{cancel_job_id}/cancel")).send().await.ok();
                });
            }
        }
    }

    assert!(seen_events.contains(&"canceled".to_string()), "expected a canceled sentinel, saw {seen_events:?}");
    assert!(!seen_events.contains(&"done".to_string()), "canceled stream must never also emit done");

    let state: Value = client
        .get(format!("{}/jobs/{job_id}/state", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(state["state"]["status"], "canceled");
}

#[tokio::test]
async fn cancel_on_unknown_job_is_not_found_matches_seed_scenario_three() {
    let server = spawn_server(Duration::from_millis(0), Duration::from_millis(1)).await;
    let client = reqwest::Client::new();

    let resp = client.post(format!("{}/jobs/job_doesnotexist/cancel", server.base_url)).send().await.unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn cancel_on_terminal_job_matches_seed_scenario_four() {
    let server = spawn_server(Duration::from_millis(0), Duration::from_millis(2)).await;
    let client = reqwest::Client::new();

    let created = create_job(&client, &server.base_url, "MVLSPADKTNVKAAWG").await;
    let job_id = created["jobId"].as_str().unwrap().to_string();

    client.get(format!("{}/jobs/{job_id}/stream", server.base_url)).send().await.unwrap().text().await.unwrap();

    let resp: Value = client
        .post(format!("{}/jobs/{job_id}/cancel", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(resp["ok"], false);
    assert_eq!(resp["status"], "complete");
}

#[tokio::test]
async fn replay_after_disconnect_matches_seed_scenario_five() {
    // Slow enough that we can drop the connection after 3 frames and
    // still have the server-side driver keep running to completion.
    let server = spawn_server(Duration::from_millis(10), Duration::from_millis(20)).await;
    let client = reqwest::Client::new();

    let created = create_job(&client, &server.base_url, "MVLSPADKTNVKAAWG").await;
    let job_id = created["jobId"].as_str().unwrap().to_string();

    let resp = client.get(format!("{}/jobs/{job_id}/stream", server.base_url)).send().await.unwrap();
    let mut byte_stream = resp.bytes_stream();
    let mut buf = String::new();
    let mut delivered = 0;

    'outer: while let Some(chunk) = byte_stream.next().await {
        let chunk = chunk.unwrap();
        buf.push_str(&String::from_utf8_lossy(&chunk));
        while let Some(idx) = buf.find("\n\n") {
            let frame = buf[..idx].to_string();
            buf.drain(..idx + 2);
            if frame.lines().any(|l| l == "event: step") {
                delivered += 1;
            }
            if delivered >= 3 {
                break 'outer;
            }
        }
    }
    assert_eq!(delivered, 3);
    drop(byte_stream); // simulate the client disconnecting mid-stream

    // Give the still-running server-side driver time to finish.
    tokio::time::sleep(Duration::from_millis(300)).await;

    let replay: Value = client
        .get(format!("{}/jobs/{job_id}/events?offset=2", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let events = replay["events"].as_array().unwrap();
    assert!(!events.is_empty());
    assert_eq!(events[0]["seq"], 3);
    // every event from offset 2 onward, including ones produced after disconnect
    assert!(replay["total"].as_i64().unwrap() >= 3);
}

#[tokio::test]
async fn bad_sequence_matches_seed_scenario_six() {
    let server = spawn_server(Duration::from_millis(0), Duration::from_millis(1)).await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{}/jobs", server.base_url))
        .json(&json!({ "sequence": "INVALID123!@#" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::BAD_REQUEST);

    let body: Value = resp.json().await.unwrap();
    assert!(body.get("error").is_some());
    assert!(body["details"].as_array().is_some_and(|d| !d.is_empty()));
    assert!(body.get("jobId").is_none());
}
