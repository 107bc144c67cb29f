// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! foldctl — a thin operator CLI against `foldjobd`'s HTTP surface,
//! following the common pattern of a small daemon paired with a CLI
//! that talks to it.
//!
//! Uses a clap `Parser`/`Subcommand` layout with a global output flag,
//! and one client type (`client.rs`) wrapping the daemon's protocol.

mod client;

use anyhow::Result;
use clap::{Parser, Subcommand};
use client::DaemonClient;

#[derive(Parser)]
#[command(name = "foldctl", version, about = "Operator CLI for foldjobd")]
struct Cli {
    /// Base URL of the foldjobd instance to talk to.
    #[arg(long, global = true, env = "FOLDJOB_URL", default_value = "http://127.0.0.1:8080")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Submit a new folding job for a sequence.
    Create {
        /// Amino-acid sequence (10-5000 uppercase letters).
        sequence: String,
        /// Optional conversation id to associate with the job.
        #[arg(long)]
        conversation_id: Option<String>,
    },
    /// Stream a job's progress events to stdout as they arrive.
    Stream {
        job_id: String,
        /// Override the sequence used to (re)drive the job.
        #[arg(long)]
        sequence: Option<String>,
    },
    /// Cancel a running job.
    Cancel { job_id: String },
    /// Print a job's current state.
    State { job_id: String },
    /// Replay a job's event log from an offset.
    Events {
        job_id: String,
        #[arg(long, default_value_t = 0)]
        offset: i64,
        #[arg(long)]
        limit: Option<i64>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let client = DaemonClient::new(&cli.url)?;

    match cli.command {
        Commands::Create { sequence, conversation_id } => {
            let resp = client.create_job(&sequence, conversation_id.as_deref()).await?;
            println!("{}", serde_json::to_string_pretty(&resp)?);
        }
        Commands::Stream { job_id, sequence } => {
            client
                .stream(&job_id, sequence.as_deref(), |data| {
                    println!("{data}");
                })
                .await?;
        }
        Commands::Cancel { job_id } => {
            let resp = client.cancel(&job_id).await?;
            println!("{}", serde_json::to_string_pretty(&resp)?);
        }
        Commands::State { job_id } => {
            let resp = client.get_state(&job_id).await?;
            println!("{}", serde_json::to_string_pretty(&resp)?);
        }
        Commands::Events { job_id, offset, limit } => {
            let resp = client.get_events(&job_id, offset, limit).await?;
            println!("{}", serde_json::to_string_pretty(&resp)?);
        }
    }

    Ok(())
}
