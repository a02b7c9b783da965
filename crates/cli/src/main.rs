// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `triage`: ingest a findings CSV and drive it through waves of remote
//! remediation sessions.

mod commands;
mod exit_error;
mod ingest;
mod playbooks;

use clap::{Parser, Subcommand};
use exit_error::ExitError;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "triage", about = "Findings-triage batch orchestrator", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Ingest a findings CSV and start a new run.
    Run {
        #[arg(long)]
        findings: PathBuf,
        /// Force mock mode regardless of MOCK_MODE.
        #[arg(long, conflicts_with = "live")]
        mock: bool,
        /// Force live mode regardless of MOCK_MODE.
        #[arg(long, conflicts_with = "mock")]
        live: bool,
        #[arg(long)]
        wave_size: Option<u32>,
    },
    /// Continue a paused or interrupted run.
    Resume {
        #[arg(long = "run-id")]
        run_id: String,
        #[arg(long)]
        findings: PathBuf,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt().with_env_filter(tracing_subscriber::EnvFilter::from_default_env()).init();

    let cli = Cli::parse();

    let result = match cli.command {
        Command::Run { findings, mock, live, wave_size } => commands::run::handle(findings, mock, live, wave_size).await,
        Command::Resume { run_id, findings } => commands::resume::handle(run_id, findings).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if let Some(exit_err) = e.downcast_ref::<ExitError>() {
                eprintln!("error: {exit_err}");
                return ExitCode::from(u8::try_from(exit_err.code).unwrap_or(1));
            }
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
