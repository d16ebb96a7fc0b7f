// SPDX-License-Identifier: AGPL-3.0-or-later

//! Commit-Check action entry point
//!
//! Inputs come from the environment the workflow sets up; the command line
//! only carries operational overrides.

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::info;

use commit_check_action::checker::{DEFAULT_CHECKER, DEFAULT_RESULT_FILE};
use commit_check_action::comment::GitHubCommentClient;
use commit_check_action::config::Config;
use commit_check_action::pipeline::{self, RunOptions};

/// Run commit-check and report to GitHub
#[derive(Parser, Debug)]
#[command(name = "commit-check-action")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Checker program to run
    #[arg(long, default_value = DEFAULT_CHECKER)]
    checker: String,

    /// File the checker output is captured in
    #[arg(long, default_value = DEFAULT_RESULT_FILE)]
    result_file: PathBuf,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("commit_check_action={}", log_level).into()),
        )
        .init();

    info!("commit-check-action v{}", env!("CARGO_PKG_VERSION"));

    let config = Config::from_env()?;
    let options = RunOptions {
        checker: cli.checker,
        result_file: cli.result_file,
    };

    let code = pipeline::run(&config, &options, GitHubCommentClient::connect).await?;

    std::process::exit(code);
}
