// SPDX-License-Identifier: AGPL-3.0-or-later

//! GitHub Actions job summary

use anyhow::{Context, Result};
use std::path::Path;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use crate::config::Config;
use crate::outcome::CheckOutcome;

/// Append the outcome to the job summary
///
/// Returns 1 when failure content was written, 0 otherwise (including
/// when job summaries are disabled).
pub async fn publish(config: &Config, outcome: &CheckOutcome) -> Result<i32> {
    if !config.job_summary {
        debug!("Job summary disabled");
        return Ok(0);
    }

    let path = Path::new(&config.summary_path);
    append(path, &outcome.to_markdown())
        .await
        .with_context(|| format!("Failed to write job summary {}", path.display()))?;

    info!("Wrote job summary to {}", path.display());
    Ok(if outcome.is_failure() { 1 } else { 0 })
}

async fn append(path: &Path, markdown: &str) -> std::io::Result<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .await?;
    file.write_all(markdown.as_bytes()).await?;
    file.write_all(b"\n").await?;
    file.flush().await
}
