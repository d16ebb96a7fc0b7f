// SPDX-License-Identifier: AGPL-3.0-or-later

//! Running commit-check
//!
//! The checker is an opaque collaborator: we hand it one flag per enabled
//! check, send its stdout to the result file and keep its exit code.

use anyhow::{Context, Result};
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::config::{Check, CheckFlags};

/// Program invoked when no override is given
pub const DEFAULT_CHECKER: &str = "commit-check";

/// File the checker's stdout is written to
pub const DEFAULT_RESULT_FILE: &str = "result.txt";

/// Flags for every enabled check, in commit-check's documented order
pub fn build_args(flags: &CheckFlags) -> Vec<&'static str> {
    Check::ALL
        .into_iter()
        .filter(|check| flags.is_enabled(*check))
        .map(Check::flag)
        .collect()
}

/// Run the checker once, writing its stdout to `result_path`
///
/// Returns the checker's exit code. A process terminated by a signal has
/// no code and is reported as 1.
pub async fn run(program: &str, flags: &CheckFlags, result_path: &Path) -> Result<i32> {
    let args = build_args(flags);

    let mut command_line = vec![program];
    command_line.extend(args.iter().copied());
    info!("{}", command_line.join(" "));

    let result_file = tokio::fs::File::create(result_path)
        .await
        .with_context(|| format!("Failed to create result file {}", result_path.display()))?
        .into_std()
        .await;

    // `output()` would re-pipe stdout, so spawn and wait instead
    let child = Command::new(program)
        .args(&args)
        .stdin(Stdio::null())
        .stdout(Stdio::from(result_file))
        .stderr(Stdio::piped())
        .spawn()
        .with_context(|| format!("Failed to run {}", program))?;
    let output = child
        .wait_with_output()
        .await
        .with_context(|| format!("Failed to wait for {}", program))?;

    if !output.stderr.is_empty() {
        debug!(
            "{} stderr: {}",
            program,
            String::from_utf8_lossy(&output.stderr).trim_end()
        );
    }

    let code = match output.status.code() {
        Some(code) => code,
        None => {
            warn!("{} was terminated by a signal", program);
            1
        }
    };

    debug!("{} exited with {}", program, code);
    Ok(code)
}
