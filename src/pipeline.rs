// SPDX-License-Identifier: AGPL-3.0-or-later

//! One action run: check, publish, aggregate

use anyhow::Result;
use std::path::PathBuf;
use tracing::info;

use crate::checker;
use crate::comment::{self, CommentClient, CommentError, Target};
use crate::config::Config;
use crate::outcome::CheckOutcome;
use crate::summary;

/// Operational settings that are not action inputs
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub checker: String,
    pub result_file: PathBuf,
}

/// Sub-results of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Codes {
    pub checker: i32,
    pub job_summary: i32,
    pub pr_comment: i32,
}

impl Codes {
    /// Process exit code: the sum of every stage, or 0 on a dry run
    pub fn aggregate(&self, dry_run: bool) -> i32 {
        if dry_run {
            return 0;
        }
        self.checker
            .saturating_add(self.job_summary)
            .saturating_add(self.pr_comment)
    }
}

/// Run the checker and publish its outcome
///
/// Returns the code the process should exit with.
pub async fn run<F>(config: &Config, options: &RunOptions, connect: F) -> Result<i32>
where
    F: FnOnce(&Target) -> Result<Box<dyn CommentClient>, CommentError>,
{
    config.log();

    let checker = checker::run(&options.checker, &config.checks, &options.result_file).await?;
    let outcome = CheckOutcome::read(&options.result_file).await?;

    let codes = Codes {
        checker,
        job_summary: summary::publish(config, &outcome).await?,
        pr_comment: comment::publish(config, &outcome, connect).await,
    };
    info!(
        "checker={} job_summary={} pr_comment={}",
        codes.checker, codes.job_summary, codes.pr_comment
    );

    let code = codes.aggregate(config.dry_run);
    if config.dry_run {
        info!("Dry run enabled, exit code forced to 0");
    }

    if let Some(annotation) = error_annotation(&outcome) {
        println!("\n{}", outcome.to_markdown());
        println!("{}", annotation);
    }

    Ok(code)
}

/// GitHub workflow command flagging a failed check, if any
///
/// Carries the same markdown as the job summary and the comment.
pub fn error_annotation(outcome: &CheckOutcome) -> Option<String> {
    if !outcome.is_failure() {
        return None;
    }
    Some(format!(
        "::error::{}",
        escape_workflow_data(&outcome.to_markdown())
    ))
}

/// Escape a workflow command message (`%`, CR and LF)
fn escape_workflow_data(data: &str) -> String {
    data.replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}
