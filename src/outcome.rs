// SPDX-License-Identifier: AGPL-3.0-or-later

//! Interpreting the checker's captured output

use anyhow::{Context, Result};
use regex::Regex;
use std::io::ErrorKind;
use std::path::Path;
use std::sync::OnceLock;
use tracing::debug;

/// Heading used when every check passed
pub const SUCCESS_TITLE: &str = "# Commit-Check ✔️";

/// Heading used when commit-check reported problems
pub const FAILURE_TITLE: &str = "# Commit-Check ❌";

fn ansi_sgr() -> &'static Regex {
    static ANSI: OnceLock<Regex> = OnceLock::new();
    ANSI.get_or_init(|| Regex::new(r"\x1B\[[0-9;]*[a-zA-Z]").expect("ansi regex must compile"))
}

/// Remove terminal colour sequences from `text`
pub fn strip_ansi(text: &str) -> String {
    ansi_sgr().replace_all(text, "").into_owned()
}

/// Pass/fail verdict of a single checker run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckOutcome {
    Pass,
    /// Sanitized diagnostic text, never empty
    Fail(String),
}

impl CheckOutcome {
    /// Classify raw checker output
    pub fn from_output(raw: &str) -> Self {
        let cleaned = strip_ansi(raw);
        let trimmed = cleaned.trim_end();
        if trimmed.trim_start().is_empty() {
            CheckOutcome::Pass
        } else {
            CheckOutcome::Fail(trimmed.to_string())
        }
    }

    /// Read and classify the result file; a missing file counts as empty
    pub async fn read(path: &Path) -> Result<Self> {
        let raw = match tokio::fs::read(path).await {
            Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No result file at {}", path.display());
                String::new()
            }
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("Failed to read result file {}", path.display()))
            }
        };
        Ok(Self::from_output(&raw))
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, CheckOutcome::Fail(_))
    }

    /// Diagnostic text, if the run failed
    pub fn diagnostics(&self) -> Option<&str> {
        match self {
            CheckOutcome::Pass => None,
            CheckOutcome::Fail(text) => Some(text),
        }
    }

    /// Markdown shared by the job summary and the pull request comment
    pub fn to_markdown(&self) -> String {
        match self {
            CheckOutcome::Pass => SUCCESS_TITLE.to_string(),
            CheckOutcome::Fail(text) => format!("{}\n```\n{}\n```", FAILURE_TITLE, text),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_ansi() {
        let colored = "\x1b[31mType commit messages...\x1b[0m ok\x1b[1;32m!\x1b[m";
        assert_eq!(strip_ansi(colored), "Type commit messages... ok!");
    }

    #[test]
    fn test_empty_output_passes() {
        assert_eq!(CheckOutcome::from_output(""), CheckOutcome::Pass);
    }

    #[test]
    fn test_colored_whitespace_passes() {
        let raw = "\x1b[0m  \n\x1b[31m\t\x1b[0m\n\n";
        assert_eq!(CheckOutcome::from_output(raw), CheckOutcome::Pass);
    }

    #[test]
    fn test_failure_text_is_cleaned_and_trimmed() {
        let raw = "\x1b[31mCommit rejected by Commit-Check.\x1b[0m\n  \nType message check failed ==>  \n\n";
        let outcome = CheckOutcome::from_output(raw);
        assert_eq!(
            outcome.diagnostics(),
            Some("Commit rejected by Commit-Check.\n  \nType message check failed ==>")
        );
        assert!(outcome.is_failure());
    }

    #[test]
    fn test_markdown() {
        assert_eq!(CheckOutcome::Pass.to_markdown(), "# Commit-Check ✔️");
        assert_eq!(
            CheckOutcome::Fail("bad subject".to_string()).to_markdown(),
            "# Commit-Check ❌\n```\nbad subject\n```"
        );
    }

    #[tokio::test]
    async fn test_read_missing_file_is_pass() {
        let dir = tempfile::tempdir().unwrap();
        let outcome = CheckOutcome::read(&dir.path().join("absent.txt"))
            .await
            .unwrap();
        assert_eq!(outcome, CheckOutcome::Pass);
    }

    #[tokio::test]
    async fn test_read_result_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("result.txt");
        std::fs::write(&path, "\x1b[1;31mbranch name invalid\x1b[0m\n").unwrap();

        let outcome = CheckOutcome::read(&path).await.unwrap();
        assert_eq!(outcome, CheckOutcome::Fail("branch name invalid".to_string()));
    }
}
