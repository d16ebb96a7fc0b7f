// SPDX-License-Identifier: AGPL-3.0-or-later

//! Action configuration
//!
//! Every input the action understands arrives as an environment variable.
//! They are read once into a [`Config`] which is then passed by reference
//! to each stage of the pipeline.

use thiserror::Error;
use tracing::info;

/// Default GitHub REST endpoint
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Configuration errors that abort the run
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} not set")]
    MissingVar(&'static str),
}

/// The commit-check checks, in the order their flags are passed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Check {
    Message,
    Branch,
    AuthorName,
    AuthorEmail,
    CommitSignoff,
    MergeBase,
    Imperative,
}

impl Check {
    pub const ALL: [Check; 7] = [
        Check::Message,
        Check::Branch,
        Check::AuthorName,
        Check::AuthorEmail,
        Check::CommitSignoff,
        Check::MergeBase,
        Check::Imperative,
    ];

    /// Environment variable carrying this check's input
    pub fn env_var(self) -> &'static str {
        match self {
            Check::Message => "MESSAGE",
            Check::Branch => "BRANCH",
            Check::AuthorName => "AUTHOR_NAME",
            Check::AuthorEmail => "AUTHOR_EMAIL",
            Check::CommitSignoff => "COMMIT_SIGNOFF",
            Check::MergeBase => "MERGE_BASE",
            Check::Imperative => "IMPERATIVE",
        }
    }

    /// Command-line flag understood by commit-check
    pub fn flag(self) -> &'static str {
        match self {
            Check::Message => "--message",
            Check::Branch => "--branch",
            Check::AuthorName => "--author-name",
            Check::AuthorEmail => "--author-email",
            Check::CommitSignoff => "--commit-signoff",
            Check::MergeBase => "--merge-base",
            Check::Imperative => "--imperative",
        }
    }

    fn default_enabled(self) -> bool {
        matches!(self, Check::Imperative)
    }
}

/// Which checks are switched on
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CheckFlags {
    pub message: bool,
    pub branch: bool,
    pub author_name: bool,
    pub author_email: bool,
    pub commit_signoff: bool,
    pub merge_base: bool,
    pub imperative: bool,
}

impl CheckFlags {
    pub fn is_enabled(&self, check: Check) -> bool {
        match check {
            Check::Message => self.message,
            Check::Branch => self.branch,
            Check::AuthorName => self.author_name,
            Check::AuthorEmail => self.author_email,
            Check::CommitSignoff => self.commit_signoff,
            Check::MergeBase => self.merge_base,
            Check::Imperative => self.imperative,
        }
    }

    pub fn set(&mut self, check: Check, enabled: bool) {
        let slot = match check {
            Check::Message => &mut self.message,
            Check::Branch => &mut self.branch,
            Check::AuthorName => &mut self.author_name,
            Check::AuthorEmail => &mut self.author_email,
            Check::CommitSignoff => &mut self.commit_signoff,
            Check::MergeBase => &mut self.merge_base,
            Check::Imperative => &mut self.imperative,
        };
        *slot = enabled;
    }
}

/// What the workflow tells us about the repository and event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitHubContext {
    pub token: Option<String>,
    /// `owner/repo`
    pub repository: Option<String>,
    /// e.g. `refs/pull/42/merge`
    pub git_ref: Option<String>,
    pub api_url: String,
}

impl Default for GitHubContext {
    fn default() -> Self {
        Self {
            token: None,
            repository: None,
            git_ref: None,
            api_url: DEFAULT_API_URL.to_string(),
        }
    }
}

/// Action configuration, built once at start-up
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub checks: CheckFlags,
    pub dry_run: bool,
    pub job_summary: bool,
    pub pr_comments: bool,
    /// File named by `GITHUB_STEP_SUMMARY`
    pub summary_path: String,
    pub github: GitHubContext,
}

impl Config {
    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let flag = |name: &str, default: bool| match lookup(name) {
            Some(value) => value == "true",
            None => default,
        };

        let mut checks = CheckFlags::default();
        for check in Check::ALL {
            checks.set(check, flag(check.env_var(), check.default_enabled()));
        }

        let summary_path =
            lookup("GITHUB_STEP_SUMMARY").ok_or(ConfigError::MissingVar("GITHUB_STEP_SUMMARY"))?;

        let github = GitHubContext {
            token: lookup("GITHUB_TOKEN").filter(|t| !t.is_empty()),
            repository: lookup("GITHUB_REPOSITORY").filter(|r| !r.is_empty()),
            git_ref: lookup("GITHUB_REF"),
            api_url: lookup("GITHUB_API_URL")
                .filter(|u| !u.is_empty())
                .unwrap_or_else(|| DEFAULT_API_URL.to_string()),
        };

        Ok(Self {
            checks,
            dry_run: flag("DRY_RUN", false),
            job_summary: flag("JOB_SUMMARY", false),
            pr_comments: flag("PR_COMMENTS", false),
            summary_path,
            github,
        })
    }

    /// Echo the inputs, one per line
    pub fn log(&self) {
        for check in Check::ALL {
            info!("{} = {}", check.env_var(), self.checks.is_enabled(check));
        }
        info!("DRY_RUN = {}", self.dry_run);
        info!("JOB_SUMMARY = {}", self.job_summary);
        info!("PR_COMMENTS = {}", self.pr_comments);
    }
}
