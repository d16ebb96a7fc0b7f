// SPDX-License-Identifier: AGPL-3.0-or-later

//! Pull request status comment
//!
//! A pull request carries at most one status comment: a comment whose body
//! starts with the success or failure heading. Each run either leaves the
//! newest one alone, edits it, or creates one, and deletes any older
//! duplicates.

use async_trait::async_trait;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::outcome::{CheckOutcome, FAILURE_TITLE, SUCCESS_TITLE};

pub mod github;

pub use github::GitHubCommentClient;

/// Why the comment could not be published
#[derive(Debug, Error)]
pub enum CommentError {
    /// Nothing to talk to; publishing is skipped
    #[error("{0} not set, skipping pull request comment")]
    NotConfigured(&'static str),

    #[error("GITHUB_REF not set")]
    MissingRef,

    #[error("cannot determine pull request number from ref {0:?}")]
    InvalidRef(String),

    #[error("invalid repository {0:?}, expected owner/repo")]
    InvalidRepository(String),

    #[error("GitHub API request failed: {0}")]
    Api(String),

    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

/// A comment on a pull request, as far as we care
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    pub id: u64,
    pub body: String,
}

/// `owner/repo`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Repository {
    pub owner: String,
    pub name: String,
}

impl Repository {
    pub fn parse(full_name: &str) -> Result<Self, CommentError> {
        match full_name.split_once('/') {
            Some((owner, name)) if !owner.is_empty() && !name.is_empty() && !name.contains('/') => {
                Ok(Self {
                    owner: owner.to_string(),
                    name: name.to_string(),
                })
            }
            _ => Err(CommentError::InvalidRepository(full_name.to_string())),
        }
    }
}

/// Where the status comment goes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub token: String,
    pub api_url: String,
    pub repository: Repository,
    pub pr_number: u64,
}

impl Target {
    pub fn from_config(config: &Config) -> Result<Self, CommentError> {
        let github = &config.github;
        let token = github
            .token
            .clone()
            .ok_or(CommentError::NotConfigured("GITHUB_TOKEN"))?;
        let full_name = github
            .repository
            .as_deref()
            .ok_or(CommentError::NotConfigured("GITHUB_REPOSITORY"))?;
        let git_ref = github
            .git_ref
            .as_deref()
            .ok_or(CommentError::MissingRef)?;

        Ok(Self {
            token,
            api_url: github.api_url.clone(),
            repository: Repository::parse(full_name)?,
            pr_number: pr_number_from_ref(git_ref)?,
        })
    }
}

/// Pull request number from a ref such as `refs/pull/42/merge`
pub fn pr_number_from_ref(git_ref: &str) -> Result<u64, CommentError> {
    let mut segments = git_ref.rsplit('/');
    segments.next();
    segments
        .next()
        .and_then(|segment| segment.parse().ok())
        .ok_or_else(|| CommentError::InvalidRef(git_ref.to_string()))
}

/// Whether a comment body is one of ours
pub fn is_status_comment(body: &str) -> bool {
    body.starts_with(SUCCESS_TITLE) || body.starts_with(FAILURE_TITLE)
}

/// What to do with the newest status comment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentAction {
    /// Already up to date
    Keep(u64),
    Edit(u64),
    Create,
}

/// Mutations needed to leave exactly one up-to-date status comment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentPlan {
    pub action: CommentAction,
    /// Older status comments, in listing order
    pub delete: Vec<u64>,
}

/// Decide how to reconcile existing comments with the new body
///
/// `existing` must be in listing order (oldest first). The last status
/// comment is the current one; every earlier status comment is deleted.
pub fn plan_status_comment(existing: &[Comment], body: &str) -> CommentPlan {
    let (current, delete) = existing
        .iter()
        .filter(|comment| is_status_comment(&comment.body))
        .fold(
            (None::<&Comment>, Vec::new()),
            |(current, mut delete), comment| {
                if let Some(previous) = current {
                    delete.push(previous.id);
                }
                (Some(comment), delete)
            },
        );

    let action = match current {
        Some(comment) if comment.body == body => CommentAction::Keep(comment.id),
        Some(comment) => CommentAction::Edit(comment.id),
        None => CommentAction::Create,
    };

    CommentPlan { action, delete }
}

/// Pull request comment operations
#[async_trait]
pub trait CommentClient: Send + Sync {
    /// All comments on the issue, oldest first
    async fn list_comments(
        &self,
        repo: &Repository,
        issue_number: u64,
    ) -> Result<Vec<Comment>, CommentError>;

    async fn create_comment(
        &self,
        repo: &Repository,
        issue_number: u64,
        body: &str,
    ) -> Result<Comment, CommentError>;

    async fn edit_comment(
        &self,
        repo: &Repository,
        comment_id: u64,
        body: &str,
    ) -> Result<(), CommentError>;

    async fn delete_comment(&self, repo: &Repository, comment_id: u64) -> Result<(), CommentError>;
}

/// Reconcile the pull request's status comment with `outcome`
pub async fn sync_status_comment(
    client: &dyn CommentClient,
    target: &Target,
    outcome: &CheckOutcome,
) -> Result<CommentPlan, CommentError> {
    let repo = &target.repository;
    let pr = target.pr_number;
    let body = outcome.to_markdown();

    let existing = client.list_comments(repo, pr).await?;
    let plan = plan_status_comment(&existing, &body);

    match plan.action {
        CommentAction::Keep(_) => info!("PR comment already up-to-date for PR #{}", pr),
        CommentAction::Edit(id) => {
            info!("Updating the last comment on PR #{}", pr);
            client.edit_comment(repo, id, &body).await?;
        }
        CommentAction::Create => {
            info!("Creating a new comment on PR #{}", pr);
            let comment = client.create_comment(repo, pr, &body).await?;
            info!("Posted comment {} to PR #{}", comment.id, pr);
        }
    }

    for id in &plan.delete {
        info!("Deleting an old comment on PR #{}", pr);
        client.delete_comment(repo, *id).await?;
    }

    Ok(plan)
}

/// Publish the status comment if enabled
///
/// Never fails: every error becomes a code. Returns 0 when disabled, not
/// configured, or passing; 1 on failure content or any error.
pub async fn publish<F>(config: &Config, outcome: &CheckOutcome, connect: F) -> i32
where
    F: FnOnce(&Target) -> Result<Box<dyn CommentClient>, CommentError>,
{
    if !config.pr_comments {
        return 0;
    }

    let result = async {
        let target = Target::from_config(config)?;
        let client = connect(&target)?;
        sync_status_comment(client.as_ref(), &target, outcome).await
    }
    .await;

    match result {
        Ok(_) if outcome.is_failure() => 1,
        Ok(_) => 0,
        Err(e @ CommentError::NotConfigured(_)) => {
            warn!("{}", e);
            0
        }
        Err(e) => {
            error!("Error posting PR comment: {}", e);
            1
        }
    }
}
