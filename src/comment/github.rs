// SPDX-License-Identifier: AGPL-3.0-or-later

//! GitHub issue comments over the REST API

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{Comment, CommentClient, CommentError, Repository, Target};

const PER_PAGE: usize = 100;

#[derive(Debug, Serialize)]
struct CommentBody<'a> {
    body: &'a str,
}

#[derive(Debug, Deserialize)]
struct IssueComment {
    id: u64,
    body: Option<String>,
}

impl From<IssueComment> for Comment {
    fn from(comment: IssueComment) -> Self {
        Comment {
            id: comment.id,
            body: comment.body.unwrap_or_default(),
        }
    }
}

/// Token-authenticated GitHub client
pub struct GitHubCommentClient {
    http: Client,
    token: String,
    base_url: String,
}

impl GitHubCommentClient {
    pub fn new(token: impl Into<String>, base_url: impl Into<String>) -> Result<Self, CommentError> {
        let http = Client::builder()
            .user_agent(concat!("commit-check-action/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self::with_http(http, token, base_url))
    }

    fn with_http(http: Client, token: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            http,
            token: token.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Client for a resolved target, boxed for [`super::publish`]
    pub fn connect(target: &Target) -> Result<Box<dyn CommentClient>, CommentError> {
        Ok(Box::new(Self::new(&target.token, &target.api_url)?))
    }

    fn issue_comments_url(&self, repo: &Repository, issue_number: u64) -> String {
        format!(
            "{}/repos/{}/{}/issues/{}/comments",
            self.base_url, repo.owner, repo.name, issue_number
        )
    }

    fn comment_url(&self, repo: &Repository, comment_id: u64) -> String {
        format!(
            "{}/repos/{}/{}/issues/comments/{}",
            self.base_url, repo.owner, repo.name, comment_id
        )
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .bearer_auth(&self.token)
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", "2022-11-28")
    }
}

async fn check_status(response: Response, what: &str) -> Result<Response, CommentError> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    Err(CommentError::Api(format!(
        "Failed to {}: {} - {}",
        what,
        status,
        body.trim()
    )))
}

#[async_trait]
impl CommentClient for GitHubCommentClient {
    async fn list_comments(
        &self,
        repo: &Repository,
        issue_number: u64,
    ) -> Result<Vec<Comment>, CommentError> {
        let url = self.issue_comments_url(repo, issue_number);
        let mut comments = Vec::new();
        let mut page = 1u32;

        loop {
            debug!("Listing comments on #{} (page {})", issue_number, page);

            let response = self
                .authorized(self.http.get(&url))
                .query(&[("per_page", PER_PAGE as u32), ("page", page)])
                .send()
                .await?;
            let batch: Vec<IssueComment> = check_status(response, "list comments")
                .await?
                .json()
                .await?;

            let last_page = batch.len() < PER_PAGE;
            comments.extend(batch.into_iter().map(Comment::from));
            if last_page {
                break;
            }
            page += 1;
        }

        Ok(comments)
    }

    async fn create_comment(
        &self,
        repo: &Repository,
        issue_number: u64,
        body: &str,
    ) -> Result<Comment, CommentError> {
        let response = self
            .authorized(self.http.post(self.issue_comments_url(repo, issue_number)))
            .json(&CommentBody { body })
            .send()
            .await?;

        let comment: IssueComment = check_status(response, "create comment")
            .await?
            .json()
            .await?;
        Ok(comment.into())
    }

    async fn edit_comment(
        &self,
        repo: &Repository,
        comment_id: u64,
        body: &str,
    ) -> Result<(), CommentError> {
        let response = self
            .authorized(self.http.patch(self.comment_url(repo, comment_id)))
            .json(&CommentBody { body })
            .send()
            .await?;

        check_status(response, "edit comment").await?;
        Ok(())
    }

    async fn delete_comment(&self, repo: &Repository, comment_id: u64) -> Result<(), CommentError> {
        let response = self
            .authorized(self.http.delete(self.comment_url(repo, comment_id)))
            .send()
            .await?;

        check_status(response, "delete comment").await?;
        Ok(())
    }
}
