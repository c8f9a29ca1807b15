//! Traits related to remote git forges
use async_trait::async_trait;
use chrono::{DateTime, Utc};
#[cfg(test)]
use mockall::automock;

use crate::{
    error::Result,
    forge::{
        config::RemoteConfig,
        query::IssueQuery,
        request::{
            ForgeCommit, ForgeIssue, ForgeRelease, GetFileContentRequest,
            IssueSearchResult, ListCommitsRequest,
        },
    },
};

/// Read-only view of the version-control host and issue tracker.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait Forge {
    fn remote_config(&self) -> RemoteConfig;
    /// All releases of the project, newest-first.
    async fn list_releases(&self) -> Result<Vec<ForgeRelease>>;
    /// Commit id currently at the head of `branch`.
    async fn branch_head(&self, branch: &str) -> Result<String>;
    /// Commit time of a tag name or commit id.
    async fn resolve_time(&self, tag_or_sha: &str) -> Result<DateTime<Utc>>;
    /// Commits on a branch inside a time window, in forge order.
    async fn list_commits(
        &self,
        req: ListCommitsRequest,
    ) -> Result<Vec<ForgeCommit>>;
    /// Issue or pull request metadata, or `None` when it does not exist.
    async fn get_issue(&self, number: u64) -> Result<Option<ForgeIssue>>;
    /// Merged pull requests matching `query`, capped at what the forge's
    /// search will return.
    async fn search_issues(&self, query: IssueQuery)
    -> Result<IssueSearchResult>;
    /// File content, or `None` when the file does not exist.
    async fn get_file_content(
        &self,
        req: GetFileContentRequest,
    ) -> Result<Option<String>>;
}
