//! Manager that wraps forge implementations
use chrono::{DateTime, Utc};
use log::*;

use crate::{
    error::{RelnotesError, Result, Stage},
    forge::{
        config::RemoteConfig,
        query::IssueQuery,
        request::{
            ForgeCommit, ForgeIssue, ForgeRelease, GetFileContentRequest,
            IssueSearchResult, ListCommitsRequest,
        },
        traits::Forge,
    },
};

/// Front for a [`Forge`] that logs each call and tags failures with the
/// stage and identifier they occurred on.
pub struct ForgeManager {
    forge: Box<dyn Forge>,
    remote_config: RemoteConfig,
}

impl ForgeManager {
    pub fn new(forge: Box<dyn Forge>) -> Self {
        let remote_config = forge.remote_config();
        Self {
            forge,
            remote_config,
        }
    }

    fn project(&self) -> String {
        format!("{}/{}", self.remote_config.owner, self.remote_config.repo)
    }

    pub async fn list_releases(&self) -> Result<Vec<ForgeRelease>> {
        let project = self.project();
        debug!("listing releases for {project}");
        self.forge
            .list_releases()
            .await
            .map_err(|e| RelnotesError::collaborator(Stage::ListReleases, project, e))
    }

    pub async fn branch_head(&self, branch: &str) -> Result<String> {
        debug!("resolving head of branch {branch}");
        self.forge
            .branch_head(branch)
            .await
            .map_err(|e| RelnotesError::collaborator(Stage::BranchHead, branch, e))
    }

    pub async fn resolve_time(&self, tag_or_sha: &str) -> Result<DateTime<Utc>> {
        debug!("resolving commit time of {tag_or_sha}");
        self.forge.resolve_time(tag_or_sha).await.map_err(|e| {
            RelnotesError::collaborator(Stage::ResolveTime, tag_or_sha, e)
        })
    }

    pub async fn list_commits(
        &self,
        req: ListCommitsRequest,
    ) -> Result<Vec<ForgeCommit>> {
        debug!(
            "listing commits on {} between {} and {}",
            req.branch, req.since, req.until
        );
        let branch = req.branch.clone();
        self.forge
            .list_commits(req)
            .await
            .map_err(|e| RelnotesError::collaborator(Stage::ListCommits, branch, e))
    }

    /// Metadata for each of `numbers` that exists on the forge, in the
    /// order given.
    pub async fn get_issues(&self, numbers: &[u64]) -> Result<Vec<ForgeIssue>> {
        debug!("fetching metadata for {} pull requests", numbers.len());
        let mut issues = vec![];

        for number in numbers {
            let issue = self.forge.get_issue(*number).await.map_err(|e| {
                RelnotesError::collaborator(
                    Stage::ListIssues,
                    format!("#{number}"),
                    e,
                )
            })?;

            match issue {
                Some(issue) => issues.push(issue),
                None => warn!("PR #{number} not found on the forge"),
            }
        }

        Ok(issues)
    }

    pub async fn search_issues(
        &self,
        query: IssueQuery,
    ) -> Result<IssueSearchResult> {
        let project = self.project();
        let result = self
            .forge
            .search_issues(query)
            .await
            .map_err(|e| RelnotesError::collaborator(Stage::ListIssues, project, e))?;

        if result.incomplete {
            warn!(
                "some release notes may be missing: incomplete search result from the forge"
            );
        }

        Ok(result)
    }

    pub async fn get_file_content(
        &self,
        req: GetFileContentRequest,
    ) -> Result<Option<String>> {
        let path = req.path.clone();
        debug!("fetching file {path}");
        self.forge
            .get_file_content(req)
            .await
            .map_err(|e| RelnotesError::collaborator(Stage::FetchFile, path, e))
    }
}
