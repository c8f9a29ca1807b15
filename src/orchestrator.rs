//! Runs the changelog pipeline: range resolution, commit walk, pull request
//! extraction, note correlation and assembly.
use chrono::{DateTime, Duration, Utc};
use log::*;

use crate::{
    changelog::{self, AssembleParams, RepoReportParams},
    config::RelnotesConfig,
    error::Result,
    extract::extract_pr_numbers,
    forge::{
        manager::ForgeManager,
        query::{IssueQuery, SortField, SortOrder, format_time},
        request::{ForgeCommit, GetFileContentRequest, ListCommitsRequest},
    },
    notes::{filter_release_noteworthy, index_issues},
    range::{self, TagRange},
    release_index::ReleaseIndex,
    version::{self, BranchVersion, VersionKind},
};

/// Result of a changelog run.
#[derive(Debug, Clone)]
pub struct ReleaseNotes {
    pub range: TagRange,
    /// Whether the range ends on a dot-zero release.
    pub is_major: bool,
    /// Release-note-worthy pull requests in extraction order.
    pub pr_numbers: Vec<u64>,
    /// Ordered changelog sections.
    pub sections: Vec<String>,
}

impl ReleaseNotes {
    pub fn to_markdown(&self) -> String {
        format!("{}\n", self.sections.join("\n\n"))
    }
}

/// Search-based collection of release notes across repositories of the
/// configured owner.
#[derive(Debug, Clone, Default)]
pub struct CollectRequest {
    /// Repository names. Empty means the configured repository.
    pub repos: Vec<String>,
    /// Version printed in each report header.
    pub version: String,
    pub merged_after: Option<DateTime<Utc>>,
    pub merged_before: Option<DateTime<Utc>>,
    pub sort: Option<SortField>,
    pub order: SortOrder,
}

/// Rendered release note report for one repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoReport {
    pub repo: String,
    pub report: String,
}

pub struct Orchestrator {
    config: RelnotesConfig,
    forge: ForgeManager,
}

impl Orchestrator {
    pub fn new(config: RelnotesConfig, forge: ForgeManager) -> Self {
        Self { config, forge }
    }

    /// Last release per branch, built from every release of the project.
    pub async fn release_index(&self) -> Result<ReleaseIndex> {
        let releases = self.forge.list_releases().await?;
        info!("found {} releases", releases.len());

        let index = ReleaseIndex::build_unordered(releases);
        if index.is_empty() {
            warn!("no release could be mapped onto a branch");
        } else {
            info!("indexed last releases of {} branches", index.len());
        }

        Ok(index)
    }

    /// Resolves `user_range` (`[[START..]END]`) for the configured branch.
    /// The forge is only asked for the branch head and releases when the
    /// range leaves them open.
    pub async fn resolve_range(&self, user_range: &str) -> Result<TagRange> {
        let branch_head = if range::needs_branch_head(user_range) {
            self.forge.branch_head(&self.config.branch).await?
        } else {
            String::new()
        };

        let index = if range::needs_release_index(user_range) {
            self.release_index().await?
        } else {
            ReleaseIndex::default()
        };

        range::resolve(&self.config.branch, user_range, &index, &branch_head)
    }

    /// Commits on the configured branch after `range.start` up to and
    /// including `range.end`, in forge order.
    pub async fn walk_commits(
        &self,
        range: &TagRange,
    ) -> Result<Vec<ForgeCommit>> {
        let since = self.forge.resolve_time(&range.start).await?;
        let until = self.forge.resolve_time(&range.end).await?;

        let commits = self
            .forge
            .list_commits(ListCommitsRequest {
                branch: self.config.branch.clone(),
                since: since + Duration::seconds(1),
                until,
            })
            .await?;

        info!("found {} commits in {range}", commits.len());

        Ok(commits)
    }

    /// Produces the changelog sections for `user_range`.
    pub async fn generate(&self, user_range: &str) -> Result<ReleaseNotes> {
        let range = self.resolve_range(user_range).await?;
        let commits = self.walk_commits(&range).await?;

        let extracted = extract_pr_numbers(&commits)?;
        info!("extracted {} pull requests from commits", extracted.len());

        let issues = index_issues(self.forge.get_issues(&extracted).await?);
        let pr_numbers =
            filter_release_noteworthy(&extracted, &issues, &self.config.label);

        info!(
            "{} of {} pull requests carry the {} label",
            pr_numbers.len(),
            extracted.len(),
            self.config.label
        );

        let is_major = version::classify(&range.end, VersionKind::DotZero);

        let (draft, changelog) = if is_major {
            self.fetch_major_release_documents(&range).await?
        } else {
            (None, None)
        };

        let sections = changelog::assemble(AssembleParams {
            is_major,
            range: &range,
            pr_numbers: &pr_numbers,
            issues: &issues,
            draft: draft.as_deref(),
            changelog: changelog.as_deref(),
        })?;

        Ok(ReleaseNotes {
            range,
            is_major,
            pr_numbers,
            sections,
        })
    }

    async fn fetch_major_release_documents(
        &self,
        range: &TagRange,
    ) -> Result<(Option<String>, Option<String>)> {
        let draft = match BranchVersion::parse(&range.end) {
            Some(version) => {
                let path = self.config.draft_path_for(&version.major_minor);
                info!("looking for release notes draft at {path}");
                self.forge
                    .get_file_content(GetFileContentRequest { path })
                    .await?
            }
            None => None,
        };

        let changelog = self
            .forge
            .get_file_content(GetFileContentRequest {
                path: self.config.changelog_path.clone(),
            })
            .await?;

        Ok((draft, changelog))
    }

    /// Searches each repository for merged pull requests carrying the
    /// configured label inside the requested merge window. A repository
    /// whose search fails is logged and left out.
    pub async fn collect(&self, req: &CollectRequest) -> Vec<RepoReport> {
        let repos = if req.repos.is_empty() {
            vec![self.config.repo.clone()]
        } else {
            req.repos.clone()
        };

        let mut reports = vec![];

        for repo in repos {
            info!("start fetching release notes from {repo}");

            match self.collect_repo(&repo, req).await {
                Ok(report) => reports.push(RepoReport { repo, report }),
                Err(err) => {
                    error!("failed to get release notes for {repo}: {err}")
                }
            }
        }

        reports
    }

    async fn collect_repo(
        &self,
        repo: &str,
        req: &CollectRequest,
    ) -> Result<String> {
        let search = self
            .forge
            .search_issues(IssueQuery {
                owner: self.config.owner.clone(),
                repo: repo.to_string(),
                label: self.config.label.clone(),
                merged_after: req.merged_after,
                merged_before: req.merged_before,
                sort: req.sort,
                order: req.order,
            })
            .await?;

        info!(
            "{repo}: {} of {} matching pull requests fetched",
            search.issues.len(),
            search.total
        );

        changelog::repo_report(RepoReportParams {
            owner: &self.config.owner,
            repo,
            version: &req.version,
            start_date: &format_time(req.merged_after),
            end_date: &format_time(req.merged_before),
            search: &search,
        })
    }
}
