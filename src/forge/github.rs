//! Implements the Forge trait for Github
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::*;
use octocrab::Octocrab;
use serde::{Deserialize, Serialize};

use crate::{
    error::{RelnotesError, Result},
    forge::{
        config::{DEFAULT_PAGE_SIZE, RemoteConfig, SEARCH_RESULT_CAP},
        paging::{Page, collect_pages},
        query::IssueQuery,
        request::{
            ForgeCommit, ForgeIssue, ForgeRelease, GetFileContentRequest,
            IssueSearchResult, ListCommitsRequest,
        },
        traits::Forge,
    },
};

#[derive(Debug, Deserialize)]
struct GithubRelease {
    tag_name: String,
    #[serde(default)]
    draft: bool,
    published_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
struct GithubSignature {
    date: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
struct GithubCommitDetail {
    message: String,
    committer: Option<GithubSignature>,
}

#[derive(Debug, Deserialize)]
struct GithubCommit {
    sha: String,
    commit: GithubCommitDetail,
}

#[derive(Debug, Deserialize)]
struct GithubBranchCommit {
    sha: String,
}

#[derive(Debug, Deserialize)]
struct GithubBranch {
    commit: GithubBranchCommit,
}

#[derive(Debug, Deserialize)]
struct GithubLabel {
    name: String,
}

#[derive(Debug, Deserialize)]
struct GithubUser {
    login: String,
}

#[derive(Debug, Deserialize)]
struct GithubIssue {
    number: u64,
    title: String,
    body: Option<String>,
    #[serde(default)]
    labels: Vec<GithubLabel>,
    user: Option<GithubUser>,
}

#[derive(Debug, Deserialize)]
struct GithubSearchResult {
    total_count: u64,
    #[serde(default)]
    incomplete_results: bool,
    items: Vec<GithubIssue>,
}

#[derive(Debug, Serialize)]
struct PageParams {
    per_page: u8,
    page: u32,
}

#[derive(Debug, Serialize)]
struct CommitParams {
    sha: String,
    since: String,
    until: String,
    per_page: u8,
    page: u32,
}

#[derive(Debug, Serialize)]
struct SearchParams<'a> {
    q: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    sort: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    order: Option<&'a str>,
    per_page: u8,
    page: u32,
}

impl From<GithubRelease> for ForgeRelease {
    fn from(release: GithubRelease) -> Self {
        Self {
            tag: release.tag_name,
            draft: release.draft,
            published_at: release.published_at,
        }
    }
}

impl From<GithubIssue> for ForgeIssue {
    fn from(issue: GithubIssue) -> Self {
        Self {
            number: issue.number,
            labels: issue.labels.into_iter().map(|l| l.name).collect(),
            title: issue.title,
            body: issue.body.unwrap_or_default(),
            author: issue.user.map(|u| u.login).unwrap_or_default(),
        }
    }
}

/// GitHub forge implementation using Octocrab for API interactions with
/// releases, commit history and pull requests.
pub struct Github {
    config: RemoteConfig,
    instance: Octocrab,
}

impl Github {
    /// Create GitHub client with personal access token authentication and API
    /// base URL configuration.
    pub async fn new(config: RemoteConfig) -> Result<Self> {
        let base_uri = format!("{}://api.{}", config.scheme, config.host);
        let builder = Octocrab::builder()
            .personal_token(config.token.clone())
            .base_uri(base_uri)?;
        let instance = builder.build()?;

        Ok(Self { config, instance })
    }

    fn repo_route(&self, suffix: &str) -> String {
        format!("/repos/{}/{}/{}", self.config.owner, self.config.repo, suffix)
    }
}

#[async_trait]
impl Forge for Github {
    fn remote_config(&self) -> RemoteConfig {
        self.config.clone()
    }

    async fn list_releases(&self) -> Result<Vec<ForgeRelease>> {
        let route = self.repo_route("releases");
        let route = route.as_str();
        let instance = &self.instance;

        let paged = collect_pages(None, move |page| async move {
            let params = PageParams {
                per_page: DEFAULT_PAGE_SIZE,
                page,
            };
            let result: Vec<GithubRelease> =
                instance.get(route, Some(&params)).await?;
            Ok::<_, RelnotesError>(Page::new(result))
        })
        .await?;

        Ok(paged.items.into_iter().map(ForgeRelease::from).collect())
    }

    async fn branch_head(&self, branch: &str) -> Result<String> {
        let route = self.repo_route(&format!("branches/{branch}"));
        let result: GithubBranch =
            self.instance.get(&route, None::<&()>).await?;
        Ok(result.commit.sha)
    }

    async fn resolve_time(&self, tag_or_sha: &str) -> Result<DateTime<Utc>> {
        let route = self.repo_route(&format!("commits/{tag_or_sha}"));
        let result: GithubCommit =
            self.instance.get(&route, None::<&()>).await?;

        result
            .commit
            .committer
            .and_then(|c| c.date)
            .ok_or_else(|| {
                RelnotesError::forge(format!(
                    "no committer date found for {tag_or_sha}"
                ))
            })
    }

    async fn list_commits(
        &self,
        req: ListCommitsRequest,
    ) -> Result<Vec<ForgeCommit>> {
        let route = self.repo_route("commits");
        let route = route.as_str();
        let instance = &self.instance;
        let req = &req;

        let paged = collect_pages(None, move |page| async move {
            let params = CommitParams {
                sha: req.branch.clone(),
                since: req.since.to_rfc3339(),
                until: req.until.to_rfc3339(),
                per_page: DEFAULT_PAGE_SIZE,
                page,
            };
            let result: Vec<GithubCommit> =
                instance.get(route, Some(&params)).await?;
            Ok::<_, RelnotesError>(Page::new(result))
        })
        .await?;

        Ok(paged
            .items
            .into_iter()
            .map(|c| ForgeCommit {
                id: c.sha,
                message: c.commit.message,
            })
            .collect())
    }

    async fn get_issue(&self, number: u64) -> Result<Option<ForgeIssue>> {
        let route = self.repo_route(&format!("issues/{number}"));

        let result: octocrab::Result<GithubIssue> =
            self.instance.get(&route, None::<&()>).await;

        match result {
            Ok(issue) => Ok(Some(issue.into())),
            Err(err) if is_not_found(&err) => {
                debug!("no issue found for #{number}");
                Ok(None)
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn search_issues(
        &self,
        query: IssueQuery,
    ) -> Result<IssueSearchResult> {
        let q = query.to_query_string();
        info!("searching issues: {q}");

        let sort = query.sort.map(|s| s.to_string());
        let order = query.sort.map(|_| query.order.to_string());
        let (q, sort, order) = (q.as_str(), sort.as_deref(), order.as_deref());
        let instance = &self.instance;

        let fetch = move |page| async move {
            let params = SearchParams {
                q,
                sort,
                order,
                per_page: DEFAULT_PAGE_SIZE,
                page,
            };
            let result: GithubSearchResult =
                instance.get("/search/issues", Some(&params)).await?;
            Ok::<_, RelnotesError>(Page {
                items: result.items,
                total: Some(result.total_count),
                incomplete: result.incomplete_results,
            })
        };

        let paged = collect_pages(Some(SEARCH_RESULT_CAP), fetch).await?;

        Ok(IssueSearchResult {
            total: paged.total.unwrap_or(paged.items.len() as u64),
            incomplete: paged.incomplete,
            issues: paged.items.into_iter().map(ForgeIssue::from).collect(),
        })
    }

    async fn get_file_content(
        &self,
        req: GetFileContentRequest,
    ) -> Result<Option<String>> {
        let path = req.path;
        let repos = self.instance.repos(&self.config.owner, &self.config.repo);

        match repos.get_content().path(&path).send().await {
            Err(err) if is_not_found(&err) => {
                info!("no file found for path: {path}");
                Ok(None)
            }
            Err(err) => {
                let msg = format!(
                    "encountered error getting file contents for path: {path}: {err}"
                );
                error!("{msg}");
                Err(RelnotesError::forge(msg))
            }
            Ok(mut data) => {
                let items = data.take_items();

                if items.is_empty() {
                    info!("no file found for path: {path}");
                    return Ok(None);
                }

                if let Some(content) = items[0].decoded_content() {
                    Ok(Some(content))
                } else {
                    Err(RelnotesError::forge(format!(
                        "failed to decode file content for path: {path}"
                    )))
                }
            }
        }
    }
}

fn is_not_found(err: &octocrab::Error) -> bool {
    matches!(
        err,
        octocrab::Error::GitHub { source, .. }
            if source.status_code.as_u16() == 404
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_release_payload() {
        let json = r#"[
          {"tag_name": "v1.8.0", "draft": false, "published_at": "2017-09-28T22:13:57Z"},
          {"tag_name": "v1.9.0-alpha.1", "draft": true, "published_at": null}
        ]"#;

        let releases: Vec<GithubRelease> = serde_json::from_str(json).unwrap();
        let releases: Vec<ForgeRelease> =
            releases.into_iter().map(ForgeRelease::from).collect();

        assert_eq!(releases[0].tag, "v1.8.0");
        assert!(!releases[0].draft);
        assert!(releases[0].published_at.is_some());
        assert_eq!(releases[1].tag, "v1.9.0-alpha.1");
        assert!(releases[1].draft);
        assert!(releases[1].published_at.is_none());
    }

    #[test]
    fn converts_search_payload() {
        let json = r#"{
          "total_count": 2,
          "incomplete_results": true,
          "items": [
            {
              "number": 51234,
              "title": "Fix flaky test",
              "body": null,
              "labels": [{"name": "release-note"}, {"name": "kind/bug"}],
              "user": {"login": "octocat"}
            },
            {"number": 51235, "title": "Docs", "body": "text"}
          ]
        }"#;

        let result: GithubSearchResult = serde_json::from_str(json).unwrap();
        assert!(result.incomplete_results);

        let issues: Vec<ForgeIssue> =
            result.items.into_iter().map(ForgeIssue::from).collect();

        assert_eq!(issues[0].number, 51234);
        assert!(issues[0].has_label("release-note"));
        assert_eq!(issues[0].body, "");
        assert_eq!(issues[0].author, "octocat");
        assert!(issues[1].labels.is_empty());
        assert_eq!(issues[1].author, "");
    }

    #[test]
    fn reads_committer_date_from_commit_payload() {
        let json = r#"{
          "sha": "abc123",
          "commit": {
            "message": "Merge pull request #100 from x/y",
            "committer": {"name": "bot", "date": "2017-09-01T10:00:00Z"}
          }
        }"#;

        let commit: GithubCommit = serde_json::from_str(json).unwrap();
        assert_eq!(commit.sha, "abc123");
        assert!(commit.commit.committer.and_then(|c| c.date).is_some());
    }

    #[test]
    fn search_params_send_sort_only_when_set() {
        let params = SearchParams {
            q: "repo:o/r is:merged",
            sort: None,
            order: None,
            per_page: DEFAULT_PAGE_SIZE,
            page: 2,
        };
        let value = serde_json::to_value(&params).unwrap();
        assert!(value.get("sort").is_none());
        assert!(value.get("order").is_none());
        assert_eq!(value["page"], 2);

        let params = SearchParams {
            sort: Some("created"),
            order: Some("asc"),
            ..params
        };
        let value = serde_json::to_value(&params).unwrap();
        assert_eq!(value["sort"], "created");
        assert_eq!(value["order"], "asc");
    }

    #[test]
    fn converts_single_issue_payload() {
        let json = r#"{
          "number": 100,
          "title": "Fix flaky test",
          "body": "```release-note\nFix flake\n```",
          "labels": [{"name": "release-note"}],
          "user": {"login": "octocat"},
          "pull_request": {"url": "https://api.github.com/repos/o/r/pulls/100"}
        }"#;

        let issue: ForgeIssue =
            serde_json::from_str::<GithubIssue>(json).unwrap().into();

        assert_eq!(issue.number, 100);
        assert!(issue.has_label("release-note"));
        assert_eq!(issue.body, "```release-note\nFix flake\n```");
    }
}
