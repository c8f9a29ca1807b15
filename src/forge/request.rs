use chrono::{DateTime, Utc};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// Release as published on the forge.
pub struct ForgeRelease {
    pub tag: String,
    pub draft: bool,
    pub published_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// Represents a normalized commit returned from any forge
pub struct ForgeCommit {
    pub id: String,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// Issue or pull request metadata.
pub struct ForgeIssue {
    pub number: u64,
    pub labels: Vec<String>,
    pub title: String,
    pub body: String,
    pub author: String,
}

impl ForgeIssue {
    pub fn has_label(&self, label: &str) -> bool {
        self.labels.iter().any(|l| l == label)
    }
}

#[derive(Debug, Clone, Default)]
/// Issues returned by a search along with the forge's completeness flag.
pub struct IssueSearchResult {
    pub issues: Vec<ForgeIssue>,
    /// Number of matches the forge reported, which may exceed `issues`.
    pub total: u64,
    pub incomplete: bool,
}

#[derive(Debug, Clone)]
/// Request to list a branch's commits inside a time window.
pub struct ListCommitsRequest {
    pub branch: String,
    pub since: DateTime<Utc>,
    pub until: DateTime<Utc>,
}

#[derive(Debug, Clone)]
/// Request to get a file's content from the default branch.
pub struct GetFileContentRequest {
    pub path: String,
}
