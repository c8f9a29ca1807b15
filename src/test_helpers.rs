//! Common test helper functions shared across test modules.
use chrono::{DateTime, Utc};
use secrecy::SecretString;

use crate::{
    forge::{
        config::RemoteConfig,
        request::{ForgeCommit, ForgeIssue, ForgeRelease},
    },
    range::TagRange,
    release_index::ReleaseIndex,
};

/// Creates a test RemoteConfig with sensible defaults.
pub fn create_test_remote_config() -> RemoteConfig {
    RemoteConfig {
        host: "github.com".to_string(),
        scheme: "https".to_string(),
        owner: "test".to_string(),
        repo: "repo".to_string(),
        path: "test/repo".to_string(),
        token: SecretString::from("test-token".to_string()),
    }
}

/// Creates a release without a publish time.
pub fn create_test_release(tag: &str, draft: bool) -> ForgeRelease {
    ForgeRelease {
        tag: tag.to_string(),
        draft,
        published_at: None,
    }
}

/// Creates a non-draft release published `secs` seconds after the epoch.
pub fn create_test_release_at(tag: &str, secs: i64) -> ForgeRelease {
    ForgeRelease {
        published_at: DateTime::<Utc>::from_timestamp(secs, 0),
        ..create_test_release(tag, false)
    }
}

/// Creates an index directly from (branch, tag) pairs.
pub fn create_test_index(entries: &[(&str, &str)]) -> ReleaseIndex {
    entries
        .iter()
        .map(|(branch, tag)| (branch.to_string(), tag.to_string()))
        .collect()
}

/// Creates one commit per message with ids `c0`, `c1`, ...
pub fn create_test_commits(messages: &[&str]) -> Vec<ForgeCommit> {
    messages
        .iter()
        .enumerate()
        .map(|(i, message)| ForgeCommit {
            id: format!("c{i}"),
            message: message.to_string(),
        })
        .collect()
}

/// Creates an issue authored by `octocat`.
pub fn create_test_issue(
    number: u64,
    title: &str,
    body: &str,
    labels: &[&str],
) -> ForgeIssue {
    ForgeIssue {
        number,
        labels: labels.iter().map(|l| l.to_string()).collect(),
        title: title.to_string(),
        body: body.to_string(),
        author: "octocat".to_string(),
    }
}

pub fn create_test_range(start: &str, end: &str) -> TagRange {
    TagRange {
        start: start.to_string(),
        end: end.to_string(),
    }
}
