//! Search query construction for the forge's issue search.
use chrono::{DateTime, Utc};
use clap::ValueEnum;
use log::*;
use std::fmt;

/// Appends a `key:value` part built from `parts` to `query`. The first
/// element is the key and the rest are concatenated into the value. Fewer
/// than two parts, or any empty part, leaves the query unchanged.
pub fn add_query(mut query: Vec<String>, parts: &[&str]) -> Vec<String> {
    if parts.len() < 2 {
        warn!("not enough parts to form a query: {:?}", parts);
        return query;
    }

    if parts.iter().any(|p| p.is_empty()) {
        return query;
    }

    query.push(format!("{}:{}", parts[0], parts[1..].concat()));
    query
}

/// Field search results are sorted by. Unsorted searches use best match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SortField {
    Comments,
    Created,
    Updated,
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortField::Comments => f.write_str("comments"),
            SortField::Created => f.write_str("created"),
            SortField::Updated => f.write_str("updated"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortOrder::Asc => f.write_str("asc"),
            SortOrder::Desc => f.write_str("desc"),
        }
    }
}

/// Search for merged pull requests carrying a label, optionally bounded by
/// merge time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueQuery {
    pub owner: String,
    pub repo: String,
    pub label: String,
    pub merged_after: Option<DateTime<Utc>>,
    pub merged_before: Option<DateTime<Utc>>,
    pub sort: Option<SortField>,
    pub order: SortOrder,
}

impl IssueQuery {
    pub fn parts(&self) -> Vec<String> {
        let repo = format!("{}/{}", self.owner, self.repo);
        let after = format_time(self.merged_after);
        let before = format_time(self.merged_before);

        let mut query = vec![];
        query = add_query(query, &["repo", &repo]);
        query = add_query(query, &["label", &self.label]);
        query = add_query(query, &["is", "merged"]);
        query = add_query(query, &["type", "pr"]);
        query = add_query(query, &["merged", ">", &after]);
        query = add_query(query, &["merged", "<", &before]);
        query
    }

    pub fn to_query_string(&self) -> String {
        self.parts().join(" ")
    }
}

pub fn format_time(time: Option<DateTime<Utc>>) -> String {
    time.map(|t| t.format("%Y-%m-%dT%H:%M:%SZ").to_string())
        .unwrap_or_default()
}
