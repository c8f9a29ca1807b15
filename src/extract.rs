//! Recovery of pull request numbers from commit messages.
use log::*;
use regex::Regex;
use std::{collections::HashSet, sync::LazyLock};

use crate::{
    error::{RelnotesError, Result},
    forge::request::ForgeCommit,
};

static CHERRY_PICK_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"automated-cherry-pick-of-((?:#[0-9]+-+)+)").unwrap()
});

static CHERRY_PICK_REF_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"#([0-9]+)-").unwrap());

static MERGE_PR_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^Merge pull request #([0-9]+) from").unwrap());

/// Pull request references found in a single commit message. A cherry-pick
/// marker takes precedence over the merge subject that usually carries it.
pub fn commit_references(message: &str) -> Vec<&str> {
    if let Some(caps) = CHERRY_PICK_REGEX.captures(message)
        && let Some(refs) = caps.get(1)
    {
        return CHERRY_PICK_REF_REGEX
            .captures_iter(refs.as_str())
            .filter_map(|c| c.get(1).map(|m| m.as_str()))
            .collect();
    }

    if let Some(caps) = MERGE_PR_REGEX.captures(message)
        && let Some(pr) = caps.get(1)
    {
        return vec![pr.as_str()];
    }

    vec![]
}

/// Extracts pull request numbers from `commits`, keeping the first
/// occurrence of each number in commit order.
pub fn extract_pr_numbers(commits: &[ForgeCommit]) -> Result<Vec<u64>> {
    let mut seen: HashSet<u64> = HashSet::new();
    let mut numbers: Vec<u64> = vec![];

    for commit in commits.iter() {
        for reference in commit_references(&commit.message) {
            let number = reference.parse::<u64>().map_err(|source| {
                RelnotesError::MalformedCommitReference {
                    commit: commit.id.clone(),
                    reference: reference.to_string(),
                    source,
                }
            })?;

            if seen.insert(number) {
                debug!("commit {} references PR #{number}", commit.id);
                numbers.push(number);
            }
        }
    }

    Ok(numbers)
}
