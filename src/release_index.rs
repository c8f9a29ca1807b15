//! Mapping from branch name to the last release tag shipped from it.
use log::*;
use serde::Serialize;
use std::{cmp::Reverse, collections::BTreeMap};

use crate::{forge::request::ForgeRelease, version::BranchVersion};

/// Branch that receives the newest alpha or dot-zero release.
pub const MASTER_BRANCH: &str = "master";

/// Pre-release marker of releases that only ever belong to master.
const ALPHA_MARKER: &str = "-alpha";

/// Last known release tag per branch. Each slot is assigned once while
/// walking releases newest-first, so the first qualifying release wins.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReleaseIndex {
    branches: BTreeMap<String, String>,
}

impl ReleaseIndex {
    /// Builds the index from releases already ordered newest-first.
    pub fn build(releases: &[ForgeRelease]) -> Self {
        let mut index = Self::default();

        for release in releases.iter() {
            if release.draft {
                debug!("skipping draft release: {}", release.tag);
                continue;
            }

            if release.tag.contains(ALPHA_MARKER) {
                index.assign(MASTER_BRANCH, &release.tag);
                continue;
            }

            let Some(version) = BranchVersion::parse(&release.tag) else {
                debug!("skipping unparsable release tag: {}", release.tag);
                continue;
            };

            if version.is_patch_zero() {
                index.assign(MASTER_BRANCH, &release.tag);
            }

            index.assign(&version.branch_name(), &release.tag);
        }

        index
    }

    /// Orders releases newest-first by publish time before building. Releases
    /// without a publish time keep their relative order after the others.
    pub fn build_unordered(mut releases: Vec<ForgeRelease>) -> Self {
        let unpublished =
            releases.iter().filter(|r| r.published_at.is_none()).count();

        if unpublished > 0 {
            debug!(
                "{unpublished} releases have no publish time: keeping forge order for them"
            );
        }

        releases.sort_by_key(|r| {
            (r.published_at.is_none(), Reverse(r.published_at))
        });

        Self::build(&releases)
    }

    fn assign(&mut self, branch: &str, tag: &str) {
        if self.branches.contains_key(branch) {
            return;
        }
        debug!("last release for {branch}: {tag}");
        self.branches.insert(branch.to_string(), tag.to_string());
    }

    pub fn get(&self, branch: &str) -> Option<&str> {
        self.branches.get(branch).map(|t| t.as_str())
    }

    pub fn len(&self) -> usize {
        self.branches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.branches.is_empty()
    }
}

impl FromIterator<(String, String)> for ReleaseIndex {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            branches: iter.into_iter().collect(),
        }
    }
}
