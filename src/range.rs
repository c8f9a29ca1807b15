//! Resolution of a user supplied `[[START..]END]` range into concrete start
//! and end points.
use log::*;
use regex::Regex;
use std::{fmt, sync::LazyLock};

use crate::{
    error::{RelnotesError, Result},
    release_index::{MASTER_BRANCH, ReleaseIndex},
};

static RANGE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^([v0-9.]*-*(?:alpha|beta|rc)*\.*[0-9]*)\.\.([v0-9.]*-*(?:alpha|beta|rc)*\.*[0-9]*)$",
    )
    .unwrap()
});

/// Two-sided `START..END` expression. Either side may be empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeExpr {
    pub start: String,
    pub end: String,
}

impl RangeExpr {
    /// Parses `START..END` where both sides are version-like tokens. Returns
    /// `None` for anything else, including a bare end tag.
    pub fn parse(input: &str) -> Option<Self> {
        let caps = RANGE_REGEX.captures(input)?;

        Some(Self {
            start: caps.get(1)?.as_str().to_string(),
            end: caps.get(2)?.as_str().to_string(),
        })
    }
}

/// Concrete range of history a changelog covers. Both ends are non-empty
/// and may be tag names or commit ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagRange {
    pub start: String,
    pub end: String,
}

impl fmt::Display for TagRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// Last release for `branch`, falling back to its parent branch (last
/// `.`-segment removed) and then to master.
pub fn last_release_for(branch: &str, index: &ReleaseIndex) -> Option<String> {
    if let Some(tag) = index.get(branch) {
        return Some(tag.to_string());
    }

    if let Some(idx) = branch.rfind('.') {
        let parent = &branch[..idx];
        if let Some(tag) = index.get(parent) {
            debug!("using last release of parent branch {parent}: {tag}");
            return Some(tag.to_string());
        }
    }

    index.get(MASTER_BRANCH).map(|tag| {
        debug!("using last release of {MASTER_BRANCH}: {tag}");
        tag.to_string()
    })
}

/// Whether resolving `user_range` needs the release index, i.e. whether it
/// is a bare end tag rather than a `START..END` expression.
pub fn needs_release_index(user_range: &str) -> bool {
    RangeExpr::parse(user_range).is_none()
}

/// Whether resolving `user_range` needs the branch head, i.e. whether its
/// end is left open.
pub fn needs_branch_head(user_range: &str) -> bool {
    match RangeExpr::parse(user_range) {
        Some(expr) => expr.end.is_empty(),
        None => user_range.is_empty(),
    }
}

/// Resolves `user_range` for `branch` into a concrete range. The start of a
/// bare end tag comes from the release index, while a `START..END`
/// expression is taken as written. A missing end defaults to `branch_head`.
pub fn resolve(
    branch: &str,
    user_range: &str,
    index: &ReleaseIndex,
    branch_head: &str,
) -> Result<TagRange> {
    let (start, end) = match RangeExpr::parse(user_range) {
        Some(expr) => (expr.start, expr.end),
        None => (
            last_release_for(branch, index).unwrap_or_default(),
            user_range.to_string(),
        ),
    };

    if start.is_empty() {
        return Err(RelnotesError::range_unresolvable(branch));
    }

    if user_range.is_empty() {
        info!("pretty range: {start}..{branch_head}");
    } else {
        info!("pretty range: {user_range}");
    }

    let end = if end.is_empty() {
        branch_head.to_string()
    } else {
        end
    };

    info!("start: {start}");
    info!("release: {end}");

    Ok(TagRange { start, end })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::create_test_index;

    const HEAD: &str = "0123abcd";

    #[test]
    fn parses_two_sided_expressions() {
        let expr = RangeExpr::parse("v1.2.3..v1.2.7").unwrap();
        assert_eq!(expr.start, "v1.2.3");
        assert_eq!(expr.end, "v1.2.7");

        let expr = RangeExpr::parse("v1.8.0-beta.1..v1.8.0-rc.1").unwrap();
        assert_eq!(expr.start, "v1.8.0-beta.1");
        assert_eq!(expr.end, "v1.8.0-rc.1");

        let expr = RangeExpr::parse("v1.2.3..").unwrap();
        assert_eq!(expr.start, "v1.2.3");
        assert_eq!(expr.end, "");

        let expr = RangeExpr::parse("..v1.2.7").unwrap();
        assert_eq!(expr.start, "");
        assert_eq!(expr.end, "v1.2.7");
    }

    #[test]
    fn rejects_single_tags() {
        assert!(RangeExpr::parse("v1.2.7").is_none());
        assert!(RangeExpr::parse("").is_none());
        assert!(RangeExpr::parse("feature..v1.2.7").is_none());
    }

    #[test]
    fn explicit_range_is_used_verbatim() {
        let range =
            resolve("release-1.2", "v1.2.3..v1.2.7", &ReleaseIndex::default(), HEAD)
                .unwrap();

        assert_eq!(range.start, "v1.2.3");
        assert_eq!(range.end, "v1.2.7");
        assert_eq!(range.to_string(), "v1.2.3..v1.2.7");
    }

    #[test]
    fn default_range_runs_from_last_release_to_head() {
        let index = create_test_index(&[("release-1.7", "v1.7.5")]);
        let range = resolve("release-1.7", "", &index, HEAD).unwrap();

        assert_eq!(range.start, "v1.7.5");
        assert_eq!(range.end, HEAD);
    }

    #[test]
    fn single_tag_is_the_end_of_the_range() {
        let index = create_test_index(&[("release-1.7", "v1.7.5")]);
        let range = resolve("release-1.7", "v1.7.6", &index, HEAD).unwrap();

        assert_eq!(range.start, "v1.7.5");
        assert_eq!(range.end, "v1.7.6");
    }

    #[test]
    fn open_start_is_not_filled_in() {
        let index = create_test_index(&[("release-1.7", "v1.7.5")]);
        let err = resolve("release-1.7", "..v1.7.6", &index, HEAD).unwrap_err();

        assert!(matches!(err, RelnotesError::RangeUnresolvable { .. }));
    }

    #[test]
    fn open_end_defaults_to_head() {
        let range =
            resolve("release-1.7", "v1.7.5..", &ReleaseIndex::default(), HEAD)
                .unwrap();

        assert_eq!(range.start, "v1.7.5");
        assert_eq!(range.end, HEAD);
    }

    #[test]
    fn reports_which_lookups_a_range_needs() {
        assert!(!needs_release_index("v1.2.3..v1.2.7"));
        assert!(!needs_branch_head("v1.2.3..v1.2.7"));

        assert!(!needs_release_index("v1.2.3.."));
        assert!(needs_branch_head("v1.2.3.."));

        assert!(needs_release_index("v1.2.7"));
        assert!(!needs_branch_head("v1.2.7"));

        assert!(needs_release_index(""));
        assert!(needs_branch_head(""));
    }

    #[test]
    fn falls_back_to_parent_before_master() {
        let index = create_test_index(&[
            ("release-1.7", "v1.7.5"),
            ("master", "v1.8.0"),
        ]);

        let range = resolve("release-1.7.6", "", &index, HEAD).unwrap();
        assert_eq!(range.start, "v1.7.5");
    }

    #[test]
    fn falls_back_to_master() {
        let index = create_test_index(&[("master", "v1.8.0")]);

        let range = resolve("release-1.9", "", &index, HEAD).unwrap();
        assert_eq!(range.start, "v1.8.0");

        let range = resolve("feature", "", &index, HEAD).unwrap();
        assert_eq!(range.start, "v1.8.0");
    }

    #[test]
    fn fails_without_start_point() {
        let err = resolve("feature", "", &ReleaseIndex::default(), HEAD)
            .unwrap_err();

        assert!(matches!(
            err,
            RelnotesError::RangeUnresolvable { ref branch } if branch == "feature"
        ));
    }
}
