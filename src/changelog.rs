//! Assembly of the final changelog sections.
use log::*;
use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

use crate::{
    error::Result,
    forge::request::{ForgeIssue, IssueSearchResult},
    notes::{IssueMap, extract_note},
    range::TagRange,
    version::BranchVersion,
};

static ANCHOR_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<a\s+(?:name|id)="([^"]+)""#).unwrap()
});

/// Generic outline used for a major release when no draft exists.
pub const MAJOR_RELEASE_SCAFFOLD: &str = r#"## Major Themes

* TBD

## Other notable improvements

* TBD

## Known Issues

* TBD

## Provider-specific Notes

* TBD"#;

/// Emitted instead of an empty bullet list.
pub const NO_NOTABLE_CHANGES: &str =
    "**No notable changes for this release**";

/// Appended to a report whose search did not return every result.
pub const INCOMPLETE_RESULTS_WARNING: &str = "!!Warning: Some release notes missing due to incomplete search result from github.";

const PATCH_NOTES_TEMPLATE: &str = r#"{% for pr in prs -%}
* {{ pr.note }} (#{{ pr.number }}, @{{ pr.author }})
{% endfor -%}"#;

#[derive(Debug, Serialize)]
struct NoteLine {
    note: String,
    number: u64,
    author: String,
}

/// Inputs to [`assemble`].
#[derive(Debug)]
pub struct AssembleParams<'a> {
    /// Whether the range ends on a dot-zero release.
    pub is_major: bool,
    pub range: &'a TagRange,
    /// Release-note-worthy pull requests in extraction order.
    pub pr_numbers: &'a [u64],
    pub issues: &'a IssueMap,
    /// Release notes draft for major releases, if one was found.
    pub draft: Option<&'a str>,
    /// Project CHANGELOG document, if one was found.
    pub changelog: Option<&'a str>,
}

/// Inputs to [`repo_report`].
#[derive(Debug)]
pub struct RepoReportParams<'a> {
    pub owner: &'a str,
    pub repo: &'a str,
    pub version: &'a str,
    /// Merge window the search covered, as given by the user.
    pub start_date: &'a str,
    pub end_date: &'a str,
    pub search: &'a IssueSearchResult,
}

/// Anchor prefix of the CHANGELOG entries that belong to the release `tag`
/// ends on, e.g. `release-1.8-`.
pub fn changelog_anchor_prefix(tag: &str) -> Option<String> {
    BranchVersion::parse(tag).map(|v| format!("{}-", v.branch_name()))
}

/// Concatenates the CHANGELOG entries whose anchor starts with `prefix`. An
/// entry runs from its anchor line up to the next anchor line.
pub fn aggregate_changelog(document: &str, prefix: &str) -> Option<String> {
    let mut entries: Vec<&str> = vec![];
    let mut keep = false;

    for line in document.lines() {
        if let Some(caps) = ANCHOR_REGEX.captures(line)
            && let Some(name) = caps.get(1)
        {
            keep = name.as_str().starts_with(prefix);
        }

        if keep {
            entries.push(line);
        }
    }

    if entries.is_empty() {
        return None;
    }

    Some(entries.join("\n").trim_end().to_string())
}

/// Builds the ordered changelog sections for a release.
pub fn assemble(params: AssembleParams) -> Result<Vec<String>> {
    if params.is_major {
        return Ok(assemble_major(&params));
    }

    assemble_patch(&params)
}

fn assemble_major(params: &AssembleParams) -> Vec<String> {
    let mut sections = vec![];

    match params.draft {
        Some(draft) => sections.push(draft.trim_end().to_string()),
        None => {
            info!("no release notes draft available: using generic outline");
            sections.push(MAJOR_RELEASE_SCAFFOLD.to_string());
        }
    }

    if let Some(document) = params.changelog
        && let Some(prefix) = changelog_anchor_prefix(&params.range.end)
    {
        match aggregate_changelog(document, &prefix) {
            Some(entries) => sections.push(entries),
            None => debug!("no changelog entries found for anchor {prefix}"),
        }
    }

    sections
}

fn assemble_patch(params: &AssembleParams) -> Result<Vec<String>> {
    let mut sections =
        vec![format!("## Changelog since {}", params.range.start)];

    let issues = params
        .pr_numbers
        .iter()
        .filter_map(|number| match params.issues.get(number) {
            Some(issue) => Some(issue),
            None => {
                warn!("PR #{number} missing from issue list: skipping");
                None
            }
        })
        .collect::<Vec<&ForgeIssue>>();

    sections.push(render_notes(&issues)?);

    Ok(sections)
}

/// One bullet per issue, or [`NO_NOTABLE_CHANGES`] when there are none.
fn render_notes(issues: &[&ForgeIssue]) -> Result<String> {
    if issues.is_empty() {
        return Ok(NO_NOTABLE_CHANGES.to_string());
    }

    let lines = issues
        .iter()
        .map(|issue| NoteLine {
            note: extract_note(issue),
            number: issue.number,
            author: issue.author.clone(),
        })
        .collect::<Vec<NoteLine>>();

    let mut context = tera::Context::new();
    context.insert("prs", &lines);
    let notes = tera::Tera::one_off(PATCH_NOTES_TEMPLATE, &context, false)?;

    Ok(notes.trim_end().to_string())
}

/// Release note report for one repository's search results, headed by the
/// repository, the merge window and the number of matches.
pub fn repo_report(params: RepoReportParams) -> Result<String> {
    let issues = params.search.issues.iter().collect::<Vec<&ForgeIssue>>();

    let mut lines = vec![
        format!(
            "{}: {} -- {} release note",
            params.owner, params.repo, params.version
        ),
        format!("Date: {} -- {}", params.start_date, params.end_date),
        format!("Total: {}", params.search.total),
        render_notes(&issues)?,
    ];

    if params.search.incomplete {
        lines.push(INCOMPLETE_RESULTS_WARNING.to_string());
    }

    Ok(format!("{}\n", lines.join("\n")))
}
