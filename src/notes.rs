//! Correlation of extracted pull requests with issue tracker metadata and
//! extraction of their release note text.
use log::*;
use std::collections::HashMap;

use crate::forge::request::ForgeIssue;

const FENCE: &str = "```";
const RELEASE_NOTE_FENCE: &str = "```release-note";

/// Issue metadata keyed by issue/pull request number.
pub type IssueMap = HashMap<u64, ForgeIssue>;

pub fn index_issues(issues: Vec<ForgeIssue>) -> IssueMap {
    issues.into_iter().map(|i| (i.number, i)).collect()
}

/// Keeps the numbers whose issue is known and carries `label`, in their
/// original order. Unknown numbers are dropped.
pub fn filter_release_noteworthy(
    pr_numbers: &[u64],
    issues: &IssueMap,
    label: &str,
) -> Vec<u64> {
    pr_numbers
        .iter()
        .copied()
        .filter(|number| match issues.get(number) {
            Some(issue) => issue.has_label(label),
            None => {
                debug!("PR #{number} not found in issue list: skipping");
                false
            }
        })
        .collect()
}

/// Interior of the first ```` ```release-note ```` fence in `body`, if any.
///
/// The block closes on a bare fence line. Code blocks inside the note are
/// kept: fences with an info string open a nested block, and a run of bare
/// fences of odd length pairs up with the last one closing the note.
pub fn release_note_block(body: &str) -> Option<&str> {
    let opener = body.find(RELEASE_NOTE_FENCE)?;
    let rest = body[opener + RELEASE_NOTE_FENCE.len()..]
        .trim_start_matches([' ', '\t']);

    let first_line = rest.split('\n').next().unwrap_or_default();
    if let Some(end) = first_line.find(FENCE) {
        return non_blank(first_line[..end].trim());
    }

    let interior = rest
        .strip_prefix("\r\n")
        .or_else(|| rest.strip_prefix('\n'))
        .unwrap_or(rest);

    let fences = fence_lines(interior);
    let mut depth = 0usize;

    for (i, &(offset, has_info)) in fences.iter().enumerate() {
        if has_info {
            depth += 1;
        } else if depth > 0 {
            depth -= 1;
        } else {
            let run = fences[i..].iter().take_while(|(_, info)| !info).count();
            let closer = if run % 2 == 1 {
                fences[i + run - 1].0
            } else {
                offset
            };
            return non_blank(strip_line_end(&interior[..closer]));
        }
    }

    debug!("release note block is never closed");
    None
}

/// Byte offset of every line starting with a fence, and whether the fence
/// carries an info string.
fn fence_lines(text: &str) -> Vec<(usize, bool)> {
    let mut fences = vec![];
    let mut offset = 0;

    for line in text.split_inclusive('\n') {
        let trimmed = line.trim();
        if let Some(info) = trimmed.strip_prefix(FENCE) {
            fences.push((offset, !info.trim().is_empty()));
        }
        offset += line.len();
    }

    fences
}

fn strip_line_end(text: &str) -> &str {
    let text = text.strip_suffix('\n').unwrap_or(text);
    text.strip_suffix('\r').unwrap_or(text)
}

fn non_blank(note: &str) -> Option<&str> {
    Some(note).filter(|n| !n.trim().is_empty())
}

/// Release note text for an issue: its release-note fence, or its title
/// when the body has none.
pub fn extract_note(issue: &ForgeIssue) -> String {
    match release_note_block(&issue.body) {
        Some(note) => note.to_string(),
        None => {
            debug!("PR #{} has no release note block: using title", issue.number);
            issue.title.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::create_test_issue;

    #[test]
    fn extracts_fenced_note() {
        let issue = create_test_issue(
            1,
            "Title",
            "**What this PR does**:\n\n```release-note\nAdd --foo flag to kubectl\n```\n",
            &["release-note"],
        );

        assert_eq!(extract_note(&issue), "Add --foo flag to kubectl");
    }

    #[test]
    fn keeps_internal_newlines_and_markdown() {
        let issue = create_test_issue(
            1,
            "Title",
            "```release-note\r\nFirst line with `code`\r\n\r\n- second\r\n```",
            &[],
        );

        assert_eq!(
            extract_note(&issue),
            "First line with `code`\r\n\r\n- second"
        );
    }

    #[test]
    fn falls_back_to_title() {
        let issue = create_test_issue(1, "Fix flaky test", "no fence here", &[]);
        assert_eq!(extract_note(&issue), "Fix flaky test");

        let issue = create_test_issue(1, "Fix flaky test", "", &[]);
        assert_eq!(extract_note(&issue), "Fix flaky test");

        let issue = create_test_issue(
            1,
            "Fix flaky test",
            "```release-note\n   \n```",
            &[],
        );
        assert_eq!(extract_note(&issue), "Fix flaky test");
    }

    #[test]
    fn uses_first_fence_only() {
        let body = "```release-note\none\n```\ntext\n```release-note\ntwo\n```";
        assert_eq!(release_note_block(body), Some("one"));
    }

    #[test]
    fn keeps_bare_code_blocks_inside_the_note() {
        let body = "```release-note\nkubectl now supports:\n```\nkubectl foo --bar\n```\n```\n";

        assert_eq!(
            release_note_block(body),
            Some("kubectl now supports:\n```\nkubectl foo --bar\n```")
        );
    }

    #[test]
    fn keeps_language_code_blocks_inside_the_note() {
        let body = "```release-note\nRun:\n```bash\nkubectl foo\n```\n```";

        assert_eq!(
            release_note_block(body),
            Some("Run:\n```bash\nkubectl foo\n```")
        );
    }

    #[test]
    fn stops_before_following_template_blocks() {
        let body = "```release-note\nNONE\n```\n\n#### Docs\n```docs\n- [KEP]: link\n```\n";
        assert_eq!(release_note_block(body), Some("NONE"));
    }

    #[test]
    fn reads_single_line_fence() {
        assert_eq!(
            release_note_block("```release-note Add --foo flag```"),
            Some("Add --foo flag")
        );
    }

    #[test]
    fn unclosed_fence_falls_back_to_title() {
        let issue =
            create_test_issue(1, "Fix flaky test", "```release-note\nnote", &[]);
        assert_eq!(extract_note(&issue), "Fix flaky test");
    }

    #[test]
    fn extraction_is_idempotent() {
        let issue = create_test_issue(
            1,
            "Title",
            "```release-note\nAdd `--foo`\nsecond line\n```",
            &[],
        );

        let note = extract_note(&issue);
        assert!(release_note_block(&note).is_none());

        let again = create_test_issue(1, &note, &note, &[]);
        assert_eq!(extract_note(&again), note);
    }

    #[test]
    fn filters_by_label_and_presence() {
        let issues = index_issues(vec![
            create_test_issue(100, "a", "", &["release-note"]),
            create_test_issue(200, "b", "", &["release-note-none"]),
            create_test_issue(300, "c", "", &["kind/bug", "release-note"]),
        ]);

        let filtered =
            filter_release_noteworthy(&[300, 400, 200, 100], &issues, "release-note");

        assert_eq!(filtered, vec![300, 100]);
    }
}
