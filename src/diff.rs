//! Line diffs between configuration snapshots

use serde::{Deserialize, Serialize};
use similar::{ChangeTag, TextDiff};

/// Summary and unified body of a line diff
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diff {
    /// Summary of the old side
    pub before: String,
    /// Summary of the new side, with change counts
    pub after: String,
    /// One line per input line, prefixed with `-`, `+` or a space
    pub details: Option<String>,
    /// Number of added lines
    pub additions: usize,
    /// Number of removed lines
    pub deletions: usize,
}

impl Diff {
    /// Whether the two sides differ
    pub fn has_changes(&self) -> bool {
        self.additions > 0 || self.deletions > 0
    }
}

/// Generate a line diff between two configurations
pub fn generate_config_diff(before: &str, after: &str) -> Diff {
    let text_diff = TextDiff::from_lines(before, after);

    let mut details = String::new();
    let mut additions = 0;
    let mut deletions = 0;

    for change in text_diff.iter_all_changes() {
        let sign = match change.tag() {
            ChangeTag::Delete => {
                deletions += 1;
                "-"
            }
            ChangeTag::Insert => {
                additions += 1;
                "+"
            }
            ChangeTag::Equal => " ",
        };
        details.push_str(sign);
        details.push_str(change.value());
        if change.missing_newline() {
            details.push('\n');
        }
    }

    Diff {
        before: format!("{} lines", before.lines().count()),
        after: format!(
            "{} lines ({} additions, {} deletions)",
            after.lines().count(),
            additions,
            deletions
        ),
        details: (!details.is_empty()).then_some(details),
        additions,
        deletions,
    }
}
