//! `NOIPStyle` grader: line-by-line comparison that ignores trailing
//! whitespace on each line and trailing blank lines at the end of output.

use super::GraderVerdict;
use crate::diagnostic::LineMismatch;

/// Registered name of the built-in line-wise grader.
pub const NOIP_STYLE: &str = "NOIPStyle";

fn significant_lines(text: &str) -> Vec<&str> {
    let mut lines: Vec<&str> = text.lines().map(str::trim_end).collect();
    while lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }
    lines
}

/// Line-wise comparison ignoring trailing whitespace and trailing blank lines.
///
/// Fails with a [`LineMismatch`] naming the first differing line (1-based).
pub fn noip_style(content: &str, std: &str) -> GraderVerdict {
    let content_lines = significant_lines(content);
    let std_lines = significant_lines(std);
    let len = content_lines.len().max(std_lines.len());

    for i in 0..len {
        let got = content_lines.get(i).copied().unwrap_or_default();
        let want = std_lines.get(i).copied().unwrap_or_default();
        // A missing line compares as empty, so lengths must be checked too.
        if got != want || i >= content_lines.len() || i >= std_lines.len() {
            return GraderVerdict::fail(LineMismatch {
                line: i + 1,
                content_line: got.to_string(),
                std_line: want.to_string(),
            });
        }
    }

    GraderVerdict::pass()
}
