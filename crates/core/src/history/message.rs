//! Extract the merged branch name from a merge commit message.
//!
//! Three message shapes are recognized:
//!
//! 1. `Merge branch '<name>' into <target>`
//! 2. `Merge remote-tracking branch '<name>' [of <url>] into <target>`
//! 3. `Merge pull request #<n> from <name>`
//!
//! Any of them may carry a leading ref decoration such as `(master) `.
//! Git leaves out ` into <target>` when merging into the default branch, so
//! the target is optional.

use std::sync::LazyLock;

use regex_lite::Regex;

static MERGE_MESSAGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"^(?:\([^)]*\) )?",
        r"(?:",
        r"Merge (?:remote-tracking )?branch '(?P<branch>[^']+)'(?: of \S+)?(?: into (?P<target>.+))?",
        r"|",
        r"Merge pull request #\d+ from (?P<pr_branch>\S+)",
        r")",
    ))
    .expect("merge message pattern is valid")
});

/// Name of the branch merged by a commit with this message, or `None` when the
/// message is not one of the known merge shapes.
pub fn parse_merge_branch(message: &str) -> Option<String> {
    let caps = MERGE_MESSAGE.captures(message.trim())?;
    caps.name("branch")
        .or_else(|| caps.name("pr_branch"))
        .map(|m| m.as_str().to_string())
}
