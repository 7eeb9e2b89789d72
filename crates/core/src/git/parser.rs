//! Parsers for `git` porcelain text output.

use tracing::{debug, warn};

use crate::models::{Branch, Commit};

/// Parse `git branch --no-color --all`.
///
/// Each line is `"* <name>"` for the current branch or `"  <name>"` otherwise.
/// Symbolic entries such as `remotes/origin/HEAD -> origin/master` are kept
/// under their own name; a detached HEAD (`* (HEAD detached at ...)`) is not a
/// branch and is skipped, which leaves the snapshot without a current branch.
pub fn parse_branch_list(output: &str) -> Vec<Branch> {
    let mut branches = Vec::new();
    for line in output.lines() {
        if line.trim().is_empty() {
            continue;
        }
        let is_current = line.starts_with('*');
        let rest = line.get(2..).unwrap_or("").trim();
        if rest.starts_with('(') {
            debug!(line, "skipping detached HEAD entry");
            continue;
        }
        let name = match rest.split_once(" -> ") {
            Some((name, _target)) => name,
            None => rest,
        };
        if name.is_empty() {
            warn!(line, "skipping unparseable branch line");
            continue;
        }
        branches.push(Branch::new(name, is_current));
    }
    debug!(count = branches.len(), "parsed branch list");
    branches
}

/// Parse `git log --pretty=oneline` output: `<revision> <message>` per line.
pub fn parse_oneline_log(output: &str) -> Vec<Commit> {
    output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| match line.split_once(' ') {
            Some((rev, message)) => Commit::new(rev, Some(message.to_string())),
            None => Commit::new(line, Some(String::new())),
        })
        .collect()
}

/// Parse `git log --pretty=%P -n 1 <rev>`: whitespace separated parents.
pub fn parse_parents(output: &str) -> Vec<String> {
    output.split_whitespace().map(str::to_string).collect()
}
