//! Point-in-time snapshot of every local and remote-tracking branch.
//!
//! A snapshot goes stale as soon as anything checks out, resets, creates,
//! deletes or merges a branch. Take a new one after mutating the repository.

use regex_lite::Regex;
use tracing::debug;

use crate::errors::{CatalogError, GitError};
use crate::git::GitClient;
use crate::models::Branch;

#[derive(Debug, Clone, Default)]
pub struct BranchCatalog {
    branches: Vec<Branch>,
}

impl BranchCatalog {
    /// List the repository's branches.
    pub fn snapshot(git: &GitClient) -> Result<Self, GitError> {
        Ok(Self::from_branches(git.list_branches()?))
    }

    pub fn from_branches(branches: Vec<Branch>) -> Self {
        Self { branches }
    }

    pub fn branches(&self) -> &[Branch] {
        &self.branches
    }

    /// The branch flagged as checked out. Exactly one branch must be.
    pub fn current(&self) -> Result<&Branch, CatalogError> {
        let mut flagged = self.branches.iter().filter(|b| b.is_current);
        let current = flagged.next().ok_or(CatalogError::NoCurrentBranch)?;
        let others: Vec<String> = flagged.map(|b| b.name.clone()).collect();
        if !others.is_empty() {
            let mut names = vec![current.name.clone()];
            names.extend(others);
            return Err(CatalogError::MultipleCurrentBranches(names));
        }
        Ok(current)
    }

    /// Branches whose name starts with `prefix`.
    pub fn with_prefix<'a>(&'a self, prefix: &'a str) -> impl Iterator<Item = &'a Branch> + 'a {
        self.branches.iter().filter(move |b| b.name.starts_with(prefix))
    }

    /// A copy of this snapshot without the branches under `prefix`.
    pub fn without_prefix(&self, prefix: &str) -> BranchCatalog {
        Self::from_branches(
            self.branches
                .iter()
                .filter(|b| !b.name.starts_with(prefix))
                .cloned()
                .collect(),
        )
    }

    /// Branches whose name is `name` or ends in `/<name>`.
    ///
    /// The `/` boundary keeps `revert-204-bugfix/os-1088` from answering a
    /// request for `bugfix/os-1088`. With `best`, two or more matches are
    /// narrowed to one: local branches win over remote-tracking ones, then the
    /// shortest name wins. Equally short survivors are an error.
    pub fn matching(&self, name: &str, best: bool) -> Result<Vec<&Branch>, CatalogError> {
        let pattern = suffix_pattern(name);
        let matches: Vec<&Branch> = self
            .branches
            .iter()
            .filter(|b| pattern.is_match(&b.name))
            .collect();

        debug!(name, count = matches.len(), "matched branches");

        if matches.len() < 2 || !best {
            return Ok(matches);
        }

        Ok(vec![pick_best(name, &matches)?])
    }

    /// The single best match for `name`, if any branch matches.
    ///
    /// More than one result here is a broken postcondition of `matching`, and
    /// is reported rather than truncated.
    pub fn best_match(&self, name: &str) -> Result<Option<&Branch>, CatalogError> {
        let mut matches = self.matching(name, true)?;
        if matches.len() > 1 {
            return Err(CatalogError::TooManyMatches {
                pattern: name.to_string(),
                count: matches.len(),
            });
        }
        Ok(matches.pop())
    }
}

fn suffix_pattern(name: &str) -> Regex {
    let pattern = format!("(?:^|/){}$", regex_lite::escape(name));
    Regex::new(&pattern).expect("escaped branch name is a valid pattern")
}

fn pick_best<'a>(name: &str, matches: &[&'a Branch]) -> Result<&'a Branch, CatalogError> {
    let local: Vec<&Branch> = matches.iter().copied().filter(|b| !b.is_remote()).collect();
    let pool: &[&Branch] = if local.is_empty() { matches } else { &local };

    let shortest = pool.iter().map(|b| b.name.len()).min().unwrap_or(0);
    let candidates: Vec<&'a Branch> = pool
        .iter()
        .copied()
        .filter(|b| b.name.len() == shortest)
        .collect();

    match candidates.as_slice() {
        [only] => Ok(*only),
        _ => Err(CatalogError::AmbiguousMatch {
            pattern: name.to_string(),
            candidates: candidates.iter().map(|b| b.name.clone()).collect(),
        }),
    }
}
