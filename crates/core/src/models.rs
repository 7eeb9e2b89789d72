//! Value types shared by the scanner, catalog and replay engine.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::GitError;
use crate::git::GitClient;
use crate::history::message::parse_merge_branch;

/// Namespace for backup and placeholder branches created by git-smash.
pub const SMASH_PREFIX: &str = "smash/";

// ---------------------------------------------------------------------------
// Commit
// ---------------------------------------------------------------------------

/// A single commit: an opaque revision id plus its (optional) subject line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commit {
    pub revision: String,
    pub message: Option<String>,
}

impl Commit {
    pub fn new(revision: impl Into<String>, message: Option<String>) -> Self {
        Self {
            revision: revision.into(),
            message,
        }
    }

    /// A commit known only by its revision.
    pub fn from_revision(revision: impl Into<String>) -> Self {
        Self::new(revision, None)
    }

    /// Name of the branch this commit merged, if its message is a known merge shape.
    pub fn merge_branch(&self) -> Option<String> {
        self.message.as_deref().and_then(parse_merge_branch)
    }

    /// Parent revisions, left (merged into) first.
    pub fn parents(&self, git: &GitClient) -> Result<Vec<String>, GitError> {
        git.parents(&self.revision)
    }

    /// The last parent: the tip of the branch that was merged in.
    pub fn right_parent(&self, git: &GitClient) -> Result<Commit, GitError> {
        let parents = self.parents(git)?;
        parents
            .last()
            .map(|rev| Commit::from_revision(rev.clone()))
            .ok_or_else(|| GitError::UnexpectedOutput {
                command: format!("git log --pretty=%P -n 1 {}", self.revision),
                output: "no parents".into(),
            })
    }
}

impl fmt::Display for Commit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.message {
            Some(message) => write!(f, "{} {}", self.revision, message),
            None => write!(f, "{}", self.revision),
        }
    }
}

// ---------------------------------------------------------------------------
// Branch
// ---------------------------------------------------------------------------

/// A local or remote-tracking branch as listed by `git branch --all`.
///
/// Branch tips move underneath a catalog snapshot, so the commit is looked up
/// on demand unless the branch was fabricated with a pinned commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Branch {
    pub name: String,
    pub is_current: bool,
    pub pinned_commit: Option<Commit>,
}

impl Branch {
    pub fn new(name: impl Into<String>, is_current: bool) -> Self {
        Self {
            name: name.into(),
            is_current,
            pinned_commit: None,
        }
    }

    /// A synthetic branch that always resolves to `commit`.
    pub fn pinned(name: impl Into<String>, commit: Commit) -> Self {
        Self {
            name: name.into(),
            is_current: false,
            pinned_commit: Some(commit),
        }
    }

    /// Remote-tracking branches are listed as `remotes/<remote>/<name>`.
    pub fn is_remote(&self) -> bool {
        self.name.starts_with("remotes/")
    }

    /// Current tip of the branch.
    pub fn commit(&self, git: &GitClient) -> Result<Commit, GitError> {
        match &self.pinned_commit {
            Some(commit) => Ok(commit.clone()),
            None => git.branch_tip(&self.name),
        }
    }

    /// `<revision> @ [*]<name>`, for log output.
    pub fn info(&self, git: &GitClient) -> String {
        let current = if self.is_current { "*" } else { "" };
        match self.commit(git) {
            Ok(commit) => format!("{} @ {}{}", commit, current, self.name),
            Err(_) => format!("? @ {}{}", current, self.name),
        }
    }
}

impl fmt::Display for Branch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

// ---------------------------------------------------------------------------
// Merge records
// ---------------------------------------------------------------------------

/// A merge commit together with the branch name parsed from its message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeRecord {
    pub commit: Commit,
    pub merge_branch: String,
}

impl MergeRecord {
    /// Build a record from a commit, or `None` when its message is not a merge shape.
    pub fn from_commit(commit: Commit) -> Option<Self> {
        let merge_branch = commit.merge_branch()?;
        Some(Self {
            commit,
            merge_branch,
        })
    }
}

impl fmt::Display for MergeRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} @ {}", self.merge_branch, self.commit.revision)
    }
}

/// A simplified merge paired with the live (or placeholder) branch to replay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedMerge {
    pub record: MergeRecord,
    pub branch: Branch,
}
