//! Walk the merge commits between the base and HEAD.

use tracing::{debug, info, instrument, warn};

use crate::errors::GitError;
use crate::git::GitClient;
use crate::models::MergeRecord;

/// Where the current branch forked from the base branch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseRevision {
    /// Name of the base branch, e.g. `origin/master`.
    pub branch: String,
    /// `merge-base HEAD <branch>`.
    pub merge_base: String,
    /// Tip of the base branch.
    pub tip: String,
}

impl BaseRevision {
    /// True when HEAD already contains the base branch tip.
    pub fn is_on_base(&self) -> bool {
        self.merge_base == self.tip
    }
}

/// Compute the merge-base with `base_branch` and warn when HEAD is behind it.
#[instrument(skip(git))]
pub fn resolve_base(git: &GitClient, base_branch: &str) -> Result<BaseRevision, GitError> {
    let merge_base = git.merge_base(base_branch)?;
    let tip = git.branch_tip(base_branch)?.revision;
    let base = BaseRevision {
        branch: base_branch.to_string(),
        merge_base,
        tip,
    };
    if !base.is_on_base() {
        warn!(
            base_branch,
            merge_base = %base.merge_base,
            tip = %base.tip,
            "this branch is not on top of the base branch"
        );
    }
    Ok(base)
}

/// Merge commits in `base_rev..HEAD`, newest first, as merge records.
///
/// Commits whose message is not a recognized merge shape are skipped with a
/// warning; merges of a branch named in `drop` are skipped with an info entry.
#[instrument(skip(git, drop))]
pub fn scan_merges(
    git: &GitClient,
    base_rev: &str,
    drop: &[String],
) -> Result<Vec<MergeRecord>, GitError> {
    info!("looking for merge commits until {}", base_rev);

    let mut records = Vec::new();
    for commit in git.merge_commits_since(base_rev)? {
        let Some(record) = MergeRecord::from_commit(commit.clone()) else {
            warn!(rev = %commit.revision, "could not parse merge message: {}", commit);
            continue;
        };
        if drop.iter().any(|name| name == &record.merge_branch) {
            info!(branch = %record.merge_branch, rev = %record.commit.revision, "dropping merge");
            continue;
        }
        debug!(branch = %record.merge_branch, rev = %record.commit.revision, "found merge");
        records.push(record);
    }

    Ok(records)
}
