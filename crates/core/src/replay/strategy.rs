//! Escalating merge of one resolved branch.
//!
//! Each branch is tried as a direct merge first, then by merging the original
//! merge commit (which carries the conflict resolutions made the first time),
//! and finally by handing the conflict to the operator. Each attempt runs
//! inside a [`TempBranch`](crate::temp_branch::TempBranch) scope named after
//! the originally merged branch, so the new merge commit gets the same
//! message shape and a later replay can parse it again.

use std::fmt;

use tracing::{info, warn};

use crate::errors::{ReplayError, SmashError};
use crate::git::{GitClient, MergeOutcome};
use crate::models::{Commit, ResolvedMerge};
use crate::temp_branch::with_temp_branch;

use super::operator::{ConflictContext, Operator, Resolution};

/// Escalation states, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attempt {
    DirectMerge,
    MergeTheMerge,
    Interactive,
}

impl Attempt {
    /// The state to move to when this attempt conflicts.
    pub fn escalate(self) -> Option<Attempt> {
        match self {
            Self::DirectMerge => Some(Self::MergeTheMerge),
            Self::MergeTheMerge => Some(Self::Interactive),
            Self::Interactive => None,
        }
    }
}

impl fmt::Display for Attempt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DirectMerge => write!(f, "direct merge"),
            Self::MergeTheMerge => write!(f, "merge of the merge commit"),
            Self::Interactive => write!(f, "interactive resolution"),
        }
    }
}

/// How a branch ended up in the rebuilt history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// Its commit was already reachable from HEAD.
    AlreadyMerged,
    /// Merged by the given attempt.
    Merged(Attempt),
}

/// Result of a single attempt that did not fail outright.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AttemptResult {
    Success,
    Conflict,
}

/// Name for the temporary branch standing in for `merge_branch`.
///
/// A local branch called `remotes/<remote>/<name>` would lose to the
/// remote-tracking ref of the same name when passed to `git merge`, so the
/// `remotes/` prefix is dropped.
pub fn scope_branch_name(merge_branch: &str) -> &str {
    merge_branch.strip_prefix("remotes/").unwrap_or(merge_branch)
}

pub(crate) struct BranchApplier<'a> {
    pub git: &'a GitClient,
    pub current_branch: &'a str,
    pub backup_branch: &'a str,
}

impl BranchApplier<'_> {
    /// Merge `resolved` into HEAD, escalating on conflict.
    pub fn apply(
        &self,
        resolved: &ResolvedMerge,
        operator: &mut dyn Operator,
    ) -> Result<ApplyOutcome, SmashError> {
        let commit = resolved.branch.commit(self.git)?;
        if self.git.head_history()?.contains(&commit.revision) {
            info!(
                rev = %commit.revision,
                branch = %resolved.branch,
                "already in commit history, skipping"
            );
            return Ok(ApplyOutcome::AlreadyMerged);
        }

        let scope_name = scope_branch_name(&resolved.record.merge_branch);
        let mut attempt = Attempt::DirectMerge;
        loop {
            let result = match attempt {
                Attempt::DirectMerge => self.merge_in_scope(scope_name, &commit, attempt)?,
                Attempt::MergeTheMerge => {
                    let merge_commit = Commit::from_revision(&resolved.record.commit.revision);
                    self.merge_in_scope(scope_name, &merge_commit, attempt)?
                }
                Attempt::Interactive => self.merge_interactively(scope_name, &commit, operator)?,
            };

            match result {
                AttemptResult::Success => {
                    info!(branch = %resolved.branch, %attempt, "merged");
                    return Ok(ApplyOutcome::Merged(attempt));
                }
                AttemptResult::Conflict => match attempt.escalate() {
                    Some(next) => {
                        warn!(branch = %resolved.branch, failed = %attempt, next = %next, "escalating");
                        attempt = next;
                    }
                    None => {
                        return Err(ReplayError::OperatorAborted {
                            branch: resolved.branch.name.clone(),
                            backup: self.backup_branch.to_string(),
                        }
                        .into())
                    }
                },
            }
        }
    }

    /// Merge `target` through a temporary branch; on conflict, discard the
    /// attempt and report it.
    fn merge_in_scope(
        &self,
        scope_name: &str,
        target: &Commit,
        attempt: Attempt,
    ) -> Result<AttemptResult, SmashError> {
        with_temp_branch(self.git, scope_name, target, |branch| {
            info!(%attempt, "merging {}", branch.info(self.git));
            match self.git.merge(&branch.name)? {
                MergeOutcome::Merged => Ok(AttemptResult::Success),
                MergeOutcome::Conflict => {
                    warn!(%attempt, "merging {} failed", branch.name);
                    self.git.reset_hard(None)?;
                    Ok(AttemptResult::Conflict)
                }
            }
        })
    }

    /// Merge `target` and leave any conflict in the working tree for the
    /// operator. An operator abort is fatal.
    fn merge_interactively(
        &self,
        scope_name: &str,
        target: &Commit,
        operator: &mut dyn Operator,
    ) -> Result<AttemptResult, SmashError> {
        with_temp_branch(self.git, scope_name, target, |branch| {
            if self.git.merge(&branch.name)? == MergeOutcome::Merged {
                return Ok(AttemptResult::Success);
            }

            let context = ConflictContext {
                repo_path: self.git.repo_path().to_path_buf(),
                current_branch: self.current_branch.to_string(),
                merge_branch: branch.name.clone(),
                revision: target.revision.clone(),
                backup_branch: self.backup_branch.to_string(),
            };
            warn!(branch = %branch.name, "could not merge automatically, handing over to the operator");

            match operator.resolve_conflict(&context) {
                Resolution::Resolved => {
                    if self.git.merge_in_progress()? {
                        self.git.add_all()?;
                        self.git.commit_no_edit()?;
                    }
                    if !self.git.head_history()?.contains(&target.revision) {
                        warn!(
                            branch = %branch.name,
                            rev = %target.revision,
                            "resolved without merging the branch"
                        );
                        self.git.reset_hard(None)?;
                        return Err(ReplayError::OperatorAborted {
                            branch: branch.name.clone(),
                            backup: self.backup_branch.to_string(),
                        }
                        .into());
                    }
                    Ok(AttemptResult::Success)
                }
                Resolution::Aborted => {
                    self.git.reset_hard(None)?;
                    Err(ReplayError::OperatorAborted {
                        branch: branch.name.clone(),
                        backup: self.backup_branch.to_string(),
                    }
                    .into())
                }
            }
        })
    }
}
