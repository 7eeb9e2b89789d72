//! The human in the loop.
//!
//! The engine asks the operator two things: whether an existing backup branch
//! may be thrown away, and to resolve a merge conflict that neither automatic
//! strategy could handle. The CLI answers with prompts and a subshell; tests
//! answer with a script.

use std::path::PathBuf;

/// Outcome of handing a conflict to the operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// The working tree is resolved and ready to be staged and committed.
    Resolved,
    /// The operator gave up; the replay stops.
    Aborted,
}

/// What the operator needs to know to resolve a conflict by hand.
#[derive(Debug, Clone)]
pub struct ConflictContext {
    /// Repository root; the conflicted working tree lives here.
    pub repo_path: PathBuf,
    /// Branch being rebuilt.
    pub current_branch: String,
    /// Branch being merged in.
    pub merge_branch: String,
    /// Commit being merged in.
    pub revision: String,
    /// Where the pre-replay state of `current_branch` was saved.
    pub backup_branch: String,
}

pub trait Operator {
    /// `existing` describes the backup branch already in the way. Returning
    /// `true` deletes every `smash/*` branch before the backup is retried.
    fn confirm_backup_overwrite(&mut self, existing: &str) -> bool;

    /// Block until the operator has resolved the conflict in the working tree
    /// (or given up). Staging and committing is left to the engine.
    fn resolve_conflict(&mut self, context: &ConflictContext) -> Resolution;
}
