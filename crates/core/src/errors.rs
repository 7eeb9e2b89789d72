//! Error types for the git-smash core library.
//!
//! Each subsystem has its own error type derived with `thiserror`, and a
//! top-level [`SmashError`] enum unifies them for callers that want a single
//! error type.

use thiserror::Error;

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

/// Unified error type for the entire core library.
#[derive(Debug, Error)]
pub enum SmashError {
    #[error(transparent)]
    Git(#[from] GitError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Replay(#[from] ReplayError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The requested action is not one of `list`, `replay` or `clean`.
    #[error("action '{0}' not defined (expected one of: list, replay, clean)")]
    UnknownAction(String),
}

// ---------------------------------------------------------------------------
// Git errors
// ---------------------------------------------------------------------------

/// Errors from invoking the `git` binary.
#[derive(Debug, Error)]
pub enum GitError {
    /// The `git` binary was not found on `$PATH`.
    #[error("git binary not found: {0}")]
    BinaryNotFound(String),

    /// A `git` command exited with a non-zero status.
    #[error("`{command}` failed (exit {exit_code}): {stderr}")]
    CommandFailed {
        command: String,
        exit_code: i32,
        stderr: String,
    },

    /// The command succeeded but printed something we could not interpret.
    #[error("unexpected output from `{command}`: {output}")]
    UnexpectedOutput { command: String, output: String },

    /// Generic I/O wrapper.
    #[error("git I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl GitError {
    /// True when git refused to create a branch because the name is taken.
    pub fn is_branch_exists(&self) -> bool {
        match self {
            Self::CommandFailed {
                exit_code, stderr, ..
            } => *exit_code == 128 && stderr.contains("already exists"),
            _ => false,
        }
    }
}

// ---------------------------------------------------------------------------
// Branch catalog errors
// ---------------------------------------------------------------------------

/// Errors from querying a [`BranchCatalog`](crate::catalog::BranchCatalog).
#[derive(Debug, Error)]
pub enum CatalogError {
    /// No branch in the snapshot is flagged as current (detached HEAD, or a
    /// corrupted snapshot).
    #[error("unable to find current branch")]
    NoCurrentBranch,

    /// More than one branch in the snapshot is flagged as current.
    #[error("snapshot flags more than one current branch: {}", .0.join(", "))]
    MultipleCurrentBranches(Vec<String>),

    /// Two or more equally good candidates matched a best-match query.
    #[error("ambiguous branch match for '{pattern}': {}", candidates.join(", "))]
    AmbiguousMatch {
        pattern: String,
        candidates: Vec<String>,
    },

    /// A best-match query produced more than one result.
    #[error("best match for '{pattern}' returned {count} branches")]
    TooManyMatches { pattern: String, count: usize },
}

// ---------------------------------------------------------------------------
// Replay errors
// ---------------------------------------------------------------------------

/// Errors raised by the replay engine itself.
#[derive(Debug, Error)]
pub enum ReplayError {
    /// The backup branch still existed after the smash namespace was cleaned.
    #[error("backup branch '{0}' still exists after cleaning smash branches")]
    BackupCollision(String),

    /// The operator declined to overwrite an existing backup branch.
    #[error("backup branch '{0}' already exists and was not removed")]
    OperatorDeclined(String),

    /// A temporary branch scope was asked to move the checked out branch.
    #[error("refusing to use the current branch '{0}' as a temporary branch")]
    ScopeIsCurrentBranch(String),

    /// The operator abandoned interactive conflict resolution.
    #[error(
        "conflict resolution for '{branch}' was aborted; the pre-replay state is on '{backup}'"
    )]
    OperatorAborted { branch: String, backup: String },
}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

/// Errors from configuration loading and validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file not found.
    #[error("configuration file not found: {0}")]
    FileNotFound(String),

    /// TOML parse error.
    #[error("configuration parse error in '{path}': {detail}")]
    ParseError { path: String, detail: String },

    /// A config value is invalid.
    #[error("invalid configuration value for '{field}': {detail}")]
    InvalidValue { field: String, detail: String },

    /// Generic I/O error reading the config file.
    #[error("configuration I/O error: {0}")]
    IoError(#[from] std::io::Error),
}
