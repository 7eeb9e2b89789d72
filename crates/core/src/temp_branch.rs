//! Temporarily point a named branch at a commit.
//!
//! [`TempBranch`] repoints an existing local branch (or creates a missing
//! one) and puts things back when it goes out of scope: the branch returns to
//! its original commit, or is deleted if it did not exist before. Release
//! runs on every exit path, including early returns and errors inside the
//! scope, so a failed trial merge never leaves a stray branch behind.

use tracing::{debug, error};

use crate::catalog::BranchCatalog;
use crate::errors::{GitError, ReplayError, SmashError};
use crate::git::GitClient;
use crate::models::{Branch, Commit};

pub struct TempBranch<'a> {
    git: &'a GitClient,
    branch: Branch,
    return_to: String,
    original_commit: Option<Commit>,
    released: bool,
}

impl<'a> TempBranch<'a> {
    /// Point local branch `name` at `target`, then check out the branch that
    /// was current on entry again.
    pub fn acquire(git: &'a GitClient, name: &str, target: &Commit) -> Result<Self, SmashError> {
        let catalog = BranchCatalog::snapshot(git)?;
        let return_to = catalog.current()?.name.clone();
        if return_to == name {
            return Err(ReplayError::ScopeIsCurrentBranch(return_to).into());
        }

        let original_commit = if git.local_branch_exists(name)? {
            let original = git.branch_tip(&format!("refs/heads/{}", name))?;
            repoint(git, name, target, &return_to)?;
            debug!(name, original = %original.revision, target = %target.revision, "repointed branch");
            Some(original)
        } else {
            git.checkout_new(name, Some(&target.revision))?;
            git.checkout(&return_to)?;
            debug!(name, target = %target.revision, "created temporary branch");
            None
        };

        Ok(Self {
            git,
            branch: Branch::new(name, false),
            return_to,
            original_commit,
            released: false,
        })
    }

    pub fn branch(&self) -> &Branch {
        &self.branch
    }

    /// Commit the branch pointed at before the scope, if it existed.
    pub fn original_commit(&self) -> Option<&Commit> {
        self.original_commit.as_ref()
    }

    /// Restore the branch now and report any failure.
    pub fn release(mut self) -> Result<(), GitError> {
        self.released = true;
        self.restore()
    }

    fn restore(&self) -> Result<(), GitError> {
        let name = &self.branch.name;
        match &self.original_commit {
            Some(original) => {
                debug!(name = %name, rev = %original.revision, "resetting branch to original commit");
                repoint(self.git, name, original, &self.return_to)
            }
            None => {
                debug!(name = %name, "removing temporary branch");
                self.git.delete_branch(name)
            }
        }
    }
}

impl Drop for TempBranch<'_> {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        if let Err(err) = self.restore() {
            error!(branch = %self.branch.name, %err, "failed to restore temporary branch");
        }
    }
}

/// Run `f` with `name` pointed at `target`, restoring the branch afterwards.
///
/// An error from `f` takes precedence over an error from restoring.
pub fn with_temp_branch<T, F>(
    git: &GitClient,
    name: &str,
    target: &Commit,
    f: F,
) -> Result<T, SmashError>
where
    F: FnOnce(&Branch) -> Result<T, SmashError>,
{
    let scope = TempBranch::acquire(git, name, target)?;
    let result = f(scope.branch());
    match result {
        Ok(value) => {
            scope.release()?;
            Ok(value)
        }
        // Dropping the scope restores the branch and logs any failure.
        Err(err) => Err(err),
    }
}

/// Point `name` at `target` without moving the working branch.
fn repoint(git: &GitClient, name: &str, target: &Commit, return_to: &str) -> Result<(), GitError> {
    git.checkout(name)?;
    git.reset_hard(Some(&target.revision))?;
    git.checkout(return_to)
}
