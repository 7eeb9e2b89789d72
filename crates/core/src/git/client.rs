//! Synchronous `git` CLI client.
//!
//! Every call blocks until the command exits. The working tree, index and
//! current branch are one shared resource, so callers issue one command at a
//! time and never overlap them.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

use tracing::{debug, info, instrument, warn};

use super::parser::{parse_branch_list, parse_oneline_log, parse_parents};
use crate::errors::GitError;
use crate::models::{Branch, Commit};

/// Exit status `git merge` uses for conflicts.
const CONFLICT_EXIT_CODE: i32 = 1;

/// Result of a merge that did not fail outright.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    Merged,
    Conflict,
}

/// Client for a single repository, driven through the `git` binary.
#[derive(Debug, Clone)]
pub struct GitClient {
    repo_path: PathBuf,
}

impl GitClient {
    /// Create a client for the repository rooted at `repo_path`.
    pub fn new(repo_path: impl Into<PathBuf>) -> Self {
        let client = Self {
            repo_path: repo_path.into(),
        };
        debug!(path = %client.repo_path.display(), "created GitClient");
        client
    }

    /// Find the repository containing `dir` and open a client at its root.
    pub fn discover(dir: impl AsRef<Path>) -> Result<Self, GitError> {
        let lookup = Self::new(dir.as_ref());
        let root = lookup.run(&["rev-parse", "--show-toplevel"])?;
        info!(root = %root, "discovered git repository");
        Ok(Self::new(root))
    }

    pub fn repo_path(&self) -> &Path {
        &self.repo_path
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// Common ancestor of HEAD and `base_branch`.
    #[instrument(skip(self))]
    pub fn merge_base(&self, base_branch: &str) -> Result<String, GitError> {
        self.run(&["merge-base", "HEAD", base_branch])
    }

    /// Tip commit of `name` (any revision git can resolve).
    pub fn branch_tip(&self, name: &str) -> Result<Commit, GitError> {
        let rev = self.run(&["rev-list", name, "--max-count", "1"])?;
        Ok(Commit::from_revision(rev))
    }

    /// Merge commits in `base..HEAD`, newest first.
    #[instrument(skip(self))]
    pub fn merge_commits_since(&self, base: &str) -> Result<Vec<Commit>, GitError> {
        let range = format!("{}..HEAD", base);
        let output = self.run(&[
            "log",
            "--no-decorate",
            "--no-color",
            "--pretty=oneline",
            "--merges",
            &range,
        ])?;
        let commits = parse_oneline_log(&output);
        debug!(count = commits.len(), "listed merge commits");
        Ok(commits)
    }

    /// Parent revisions of `revision`, first parent first.
    pub fn parents(&self, revision: &str) -> Result<Vec<String>, GitError> {
        let output = self.run(&["log", "--pretty=%P", "-n", "1", revision])?;
        Ok(parse_parents(&output))
    }

    /// Every local and remote-tracking branch.
    pub fn list_branches(&self) -> Result<Vec<Branch>, GitError> {
        let output = self.run(&["branch", "--no-color", "--all"])?;
        Ok(parse_branch_list(&output))
    }

    /// All revisions reachable from HEAD.
    pub fn head_history(&self) -> Result<HashSet<String>, GitError> {
        let output = self.run(&["rev-list", "HEAD"])?;
        Ok(output.lines().map(str::to_string).collect())
    }

    /// Whether `refname` resolves to an object.
    pub fn ref_exists(&self, refname: &str) -> Result<bool, GitError> {
        let output = self.output(&["rev-parse", "--verify", "--quiet", refname])?;
        Ok(output.status.success())
    }

    /// Whether a local branch called `name` exists.
    pub fn local_branch_exists(&self, name: &str) -> Result<bool, GitError> {
        self.ref_exists(&format!("refs/heads/{}", name))
    }

    /// Whether a merge is waiting to be committed.
    pub fn merge_in_progress(&self) -> Result<bool, GitError> {
        self.ref_exists("MERGE_HEAD")
    }

    // -----------------------------------------------------------------------
    // Mutations
    // -----------------------------------------------------------------------

    #[instrument(skip(self))]
    pub fn checkout(&self, name: &str) -> Result<(), GitError> {
        self.run(&["checkout", name])?;
        Ok(())
    }

    /// `checkout -b <name> [<start_point>]`.
    #[instrument(skip(self))]
    pub fn checkout_new(&self, name: &str, start_point: Option<&str>) -> Result<(), GitError> {
        let mut args = vec!["checkout", "-b", name];
        args.extend(start_point);
        self.run(&args)?;
        info!(name, "created branch");
        Ok(())
    }

    /// `reset --hard [<target>]`.
    #[instrument(skip(self))]
    pub fn reset_hard(&self, target: Option<&str>) -> Result<(), GitError> {
        let mut args = vec!["reset", "--hard"];
        args.extend(target);
        self.run(&args)?;
        Ok(())
    }

    #[instrument(skip(self))]
    pub fn delete_branch(&self, name: &str) -> Result<(), GitError> {
        self.run(&["branch", "-D", name])?;
        info!(name, "deleted branch");
        Ok(())
    }

    /// `merge --no-ff --no-edit <branch>`. A conflict is an outcome, not an
    /// error. Every merge leaves a merge commit so the next scan finds it.
    #[instrument(skip(self))]
    pub fn merge(&self, branch: &str) -> Result<MergeOutcome, GitError> {
        self.run_allowing_conflict(&["merge", "--no-ff", "--no-edit", branch])
    }

    /// Stage every change in the working tree.
    pub fn add_all(&self) -> Result<(), GitError> {
        self.run(&["add", "--all"])?;
        Ok(())
    }

    /// Commit the staged state using the prepared message.
    pub fn commit_no_edit(&self) -> Result<(), GitError> {
        self.run(&["commit", "--no-edit"])?;
        Ok(())
    }

    /// Push `branch` to `remote`, refusing to clobber unseen remote work.
    #[instrument(skip(self))]
    pub fn push_force_with_lease(&self, remote: &str, branch: &str) -> Result<(), GitError> {
        self.run(&["push", "--force-with-lease", remote, branch])?;
        info!(remote, branch, "pushed");
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Process plumbing
    // -----------------------------------------------------------------------

    fn run_allowing_conflict(&self, args: &[&str]) -> Result<MergeOutcome, GitError> {
        let output = self.output(args)?;
        if output.status.success() {
            return Ok(MergeOutcome::Merged);
        }
        let exit_code = output.status.code().unwrap_or(-1);
        if exit_code == CONFLICT_EXIT_CODE {
            warn!(cmd = %command_line(args), "conflict");
            return Ok(MergeOutcome::Conflict);
        }
        Err(failure(args, &output))
    }

    fn run(&self, args: &[&str]) -> Result<String, GitError> {
        let output = self.output(args)?;
        if !output.status.success() {
            let err = failure(args, &output);
            debug!(%err, "git command failed");
            return Err(err);
        }
        // Leading whitespace is significant: `git branch` marks columns with it.
        Ok(String::from_utf8_lossy(&output.stdout).trim_end().to_string())
    }

    fn output(&self, args: &[&str]) -> Result<Output, GitError> {
        let mut cmd = Command::new("git");
        cmd.current_dir(&self.repo_path)
            .arg("--no-pager")
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        debug!(cmd = %command_line(args), "running git command");
        cmd.output().map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                GitError::BinaryNotFound("git".into())
            } else {
                GitError::IoError(e)
            }
        })
    }
}

fn command_line(args: &[&str]) -> String {
    format!("git {}", args.join(" "))
}

fn failure(args: &[&str], output: &Output) -> GitError {
    let mut stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
    if stderr.is_empty() {
        stderr = String::from_utf8_lossy(&output.stdout).trim().to_string();
    }
    GitError::CommandFailed {
        command: command_line(args),
        exit_code: output.status.code().unwrap_or(-1),
        stderr,
    }
}
