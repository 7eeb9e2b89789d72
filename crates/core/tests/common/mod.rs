//! Shared fixtures for the integration tests.
//!
//! Repositories are real: they are built with the `git` binary inside a
//! `TempDir`. If `git` is not installed, tests skip gracefully.

#![allow(dead_code)]

use std::path::Path;
use std::process::{Command, Output, Stdio};

use tempfile::TempDir;

use gitsmash_core::config::SmashConfig;
use gitsmash_core::replay::{ConflictContext, Operator, Resolution};
use gitsmash_core::GitClient;

/// Returns `true` if `git` is available on `$PATH`.
pub fn git_available() -> bool {
    Command::new("git")
        .arg("--version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

/// Skip the current test when `git` is missing.
#[macro_export]
macro_rules! require_git {
    () => {
        if !common::git_available() {
            eprintln!("git not installed, skipping");
            return;
        }
    };
}

/// A throwaway repository with a single `base` commit on `master`.
pub struct TestRepo {
    dir: TempDir,
}

impl TestRepo {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let repo = Self { dir };
        repo.git(&["init", "-q"]);
        repo.git(&["symbolic-ref", "HEAD", "refs/heads/master"]);
        repo.git(&["config", "user.name", "Test"]);
        repo.git(&["config", "user.email", "test@example.com"]);
        repo.git(&["config", "commit.gpgsign", "false"]);
        repo.commit_file("base.txt", "base\n", "base");
        repo
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn client(&self) -> GitClient {
        GitClient::new(self.path())
    }

    /// Run git and return its output, whatever the exit status.
    pub fn try_git(&self, args: &[&str]) -> Output {
        Command::new("git")
            .current_dir(self.path())
            .env("GIT_EDITOR", "true")
            .args(args)
            .output()
            .expect("failed to run git")
    }

    /// Run git, asserting success, and return trimmed stdout.
    pub fn git(&self, args: &[&str]) -> String {
        let output = self.try_git(args);
        assert!(
            output.status.success(),
            "git {:?} failed: {}",
            args,
            String::from_utf8_lossy(&output.stderr)
        );
        String::from_utf8_lossy(&output.stdout).trim().to_string()
    }

    /// Write `content` to `file`, commit it, and return the new revision.
    pub fn commit_file(&self, file: &str, content: &str, message: &str) -> String {
        std::fs::write(self.path().join(file), content).unwrap();
        self.git(&["add", file]);
        self.git(&["commit", "-q", "-m", message]);
        self.rev("HEAD")
    }

    pub fn checkout(&self, name: &str) {
        self.git(&["checkout", "-q", name]);
    }

    /// Create `name` at `start` and check it out.
    pub fn branch(&self, name: &str, start: &str) {
        self.git(&["checkout", "-q", "-b", name, start]);
    }

    /// `merge --no-ff` that must succeed.
    pub fn merge(&self, name: &str) -> String {
        self.git(&["merge", "-q", "--no-ff", "--no-edit", name]);
        self.rev("HEAD")
    }

    /// `merge --no-ff` expected to conflict; `resolve` is written to `file`
    /// and the merge committed.
    pub fn merge_resolving(&self, name: &str, file: &str, resolve: &str) -> String {
        let output = self.try_git(&["merge", "--no-ff", "--no-edit", name]);
        assert_eq!(output.status.code(), Some(1), "expected a conflict merging {}", name);
        std::fs::write(self.path().join(file), resolve).unwrap();
        self.git(&["add", "--all"]);
        self.git(&["commit", "-q", "--no-edit"]);
        self.rev("HEAD")
    }

    pub fn rev(&self, name: &str) -> String {
        self.git(&["rev-parse", name])
    }

    pub fn branch_exists(&self, name: &str) -> bool {
        self.try_git(&["rev-parse", "--verify", "--quiet", &format!("refs/heads/{}", name)])
            .status
            .success()
    }

    pub fn current_branch(&self) -> String {
        self.git(&["rev-parse", "--abbrev-ref", "HEAD"])
    }

    pub fn parents(&self, rev: &str) -> Vec<String> {
        self.git(&["log", "--pretty=%P", "-n", "1", rev])
            .split_whitespace()
            .map(str::to_string)
            .collect()
    }

    pub fn subject(&self, rev: &str) -> String {
        self.git(&["log", "--pretty=%s", "-n", "1", rev])
    }

    pub fn read(&self, file: &str) -> Option<String> {
        std::fs::read_to_string(self.path().join(file)).ok()
    }

    pub fn is_clean(&self) -> bool {
        self.git(&["status", "--porcelain"]).is_empty()
    }
}

/// Config rebuilding onto the local `master`.
pub fn local_config() -> SmashConfig {
    SmashConfig {
        base_branch: "master".into(),
        ..SmashConfig::default()
    }
}

/// An operator driven by the test.
pub struct ScriptedOperator {
    pub overwrite_backups: bool,
    pub on_conflict: Box<dyn FnMut(&ConflictContext) -> Resolution>,
    pub prompts: Vec<String>,
    pub conflicts: Vec<ConflictContext>,
}

impl ScriptedOperator {
    /// An operator that must never be consulted about conflicts.
    pub fn unattended() -> Self {
        Self::resolving(|ctx| panic!("unexpected conflict merging {}", ctx.merge_branch))
    }

    pub fn resolving(on_conflict: impl FnMut(&ConflictContext) -> Resolution + 'static) -> Self {
        Self {
            overwrite_backups: false,
            on_conflict: Box::new(on_conflict),
            prompts: Vec::new(),
            conflicts: Vec::new(),
        }
    }
}

impl Operator for ScriptedOperator {
    fn confirm_backup_overwrite(&mut self, existing: &str) -> bool {
        self.prompts.push(existing.to_string());
        self.overwrite_backups
    }

    fn resolve_conflict(&mut self, context: &ConflictContext) -> Resolution {
        self.conflicts.push(context.clone());
        (self.on_conflict)(context)
    }
}
