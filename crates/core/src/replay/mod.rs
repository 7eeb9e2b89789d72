//! Rebuild the current branch by replaying its merges onto a fresh base.
//!
//! A replay runs these steps, stopping at the first fatal error:
//!
//! 1. Resolve the base (merge-base of HEAD and the base branch).
//! 2. Scan the merges since the base and simplify them to one per branch.
//! 3. Resolve each merged branch name to a live branch, or a placeholder
//!    pinned to the commit that was originally merged.
//! 4. Reverse the list so branches are merged chronologically.
//! 5. Back up the current branch to `smash/<name>`.
//! 6. Hard-reset the current branch to the base.
//! 7. Merge every branch, escalating on conflict (see [`strategy`]).

pub mod operator;
pub mod strategy;

use tracing::{info, instrument, warn};

use crate::catalog::BranchCatalog;
use crate::config::SmashConfig;
use crate::errors::{ReplayError, SmashError};
use crate::git::GitClient;
use crate::history::{resolve_base, scan_merges, simplify, BaseRevision};
use crate::models::{Branch, MergeRecord, ResolvedMerge, SMASH_PREFIX};

pub use operator::{ConflictContext, Operator, Resolution};
pub use strategy::{ApplyOutcome, Attempt};

use strategy::BranchApplier;

/// Per-invocation options that do not live in the config file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplayOptions {
    /// Merged branch names to leave out.
    pub drop: Vec<String>,
    /// Reset onto the base branch tip instead of the merge-base.
    pub reset_base: bool,
}

/// One branch merged (or skipped) during a replay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplayStep {
    pub merge_branch: String,
    pub branch: String,
    pub outcome: ApplyOutcome,
}

/// Summary of a finished replay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplayReport {
    pub current_branch: String,
    pub backup_branch: String,
    pub reset_to: String,
    pub steps: Vec<ReplayStep>,
    pub pushed: bool,
}

/// Entry point for the `list`, `clean` and `replay` actions.
pub struct Smash {
    git: GitClient,
    config: SmashConfig,
    options: ReplayOptions,
}

impl Smash {
    pub fn new(git: GitClient, config: SmashConfig, options: ReplayOptions) -> Self {
        Self {
            git,
            config,
            options,
        }
    }

    pub fn config(&self) -> &SmashConfig {
        &self.config
    }

    // -----------------------------------------------------------------------
    // list
    // -----------------------------------------------------------------------

    /// Merges since the base, newest first; simplified unless `all`.
    #[instrument(skip(self))]
    pub fn list(&self, all: bool) -> Result<Vec<MergeRecord>, SmashError> {
        let base = resolve_base(&self.git, &self.config.base_branch)?;
        if all {
            Ok(scan_merges(&self.git, &base.merge_base, &self.options.drop)?)
        } else {
            self.gather(&base)
        }
    }

    // -----------------------------------------------------------------------
    // clean
    // -----------------------------------------------------------------------

    /// Delete every local `smash/*` branch except the checked out one.
    /// Returns the branches removed, described with their commits.
    #[instrument(skip(self))]
    pub fn clean(&self) -> Result<Vec<String>, SmashError> {
        let catalog = BranchCatalog::snapshot(&self.git)?;
        let current = catalog.current()?;

        let mut removed = Vec::new();
        for branch in catalog.with_prefix(SMASH_PREFIX) {
            if branch.name == current.name {
                warn!(branch = %branch.name, "not removing the checked out branch");
                continue;
            }
            let info = branch.info(&self.git);
            info!("remove {}", info);
            self.git.delete_branch(&branch.name)?;
            removed.push(info);
        }
        Ok(removed)
    }

    // -----------------------------------------------------------------------
    // replay
    // -----------------------------------------------------------------------

    /// Rebuild the current branch from the base plus its merged branches.
    #[instrument(skip(self, operator))]
    pub fn replay(&self, operator: &mut dyn Operator) -> Result<ReplayReport, SmashError> {
        let base = resolve_base(&self.git, &self.config.base_branch)?;

        info!("find merge commits:");
        let records = self.gather(&base)?;

        let catalog = BranchCatalog::snapshot(&self.git)?;
        let current = catalog.current()?.clone();

        let mut plan = self.resolve_branches(&catalog, &current, records)?;
        plan.reverse();

        let listing: Vec<String> = plan.iter().map(|r| r.branch.info(&self.git)).collect();
        info!("branches to merge:\n\t{}", listing.join("\n\t"));

        let backup_branch = self.backup(&current, operator)?;

        let reset_to = if self.options.reset_base {
            base.tip.clone()
        } else {
            base.merge_base.clone()
        };
        info!(branch = %current.name, "resetting to {}", reset_to);
        self.git.reset_hard(Some(&reset_to))?;

        let applier = BranchApplier {
            git: &self.git,
            current_branch: &current.name,
            backup_branch: &backup_branch,
        };
        let mut steps = Vec::with_capacity(plan.len());
        for resolved in &plan {
            let outcome = applier.apply(resolved, operator)?;
            steps.push(ReplayStep {
                merge_branch: resolved.record.merge_branch.clone(),
                branch: resolved.branch.name.clone(),
                outcome,
            });
        }

        let pushed = if self.config.push {
            self.git
                .push_force_with_lease(&self.config.remote, &current.name)?;
            true
        } else {
            false
        };

        Ok(ReplayReport {
            current_branch: current.name,
            backup_branch,
            reset_to,
            steps,
            pushed,
        })
    }

    /// Scan and simplify the merges since `base`.
    fn gather(&self, base: &BaseRevision) -> Result<Vec<MergeRecord>, SmashError> {
        let merges = scan_merges(&self.git, &base.merge_base, &self.options.drop)?;
        Ok(simplify(merges))
    }

    /// Pair every record with the branch to merge, newest first.
    fn resolve_branches(
        &self,
        catalog: &BranchCatalog,
        current: &Branch,
        records: Vec<MergeRecord>,
    ) -> Result<Vec<ResolvedMerge>, SmashError> {
        let candidates = catalog.without_prefix(SMASH_PREFIX);
        let mut resolved = Vec::with_capacity(records.len());

        for record in records {
            if record.merge_branch == current.name {
                info!("{} merging self; skipping", record.merge_branch);
                continue;
            }

            let branch = match candidates.best_match(&record.merge_branch)? {
                Some(branch) if branch.name == current.name => {
                    info!("{} resolves to the current branch; skipping", record.merge_branch);
                    continue;
                }
                Some(branch) => branch.clone(),
                None => {
                    let tip = record.commit.right_parent(&self.git)?;
                    let placeholder =
                        Branch::pinned(format!("{}{}", SMASH_PREFIX, record.merge_branch), tip);
                    warn!(
                        "cannot find {} on any remote, using the merged commit: {}",
                        record.merge_branch,
                        placeholder.info(&self.git)
                    );
                    placeholder
                }
            };

            resolved.push(ResolvedMerge { record, branch });
        }

        Ok(resolved)
    }

    /// Save the current branch as `smash/<name>`.
    ///
    /// If the name is taken, the `smash/` namespace is cleaned (after asking,
    /// unless `clean_backups` is set) and the backup retried once.
    fn backup(&self, current: &Branch, operator: &mut dyn Operator) -> Result<String, SmashError> {
        let backup = format!("{}{}", SMASH_PREFIX, current.name);
        info!("backing up current branch to {}", backup);

        let mut cleaned = false;
        loop {
            match self.git.checkout_new(&backup, None) {
                Ok(()) => {
                    self.git.checkout(&current.name)?;
                    return Ok(backup);
                }
                Err(err) if err.is_branch_exists() => {
                    if cleaned {
                        return Err(ReplayError::BackupCollision(backup).into());
                    }
                    let existing = Branch::new(backup.as_str(), false).info(&self.git);
                    let clean = self.config.clean_backups
                        || operator.confirm_backup_overwrite(&existing);
                    if !clean {
                        return Err(ReplayError::OperatorDeclined(backup).into());
                    }
                    self.clean()?;
                    cleaned = true;
                }
                Err(err) => return Err(err.into()),
            }
        }
    }
}
