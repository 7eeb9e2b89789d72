//! Operator backed by the terminal: confirmation prompts and a subshell for
//! resolving conflicts by hand.

use std::process::Command;

use dialoguer::Confirm;
use tracing::{error, warn};

use gitsmash_core::replay::{ConflictContext, Operator, Resolution};

use crate::style;

pub struct TerminalOperator {
    shell: String,
}

impl TerminalOperator {
    pub fn new(shell: impl Into<String>) -> Self {
        Self {
            shell: shell.into(),
        }
    }
}

impl Operator for TerminalOperator {
    fn confirm_backup_overwrite(&mut self, existing: &str) -> bool {
        let prompt = format!(
            "backup branch {} already exists. Delete all smash/ branches and continue?",
            existing
        );
        match Confirm::new().with_prompt(prompt).default(false).interact() {
            Ok(answer) => answer,
            Err(err) => {
                warn!(%err, "failed to read confirmation");
                false
            }
        }
    }

    fn resolve_conflict(&mut self, context: &ConflictContext) -> Resolution {
        println!();
        println!(
            "{}",
            style::warn(&format!(
                "merging {} into {} needs a hand",
                style::branch(&context.merge_branch),
                style::branch(&context.current_branch)
            ))
        );
        println!("  Launching a subshell. Fix the conflict, but do not commit.");
        println!("  Exit with status 0 when done; any other status aborts the replay.");
        println!(
            "  {}",
            style::dim(&format!(
                "merging {}; the previous state is on {}",
                style::short_rev(&context.revision),
                context.backup_branch
            ))
        );
        println!();

        let status = Command::new(&self.shell)
            .arg("-i")
            .current_dir(&context.repo_path)
            .status();

        match status {
            Ok(status) if status.success() => Resolution::Resolved,
            Ok(status) => {
                warn!(%status, "subshell exited unsuccessfully");
                Resolution::Aborted
            }
            Err(err) => {
                error!(shell = %self.shell, %err, "failed to launch subshell");
                Resolution::Aborted
            }
        }
    }
}
