//! git-smash core library.
//!
//! Finds the feature branches merged into the current branch, collapses them
//! to the latest merge per branch, resolves each to a live branch, and replays
//! them onto a fresh base with an escalating conflict protocol.

pub mod action;
pub mod catalog;
pub mod config;
pub mod errors;
pub mod git;
pub mod history;
pub mod models;
pub mod replay;
pub mod temp_branch;

// Re-exports for convenience.
pub use action::Action;
pub use catalog::BranchCatalog;
pub use config::SmashConfig;
pub use errors::SmashError;
pub use git::GitClient;
pub use replay::{ReplayOptions, Smash};
