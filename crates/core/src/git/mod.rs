//! Git CLI wrapper for git-smash.

pub mod client;
pub mod parser;

pub use client::{GitClient, MergeOutcome};
