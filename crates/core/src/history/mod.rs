//! Merge history: message parsing, scanning and simplification.

pub mod message;
pub mod scanner;
pub mod simplify;

pub use message::parse_merge_branch;
pub use scanner::{resolve_base, scan_merges, BaseRevision};
pub use simplify::simplify;
