//! Named actions selectable from the command line.

use std::fmt;
use std::str::FromStr;

use crate::errors::SmashError;

/// The fixed set of operations git-smash can run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Show the merges that a replay would apply.
    List,
    /// Rebuild the current branch from its merges.
    Replay,
    /// Delete `smash/*` branches.
    Clean,
}

impl Action {
    pub const ALL: [Action; 3] = [Action::List, Action::Replay, Action::Clean];

    pub fn name(self) -> &'static str {
        match self {
            Self::List => "list",
            Self::Replay => "replay",
            Self::Clean => "clean",
        }
    }
}

impl FromStr for Action {
    type Err = SmashError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|action| action.name() == s)
            .ok_or_else(|| SmashError::UnknownAction(s.to_string()))
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
