//! Status enums for lists and callers.

use serde::{Deserialize, Serialize};

/// Lifecycle state of a shopping list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ListState {
    #[default]
    Active,
    Archived,
}

impl ListState {
    /// Stable string form, also used as the database column value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Archived => "archived",
        }
    }
}

impl std::fmt::Display for ListState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ListState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "archived" => Ok(Self::Archived),
            _ => Err(format!("invalid list state: {s}")),
        }
    }
}

/// Application profile granted to a caller by the upstream gateway.
///
/// Every list operation requires at least one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Profile {
    /// Workspace administrators.
    Authorities,
    /// Regular users.
    Operatives,
}

impl Profile {
    /// Profiles allowed to use the shopping list commands.
    pub const LIST_USERS: [Self; 2] = [Self::Operatives, Self::Authorities];
}

impl std::fmt::Display for Profile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Authorities => write!(f, "Authorities"),
            Self::Operatives => write!(f, "Operatives"),
        }
    }
}

impl std::str::FromStr for Profile {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Authorities" => Ok(Self::Authorities),
            "Operatives" => Ok(Self::Operatives),
            other => Err(format!("invalid profile: {other}")),
        }
    }
}
