use serde::{Deserialize, Serialize};
use std::fmt;

/// The three node variants of the catalog tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    /// Groups sub-menus and actions.
    Menu,
    /// A runnable entry; its children are profiles.
    Action,
    /// One execution profile of an action.
    Profile,
}

impl ItemKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Menu => "menu",
            Self::Action => "action",
            Self::Profile => "profile",
        }
    }

    /// Menus and actions are "items"; profiles only live under an action.
    #[must_use]
    pub const fn is_item(self) -> bool {
        !matches!(self, Self::Profile)
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the loader orders each level of the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortMode {
    #[default]
    Ascending,
    Descending,
    /// Keep the persisted manual order.
    Manual,
}

impl SortMode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ascending => "ascending",
            Self::Descending => "descending",
            Self::Manual => "manual",
        }
    }

    /// Parses a settings value; unknown strings yield `None`.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "ascending" | "asc" => Some(Self::Ascending),
            "descending" | "desc" => Some(Self::Descending),
            "manual" => Some(Self::Manual),
            _ => None,
        }
    }
}

impl fmt::Display for SortMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
