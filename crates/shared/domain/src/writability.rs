use serde::{Deserialize, Serialize};
use std::fmt;

/// Why an item or a backend can, or cannot, be written.
///
/// The order of the variants mirrors the order in which the checks are made.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Reason {
    Writable,
    /// The backend is known from the settings but no module is loaded for it.
    Unavailable,
    /// The backend lacks one of willing/able/write/delete.
    IncompleteApi,
    NotWillingTo,
    NotAbleTo,
    LockedByAdmin,
    LockedByUser,
    ItemReadonly,
    NoProviderFound,
    /// The level-zero order is a mandatory preference, so top-level items are frozen.
    LevelZero,
    #[default]
    Undetermined,
}

impl Reason {
    pub const ALL: [Self; 11] = [
        Self::Writable,
        Self::Unavailable,
        Self::IncompleteApi,
        Self::NotWillingTo,
        Self::NotAbleTo,
        Self::LockedByAdmin,
        Self::LockedByUser,
        Self::ItemReadonly,
        Self::NoProviderFound,
        Self::LevelZero,
        Self::Undetermined,
    ];

    /// User-facing explanation, suitable for a tooltip.
    #[must_use]
    pub const fn tooltip(self) -> &'static str {
        match self {
            Self::Writable => "Writable.",
            Self::Unavailable => "The storage backend is not available.",
            Self::IncompleteApi => "The storage backend does not implement the full write interface.",
            Self::NotWillingTo => "The storage backend is not willing to write.",
            Self::NotAbleTo => "The storage backend reports that it is unable to write.",
            Self::LockedByAdmin => "The storage backend has been locked by an administrator.",
            Self::LockedByUser => "The storage backend has been locked by the user.",
            Self::ItemReadonly => "The item is read-only.",
            Self::NoProviderFound => "No writable storage backend was found.",
            Self::LevelZero => "The top-level order has been locked by an administrator.",
            Self::Undetermined => "Unable to determine why the item is not writable.",
        }
    }

    #[must_use]
    pub const fn is_writable(self) -> bool {
        matches!(self, Self::Writable)
    }
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tooltip())
    }
}

/// Cached result of a writability computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Writability {
    pub writable: bool,
    pub reason: Reason,
}

impl Writability {
    pub const WRITABLE: Self = Self { writable: true, reason: Reason::Writable };

    #[must_use]
    pub const fn denied(reason: Reason) -> Self {
        Self { writable: false, reason }
    }
}
