use serde::{Deserialize, Serialize};
use std::fmt;

/// Outcome of a write, delete or duplicate call on a storage backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Status {
    #[default]
    Ok,
    ProgramError,
    NotWillingToRun,
    WriteError,
    DeleteSchemasError,
    DeleteConfigError,
}

impl Status {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Ok => "OK.",
            Self::ProgramError => "Program flow error.",
            Self::NotWillingToRun => "The storage backend is not willing to do that.",
            Self::WriteError => "Write error in the storage backend.",
            Self::DeleteSchemasError => "Unable to delete the item schemas.",
            Self::DeleteConfigError => "Unable to delete the item configuration.",
        }
    }

    #[must_use]
    pub const fn is_ok(self) -> bool {
        matches!(self, Self::Ok)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
