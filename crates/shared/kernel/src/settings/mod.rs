//! Narrow key/value settings interface consumed by the catalog.
//!
//! Every value is reported together with its *mandatory* flag: a mandatory value was imposed
//! by an administrator and cannot be overridden (nor written) by the user.

mod file;
pub mod keys;
mod layers;
mod memory;

pub use file::FileSettings;
pub use memory::MemorySettings;

use std::borrow::Cow;
use std::fmt::Debug;

#[acat_derive::acat_error]
pub enum SettingsError {
    /// The key is imposed by the admin layer.
    #[error("Mandatory setting cannot be written{}: {message}", format_context(.context))]
    Mandatory { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Settings I/O failure{}: {source}", format_context(.context))]
    Io { source: std::io::Error, context: Option<Cow<'static, str>> },

    #[error("Malformed settings file{}: {source}", format_context(.context))]
    Parse { source: toml::de::Error, context: Option<Cow<'static, str>> },

    #[error("Settings serialization failure{}: {source}", format_context(.context))]
    Serialize { source: toml::ser::Error, context: Option<Cow<'static, str>> },

    #[error("Internal settings error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

/// A value read from the store, with its mandatory flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Setting<T> {
    pub value: T,
    pub mandatory: bool,
}

impl<T> Setting<T> {
    pub const fn user(value: T) -> Self {
        Self { value, mandatory: false }
    }

    pub const fn mandatory(value: T) -> Self {
        Self { value, mandatory: true }
    }
}

/// Typed access to the settings store.
///
/// `group` selects a section; `None` means [`keys::GLOBAL_GROUP`]. Getters return `None`
/// when the key is absent or holds a value of another type.
pub trait SettingsStore: Debug + Send + Sync {
    fn get_bool(&self, key: &str, group: Option<&str>) -> Option<Setting<bool>>;

    fn get_string(&self, key: &str, group: Option<&str>) -> Option<Setting<String>>;

    fn get_string_list(&self, key: &str, group: Option<&str>) -> Option<Setting<Vec<String>>>;

    /// # Errors
    /// [`SettingsError::Mandatory`] when the key is imposed, or a persistence failure.
    fn set_bool(&self, key: &str, group: Option<&str>, value: bool) -> Result<(), SettingsError>;

    /// # Errors
    /// [`SettingsError::Mandatory`] when the key is imposed, or a persistence failure.
    fn set_string(&self, key: &str, group: Option<&str>, value: &str) -> Result<(), SettingsError>;

    /// # Errors
    /// [`SettingsError::Mandatory`] when the key is imposed, or a persistence failure.
    fn set_string_list(
        &self,
        key: &str,
        group: Option<&str>,
        value: &[String],
    ) -> Result<(), SettingsError>;

    /// Every group known to either layer.
    fn groups(&self) -> Vec<String>;

    fn get_bool_or(&self, key: &str, group: Option<&str>, default: bool) -> Setting<bool> {
        self.get_bool(key, group).unwrap_or(Setting::user(default))
    }

    fn get_string_list_or_empty(&self, key: &str, group: Option<&str>) -> Setting<Vec<String>> {
        self.get_string_list(key, group).unwrap_or(Setting::user(Vec::new()))
    }
}
