use super::layers::{self, Layers};
use super::{Setting, SettingsError, SettingsErrorExt, SettingsStore};
use parking_lot::RwLock;
use toml::{Table, Value};

/// Settings held in memory only.
///
/// Useful for embedding and tests: seed the admin layer with [`MemorySettings::mandate`] to
/// simulate an administrator lock.
#[derive(Debug, Default)]
pub struct MemorySettings {
    layers: RwLock<Layers>,
}

impl MemorySettings {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds both layers from TOML documents.
    ///
    /// # Errors
    /// Returns [`SettingsError::Parse`] if either document is malformed.
    pub fn from_toml(user: &str, admin: &str) -> Result<Self, SettingsError> {
        let user = toml::from_str::<Table>(user).context("Parsing user settings")?;
        let admin = toml::from_str::<Table>(admin).context("Parsing admin settings")?;
        Ok(Self { layers: RwLock::new(Layers { admin, user }) })
    }

    /// Imposes `value` as a mandatory setting.
    pub fn mandate(&self, key: &str, group: Option<&str>, value: impl Into<Value>) {
        self.layers.write().mandate(key, group, value.into());
    }

    /// Imposes a mandatory string list.
    pub fn mandate_list(&self, key: &str, group: Option<&str>, values: &[&str]) {
        let owned: Vec<String> = values.iter().map(|v| (*v).to_owned()).collect();
        self.layers.write().mandate(key, group, layers::string_list(&owned));
    }
}

impl SettingsStore for MemorySettings {
    fn get_bool(&self, key: &str, group: Option<&str>) -> Option<Setting<bool>> {
        self.layers.read().typed(key, group, layers::as_bool)
    }

    fn get_string(&self, key: &str, group: Option<&str>) -> Option<Setting<String>> {
        self.layers.read().typed(key, group, layers::as_string)
    }

    fn get_string_list(&self, key: &str, group: Option<&str>) -> Option<Setting<Vec<String>>> {
        self.layers.read().typed(key, group, layers::as_string_list)
    }

    fn set_bool(&self, key: &str, group: Option<&str>, value: bool) -> Result<(), SettingsError> {
        self.layers.write().store(key, group, Value::Boolean(value))
    }

    fn set_string(&self, key: &str, group: Option<&str>, value: &str) -> Result<(), SettingsError> {
        self.layers.write().store(key, group, Value::String(value.to_owned()))
    }

    fn set_string_list(
        &self,
        key: &str,
        group: Option<&str>,
        value: &[String],
    ) -> Result<(), SettingsError> {
        self.layers.write().store(key, group, layers::string_list(value))
    }

    fn groups(&self) -> Vec<String> {
        self.layers.read().groups()
    }
}
