use crate::loadable::Loadable;
use serde::Deserialize;
use std::ops::{Deref, DerefMut};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Top-level catalog configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CatalogConfigInner {
    /// Debounce window of the change aggregator, in milliseconds.
    pub debounce_ms: u64,
    pub loadable: LoadableConfig,
    pub settings: SettingsConfig,
}

/// Thin Arc-wrapped config for inexpensive cloning into subsystems.
#[derive(Default, Debug, Clone, Deserialize)]
pub struct CatalogConfig {
    #[serde(flatten, default)]
    inner: Arc<CatalogConfigInner>,
}

impl Deref for CatalogConfig {
    type Target = CatalogConfigInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl DerefMut for CatalogConfig {
    fn deref_mut(&mut self) -> &mut CatalogConfigInner {
        Arc::make_mut(&mut self.inner)
    }
}

impl CatalogConfigInner {
    #[must_use]
    pub const fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

/// Default inclusion flags handed to the loader.
#[derive(Default, Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct LoadableConfig {
    pub include_disabled: bool,
    pub include_invalid: bool,
}

impl From<LoadableConfig> for Loadable {
    fn from(config: LoadableConfig) -> Self {
        Self::new(config.include_disabled, config.include_invalid)
    }
}

/// Settings store files: the admin file holds mandatory values.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SettingsConfig {
    pub user: PathBuf,
    pub admin: Option<PathBuf>,
}

// --- Default ---

impl Default for CatalogConfigInner {
    fn default() -> Self {
        Self {
            debounce_ms: 100,
            loadable: LoadableConfig::default(),
            settings: SettingsConfig::default(),
        }
    }
}

impl Default for SettingsConfig {
    fn default() -> Self {
        Self { user: PathBuf::from("catalog.toml"), admin: None }
    }
}
