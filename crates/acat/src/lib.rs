//! Facade crate for the action catalog.
//! Re-exports the domain, kernel, events and catalog crates and wires them together.
//! Keep this crate thin: it composes the other crates, it does not implement catalog logic.
//!
//! ## Usage
//! - Depend on `acat` alone; disable the `logger` feature to bring your own subscriber.
//! - Call [`init`] with the application config and the backend modules to get a [`Pivot`].

pub use acat_catalog as catalog;
pub use acat_domain as domain;
pub use acat_events as events;
pub use acat_kernel as kernel;
#[cfg(feature = "logger")]
pub use acat_logger as logger;

use acat_catalog::{CatalogError, Pivot, StorageBackend};
use acat_domain::config::CatalogConfig;
use acat_kernel::settings::FileSettings;
use std::sync::Arc;
use tracing::info;

/// The names most applications need.
pub mod prelude {
    pub use acat_catalog::{
        Catalog, CatalogError, Item, LoadOutcome, Loader, Pivot, Registry, StorageBackend,
        Updater, WritabilityEngine,
    };
    pub use acat_domain::capabilities::Capabilities;
    pub use acat_domain::item::{ItemKind, SortMode};
    pub use acat_domain::loadable::Loadable;
    pub use acat_domain::status::Status;
    pub use acat_domain::writability::{Reason, Writability};
    pub use acat_events::{CatalogChanged, ChangeNotifier, EventBus, EventReceiverExt};
    pub use acat_kernel::settings::{FileSettings, MemorySettings, SettingsStore};
}

/// Opens the settings files named by `config` and builds a [`Pivot`] over `backends`.
///
/// With `watch_changes` the change aggregator is spawned on the current tokio runtime.
///
/// # Errors
/// - [`CatalogError::Settings`] when a settings file cannot be read or parsed.
/// - [`CatalogError::Events`] when watching is requested outside a tokio runtime.
pub fn init(
    config: &CatalogConfig,
    backends: impl IntoIterator<Item = Arc<dyn StorageBackend>>,
    watch_changes: bool,
) -> Result<Pivot, CatalogError> {
    let settings = FileSettings::open(&config.settings.user, config.settings.admin.as_ref())?;

    let mut builder =
        Pivot::builder().settings(Arc::new(settings)).config(config).watch_changes(watch_changes);
    for backend in backends {
        builder = builder.backend(backend);
    }
    let pivot = builder.build()?;

    info!(backends = pivot.registry().handles().len(), "Action catalog initialised");
    Ok(pivot)
}
