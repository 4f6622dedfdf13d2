use crate::backend::StorageBackend;
use crate::catalog::Catalog;
use crate::error::CatalogError;
use crate::item::Item;
use crate::loader::Loader;
use crate::registry::{BackendHandle, Registry};
use crate::updater::{StatusReport, Updater};
use acat_domain::config::CatalogConfig;
use acat_domain::loadable::Loadable;
use acat_events::{CatalogChanged, ChangeAggregator, ChangeNotifier, EventBus};
use acat_kernel::settings::SettingsStore;
use parking_lot::{Mutex, RwLock};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tracing::{debug, info};

const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(100);

/// Application context tying the registry, the current catalog and change notifications
/// together.
///
/// A load builds a complete new [`Catalog`] before it replaces the current one, so callers
/// holding the previous `Arc<Catalog>` keep a consistent tree.
#[derive(Debug)]
pub struct Pivot {
    registry: Arc<Registry>,
    events: EventBus,
    loadable: Loadable,
    catalog: RwLock<Arc<Catalog>>,
    aggregator: Mutex<Option<ChangeAggregator>>,
    notifier: Option<ChangeNotifier>,
}

impl Pivot {
    #[must_use]
    pub fn builder() -> PivotBuilder {
        PivotBuilder::default()
    }

    #[must_use]
    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    #[must_use]
    pub const fn events(&self) -> &EventBus {
        &self.events
    }

    /// Loads a new catalog and makes it current.
    pub fn load(&self, loadable: Loadable) -> (Arc<Catalog>, Vec<String>) {
        let outcome = Loader::new(&self.registry).load(loadable);
        let catalog = Arc::new(outcome.catalog);
        *self.catalog.write() = Arc::clone(&catalog);
        (catalog, outcome.messages)
    }

    /// Loads with the loadable set given at build time.
    pub fn reload(&self) -> (Arc<Catalog>, Vec<String>) {
        self.load(self.loadable)
    }

    /// The current catalog; empty until the first load.
    #[must_use]
    pub fn catalog(&self) -> Arc<Catalog> {
        Arc::clone(&self.catalog.read())
    }

    /// A copy of the current item with `id`, if any.
    #[must_use]
    pub fn find_item_by_id(&self, id: &str) -> Option<Item> {
        self.catalog.read().find_item_by_id(id).cloned()
    }

    #[must_use]
    pub fn find_first_writable_backend(&self) -> Option<Arc<BackendHandle>> {
        self.registry.find_first_writable()
    }

    pub fn write(&self, item: &mut Item) -> StatusReport {
        Updater::new(&self.registry).write(item)
    }

    pub fn delete(&self, item: &Item) -> StatusReport {
        Updater::new(&self.registry).delete(item)
    }

    #[must_use]
    pub fn updater(&self) -> Updater<'_> {
        Updater::new(&self.registry)
    }

    /// Receiver of [`CatalogChanged`] events.
    ///
    /// # Errors
    /// [`CatalogError::Events`] if the event bus rejects the subscription.
    pub fn subscribe(&self) -> Result<broadcast::Receiver<Arc<CatalogChanged>>, CatalogError> {
        Ok(self.events.subscribe::<CatalogChanged>()?)
    }

    /// The notifier handed to backends, when change watching is on.
    #[must_use]
    pub fn notifier(&self) -> Option<ChangeNotifier> {
        self.notifier.clone()
    }

    /// Stops the change aggregator and waits for it. Idempotent.
    pub async fn shutdown(&self) {
        let aggregator = self.aggregator.lock().take();
        if let Some(aggregator) = aggregator {
            aggregator.shutdown().await;
            info!("Catalog pivot shut down");
        }
    }
}

impl Drop for Pivot {
    fn drop(&mut self) {
        if self.aggregator.get_mut().take().is_some() {
            debug!("Catalog pivot dropped; change aggregator cancelled");
        }
    }
}

/// Builder for [`Pivot`].
#[derive(Debug, Default)]
pub struct PivotBuilder {
    settings: Option<Arc<dyn SettingsStore>>,
    registry: Option<Arc<Registry>>,
    backends: Vec<Arc<dyn StorageBackend>>,
    events: Option<EventBus>,
    debounce: Option<Duration>,
    loadable: Loadable,
    watch_changes: bool,
}

impl PivotBuilder {
    /// Settings for a registry built by [`PivotBuilder::build`]; ignored with
    /// [`PivotBuilder::registry`].
    #[must_use]
    pub fn settings(mut self, settings: Arc<dyn SettingsStore>) -> Self {
        self.settings = Some(settings);
        self
    }

    #[must_use]
    pub fn registry(mut self, registry: Arc<Registry>) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Adds a backend module; only used when no registry is given.
    #[must_use]
    pub fn backend(mut self, module: Arc<dyn StorageBackend>) -> Self {
        self.backends.push(module);
        self
    }

    #[must_use]
    pub fn events(mut self, events: EventBus) -> Self {
        self.events = Some(events);
        self
    }

    #[must_use]
    pub const fn debounce(mut self, window: Duration) -> Self {
        self.debounce = Some(window);
        self
    }

    #[must_use]
    pub const fn loadable(mut self, loadable: Loadable) -> Self {
        self.loadable = loadable;
        self
    }

    /// Spawns the change aggregator and connects every backend to it. Needs a tokio runtime.
    #[must_use]
    pub const fn watch_changes(mut self, enabled: bool) -> Self {
        self.watch_changes = enabled;
        self
    }

    /// Takes the debounce window and the default loadable set from `config`.
    #[must_use]
    pub fn config(mut self, config: &CatalogConfig) -> Self {
        self.debounce = Some(config.debounce());
        self.loadable = config.loadable.into();
        self
    }

    /// # Errors
    /// - [`CatalogError::Validation`] with neither a registry nor settings.
    /// - [`CatalogError::Events`] when watching is requested outside a tokio runtime.
    pub fn build(self) -> Result<Pivot, CatalogError> {
        let registry = match self.registry {
            Some(registry) => registry,
            None => {
                let settings = self.settings.ok_or_else(|| CatalogError::Validation {
                    message: "Neither a registry nor a settings store was provided".into(),
                    context: Some("Pivot".into()),
                })?;
                Arc::new(Registry::builder().settings(settings).backends(self.backends).build()?)
            },
        };
        let events = self.events.unwrap_or_default();
        let window = self.debounce.unwrap_or(DEFAULT_DEBOUNCE);

        let (aggregator, notifier) = if self.watch_changes {
            let aggregator = ChangeAggregator::spawn(events.clone(), window)?;
            let notifier = aggregator.notifier();
            for handle in registry.handles().iter() {
                if let Some(module) = handle.module() {
                    module.watch(notifier.clone());
                }
            }
            (Some(aggregator), Some(notifier))
        } else {
            (None, None)
        };

        debug!(watching = notifier.is_some(), window_ms = window.as_millis(), "Catalog pivot ready");

        Ok(Pivot {
            registry,
            events,
            loadable: self.loadable,
            catalog: RwLock::new(Arc::new(Catalog::default())),
            aggregator: Mutex::new(aggregator),
            notifier,
        })
    }
}
