use crate::backend::StorageBackend;
use crate::error::CatalogError;
use acat_domain::writability::{Reason, Writability};
use acat_kernel::settings::{Setting, SettingsStore, keys};
use fxhash::FxHashMap;
use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, info, warn};

/// The registry's stable wrapper around one backend identity.
///
/// A handle outlives the module it wraps: backends that are configured but not installed
/// still get a handle (without module) so that their settings are kept and reported.
pub struct BackendHandle {
    id: String,
    module: Option<Arc<dyn StorageBackend>>,
    readable: Setting<bool>,
    writable_config: Setting<bool>,
    willing: bool,
    able: bool,
    writability: Writability,
}

impl BackendHandle {
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The module's name, or the id when no module is attached.
    #[must_use]
    pub fn name(&self) -> &str {
        self.module.as_deref().map_or(self.id.as_str(), |module| module.name())
    }

    #[must_use]
    pub fn module(&self) -> Option<&Arc<dyn StorageBackend>> {
        self.module.as_ref()
    }

    #[must_use]
    pub const fn is_available(&self) -> bool {
        self.module.is_some()
    }

    /// Whether the user wants this backend's items loaded.
    #[must_use]
    pub const fn is_readable(&self) -> bool {
        self.readable.value
    }

    #[must_use]
    pub const fn readable_mandatory(&self) -> bool {
        self.readable.mandatory
    }

    #[must_use]
    pub const fn is_writable_config(&self) -> bool {
        self.writable_config.value
    }

    #[must_use]
    pub const fn writable_mandatory(&self) -> bool {
        self.writable_config.mandatory
    }

    #[must_use]
    pub const fn is_willing(&self) -> bool {
        self.willing
    }

    #[must_use]
    pub const fn is_able(&self) -> bool {
        self.able
    }

    #[must_use]
    pub const fn is_finally_writable(&self) -> bool {
        self.writability.writable
    }

    #[must_use]
    pub const fn reason(&self) -> Reason {
        self.writability.reason
    }

    #[must_use]
    pub const fn writability(&self) -> Writability {
        self.writability
    }
}

impl fmt::Debug for BackendHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackendHandle")
            .field("id", &self.id)
            .field("available", &self.module.is_some())
            .field("readable", &self.readable)
            .field("writable_config", &self.writable_config)
            .field("willing", &self.willing)
            .field("able", &self.able)
            .field("writability", &self.writability)
            .finish()
    }
}

/// Ordered, immutable set of handles as published by a build.
pub type Handles = Arc<[Arc<BackendHandle>]>;

/// Owns the backend modules and the handle snapshot built from them.
///
/// Handles are built lazily on first use and cached until [`Registry::invalidate`]. A build
/// runs single-threaded on a private list and is published in one store, so readers never
/// see two handles for the same id. No lock is held while backend modules are queried.
pub struct Registry {
    settings: Arc<dyn SettingsStore>,
    modules: RwLock<Vec<Arc<dyn StorageBackend>>>,
    snapshot: RwLock<Option<Handles>>,
    /// Bumped by every invalidation; a build started before a bump is not cached.
    generation: AtomicU64,
}

impl Registry {
    #[must_use]
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    #[must_use]
    pub fn settings(&self) -> &Arc<dyn SettingsStore> {
        &self.settings
    }

    /// The ordered handles, building them if needed.
    #[must_use]
    pub fn handles(&self) -> Handles {
        if let Some(handles) = self.snapshot.read().as_ref() {
            return Arc::clone(handles);
        }

        let generation = self.generation.load(Ordering::Acquire);
        let built = self.build_handles();

        let mut slot = self.snapshot.write();
        if let Some(handles) = slot.as_ref() {
            return Arc::clone(handles);
        }
        if self.generation.load(Ordering::Acquire) == generation {
            *slot = Some(Arc::clone(&built));
        } else {
            debug!("Backend registry changed during the build; snapshot not cached");
        }
        built
    }

    /// Exact id lookup.
    #[must_use]
    pub fn find_by_id(&self, id: &str) -> Option<Arc<BackendHandle>> {
        self.handles().iter().find(|handle| handle.id == id).cloned()
    }

    /// First handle, in registry order, that can finally be written to.
    #[must_use]
    pub fn find_first_writable(&self) -> Option<Arc<BackendHandle>> {
        self.handles().iter().find(|handle| handle.is_finally_writable()).cloned()
    }

    /// Drops the cached snapshot; the next access rebuilds it.
    pub fn invalidate(&self) {
        let mut slot = self.snapshot.write();
        self.generation.fetch_add(1, Ordering::AcqRel);
        if slot.take().is_some() {
            debug!("Backend registry invalidated");
        }
    }

    #[must_use]
    pub fn rebuild(&self) -> Handles {
        self.invalidate();
        self.handles()
    }

    /// Forgets every module and the snapshot.
    ///
    /// Items still referring to released handles read as unavailable.
    pub fn release(&self) {
        let released = std::mem::take(&mut *self.modules.write());
        self.invalidate();
        debug!(modules = released.len(), "Backend registry released");
    }

    /// Attaches one more module; takes effect at the next build.
    pub fn register(&self, module: Arc<dyn StorageBackend>) {
        self.modules.write().push(module);
        self.invalidate();
    }

    fn build_handles(&self) -> Handles {
        let modules = self.modules.read().clone();
        let mut drafts = Drafts::default();

        let write_order = self.settings.get_string_list_or_empty(keys::WRITE_ORDER, None);
        for id in write_order.value.iter().map(|id| id.trim()).filter(|id| !id.is_empty()) {
            drafts.ensure(id);
        }

        for module in modules {
            let id = module.id().trim().to_owned();
            if id.is_empty() {
                warn!(name = module.name(), "Skipping backend with an empty id");
                continue;
            }
            let draft = drafts.ensure(&id);
            if draft.module.is_some() {
                warn!(backend = %id, "Skipping backend with a duplicate id");
                continue;
            }
            draft.module = Some(module);
        }

        for group in self.settings.groups() {
            if let Some(id) = keys::backend_id(&group) {
                drafts.ensure(id);
            }
        }

        let admin_locked = self.settings.get_bool_or(keys::ADMIN_LOCKED, None, false).value;
        let handles: Handles = drafts
            .list
            .into_iter()
            .map(|draft| Arc::new(draft.finish(self.settings.as_ref(), admin_locked)))
            .collect();

        info!(
            backends = handles.len(),
            available = handles.iter().filter(|h| h.is_available()).count(),
            writable = handles.iter().filter(|h| h.is_finally_writable()).count(),
            "Backend registry built"
        );
        handles
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("modules", &self.modules.read().len())
            .field("built", &self.snapshot.read().is_some())
            .finish_non_exhaustive()
    }
}

#[derive(Default)]
struct Drafts {
    list: Vec<Draft>,
    index: FxHashMap<String, usize>,
}

impl Drafts {
    /// Returns the draft for `id`, appending a new one if unseen.
    fn ensure(&mut self, id: &str) -> &mut Draft {
        let position = match self.index.get(id) {
            Some(position) => *position,
            None => {
                self.index.insert(id.to_owned(), self.list.len());
                self.list.push(Draft { id: id.to_owned(), module: None });
                self.list.len() - 1
            },
        };
        &mut self.list[position]
    }
}

struct Draft {
    id: String,
    module: Option<Arc<dyn StorageBackend>>,
}

impl Draft {
    fn finish(self, settings: &dyn SettingsStore, admin_locked: bool) -> BackendHandle {
        let group = keys::backend_group(&self.id);
        let readable = settings.get_bool_or(keys::READABLE, Some(&group), true);
        let writable_config = settings.get_bool_or(keys::WRITABLE, Some(&group), true);
        let (willing, able) = self
            .module
            .as_deref()
            .map_or((false, false), |module| (module.is_willing_to_write(), module.is_able_to_write()));

        let mut handle = BackendHandle {
            id: self.id,
            module: self.module,
            readable,
            writable_config,
            willing,
            able,
            writability: Writability::default(),
        };
        handle.writability = backend_writability(&handle, admin_locked);

        debug!(
            backend = %handle.id,
            writable = handle.writability.writable,
            reason = ?handle.writability.reason,
            "Backend handle ready"
        );
        handle
    }
}

/// Priority: unavailable, incomplete API, not willing, not able, admin lock, user lock.
fn backend_writability(handle: &BackendHandle, admin_locked: bool) -> Writability {
    let Some(module) = handle.module.as_deref() else {
        return Writability::denied(Reason::Unavailable);
    };
    if module.capabilities().is_write_api_incomplete() {
        return Writability::denied(Reason::IncompleteApi);
    }
    if !handle.willing {
        return Writability::denied(Reason::NotWillingTo);
    }
    if !handle.able {
        return Writability::denied(Reason::NotAbleTo);
    }
    if admin_locked || (!handle.writable_config.value && handle.writable_config.mandatory) {
        return Writability::denied(Reason::LockedByAdmin);
    }
    if !handle.writable_config.value {
        return Writability::denied(Reason::LockedByUser);
    }
    Writability::WRITABLE
}

/// Builder for [`Registry`].
#[derive(Default)]
pub struct RegistryBuilder {
    settings: Option<Arc<dyn SettingsStore>>,
    modules: Vec<Arc<dyn StorageBackend>>,
}

impl RegistryBuilder {
    #[must_use]
    pub fn settings(mut self, settings: Arc<dyn SettingsStore>) -> Self {
        self.settings = Some(settings);
        self
    }

    #[must_use]
    pub fn backend(mut self, module: Arc<dyn StorageBackend>) -> Self {
        self.modules.push(module);
        self
    }

    #[must_use]
    pub fn backends<I>(mut self, modules: I) -> Self
    where
        I: IntoIterator<Item = Arc<dyn StorageBackend>>,
    {
        self.modules.extend(modules);
        self
    }

    /// # Errors
    /// [`CatalogError::Validation`] when no settings store was given.
    pub fn build(self) -> Result<Registry, CatalogError> {
        let settings = self.settings.ok_or_else(|| CatalogError::Validation {
            message: "Settings store not provided".into(),
            context: Some("Registry".into()),
        })?;

        Ok(Registry {
            settings,
            modules: RwLock::new(self.modules),
            snapshot: RwLock::new(None),
            generation: AtomicU64::new(0),
        })
    }
}

impl fmt::Debug for RegistryBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistryBuilder")
            .field("settings", &self.settings.is_some())
            .field("modules", &self.modules.len())
            .finish()
    }
}
