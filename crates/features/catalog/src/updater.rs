use crate::item::Item;
use crate::registry::{BackendHandle, Registry};
use crate::writability::{WritabilityEngine, is_level_zero_mandatory};
use acat_domain::capabilities::Capabilities;
use acat_domain::status::Status;
use acat_kernel::settings::keys;
use std::sync::Arc;
use tracing::{debug, warn};

/// A status code together with the messages the backend produced.
pub type StatusReport = (Status, Vec<String>);

/// The write side of the catalog: persists, deletes and reorders items.
///
/// Every path that stores an item checks its writability first.
#[derive(Debug, Clone, Copy)]
pub struct Updater<'a> {
    registry: &'a Registry,
}

impl<'a> Updater<'a> {
    #[must_use]
    pub const fn new(registry: &'a Registry) -> Self {
        Self { registry }
    }

    /// Writes `item` to its origin backend, or to the first writable one for a new item.
    ///
    /// On success a new item is tagged with the backend it now lives in, and the edit flags
    /// are cleared.
    pub fn write(&self, item: &mut Item) -> StatusReport {
        let writability = WritabilityEngine::new(self.registry).compute(item);
        item.set_writability(writability);
        if !writability.writable {
            debug!(item = item.id(), reason = ?writability.reason, "Write refused");
            return (Status::NotWillingToRun, vec![writability.reason.tooltip().to_owned()]);
        }

        let Some(target) = item.origin().or_else(|| self.registry.find_first_writable()) else {
            return (Status::ProgramError, vec!["No target backend for the item.".to_owned()]);
        };
        let Some(module) = target.module() else {
            return (Status::ProgramError, vec![format!("Backend '{}' is gone.", target.id())]);
        };

        let mut messages = Vec::new();
        let status = module.write_item(item, &mut messages);
        if status.is_ok() {
            if !item.has_origin_link() {
                item.attach_origin(&target);
            }
            item.mark_clean();
            debug!(item = item.id(), backend = target.id(), "Item written");
        } else {
            warn!(item = item.id(), backend = target.id(), status = ?status, "Item write failed");
        }
        (status, messages)
    }

    /// Deletes `item` from its origin backend. An item never stored succeeds trivially.
    pub fn delete(&self, item: &Item) -> StatusReport {
        if !item.has_origin_link() {
            return (Status::Ok, Vec::new());
        }

        let writability = WritabilityEngine::new(self.registry).compute(item);
        if !writability.writable {
            debug!(item = item.id(), reason = ?writability.reason, "Delete refused");
            return (Status::NotWillingToRun, vec![writability.reason.tooltip().to_owned()]);
        }

        let Some((target, module)) = item.origin().and_then(|handle| {
            let module = Arc::clone(handle.module()?);
            Some((handle, module))
        }) else {
            return (Status::ProgramError, vec!["The item's backend is gone.".to_owned()]);
        };

        let mut messages = Vec::new();
        let status = module.delete_item(item, &mut messages);
        if status.is_ok() {
            debug!(item = item.id(), backend = target.id(), "Item deleted");
        } else {
            warn!(item = item.id(), backend = target.id(), status = ?status, "Item delete failed");
        }
        (status, messages)
    }

    /// Lets the backend of `source` copy its private data to `dest`.
    ///
    /// A no-op returning [`Status::Ok`] when `source` was never stored or its backend does not
    /// duplicate.
    pub fn duplicate_data(&self, dest: &Item, source: &Item) -> StatusReport {
        let Some(module) = source.origin().as_deref().and_then(BackendHandle::module).cloned()
        else {
            return (Status::Ok, Vec::new());
        };
        if !module.capabilities().contains(Capabilities::DUPLICATE) {
            return (Status::Ok, Vec::new());
        }
        let mut messages = Vec::new();
        let status = module.duplicate_data(dest, source, &mut messages);
        (status, messages)
    }

    #[must_use]
    pub fn is_level_zero_writable(&self) -> bool {
        !is_level_zero_mandatory(self.registry)
    }

    /// Persists the order of the top-level items.
    ///
    /// Returns `false` when the list is mandatory or could not be stored.
    pub fn write_level_zero(&self, items: &[Item]) -> bool {
        if !self.is_level_zero_writable() {
            debug!("Level-zero order is mandatory; not written");
            return false;
        }
        let ids: Vec<String> = items.iter().map(|item| item.id().to_owned()).collect();
        match self.registry.settings().set_string_list(keys::LEVEL_ZERO_ORDER, None, &ids) {
            Ok(()) => true,
            Err(err) => {
                warn!(error = %err, "Failed to write the level-zero order");
                false
            },
        }
    }
}
