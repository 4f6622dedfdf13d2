use crate::item::Item;
use crate::registry::Registry;
use acat_domain::writability::{Reason, Writability};
use acat_kernel::settings::keys;

/// Decides whether an item may be written, and why not.
#[derive(Debug, Clone, Copy)]
pub struct WritabilityEngine<'a> {
    registry: &'a Registry,
    level_zero_mandatory: bool,
}

impl<'a> WritabilityEngine<'a> {
    /// Captures the level-zero lock state from the registry's settings.
    #[must_use]
    pub fn new(registry: &'a Registry) -> Self {
        let level_zero_mandatory = is_level_zero_mandatory(registry);
        Self { registry, level_zero_mandatory }
    }

    #[must_use]
    pub const fn level_zero_mandatory(&self) -> bool {
        self.level_zero_mandatory
    }

    /// Checks, in order: the item's read-only flag, its origin backend (or the first writable
    /// backend for a new item), then the level-zero lock for top-level items.
    #[must_use]
    pub fn compute(&self, item: &Item) -> Writability {
        if item.is_readonly() {
            return Writability::denied(Reason::ItemReadonly);
        }

        let verdict = if item.has_origin_link() {
            item.origin().map_or(Writability::denied(Reason::Unavailable), |handle| {
                handle.writability()
            })
        } else if self.registry.find_first_writable().is_some() {
            Writability::WRITABLE
        } else {
            Writability::denied(Reason::NoProviderFound)
        };

        if verdict.writable && item.parent_id().is_none() && self.level_zero_mandatory {
            return Writability::denied(Reason::LevelZero);
        }
        verdict
    }

    /// Caches [`WritabilityEngine::compute`] on every item of the tree.
    pub fn tag(&self, items: &mut [Item]) {
        for item in items {
            item.set_writability(self.compute(item));
            self.tag(item.children_mut());
        }
    }
}

pub(crate) fn is_level_zero_mandatory(registry: &Registry) -> bool {
    registry
        .settings()
        .get_string_list(keys::LEVEL_ZERO_ORDER, None)
        .is_some_and(|setting| setting.mandatory)
}
