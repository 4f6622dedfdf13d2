//! Turns the backends' flat item lists into the catalog tree.
//!
//! A load runs five steps, strictly in sequence: merge, hierarchy reconstruction, sort,
//! status check and filter. The writability engine then tags the surviving items. Nothing
//! here is fatal: problems end up in [`LoadOutcome::messages`].

use crate::backend::ReadOutcome;
use crate::catalog::Catalog;
use crate::item::{Item, ids_match};
use crate::registry::{BackendHandle, Registry};
use crate::writability::WritabilityEngine;
use acat_domain::capabilities::Capabilities;
use acat_domain::item::{ItemKind, SortMode};
use acat_domain::loadable::Loadable;
use acat_kernel::settings::{SettingsStore, keys};
use fxhash::FxHashSet;
use std::cmp::Ordering;
use std::sync::Arc;
use tracing::{debug, info, trace, warn};

/// Result of [`Loader::load`].
#[derive(Debug, Default)]
pub struct LoadOutcome {
    pub catalog: Catalog,
    /// Diagnostics collected from the backends and from the loader itself.
    pub messages: Vec<String>,
    /// The persisted level-zero order was rewritten to include orphaned items.
    pub level_zero_rewritten: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct Loader<'a> {
    registry: &'a Registry,
}

impl<'a> Loader<'a> {
    #[must_use]
    pub const fn new(registry: &'a Registry) -> Self {
        Self { registry }
    }

    /// Builds a new catalog from every readable backend.
    #[must_use]
    pub fn load(&self, loadable: Loadable) -> LoadOutcome {
        let settings = self.registry.settings().as_ref();
        let handles = self.registry.handles();
        let mut messages = Vec::new();

        let flat = merge(&handles, &mut messages);
        let merged = flat.len();

        let level_zero = settings.get_string_list_or_empty(keys::LEVEL_ZERO_ORDER, None);
        let (mut items, orphans) = reconstruct(flat, &level_zero.value);
        let level_zero_rewritten =
            orphans && rewrite_level_zero(settings, &items, level_zero.mandatory);

        sort_items(&mut items, sort_mode(settings));

        for item in &mut items {
            item.check_status();
        }

        let mut items = filter_items(items, loadable);
        WritabilityEngine::new(self.registry).tag(&mut items);

        let catalog = Catalog::new(items);
        let counts = catalog.counts();
        info!(
            merged,
            menus = counts.menus,
            actions = counts.actions,
            profiles = counts.profiles,
            messages = messages.len(),
            "Catalog loaded"
        );

        LoadOutcome { catalog, messages, level_zero_rewritten }
    }
}

/// Reads every readable, available backend in registry order.
///
/// Each item is tagged with its origin. An id already supplied by an earlier backend is
/// dropped with a message.
fn merge(handles: &[Arc<BackendHandle>], messages: &mut Vec<String>) -> Vec<Item> {
    let mut flat = Vec::new();
    let mut seen = FxHashSet::default();

    for handle in handles {
        if !handle.is_readable() {
            debug!(backend = handle.id(), "Backend not readable; skipped");
            continue;
        }
        let Some(module) = handle.module() else {
            debug!(backend = handle.id(), "Backend unavailable; skipped");
            continue;
        };
        if !module.capabilities().contains(Capabilities::READ) {
            debug!(backend = handle.id(), "Backend cannot read; skipped");
            continue;
        }

        let ReadOutcome { items, messages: notes } = match module.read_items() {
            Ok(outcome) => outcome,
            Err(err) => {
                warn!(backend = handle.id(), error = %err, "Backend read failed");
                messages.push(format!("{}: {err}", handle.name()));
                continue;
            },
        };
        messages.extend(notes);

        let mut accepted = 0_usize;
        for mut item in flatten_menus(items) {
            if !item.kind().is_item() {
                warn!(backend = handle.id(), item = item.id(), "Profile outside of an action");
                messages.push(format!(
                    "{}: profile '{}' is not attached to an action and was ignored",
                    handle.name(),
                    item.id()
                ));
                continue;
            }
            if !seen.insert(item.id().to_lowercase()) {
                warn!(backend = handle.id(), item = item.id(), "Duplicate item id");
                messages.push(format!(
                    "{}: item '{}' is already provided by another backend and was ignored",
                    handle.name(),
                    item.id()
                ));
                continue;
            }
            item.attach_origin(handle);
            item.mark_clean();
            flat.push(item);
            accepted += 1;
        }
        debug!(backend = handle.id(), items = accepted, "Backend merged");
    }

    flat
}

/// Lifts children a backend nested inside menus to the flat list, after their menu.
///
/// The menu keeps their ids in its children-id list, so the rebuild puts them back.
fn flatten_menus(items: Vec<Item>) -> Vec<Item> {
    let mut flat = Vec::with_capacity(items.len());
    for mut item in items {
        if item.kind() == ItemKind::Menu && !item.children().is_empty() {
            let nested = item.take_children();
            flat.push(item);
            flat.extend(flatten_menus(nested));
        } else {
            flat.push(item);
        }
    }
    flat
}

/// Rebuilds the tree from `flat`, ordered by `level_zero`.
///
/// Returns the top-level items and whether orphans (items no order list claimed) had to be
/// appended, in which case the level-zero list no longer describes the tree. An empty
/// `level_zero` keeps encounter order and reports no orphans.
#[must_use]
pub fn reconstruct(mut flat: Vec<Item>, level_zero: &[String]) -> (Vec<Item>, bool) {
    if level_zero.is_empty() {
        let mut hierarchy = Vec::with_capacity(flat.len());
        append_in_encounter_order(&mut hierarchy, flat);
        return (hierarchy, false);
    }

    let mut hierarchy = build_hierarchy(&mut flat, level_zero, None, true);
    if flat.is_empty() {
        return (hierarchy, false);
    }

    debug!(orphans = flat.len(), "Appending items missing from the level-zero order");
    append_in_encounter_order(&mut hierarchy, flat);
    (hierarchy, true)
}

/// Appends `flat` at the top level, leaving items some remaining menu claims to that menu.
fn append_in_encounter_order(hierarchy: &mut Vec<Item>, mut flat: Vec<Item>) {
    let claimed: FxHashSet<String> = flat
        .iter()
        .filter(|item| item.kind() == ItemKind::Menu)
        .flat_map(|menu| menu.children_ids().iter().map(|id| id.to_lowercase()))
        .collect();

    while let Some(position) =
        flat.iter().position(|item| !claimed.contains(&item.id().to_lowercase()))
    {
        let item = flat.remove(position);
        hierarchy.push(adopt_into_level(item, &mut flat, None));
    }
    // Only claimed items are left: menus claiming each other.
    while !flat.is_empty() {
        let item = flat.remove(0);
        hierarchy.push(adopt_into_level(item, &mut flat, None));
    }
}

/// Moves the items named by `ids` out of `flat`, in that order, recursing into menus.
///
/// An empty `ids` at the top level keeps every remaining item in encounter order. Below the
/// top level an empty `ids` means an empty menu. Unknown ids are skipped.
pub fn build_hierarchy(
    flat: &mut Vec<Item>,
    ids: &[String],
    parent: Option<&str>,
    top_level: bool,
) -> Vec<Item> {
    if ids.is_empty() {
        if !top_level {
            return Vec::new();
        }
        let mut level = std::mem::take(flat);
        for item in &mut level {
            item.set_parent(parent);
        }
        return level;
    }

    let mut level = Vec::with_capacity(ids.len());
    for id in ids {
        let Some(position) = flat.iter().position(|item| ids_match(item.id(), id)) else {
            trace!(item = %id, "Ordered id not found; skipped");
            continue;
        };
        let item = flat.remove(position);
        level.push(adopt_into_level(item, flat, parent));
    }
    level
}

fn adopt_into_level(mut item: Item, flat: &mut Vec<Item>, parent: Option<&str>) -> Item {
    item.set_parent(parent);
    if item.kind() == ItemKind::Menu {
        let ids = item.children_ids().to_vec();
        let children = build_hierarchy(flat, &ids, Some(item.id()), false);
        item.set_children(children);
    }
    item
}

fn sort_mode(settings: &dyn SettingsStore) -> SortMode {
    settings
        .get_string(keys::ORDER_MODE, None)
        .and_then(|setting| SortMode::parse(&setting.value))
        .unwrap_or_default()
}

/// Sorts every level by label; [`SortMode::Manual`] keeps the given order.
///
/// Labels compare case-insensitively, ties by id. Profiles keep their order.
pub fn sort_items(items: &mut [Item], mode: SortMode) {
    match mode {
        SortMode::Manual => {},
        SortMode::Ascending => sort_level(items, false),
        SortMode::Descending => sort_level(items, true),
    }
}

fn sort_level(items: &mut [Item], descending: bool) {
    items.sort_by(|a, b| {
        let ordering = compare_labels(a, b);
        if descending { ordering.reverse() } else { ordering }
    });
    for menu in items.iter_mut().filter(|item| item.kind() == ItemKind::Menu) {
        sort_level(menu.children_mut(), descending);
    }
}

fn compare_labels(a: &Item, b: &Item) -> Ordering {
    a.label().to_lowercase().cmp(&b.label().to_lowercase()).then_with(|| a.id().cmp(b.id()))
}

/// Drops what `loadable` does not ask for, recursively.
///
/// Profiles are kept when valid; menus and actions when enabled and valid. Each flag of
/// `loadable` lifts the matching condition.
#[must_use]
pub fn filter_items(items: Vec<Item>, loadable: Loadable) -> Vec<Item> {
    items
        .into_iter()
        .filter_map(|mut item| {
            if !is_loadable(&item, loadable) {
                trace!(item = item.id(), kind = %item.kind(), "Filtered out");
                return None;
            }
            let children = item.take_children();
            item.set_children(filter_items(children, loadable));
            Some(item)
        })
        .collect()
}

fn is_loadable(item: &Item, loadable: Loadable) -> bool {
    let valid = item.is_valid() || loadable.includes_invalid();
    match item.kind() {
        ItemKind::Profile => valid,
        ItemKind::Menu | ItemKind::Action => {
            valid && (item.is_enabled() || loadable.includes_disabled())
        },
    }
}

fn rewrite_level_zero(settings: &dyn SettingsStore, items: &[Item], mandatory: bool) -> bool {
    if mandatory {
        warn!("Level-zero order is mandatory; orphaned items are shown but not persisted");
        return false;
    }

    let ids: Vec<String> = items.iter().map(|item| item.id().to_owned()).collect();
    match settings.set_string_list(keys::LEVEL_ZERO_ORDER, None, &ids) {
        Ok(()) => {
            info!(items = ids.len(), "Level-zero order rewritten");
            true
        },
        Err(err) => {
            warn!(error = %err, "Failed to rewrite the level-zero order");
            false
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(items: &[Item]) -> Vec<&str> {
        items.iter().map(Item::id).collect()
    }

    fn order(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|id| (*id).to_owned()).collect()
    }

    fn action(id: &str) -> Item {
        Item::action(id, id.to_uppercase()).with_child(Item::profile("p", "Default"))
    }

    #[test]
    fn level_zero_order_wins_and_orphans_are_appended() {
        let flat = vec![action("a"), action("b"), action("c")];
        let (tree, orphans) = reconstruct(flat, &order(&["b", "a"]));
        assert_eq!(ids(&tree), ["b", "a", "c"]);
        assert!(orphans);
    }

    #[test]
    fn empty_level_zero_keeps_encounter_order() {
        let flat = vec![action("a"), action("b")];
        let (tree, orphans) = reconstruct(flat, &[]);
        assert_eq!(ids(&tree), ["a", "b"]);
        assert!(!orphans);
    }

    #[test]
    fn empty_level_zero_still_rebuilds_menus() {
        let flat = vec![
            action("b"),
            Item::menu("m", "Menu").with_children_ids(["x"]),
            action("x"),
        ];
        let (tree, orphans) = reconstruct(flat, &[]);
        assert_eq!(ids(&tree), ["b", "m"]);
        assert_eq!(ids(tree[1].children()), ["x"]);
        assert!(!orphans);
    }

    #[test]
    fn nested_menu_children_are_lifted() {
        let flat = flatten_menus(vec![
            Item::menu("m", "Menu")
                .with_child(Item::menu("sub", "Sub").with_child(action("x")))
                .with_child(action("y")),
            action("z"),
        ]);
        assert_eq!(ids(&flat), ["m", "sub", "x", "y", "z"]);
        assert!(flat.iter().all(|item| item.kind() != ItemKind::Menu || item.children().is_empty()));
        assert_eq!(flat[0].children_ids(), ["sub", "y"]);
    }

    #[test]
    fn ids_compare_case_insensitively_and_unknown_ids_are_skipped() {
        let flat = vec![action("Alpha"), action("beta")];
        let (tree, orphans) = reconstruct(flat, &order(&["BETA", "gone", "alpha"]));
        assert_eq!(ids(&tree), ["beta", "Alpha"]);
        assert!(!orphans);
    }

    #[test]
    fn menus_claim_their_children() {
        let flat = vec![
            action("x"),
            Item::menu("m", "Menu").with_children_ids(["y", "x"]),
            action("y"),
        ];
        let (tree, orphans) = reconstruct(flat, &order(&["m"]));
        assert!(!orphans);
        assert_eq!(ids(&tree), ["m"]);
        assert_eq!(ids(tree[0].children()), ["y", "x"]);
        assert_eq!(tree[0].children()[0].parent_id(), Some("m"));
        assert_eq!(tree[0].parent_id(), None);
    }

    #[test]
    fn menu_with_empty_children_ids_stays_empty() {
        let flat = vec![Item::menu("m", "Menu"), action("loose")];
        let (tree, orphans) = reconstruct(flat, &order(&["m"]));
        assert!(tree[0].children().is_empty());
        assert_eq!(ids(&tree), ["m", "loose"]);
        assert!(orphans);
    }

    #[test]
    fn orphaned_menu_rebuilds_its_children() {
        let flat = vec![
            action("inner"),
            Item::menu("m", "Menu").with_children_ids(["inner"]),
            action("top"),
        ];
        let (tree, orphans) = reconstruct(flat, &order(&["top"]));
        assert!(orphans);
        assert_eq!(ids(&tree), ["top", "m"]);
        assert_eq!(ids(tree[1].children()), ["inner"]);
    }

    #[test]
    fn self_referencing_menus_terminate() {
        let flat = vec![
            Item::menu("m1", "One").with_children_ids(["m2"]),
            Item::menu("m2", "Two").with_children_ids(["m1"]),
        ];
        let (tree, orphans) = reconstruct(flat, &order(&["other"]));
        assert!(orphans);
        assert_eq!(ids(&tree), ["m1"]);
        assert_eq!(ids(tree[0].children()), ["m2"]);
        assert!(tree[0].children()[0].children().is_empty());
    }

    #[test]
    fn sort_is_recursive_and_per_level() {
        let mut tree = vec![
            Item::menu("z", "zeta").with_children([action("d"), action("b")]),
            action("a"),
            Item::menu("m", "Mid").with_children([action("c"), action("a2")]),
        ];
        sort_items(&mut tree, SortMode::Ascending);
        assert_eq!(ids(&tree), ["a", "m", "z"]);
        assert_eq!(ids(tree[1].children()), ["a2", "c"]);
        assert_eq!(ids(tree[2].children()), ["b", "d"]);

        sort_items(&mut tree, SortMode::Descending);
        assert_eq!(ids(&tree), ["z", "m", "a"]);
        assert_eq!(ids(tree[0].children()), ["d", "b"]);
    }

    #[test]
    fn manual_mode_keeps_order() {
        let mut tree = vec![action("b"), action("a")];
        sort_items(&mut tree, SortMode::Manual);
        assert_eq!(ids(&tree), ["b", "a"]);
    }

    #[test]
    fn profiles_are_not_sorted() {
        let mut tree = vec![
            Item::action("a", "A")
                .with_child(Item::profile("z", "Zed"))
                .with_child(Item::profile("b", "Bee")),
        ];
        sort_items(&mut tree, SortMode::Ascending);
        assert_eq!(ids(tree[0].children()), ["z", "b"]);
    }

    #[test]
    fn filter_drops_disabled_and_invalid() {
        let mut tree = vec![
            action("disabled").with_enabled(false),
            Item::action("mixed", "Mixed")
                .with_child(Item::profile("good", "Good"))
                .with_child(Item::profile("bad", "Bad").with_valid(false)),
        ];
        for item in &mut tree {
            item.check_status();
        }

        let kept = filter_items(tree.clone(), Loadable::empty());
        assert_eq!(ids(&kept), ["mixed"]);
        assert_eq!(ids(kept[0].children()), ["good"]);

        let kept = filter_items(tree.clone(), Loadable::DISABLED);
        assert_eq!(ids(&kept), ["disabled", "mixed"]);

        let kept = filter_items(tree, Loadable::ALL);
        assert_eq!(ids(kept[1].children()), ["good", "bad"]);
    }

    #[test]
    fn filter_replaces_menu_children() {
        let mut tree = vec![
            Item::menu("m", "Menu")
                .with_child(action("kept"))
                .with_child(action("off").with_enabled(false)),
        ];
        tree[0].check_status();

        let kept = filter_items(tree, Loadable::empty());
        assert_eq!(ids(kept[0].children()), ["kept"]);
    }
}
