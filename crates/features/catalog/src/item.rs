use crate::registry::BackendHandle;
use acat_domain::item::ItemKind;
use acat_domain::writability::{Reason, Writability};
use std::sync::{Arc, Weak};

/// A node of the catalog tree: a menu, an action or one of an action's profiles.
///
/// Children are owned by their parent. The parent is referenced by id only, so items can be
/// moved between levels without fix-ups beyond [`Item::parent_id`].
///
/// Storage backends hand items over flat: an action already carries its profiles, a menu only
/// the ordered ids of its children ([`Item::children_ids`]). The loader rebuilds the tree.
#[derive(Debug, Clone)]
pub struct Item {
    kind: ItemKind,
    id: String,
    label: String,
    enabled: bool,
    valid: bool,
    readonly: bool,
    dirty: bool,
    modified: bool,
    children: Vec<Item>,
    children_ids: Vec<String>,
    parent: Option<String>,
    origin: Option<Weak<BackendHandle>>,
    writability: Writability,
}

impl Item {
    fn new(kind: ItemKind, id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            kind,
            id: id.into(),
            label: label.into(),
            enabled: true,
            valid: true,
            readonly: false,
            dirty: false,
            modified: false,
            children: Vec::new(),
            children_ids: Vec::new(),
            parent: None,
            origin: None,
            writability: Writability::default(),
        }
    }

    pub fn menu(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(ItemKind::Menu, id, label)
    }

    pub fn action(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(ItemKind::Action, id, label)
    }

    pub fn profile(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(ItemKind::Profile, id, label)
    }

    #[must_use]
    pub const fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Field-level verdict of the backend. Only meaningful for profiles; menus and actions
    /// derive their validity in [`Item::check_status`].
    #[must_use]
    pub const fn with_valid(mut self, valid: bool) -> Self {
        self.valid = valid;
        self
    }

    #[must_use]
    pub const fn with_readonly(mut self, readonly: bool) -> Self {
        self.readonly = readonly;
        self
    }

    /// Persisted order of a menu's children.
    #[must_use]
    pub fn with_children_ids<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.children_ids = ids.into_iter().map(Into::into).collect();
        self
    }

    /// Appends a child (a profile for an action, a sub-item for a menu).
    #[must_use]
    pub fn with_child(mut self, child: Self) -> Self {
        self.adopt(child);
        self
    }

    #[must_use]
    pub fn with_children(mut self, children: impl IntoIterator<Item = Self>) -> Self {
        for child in children {
            self.adopt(child);
        }
        self
    }

    #[must_use]
    pub const fn kind(&self) -> ItemKind {
        self.kind
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }

    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.valid
    }

    #[must_use]
    pub const fn is_readonly(&self) -> bool {
        self.readonly
    }

    /// Edited since the last load or successful write, itself or below.
    #[must_use]
    pub const fn is_modified(&self) -> bool {
        self.modified
    }

    #[must_use]
    pub const fn is_dirty(&self) -> bool {
        self.dirty
    }

    #[must_use]
    pub fn children(&self) -> &[Self] {
        &self.children
    }

    pub fn children_mut(&mut self) -> &mut [Self] {
        &mut self.children
    }

    #[must_use]
    pub fn children_ids(&self) -> &[String] {
        &self.children_ids
    }

    #[must_use]
    pub fn parent_id(&self) -> Option<&str> {
        self.parent.as_deref()
    }

    /// `true` for an item that was never read from, nor written to, a backend.
    #[must_use]
    pub const fn is_new(&self) -> bool {
        self.origin.is_none()
    }

    /// The backend handle this item came from.
    ///
    /// `None` both for new items and for items whose registry snapshot has been released.
    #[must_use]
    pub fn origin(&self) -> Option<Arc<BackendHandle>> {
        self.origin.as_ref().and_then(Weak::upgrade)
    }

    #[must_use]
    pub const fn writability(&self) -> Writability {
        self.writability
    }

    #[must_use]
    pub const fn is_writable(&self) -> bool {
        self.writability.writable
    }

    #[must_use]
    pub const fn reason(&self) -> Reason {
        self.writability.reason
    }

    pub fn set_label(&mut self, label: impl Into<String>) {
        self.label = label.into();
        self.touch();
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        self.touch();
    }

    /// Adds a child and records the edit.
    pub fn push_child(&mut self, child: Self) {
        self.adopt(child);
        self.touch();
    }

    /// Removes the first child matching `id` (case-insensitive) and records the edit.
    pub fn remove_child(&mut self, id: &str) -> Option<Self> {
        let index = self.children.iter().position(|child| ids_match(&child.id, id))?;
        let mut child = self.children.remove(index);
        self.children_ids.retain(|known| !ids_match(known, id));
        child.parent = None;
        self.touch();
        Some(child)
    }

    /// Recomputes `valid` and `modified` bottom-up.
    ///
    /// A profile keeps the validity its backend gave it. An action is valid with a non-blank
    /// label and at least one valid profile, a menu with a non-blank label and at least one
    /// valid child.
    pub fn check_status(&mut self) {
        let mut child_modified = false;
        for child in &mut self.children {
            child.check_status();
            child_modified |= child.modified;
        }

        if self.kind.is_item() {
            self.valid =
                !self.label.trim().is_empty() && self.children.iter().any(|child| child.valid);
        }
        self.modified = self.dirty || child_modified;
    }

    pub(crate) fn set_parent(&mut self, parent: Option<&str>) {
        self.parent = parent.map(ToOwned::to_owned);
    }

    pub(crate) fn set_children(&mut self, children: Vec<Self>) {
        self.children = children;
    }

    pub(crate) fn take_children(&mut self) -> Vec<Self> {
        std::mem::take(&mut self.children)
    }

    pub(crate) fn has_origin_link(&self) -> bool {
        self.origin.is_some()
    }

    pub(crate) fn attach_origin(&mut self, handle: &Arc<BackendHandle>) {
        self.origin = Some(Arc::downgrade(handle));
        for child in &mut self.children {
            child.attach_origin(handle);
        }
    }

    pub(crate) const fn set_writability(&mut self, writability: Writability) {
        self.writability = writability;
    }

    pub(crate) fn mark_clean(&mut self) {
        self.dirty = false;
        self.modified = false;
        for child in &mut self.children {
            child.mark_clean();
        }
    }

    fn adopt(&mut self, mut child: Self) {
        child.parent = Some(self.id.clone());
        if self.kind == ItemKind::Menu && !self.children_ids.iter().any(|id| ids_match(id, &child.id))
        {
            self.children_ids.push(child.id.clone());
        }
        self.children.push(child);
    }

    const fn touch(&mut self) {
        self.dirty = true;
        self.modified = true;
    }
}

/// Item ids compare case-insensitively.
pub(crate) fn ids_match(a: &str, b: &str) -> bool {
    a.chars().flat_map(char::to_lowercase).eq(b.chars().flat_map(char::to_lowercase))
}

/// Looks up a menu or action by id, depth first, case-insensitive.
///
/// Profiles are skipped: their ids are only unique inside their action.
#[must_use]
pub fn find_item_by_id<'a>(items: &'a [Item], id: &str) -> Option<&'a Item> {
    items.iter().filter(|item| item.kind.is_item()).find_map(|item| {
        if ids_match(&item.id, id) { Some(item) } else { find_item_by_id(&item.children, id) }
    })
}

/// Mutable variant of [`find_item_by_id`].
pub fn find_item_by_id_mut<'a>(items: &'a mut [Item], id: &str) -> Option<&'a mut Item> {
    for item in items.iter_mut().filter(|item| item.kind.is_item()) {
        if ids_match(&item.id, id) {
            return Some(item);
        }
        if let Some(found) = find_item_by_id_mut(&mut item.children, id) {
            return Some(found);
        }
    }
    None
}
