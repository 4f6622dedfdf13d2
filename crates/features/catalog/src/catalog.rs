use crate::item::{self, Item};
use acat_domain::item::ItemKind;

/// The loaded item tree.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    items: Vec<Item>,
}

/// Per-kind totals of a [`Catalog`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Counts {
    pub menus: usize,
    pub actions: usize,
    pub profiles: usize,
}

impl Catalog {
    #[must_use]
    pub const fn new(items: Vec<Item>) -> Self {
        Self { items }
    }

    /// Top-level items, in display order.
    #[must_use]
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn items_mut(&mut self) -> &mut [Item] {
        &mut self.items
    }

    #[must_use]
    pub fn into_items(self) -> Vec<Item> {
        self.items
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub fn find_item_by_id(&self, id: &str) -> Option<&Item> {
        item::find_item_by_id(&self.items, id)
    }

    pub fn find_item_by_id_mut(&mut self, id: &str) -> Option<&mut Item> {
        item::find_item_by_id_mut(&mut self.items, id)
    }

    /// Ids of the top-level items, as they would be persisted in the level-zero list.
    #[must_use]
    pub fn level_zero_ids(&self) -> Vec<String> {
        self.items.iter().map(|item| item.id().to_owned()).collect()
    }

    #[must_use]
    pub fn counts(&self) -> Counts {
        self.iter().fold(Counts::default(), |mut counts, item| {
            match item.kind() {
                ItemKind::Menu => counts.menus += 1,
                ItemKind::Action => counts.actions += 1,
                ItemKind::Profile => counts.profiles += 1,
            }
            counts
        })
    }

    /// Depth-first, pre-order walk over every item, profiles included.
    #[must_use]
    pub fn iter(&self) -> Iter<'_> {
        Iter { stack: vec![self.items.iter()] }
    }
}

impl<'a> IntoIterator for &'a Catalog {
    type Item = &'a Item;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator returned by [`Catalog::iter`].
#[derive(Debug)]
pub struct Iter<'a> {
    stack: Vec<std::slice::Iter<'a, Item>>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a Item;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let level = self.stack.last_mut()?;
            if let Some(item) = level.next() {
                if !item.children().is_empty() {
                    self.stack.push(item.children().iter());
                }
                return Some(item);
            }
            self.stack.pop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Catalog {
        Catalog::new(vec![
            Item::menu("m", "Menu").with_child(
                Item::action("a1", "One").with_child(Item::profile("p1", "Default")),
            ),
            Item::action("a2", "Two")
                .with_child(Item::profile("p1", "Default"))
                .with_child(Item::profile("p2", "Other")),
        ])
    }

    #[test]
    fn iterates_depth_first() {
        let catalog = sample();
        let walked: Vec<&str> = catalog.iter().map(Item::id).collect();
        assert_eq!(walked, ["m", "a1", "p1", "a2", "p1", "p2"]);
        assert_eq!((&catalog).into_iter().count(), 6);
    }

    #[test]
    fn counts_per_kind() {
        let counts = sample().counts();
        assert_eq!(counts, Counts { menus: 1, actions: 2, profiles: 3 });
    }

    #[test]
    fn level_zero_ids_are_top_level_only() {
        assert_eq!(sample().level_zero_ids(), ["m".to_owned(), "a2".to_owned()]);
    }

    #[test]
    fn empty_catalog() {
        let catalog = Catalog::default();
        assert!(catalog.is_empty());
        assert_eq!(catalog.iter().count(), 0);
        assert!(catalog.find_item_by_id("m").is_none());
    }
}
