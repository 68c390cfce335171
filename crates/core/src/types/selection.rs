//! Ordered, duplicate-free lists of item ids (cart and favorites).

use serde::{Deserialize, Serialize};

use super::id::ItemId;

/// Outcome of [`Selection::toggle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggle {
    Added,
    Removed,
}

/// An insertion-ordered set of item ids.
///
/// Membership is checked before every insertion, and deserialization drops
/// repeated ids, so a `Selection` never holds the same id twice.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<ItemId>", into = "Vec<ItemId>")]
pub struct Selection {
    ids: Vec<ItemId>,
}

impl Selection {
    #[must_use]
    pub const fn new() -> Self {
        Self { ids: Vec::new() }
    }

    /// Append `id` unless already present. Returns whether it was added.
    pub fn add(&mut self, id: ItemId) -> bool {
        if self.contains(id) {
            return false;
        }
        self.ids.push(id);
        true
    }

    /// Remove `id` if present. Returns whether it was removed.
    pub fn remove(&mut self, id: ItemId) -> bool {
        match self.ids.iter().position(|&existing| existing == id) {
            Some(index) => {
                self.ids.remove(index);
                true
            }
            None => false,
        }
    }

    /// Remove `id` when present, append it otherwise.
    pub fn toggle(&mut self, id: ItemId) -> Toggle {
        if self.remove(id) {
            Toggle::Removed
        } else {
            self.ids.push(id);
            Toggle::Added
        }
    }

    #[must_use]
    pub fn contains(&self, id: ItemId) -> bool {
        self.ids.contains(&id)
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.ids.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Ids in insertion order.
    #[must_use]
    pub fn ids(&self) -> &[ItemId] {
        &self.ids
    }

    pub fn iter(&self) -> impl Iterator<Item = ItemId> + '_ {
        self.ids.iter().copied()
    }
}

impl From<Vec<ItemId>> for Selection {
    fn from(ids: Vec<ItemId>) -> Self {
        ids.into_iter().collect()
    }
}

impl From<Selection> for Vec<ItemId> {
    fn from(selection: Selection) -> Self {
        selection.ids
    }
}

impl FromIterator<ItemId> for Selection {
    fn from_iter<I: IntoIterator<Item = ItemId>>(iter: I) -> Self {
        let mut selection = Self::new();
        for id in iter {
            selection.add(id);
        }
        selection
    }
}
