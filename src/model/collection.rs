use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::id::Id;

/// Items that carry their own stable unique ID.
///
/// Collections are keyed by these IDs rather than by position, so reordering
/// and duplication never invalidate references held by an open editor panel.
pub trait Keyed {
    fn key(&self) -> Id;
}

/// Where to reinsert an item when moving it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveTarget {
    /// Directly before the item with the given ID.
    Before(Id),
    /// Directly after the item with the given ID.
    After(Id),
    /// To the front of the collection.
    ToStart,
    /// To the back of the collection.
    ToEnd,
}

/// An ordered, ID-keyed collection of items.
///
/// Iteration order is authoritative; all editing operations preserve the
/// multiset of IDs except for the explicit insert/duplicate/remove ones.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderedCollection<T> {
    items: Vec<T>,
}

impl<T> Default for OrderedCollection<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<T: Keyed> OrderedCollection<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_items(items: Vec<T>) -> Self {
        Self { items }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }

    /// IDs in collection order.
    pub fn ids(&self) -> impl Iterator<Item = Id> + '_ {
        self.items.iter().map(Keyed::key)
    }

    pub fn contains(&self, id: Id) -> bool {
        self.position(id).is_some()
    }

    pub fn get(&self, id: Id) -> Option<&T> {
        self.position(id).map(|index| &self.items[index])
    }

    pub fn get_mut(&mut self, id: Id) -> Option<&mut T> {
        self.position(id).map(|index| &mut self.items[index])
    }

    /// Current index of the item with the given ID.
    pub fn position(&self, id: Id) -> Option<usize> {
        self.items.iter().position(|item| item.key() == id)
    }

    /// Append an item to the end.
    pub fn push(&mut self, item: T) {
        self.items.push(item);
    }

    /// Generate an ID that does not collide with any ID already present.
    ///
    /// Random IDs are rejection-sampled against the current contents, so two
    /// calls within the same clock tick still produce distinct IDs.
    pub fn fresh_id(&self) -> Id {
        loop {
            let id = Id::new();
            if !self.contains(id) {
                return id;
            }
        }
    }

    /// Move an item to the given target position.
    ///
    /// Pure: returns a new collection and leaves `self` untouched, since the
    /// previous ordering may still be referenced by an open editor panel.
    /// An unknown item or target ID fails with `NotFound`.
    pub fn move_item(&self, id: Id, target: MoveTarget) -> Result<Self>
    where
        T: Clone,
    {
        let from = self
            .position(id)
            .ok_or_else(|| Error::not_found(format!("Item {id}")))?;

        let mut items = self.items.clone();
        let item = items.remove(from);
        let to = match target {
            MoveTarget::ToStart => 0,
            MoveTarget::ToEnd => items.len(),
            // Position relative to itself: reinsert where it was.
            MoveTarget::Before(anchor) | MoveTarget::After(anchor) if anchor == id => from,
            MoveTarget::Before(anchor) => items
                .iter()
                .position(|other| other.key() == anchor)
                .ok_or_else(|| Error::not_found(format!("Item {anchor}")))?,
            MoveTarget::After(anchor) => {
                items
                    .iter()
                    .position(|other| other.key() == anchor)
                    .ok_or_else(|| Error::not_found(format!("Item {anchor}")))?
                    + 1
            }
        };
        items.insert(to, item);
        Ok(Self { items })
    }

    /// Clone the item with the given ID and insert the clone directly after
    /// it. The clone gets a fresh collision-checked ID, handed to
    /// `clone_with` along with the source item. Returns the new ID.
    pub fn duplicate_item(&mut self, id: Id, clone_with: impl FnOnce(&T, Id) -> T) -> Result<Id> {
        let index = self
            .position(id)
            .ok_or_else(|| Error::not_found(format!("Item {id}")))?;
        let new_id = self.fresh_id();
        let clone = clone_with(&self.items[index], new_id);
        self.items.insert(index + 1, clone);
        Ok(new_id)
    }

    /// Remove and return the item with the given ID.
    ///
    /// Minimum-size rules belong to the caller; an unknown ID is a logged
    /// no-op reported as `NotFound`.
    pub fn remove_item(&mut self, id: Id) -> Result<T> {
        match self.position(id) {
            Some(index) => Ok(self.items.remove(index)),
            None => {
                debug!("remove of unknown item {id} ignored");
                Err(Error::not_found(format!("Item {id}")))
            }
        }
    }
}

impl<T: Keyed> FromIterator<T> for OrderedCollection<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}
