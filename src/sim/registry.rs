//! Entity registry with deferred removal
//!
//! Entities are stored in insertion order under stable IDs. `kill` only
//! tombstones an entry; the entry stays in place (and is skipped by every
//! live iterator) until `sweep` runs at the end of the tick. Removing one
//! entity while others in the same collection are being updated therefore
//! never shifts, skips or revisits an entry.

/// Stable entity identifier, unique for the lifetime of a run
pub type EntityId = u32;

#[derive(Debug, Clone)]
struct Entry<T> {
    id: EntityId,
    removed: bool,
    value: T,
}

/// Typed collection of entities of one kind
#[derive(Debug, Clone)]
pub struct Registry<T> {
    entries: Vec<Entry<T>>,
}

impl<T> Default for Registry<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<T> Registry<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entity. IDs must be increasing so iteration order is stable.
    pub fn insert(&mut self, id: EntityId, value: T) {
        debug_assert!(self.entries.last().is_none_or(|e| e.id < id));
        self.entries.push(Entry {
            id,
            removed: false,
            value,
        });
    }

    /// Queue an entity for removal at the end of the tick.
    /// Returns false if it was already queued or does not exist.
    pub fn kill(&mut self, id: EntityId) -> bool {
        match self.index_of(id).map(|i| &mut self.entries[i]) {
            Some(entry) if !entry.removed => {
                entry.removed = true;
                true
            }
            _ => false,
        }
    }

    pub fn is_alive(&self, id: EntityId) -> bool {
        self.get(id).is_some()
    }

    pub fn get(&self, id: EntityId) -> Option<&T> {
        let entry = &self.entries[self.index_of(id)?];
        (!entry.removed).then_some(&entry.value)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut T> {
        let i = self.index_of(id)?;
        let entry = &mut self.entries[i];
        (!entry.removed).then_some(&mut entry.value)
    }

    /// Entries stay sorted by ID (`insert` appends increasing IDs, `sweep`
    /// preserves order), so lookups binary search.
    fn index_of(&self, id: EntityId) -> Option<usize> {
        self.entries.binary_search_by_key(&id, |e| e.id).ok()
    }

    /// Live entities in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (EntityId, &T)> {
        self.entries
            .iter()
            .filter(|e| !e.removed)
            .map(|e| (e.id, &e.value))
    }

    /// Live entities in insertion order, mutably
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (EntityId, &mut T)> {
        self.entries
            .iter_mut()
            .filter(|e| !e.removed)
            .map(|e| (e.id, &mut e.value))
    }

    /// IDs of live entities, detached from the borrow
    pub fn ids(&self) -> Vec<EntityId> {
        self.iter().map(|(id, _)| id).collect()
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Physically drop tombstoned entries
    pub fn sweep(&mut self) {
        self.entries.retain(|e| !e.removed);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
