use super::entry::{PriorityEntry, Rank};
use crate::domain::object::ObjectType;
use std::collections::{BTreeMap, HashMap};

/// Handlers of one object type in dispatch order.
#[derive(Debug)]
pub(crate) struct TypeGroup {
    object_type: ObjectType,
    entries: BTreeMap<Rank, PriorityEntry>,
}

impl TypeGroup {
    pub(crate) fn new(object_type: ObjectType) -> Self {
        Self {
            object_type,
            entries: BTreeMap::new(),
        }
    }

    pub(crate) fn object_type(&self) -> ObjectType {
        self.object_type
    }

    /// Inserts `entry` unless an entry with the same id is present.
    pub(crate) fn insert(&mut self, entry: PriorityEntry) -> bool {
        debug_assert_eq!(entry.object_type(), self.object_type);
        if self.contains(&entry) {
            return false;
        }
        self.entries.insert(entry.rank(), entry);
        true
    }

    pub(crate) fn remove(&mut self, entry: &PriorityEntry) -> bool {
        if self.entries.remove(&entry.rank()).is_some() {
            return true;
        }
        // Same id under a different priority.
        let before = self.entries.len();
        self.entries.retain(|_, existing| existing != entry);
        self.entries.len() != before
    }

    pub(crate) fn contains(&self, entry: &PriorityEntry) -> bool {
        self.contains_id(entry.id())
    }

    pub(crate) fn contains_id(&self, id: &str) -> bool {
        self.entries.values().any(|existing| existing.id() == id)
    }

    /// Highest priority first; ties by ascending id.
    pub(crate) fn iter(&self) -> impl Iterator<Item = &PriorityEntry> {
        self.entries.values()
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Object type to [`TypeGroup`] mapping.
///
/// Does not enforce that an id lives in a single group; the registry does.
#[derive(Debug, Default)]
pub(crate) struct RegistryIndex {
    groups: HashMap<ObjectType, TypeGroup>,
}

impl RegistryIndex {
    pub(crate) fn add(&mut self, entry: PriorityEntry) -> bool {
        let object_type = entry.object_type();
        self.groups
            .entry(object_type)
            .or_insert_with(|| TypeGroup::new(object_type))
            .insert(entry)
    }

    /// Removes `entry` from its group, dropping the group once empty.
    pub(crate) fn remove(&mut self, entry: &PriorityEntry) -> bool {
        let object_type = entry.object_type();
        let Some(group) = self.groups.get_mut(&object_type) else {
            return false;
        };
        let removed = group.remove(entry);
        if group.is_empty() {
            self.groups.remove(&object_type);
        }
        removed
    }

    pub(crate) fn contains(&self, entry: &PriorityEntry) -> bool {
        self.groups
            .get(&entry.object_type())
            .is_some_and(|group| group.contains(entry))
    }

    pub(crate) fn group(&self, object_type: ObjectType) -> Option<&TypeGroup> {
        self.groups.get(&object_type)
    }

    pub(crate) fn groups(&self) -> impl Iterator<Item = &TypeGroup> {
        self.groups.values()
    }
}
