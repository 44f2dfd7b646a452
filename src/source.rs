use alloc::collections::VecDeque;
use alloc::vec::Vec;
use core::sync::atomic::{AtomicU64, Ordering};

use crate::key::{IdMap, IdSet};
use crate::{Item, Operation, classify};

static NEXT_SOURCE_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of a [`DataSource`] instance.
///
/// Consumers compare it across syncs to detect that the host swapped in a new source.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SourceId(u64);

impl SourceId {
    fn next() -> Self {
        Self(NEXT_SOURCE_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

/// The mutable front door: the current item sequence plus an append-only operation log.
///
/// Every mutation that changes the sequence appends the operations describing it, in the
/// order a consumer must replay them. Consumers (see [`crate::Controller`]) keep their own
/// cursor into [`Self::log`]; the source never rewrites or truncates it.
///
/// Mutations validate their arguments and panic on contract violations (duplicate
/// identities, unknown identities, out-of-bounds indexes): silently repairing them would
/// desynchronize every consumer's layout.
#[derive(Debug)]
pub struct DataSource<T: Item> {
    id: SourceId,
    items: VecDeque<T>,
    present: IdSet<T::Id>,
    version: u64,
    log: Vec<Operation<T::Id>>,
}

impl<T: Item> Default for DataSource<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Item> DataSource<T> {
    pub fn new() -> Self {
        Self {
            id: SourceId::next(),
            items: VecDeque::new(),
            present: IdSet::default(),
            version: 0,
            log: Vec::new(),
        }
    }

    /// Creates a source whose first log entry is a `Replace` with `items`.
    pub fn with_items(items: impl IntoIterator<Item = T>) -> Self {
        let mut source = Self::new();
        source.replace(items);
        source
    }

    pub fn source_id(&self) -> SourceId {
        self.id
    }

    /// Incremented once per mutation call that logged at least one operation.
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    pub fn items(&self) -> impl Iterator<Item = &T> + '_ {
        self.items.iter()
    }

    pub fn contains(&self, id: &T::Id) -> bool {
        self.present.contains(id)
    }

    /// Linear scan for the index currently holding `id`.
    pub fn index_of(&self, id: &T::Id) -> Option<usize> {
        if !self.contains(id) {
            return None;
        }
        self.items.iter().position(|item| item.id() == *id)
    }

    pub fn ids(&self) -> Vec<T::Id> {
        self.items.iter().map(Item::id).collect()
    }

    pub fn log(&self) -> &[Operation<T::Id>] {
        &self.log
    }

    /// Log entries at index `>= cursor`.
    pub fn operations_since(&self, cursor: usize) -> &[Operation<T::Id>] {
        self.log.get(cursor..).unwrap_or(&[])
    }

    /// Replaces the whole sequence.
    ///
    /// A no-op when both the current sequence and `items` are empty.
    pub fn replace(&mut self, items: impl IntoIterator<Item = T>) {
        let items: VecDeque<T> = items.into_iter().collect();
        if items.is_empty() && self.items.is_empty() {
            return;
        }
        let mut present = IdSet::default();
        for item in &items {
            let id = item.id();
            assert!(
                !present.contains(&id),
                "replace: duplicate identity {id:?} in batch"
            );
            present.insert(id);
        }
        self.present = present;
        self.items = items;
        let ids = self.ids();
        self.record([Operation::Replace(ids)]);
    }

    /// Adds `items` before the first item, keeping their order.
    pub fn prepend(&mut self, items: impl IntoIterator<Item = T>) {
        let items: Vec<T> = items.into_iter().collect();
        if items.is_empty() {
            return;
        }
        let ids = self.admit(&items, "prepend");
        for item in items.into_iter().rev() {
            self.items.push_front(item);
        }
        self.record([Operation::Prepend(ids)]);
    }

    /// Adds `items` after the last item.
    pub fn append(&mut self, items: impl IntoIterator<Item = T>) {
        let items: Vec<T> = items.into_iter().collect();
        if items.is_empty() {
            return;
        }
        let ids = self.admit(&items, "append");
        self.items.extend(items);
        self.record([Operation::Append(ids)]);
    }

    /// Inserts `items` so that the first of them ends up at index `at`.
    ///
    /// # Panics
    ///
    /// Panics if `at > len`.
    pub fn insert(&mut self, items: impl IntoIterator<Item = T>, at: usize) {
        assert!(
            at <= self.items.len(),
            "insert index {at} out of bounds (len {})",
            self.items.len()
        );
        let items: Vec<T> = items.into_iter().collect();
        if items.is_empty() {
            return;
        }
        let ids = self.admit(&items, "insert");
        for (k, item) in items.into_iter().enumerate() {
            self.items.insert(at + k, item);
        }
        self.record([Operation::Insert { at, ids }]);
    }

    /// Replaces the payload of existing items, matched by identity.
    ///
    /// # Panics
    ///
    /// Panics if an identity is not present or appears twice in `items`.
    pub fn update(&mut self, items: impl IntoIterator<Item = T>) {
        let mut pending: IdMap<T::Id, T> = IdMap::default();
        let mut ids = Vec::new();
        for item in items {
            let id = item.id();
            assert!(self.contains(&id), "update: identity {id:?} is not present");
            assert!(
                !pending.contains_key(&id),
                "update: duplicate identity {id:?} in batch"
            );
            ids.push(id.clone());
            pending.insert(id, item);
        }
        if ids.is_empty() {
            return;
        }
        for slot in self.items.iter_mut() {
            if let Some(item) = pending.remove(&slot.id()) {
                *slot = item;
            }
        }
        self.record([Operation::Update(ids)]);
    }

    /// Removes the items with the given identities.
    ///
    /// # Panics
    ///
    /// Panics if an identity is not present or appears twice in `ids`.
    pub fn remove(&mut self, ids: impl IntoIterator<Item = T::Id>) {
        let ids: Vec<T::Id> = ids.into_iter().collect();
        if ids.is_empty() {
            return;
        }
        let mut doomed = IdSet::default();
        for id in &ids {
            assert!(self.contains(id), "remove: identity {id:?} is not present");
            assert!(
                !doomed.contains(id),
                "remove: duplicate identity {id:?} in batch"
            );
            doomed.insert(id.clone());
        }
        self.items.retain(|item| !doomed.contains(&item.id()));
        for id in &ids {
            self.present.remove(id);
        }
        self.record([Operation::Remove(ids)]);
    }

    /// Makes `next` the current sequence, logging whatever [`classify`] infers (possibly
    /// nothing).
    ///
    /// Returns the number of operations appended to the log.
    pub fn apply(&mut self, next: impl IntoIterator<Item = T>) -> usize {
        let next: Vec<T> = next.into_iter().collect();
        let ops = classify(self.items.make_contiguous(), next.as_slice());
        if ops.is_empty() {
            return 0;
        }
        let count = ops.len();
        self.present = next.iter().map(Item::id).collect();
        self.items = next.into();
        self.record(ops);
        count
    }

    /// Checks a batch of new items and registers their identities.
    fn admit(&mut self, items: &[T], what: &str) -> Vec<T::Id> {
        let mut ids = Vec::with_capacity(items.len());
        for item in items {
            let id = item.id();
            assert!(
                !self.present.contains(&id),
                "{what}: identity {id:?} is already present or repeated in batch"
            );
            self.present.insert(id.clone());
            ids.push(id);
        }
        ids
    }

    fn record(&mut self, ops: impl IntoIterator<Item = Operation<T::Id>>) {
        let before = self.log.len();
        self.log.extend(ops);
        if self.log.len() > before {
            self.version += 1;
            vtrace!(
                source = self.id.get(),
                version = self.version,
                logged = self.log.len() - before,
                "DataSource::record"
            );
        }
    }
}
