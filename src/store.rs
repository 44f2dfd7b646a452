use alloc::collections::VecDeque;
use alloc::vec::Vec;
use core::{cmp, mem};

use crate::fenwick::Fenwick;
use crate::key::{IdMap, IdSet, ItemId};
use crate::{ContentBounds, LayoutOptions, Operation, PositionedItem, Viewport, VisibleRange};

/// Per-item positions and extents inside a fixed, oversized virtual coordinate space.
///
/// The store mirrors the identity sequence of a [`crate::DataSource`] and lays it out so that
/// edits at either end never move existing items: prepends grow upward from the first item,
/// appends grow downward from the last one.
///
/// Internally, items `[0, split)` hang above a movable `base` coordinate and are summed in
/// one Fenwick tree (nearest-to-base first); items `[split, len)` hang below it in another.
/// This keeps edge growth, extent updates and offset lookups at `O(log n)`. Interior inserts
/// and removals rebuild the affected tree.
///
/// The only way existing positions move without an edit at or before them is re-centering,
/// which happens when content would otherwise run off an edge of the virtual space. The
/// shift is accumulated and reported by [`Self::take_scroll_adjustment`].
#[derive(Clone, Debug)]
pub struct PositionedItemStore<K = u64> {
    options: LayoutOptions<K>,

    ids: VecDeque<K>,
    extents: VecDeque<u32>,
    above: Fenwick,
    below: Fenwick,
    split: usize,
    base: u64,

    key_sizes: IdMap<K, u32>,
    scroll_adjustment: i64,
}

impl<K: ItemId> PositionedItemStore<K> {
    /// Creates an empty store.
    ///
    /// # Panics
    ///
    /// Panics if `anchor > virtual_extent` or if `virtual_extent` does not fit in an `i64`.
    pub fn new(options: LayoutOptions<K>) -> Self {
        assert!(
            options.virtual_extent <= i64::MAX as u64,
            "virtual extent {} exceeds i64::MAX",
            options.virtual_extent
        );
        assert!(
            options.anchor <= options.virtual_extent,
            "anchor {} lies outside the virtual space (0..={})",
            options.anchor,
            options.virtual_extent
        );
        vdebug!(
            virtual_extent = options.virtual_extent,
            anchor = options.anchor,
            default_extent = options.default_extent,
            "PositionedItemStore::new"
        );
        Self {
            base: options.anchor,
            options,
            ids: VecDeque::new(),
            extents: VecDeque::new(),
            above: Fenwick::new(),
            below: Fenwick::new(),
            split: 0,
            key_sizes: IdMap::default(),
            scroll_adjustment: 0,
        }
    }

    pub fn options(&self) -> &LayoutOptions<K> {
        &self.options
    }

    pub fn anchor(&self) -> u64 {
        self.options.anchor
    }

    pub fn virtual_extent(&self) -> u64 {
        self.options.virtual_extent
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn id(&self, index: usize) -> Option<&K> {
        self.ids.get(index)
    }

    pub fn ids(&self) -> impl Iterator<Item = &K> + '_ {
        self.ids.iter()
    }

    /// Linear scan for the index currently holding `id`.
    pub fn index_of(&self, id: &K) -> Option<usize> {
        self.ids.iter().position(|k| k == id)
    }

    pub fn extent(&self, index: usize) -> Option<u32> {
        self.extents.get(index).copied()
    }

    pub fn position(&self, index: usize) -> Option<u64> {
        (index < self.len()).then(|| self.position_of(index))
    }

    pub fn item(&self, index: usize) -> Option<PositionedItem> {
        let extent = self.extent(index)?;
        Some(PositionedItem {
            index,
            position: self.position_of(index),
            extent,
        })
    }

    /// Iterates every item in index order with its position.
    pub fn iter(&self) -> impl Iterator<Item = (&K, PositionedItem)> + '_ {
        let mut position = self.top();
        self.ids
            .iter()
            .zip(self.extents.iter())
            .enumerate()
            .map(move |(index, (id, &extent))| {
                let item = PositionedItem {
                    index,
                    position,
                    extent,
                };
                position = position.saturating_add(extent as u64);
                (id, item)
            })
    }

    /// The occupied range `[top, bottom)`, or `None` when the store is empty.
    pub fn content_bounds(&self) -> Option<ContentBounds> {
        if self.is_empty() {
            return None;
        }
        Some(ContentBounds {
            top: self.top(),
            bottom: self.bottom(),
        })
    }

    /// Returns the item whose interval `[position, position + extent)` contains `position`.
    pub fn index_at_position(&self, position: u64) -> Option<usize> {
        if position < self.top() || position >= self.bottom() {
            return None;
        }
        if position >= self.base {
            Some(self.split + self.below.lower_bound(position - self.base))
        } else {
            let distance = self.base - position;
            Some(self.split - 1 - self.above.lower_bound(distance - 1))
        }
    }

    /// Indices whose intervals intersect `viewport` (no overscan). `O(log n)`.
    pub fn visible_range(&self, viewport: Viewport) -> VisibleRange {
        if self.is_empty() || viewport.size == 0 {
            return VisibleRange::EMPTY;
        }
        let start = cmp::max(viewport.offset, self.top());
        let end = cmp::min(viewport.end(), self.bottom());
        if start >= end {
            return VisibleRange::EMPTY;
        }
        match (
            self.index_at_position(start),
            self.index_at_position(end - 1),
        ) {
            (Some(first), Some(last)) => VisibleRange {
                start_index: first,
                end_index: last + 1,
            },
            _ => VisibleRange::EMPTY,
        }
    }

    /// The visible range widened by `options.overscan` items on each side.
    pub fn virtual_range(&self, viewport: Viewport) -> VisibleRange {
        let mut range = self.visible_range(viewport);
        if range.is_empty() {
            return range;
        }
        let overscan = self.options.overscan;
        range.start_index = range.start_index.saturating_sub(overscan);
        range.end_index = cmp::min(self.len(), range.end_index.saturating_add(overscan));
        range
    }

    /// Calls `f` for every item in [`Self::virtual_range`] without allocating.
    pub fn for_each_visible_item(&self, viewport: Viewport, mut f: impl FnMut(&K, PositionedItem)) {
        let range = self.virtual_range(viewport);
        if range.is_empty() {
            return;
        }
        let mut position = self.position_of(range.start_index);
        for index in range.start_index..range.end_index {
            let extent = self.extents[index];
            f(
                &self.ids[index],
                PositionedItem {
                    index,
                    position,
                    extent,
                },
            );
            position = position.saturating_add(extent as u64);
        }
    }

    /// Collects the items of [`Self::virtual_range`] into `out` (clears `out` first).
    pub fn collect_visible_items(&self, viewport: Viewport, out: &mut Vec<PositionedItem>) {
        out.clear();
        self.for_each_visible_item(viewport, |_, item| out.push(item));
    }

    /// Applies one operation. Operations must be applied in emission order.
    pub fn apply(&mut self, op: &Operation<K>) {
        vtrace!(kind = ?op.kind(), ids = op.ids().len(), "apply");
        match op {
            Operation::Replace(ids) => self.apply_replace(ids),
            Operation::Prepend(ids) => self.apply_prepend(ids),
            Operation::Append(ids) => self.apply_append(ids),
            Operation::Insert { at, ids } => self.apply_insert(*at, ids),
            Operation::Update(ids) => self.apply_update(ids),
            Operation::Remove(ids) => self.apply_remove(ids),
        }
    }

    /// Drops every item and lays out `ids` from scratch, the first one at the anchor.
    pub fn apply_replace(&mut self, ids: &[K]) {
        self.clear();
        self.apply_append(ids);
    }

    /// Lays out `ids` after the last item (or from the anchor when the store is empty).
    pub fn apply_append(&mut self, ids: &[K]) {
        if ids.is_empty() {
            return;
        }
        self.reset_base_if_empty();
        let start = self.len();
        let extents: Vec<u32> = ids
            .iter()
            .enumerate()
            .map(|(k, id)| self.extent_for(start + k, id))
            .collect();
        self.ensure_room(0, sum(&extents));

        for (id, extent) in ids.iter().zip(extents) {
            self.ids.push_back(id.clone());
            self.extents.push_back(extent);
            self.below.push_value(extent);
        }
    }

    /// Lays out `ids` immediately above the first item. Existing positions do not change.
    ///
    /// Prepending into an empty store behaves like [`Self::apply_append`].
    pub fn apply_prepend(&mut self, ids: &[K]) {
        if ids.is_empty() {
            return;
        }
        if self.is_empty() {
            self.apply_append(ids);
            return;
        }
        let extents: Vec<u32> = ids
            .iter()
            .enumerate()
            .map(|(k, id)| self.extent_for(k, id))
            .collect();
        self.ensure_room(sum(&extents), 0);

        for (id, extent) in ids.iter().zip(extents).rev() {
            self.ids.push_front(id.clone());
            self.extents.push_front(extent);
            self.above.push_value(extent);
            self.split += 1;
        }
    }

    /// Inserts `ids` at the position of the item currently at `at` and shifts every later
    /// item forward by the inserted extent.
    ///
    /// # Panics
    ///
    /// Panics if `at > len`.
    pub fn apply_insert(&mut self, at: usize, ids: &[K]) {
        assert!(
            at <= self.len(),
            "insert index {at} out of bounds (len {})",
            self.len()
        );
        if ids.is_empty() {
            return;
        }
        if at == self.len() {
            self.apply_append(ids);
            return;
        }
        let extents: Vec<u32> = ids
            .iter()
            .enumerate()
            .map(|(k, id)| self.extent_for(at + k, id))
            .collect();
        let growth = sum(&extents);
        self.ensure_room(0, growth);

        for (k, (id, extent)) in ids.iter().zip(extents).enumerate() {
            self.ids.insert(at + k, id.clone());
            self.extents.insert(at + k, extent);
        }
        if at < self.split {
            self.split += ids.len();
            self.base += growth;
            self.rebuild_above();
        } else {
            self.rebuild_below();
        }
    }

    /// Removes `ids` and shifts every later item backward by the removed extent.
    ///
    /// # Panics
    ///
    /// Panics if an identity is listed twice or is not present.
    pub fn apply_remove(&mut self, ids: &[K]) {
        if ids.is_empty() {
            return;
        }
        let indices = self.resolve(ids, "remove");

        let mut removed_above = 0u64;
        let mut above_count = 0usize;
        let mut touched_below = false;
        for &index in indices.iter().rev() {
            let extent = self.extents.remove(index).unwrap_or(0);
            if let Some(id) = self.ids.remove(index) {
                self.key_sizes.remove(&id);
            }
            if index < self.split {
                removed_above += extent as u64;
                above_count += 1;
            } else {
                touched_below = true;
            }
        }

        self.split -= above_count;
        self.base -= removed_above;
        if above_count > 0 {
            self.rebuild_above();
        }
        if touched_below {
            self.rebuild_below();
        }
    }

    /// Re-measures `ids` (their payload changed) and shifts later items by each delta.
    ///
    /// # Panics
    ///
    /// Panics if an identity is listed twice or is not present.
    pub fn apply_update(&mut self, ids: &[K]) {
        if ids.is_empty() {
            return;
        }
        let indices = self.resolve(ids, "update");
        for id in ids {
            self.key_sizes.remove(id);
        }

        let measured: Vec<(usize, u32)> = indices
            .iter()
            .map(|&index| (index, self.options.estimate(index, &self.ids[index])))
            .collect();
        let net: i64 = measured
            .iter()
            .map(|&(index, extent)| extent as i64 - self.extents[index] as i64)
            .sum();
        if net > 0 {
            self.ensure_room(0, net as u64);
        }
        for (index, extent) in measured {
            self.resize_down(index, extent);
        }
    }

    /// Records a measured extent reported by the host.
    ///
    /// The measurement is cached by identity and takes precedence over the size oracle when
    /// the same item is laid out again. Later items shift by the returned delta.
    pub fn measure(&mut self, index: usize, extent: u32) -> i64 {
        let Some(cur) = self.extent(index) else {
            vwarn!(index, len = self.len(), "measure: index out of bounds");
            return 0;
        };
        vtrace!(index, extent, "measure");
        self.key_sizes.insert(self.ids[index].clone(), extent);
        if extent > cur {
            self.ensure_room(0, (extent - cur) as u64);
        }
        self.resize_down(index, extent)
    }

    /// Like [`Self::measure`], but the item grows or shrinks upward: its bottom edge and
    /// every later item stay put while earlier items move.
    ///
    /// Useful for items measured above the viewport, where downward growth would push the
    /// visible content.
    pub fn measure_upward(&mut self, index: usize, extent: u32) -> i64 {
        let Some(cur) = self.extent(index) else {
            vwarn!(index, len = self.len(), "measure_upward: index out of bounds");
            return 0;
        };
        vtrace!(index, extent, "measure_upward");
        self.key_sizes.insert(self.ids[index].clone(), extent);
        if extent > cur {
            self.ensure_room((extent - cur) as u64, 0);
        }
        if cur == extent {
            return 0;
        }
        self.extents[index] = extent;
        let delta = extent as i64 - cur as i64;
        if index < self.split {
            self.above.add(self.split - 1 - index, delta);
        } else {
            self.below.add(index - self.split, delta);
            self.base = offset_by(self.base, -delta);
        }
        delta
    }

    pub fn is_measured(&self, index: usize) -> bool {
        self.ids
            .get(index)
            .is_some_and(|id| self.key_sizes.contains_key(id))
    }

    /// Returns the number of cached measured extents (id → extent).
    pub fn measurement_cache_len(&self) -> usize {
        self.key_sizes.len()
    }

    pub fn for_each_cached_size(&self, mut f: impl FnMut(&K, u32)) {
        for (k, v) in self.key_sizes.iter() {
            f(k, *v);
        }
    }

    /// Exports the cached measured extents (useful for persistence).
    pub fn export_measurement_cache(&self) -> Vec<(K, u32)> {
        let mut out = Vec::with_capacity(self.key_sizes.len());
        self.for_each_cached_size(|k, v| out.push((k.clone(), v)));
        out
    }

    /// Replaces the measurement cache and re-lays out every item, keeping the top fixed.
    pub fn import_measurement_cache(&mut self, entries: impl IntoIterator<Item = (K, u32)>) {
        self.key_sizes.clear();
        self.key_sizes.extend(entries);
        vdebug!(entries = self.key_sizes.len(), "import_measurement_cache");
        self.remeasure_all();
    }

    pub fn reset_measurements(&mut self) {
        self.key_sizes.clear();
        self.remeasure_all();
    }

    /// Changes the cross-axis constraint. Cached measurements are dropped and every item is
    /// re-measured, keeping the top of the content fixed.
    pub fn set_width(&mut self, width: u32) {
        if self.options.width == width {
            return;
        }
        vdebug!(from = self.options.width, to = width, "set_width");
        self.options.width = width;
        self.reset_measurements();
    }

    pub fn set_size_oracle(
        &mut self,
        size_oracle: impl Fn(usize, &K, u32) -> Option<u32> + Send + Sync + 'static,
    ) {
        self.options.size_oracle = Some(alloc::sync::Arc::new(size_oracle));
        self.remeasure_all();
    }

    pub fn set_default_extent(&mut self, default_extent: u32) {
        if self.options.default_extent == default_extent {
            return;
        }
        self.options.default_extent = default_extent;
        self.remeasure_all();
    }

    pub fn set_overscan(&mut self, overscan: usize) {
        self.options.overscan = overscan;
    }

    /// Moves the content to the middle of the virtual space.
    ///
    /// Every position shifts by the returned delta, which is also added to the pending
    /// scroll adjustment.
    pub fn recenter(&mut self) -> i64 {
        let (top, bottom) = (self.top(), self.bottom());
        let target = (self.virtual_extent() - (bottom - top)) / 2;
        let delta = target as i64 - top as i64;
        self.shift(delta);
        delta
    }

    /// Scroll offset delta accumulated by re-centering since the last call.
    ///
    /// Hosts add this to their scroll offset so the visible content stays in place.
    pub fn take_scroll_adjustment(&mut self) -> i64 {
        mem::take(&mut self.scroll_adjustment)
    }

    pub fn pending_scroll_adjustment(&self) -> i64 {
        self.scroll_adjustment
    }

    /// Drops every item. Cached measurements are kept.
    pub fn clear(&mut self) {
        self.ids.clear();
        self.extents.clear();
        self.above = Fenwick::new();
        self.below = Fenwick::new();
        self.split = 0;
        self.base = self.options.anchor;
        self.scroll_adjustment = 0;
    }

    fn top(&self) -> u64 {
        self.base - self.above.total()
    }

    fn bottom(&self) -> u64 {
        self.base + self.below.total()
    }

    fn position_of(&self, index: usize) -> u64 {
        if index < self.split {
            self.base - self.above.prefix_sum(self.split - index)
        } else {
            self.base + self.below.prefix_sum(index - self.split)
        }
    }

    fn extent_for(&self, index: usize, id: &K) -> u32 {
        match self.key_sizes.get(id) {
            Some(&size) => size,
            None => self.options.estimate(index, id),
        }
    }

    /// Sets an extent so that later items move and earlier ones stay.
    fn resize_down(&mut self, index: usize, extent: u32) -> i64 {
        let cur = self.extents[index];
        if cur == extent {
            return 0;
        }
        self.extents[index] = extent;
        let delta = extent as i64 - cur as i64;
        if index < self.split {
            self.above.add(self.split - 1 - index, delta);
            self.base = offset_by(self.base, delta);
        } else {
            self.below.add(index - self.split, delta);
        }
        delta
    }

    fn resolve(&self, ids: &[K], what: &str) -> Vec<usize> {
        let targets: IdSet<&K> = ids.iter().collect();
        assert!(
            targets.len() == ids.len(),
            "{what}: duplicate identities in batch"
        );
        let indices: Vec<usize> = self
            .ids
            .iter()
            .enumerate()
            .filter(|(_, id)| targets.contains(id))
            .map(|(i, _)| i)
            .collect();
        assert!(
            indices.len() == targets.len(),
            "{what}: {} of {} identities are not present",
            targets.len() - indices.len(),
            targets.len()
        );
        indices
    }

    fn reset_base_if_empty(&mut self) {
        if self.is_empty() {
            self.above = Fenwick::new();
            self.below = Fenwick::new();
            self.split = 0;
            self.base = self.options.anchor;
        }
    }

    fn rebuild_above(&mut self) {
        self.above = Fenwick::from_values(self.extents.range(..self.split).rev().copied());
    }

    fn rebuild_below(&mut self) {
        self.below = Fenwick::from_values(self.extents.range(self.split..).copied());
    }

    fn remeasure_all(&mut self) {
        let top = self.top();
        let extents: Vec<u32> = self
            .ids
            .iter()
            .enumerate()
            .map(|(i, id)| self.extent_for(i, id))
            .collect();
        self.extents = extents.into();
        self.rebuild_above();
        self.rebuild_below();
        self.base = top + self.above.total();
        self.ensure_room(0, 0);
    }

    /// Re-centers when growing by `grow_above` at the top or `grow_below` at the bottom
    /// would leave the virtual space.
    fn ensure_room(&mut self, grow_above: u64, grow_below: u64) {
        let (top, bottom) = (self.top(), self.bottom());
        let limit = self.virtual_extent();
        let fits = top >= grow_above
            && bottom
                .checked_add(grow_below)
                .is_some_and(|end| end <= limit);
        if fits {
            return;
        }

        let span = (bottom - top)
            .saturating_add(grow_above)
            .saturating_add(grow_below);
        assert!(
            span <= limit,
            "virtual space exhausted: {span} units of content do not fit in {limit}"
        );
        let target_top = (limit - span) / 2 + grow_above;
        vwarn!(top, bottom, target_top, "virtual space edge reached; re-centering");
        self.shift(target_top as i64 - top as i64);
    }

    fn shift(&mut self, delta: i64) {
        if delta == 0 {
            return;
        }
        self.base = offset_by(self.base, delta);
        self.scroll_adjustment += delta;
    }
}

fn sum(extents: &[u32]) -> u64 {
    extents.iter().map(|&e| e as u64).sum()
}

fn offset_by(value: u64, delta: i64) -> u64 {
    if delta >= 0 {
        value + delta as u64
    } else {
        value - delta.unsigned_abs()
    }
}
