use crate::key::ItemId;
use crate::source::SourceId;
use crate::{
    DataSource, Insets, Item, LayoutOptions, PositionedItemStore, Viewport, VisibleRange,
    compute_insets,
};

/// What a [`Controller::sync`] call did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SyncOutcome {
    /// Operations applied to the store.
    pub applied: usize,
    /// The store was rebuilt from the source's current sequence (first sync, or a new
    /// source instance) instead of being updated incrementally.
    pub reset: bool,
    /// Delta the host must add to its scroll offset because the store re-centered.
    pub scroll_adjustment: i64,
}

impl SyncOutcome {
    pub fn is_noop(&self) -> bool {
        self.applied == 0 && !self.reset && self.scroll_adjustment == 0
    }
}

/// Where a controller is in replaying a source's log.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ReplayState {
    #[default]
    Uninitialized,
    Populated {
        source: SourceId,
        /// Number of log entries already applied.
        cursor: usize,
    },
}

/// Owns a [`PositionedItemStore`] and keeps it in step with a [`DataSource`].
///
/// Adapters call [`Self::sync`] once per layout pass (it is idempotent), then read
/// [`Self::insets`] for the scroll surface and [`Self::virtual_range`] for what to render.
/// Everything runs on the thread that owns both the source and the controller.
#[derive(Clone, Debug)]
pub struct Controller<K> {
    store: PositionedItemStore<K>,
    state: ReplayState,
}

impl<K: ItemId> Controller<K> {
    pub fn new(options: LayoutOptions<K>) -> Self {
        Self::from_store(PositionedItemStore::new(options))
    }

    pub fn from_store(store: PositionedItemStore<K>) -> Self {
        Self {
            store,
            state: ReplayState::Uninitialized,
        }
    }

    pub fn store(&self) -> &PositionedItemStore<K> {
        &self.store
    }

    /// Mutable access for measurements and option changes.
    ///
    /// Structural edits must go through the source; applying operations here directly
    /// desynchronizes the store from the log.
    pub fn store_mut(&mut self) -> &mut PositionedItemStore<K> {
        &mut self.store
    }

    pub fn into_store(self) -> PositionedItemStore<K> {
        self.store
    }

    pub fn state(&self) -> ReplayState {
        self.state
    }

    pub fn cursor(&self) -> usize {
        match self.state {
            ReplayState::Uninitialized => 0,
            ReplayState::Populated { cursor, .. } => cursor,
        }
    }

    /// Brings the store up to date with `source`.
    ///
    /// - Same source as last time: replays log entries past the cursor, in order.
    /// - First sync, or a different source instance: clears the store and lays out the
    ///   source's current sequence. A log holding at most its first entry is replayed as is;
    ///   a longer history is not replayed, the current sequence is applied as one `Replace`.
    pub fn sync<T: Item<Id = K>>(&mut self, source: &DataSource<T>) -> SyncOutcome {
        let log = source.log();
        let source_id = source.source_id();

        if let ReplayState::Populated { source: seen, cursor } = self.state {
            if seen == source_id {
                let pending = source.operations_since(cursor);
                for op in pending {
                    self.store.apply(op);
                }
                if !pending.is_empty() {
                    vtrace!(
                        source = source_id.get(),
                        from = cursor,
                        to = log.len(),
                        "Controller::sync replay"
                    );
                }
                self.state = ReplayState::Populated {
                    source: source_id,
                    cursor: log.len(),
                };
                return SyncOutcome {
                    applied: pending.len(),
                    reset: false,
                    scroll_adjustment: self.store.take_scroll_adjustment(),
                };
            }
        }

        vdebug!(
            source = source_id.get(),
            log = log.len(),
            items = source.len(),
            "Controller::sync rebuild"
        );
        self.store.clear();
        let applied = if log.len() <= 1 {
            for op in log {
                self.store.apply(op);
            }
            log.len()
        } else {
            self.store.apply_replace(&source.ids());
            1
        };
        self.state = ReplayState::Populated {
            source: source_id,
            cursor: log.len(),
        };
        SyncOutcome {
            applied,
            reset: true,
            scroll_adjustment: self.store.take_scroll_adjustment(),
        }
    }

    /// Forgets the source; the next [`Self::sync`] rebuilds from scratch.
    pub fn reset(&mut self) {
        self.store.clear();
        self.state = ReplayState::Uninitialized;
    }

    pub fn insets(&self) -> Insets {
        compute_insets(
            self.store.content_bounds(),
            self.store.virtual_extent(),
            self.store.anchor(),
        )
    }

    pub fn visible_range(&self, viewport: Viewport) -> VisibleRange {
        self.store.visible_range(viewport)
    }

    pub fn virtual_range(&self, viewport: Viewport) -> VisibleRange {
        self.store.virtual_range(viewport)
    }
}
