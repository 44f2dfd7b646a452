use alloc::sync::Arc;

/// Size of the virtual coordinate space used by [`LayoutOptions::new`].
///
/// Large enough that a session would need on the order of `10^10` default-sized rows on one
/// side of the anchor before the store has to re-center.
pub const DEFAULT_VIRTUAL_EXTENT: u64 = 1 << 42;

/// A synchronous measurement hook: `(index, id, width) -> extent`.
///
/// `index` is the item's index at the moment it is laid out and `width` is the current
/// cross-axis constraint. Returning `None` falls back to [`LayoutOptions::default_extent`].
pub type SizeOracle<K> = Arc<dyn Fn(usize, &K, u32) -> Option<u32> + Send + Sync>;

/// Configuration for [`crate::PositionedItemStore`].
///
/// `virtual_extent` and `anchor` are read once when the store is created and never change
/// afterwards. Closures are stored in `Arc`s so the options are cheap to clone.
pub struct LayoutOptions<K> {
    /// Total size of the virtual coordinate space.
    pub virtual_extent: u64,
    /// Where the first item of a fresh layout is placed.
    pub anchor: u64,
    /// Cross-axis constraint passed to the size oracle.
    pub width: u32,
    /// Extent used when no measurement and no oracle answer is available.
    pub default_extent: u32,
    pub size_oracle: Option<SizeOracle<K>>,
    /// Extra items reported on each side by [`crate::PositionedItemStore::virtual_range`].
    pub overscan: usize,
}

impl<K> Clone for LayoutOptions<K> {
    fn clone(&self) -> Self {
        Self {
            virtual_extent: self.virtual_extent,
            anchor: self.anchor,
            width: self.width,
            default_extent: self.default_extent,
            size_oracle: self.size_oracle.clone(),
            overscan: self.overscan,
        }
    }
}

impl<K> LayoutOptions<K> {
    /// Creates options with every item estimated at `default_extent`.
    pub fn new(default_extent: u32) -> Self {
        Self {
            virtual_extent: DEFAULT_VIRTUAL_EXTENT,
            anchor: DEFAULT_VIRTUAL_EXTENT / 2,
            width: 0,
            default_extent,
            size_oracle: None,
            overscan: 1,
        }
    }

    /// Sets the virtual space size and moves the anchor to its midpoint.
    pub fn with_virtual_extent(mut self, virtual_extent: u64) -> Self {
        self.virtual_extent = virtual_extent;
        self.anchor = virtual_extent / 2;
        self
    }

    pub fn with_anchor(mut self, anchor: u64) -> Self {
        self.anchor = anchor;
        self
    }

    pub fn with_width(mut self, width: u32) -> Self {
        self.width = width;
        self
    }

    pub fn with_default_extent(mut self, default_extent: u32) -> Self {
        self.default_extent = default_extent;
        self
    }

    pub fn with_size_oracle(
        mut self,
        size_oracle: impl Fn(usize, &K, u32) -> Option<u32> + Send + Sync + 'static,
    ) -> Self {
        self.size_oracle = Some(Arc::new(size_oracle));
        self
    }

    pub fn with_overscan(mut self, overscan: usize) -> Self {
        self.overscan = overscan;
        self
    }

    pub(crate) fn estimate(&self, index: usize, id: &K) -> u32 {
        self.size_oracle
            .as_ref()
            .and_then(|oracle| oracle(index, id, self.width))
            .unwrap_or(self.default_extent)
    }
}

impl<K> core::fmt::Debug for LayoutOptions<K> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("LayoutOptions")
            .field("virtual_extent", &self.virtual_extent)
            .field("anchor", &self.anchor)
            .field("width", &self.width)
            .field("default_extent", &self.default_extent)
            .field("overscan", &self.overscan)
            .finish_non_exhaustive()
    }
}
