use alloc::vec::Vec;

/// A structural edit to an ordered item sequence.
///
/// Operations are produced by [`crate::classify`] or by the typed mutation methods of
/// [`crate::DataSource`], and are replayed in emission order by [`crate::Controller`].
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Operation<K> {
    /// The whole sequence was replaced; carries the identities of the new sequence.
    Replace(Vec<K>),
    /// Items were added before the first item, in display order.
    Prepend(Vec<K>),
    /// Items were added after the last item, in display order.
    Append(Vec<K>),
    /// Items were added starting at `at` (an index into the sequence before the insert).
    Insert { at: usize, ids: Vec<K> },
    /// Payloads changed in place.
    Update(Vec<K>),
    /// Items were removed.
    Remove(Vec<K>),
}

impl<K> Operation<K> {
    pub fn ids(&self) -> &[K] {
        match self {
            Self::Replace(ids)
            | Self::Prepend(ids)
            | Self::Append(ids)
            | Self::Update(ids)
            | Self::Remove(ids)
            | Self::Insert { ids, .. } => ids,
        }
    }

    pub fn kind(&self) -> OperationKind {
        match self {
            Self::Replace(_) => OperationKind::Replace,
            Self::Prepend(_) => OperationKind::Prepend,
            Self::Append(_) => OperationKind::Append,
            Self::Insert { .. } => OperationKind::Insert,
            Self::Update(_) => OperationKind::Update,
            Self::Remove(_) => OperationKind::Remove,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum OperationKind {
    Replace,
    Prepend,
    Append,
    Insert,
    Update,
    Remove,
}

/// A window onto the virtual coordinate space (e.g. the host's visible scroll rect).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Viewport {
    /// Leading edge in virtual coordinates.
    pub offset: u64,
    /// Size along the scroll axis.
    pub size: u32,
}

impl Viewport {
    pub fn new(offset: u64, size: u32) -> Self {
        Self { offset, size }
    }

    pub fn end(&self) -> u64 {
        self.offset.saturating_add(self.size as u64)
    }
}

/// The occupied sub-range `[top, bottom)` of the virtual space.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ContentBounds {
    pub top: u64,
    pub bottom: u64,
}

impl ContentBounds {
    pub fn height(&self) -> u64 {
        self.bottom - self.top
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VisibleRange {
    pub start_index: usize,
    pub end_index: usize, // exclusive
}

impl VisibleRange {
    pub const EMPTY: Self = Self {
        start_index: 0,
        end_index: 0,
    };

    pub fn is_empty(&self) -> bool {
        self.start_index >= self.end_index
    }

    pub fn len(&self) -> usize {
        self.end_index.saturating_sub(self.start_index)
    }

    pub fn contains(&self, index: usize) -> bool {
        self.start_index <= index && index < self.end_index
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PositionedItem {
    pub index: usize,
    /// Leading edge in virtual coordinates.
    pub position: u64,
    pub extent: u32,
}

impl PositionedItem {
    pub fn end(&self) -> u64 {
        self.position.saturating_add(self.extent as u64)
    }
}
