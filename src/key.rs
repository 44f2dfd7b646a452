#[cfg(not(feature = "std"))]
use alloc::collections::{BTreeMap, BTreeSet};
#[cfg(feature = "std")]
use std::collections::{HashMap, HashSet};

#[cfg(feature = "std")]
pub(crate) type IdMap<K, V> = HashMap<K, V>;
#[cfg(not(feature = "std"))]
pub(crate) type IdMap<K, V> = BTreeMap<K, V>;

#[cfg(feature = "std")]
pub(crate) type IdSet<K> = HashSet<K>;
#[cfg(not(feature = "std"))]
pub(crate) type IdSet<K> = BTreeSet<K>;

/// Bound for item identities.
///
/// With `std`, identities are hashed (`Hash + Eq`); without it they are ordered (`Ord`) and the
/// crate falls back to B-tree collections.
#[cfg(feature = "std")]
pub trait ItemId: core::hash::Hash + Eq + Clone + core::fmt::Debug {}
#[cfg(feature = "std")]
impl<K: core::hash::Hash + Eq + Clone + core::fmt::Debug> ItemId for K {}

#[cfg(not(feature = "std"))]
pub trait ItemId: Ord + Clone + core::fmt::Debug {}
#[cfg(not(feature = "std"))]
impl<K: Ord + Clone + core::fmt::Debug> ItemId for K {}

/// A list element with a stable identity and a comparable payload.
///
/// Two items are considered equal by the change classifier when their identities match and
/// `PartialEq` holds. Identity must never change for the lifetime of an item; the payload may.
pub trait Item: PartialEq {
    type Id: ItemId;

    fn id(&self) -> Self::Id;
}
