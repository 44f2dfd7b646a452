//! A headless layout engine for lists that grow in both directions.
//!
//! Chat logs and timelines load older content above and receive newer content below. This
//! crate lays such a list out inside a deliberately oversized virtual coordinate space, with
//! the first item placed at a fixed anchor in the middle. New items are spliced in at the
//! matching edge, so existing items (and therefore the user's scroll offset) never move.
//!
//! The pieces, leaves first:
//! - [`classify`]: turns "old list → new list" into a replayable batch of [`Operation`]s
//!   (replace, prepend, append, insert, update, remove).
//! - [`PositionedItemStore`]: per-item positions and extents in virtual coordinates, with
//!   `O(log n)` visible-range queries.
//! - [`compute_insets`]: hides the unused virtual space so the host's scrollable range is
//!   exactly the occupied content.
//! - [`DataSource`]: the mutable sequence plus an append-only operation log.
//! - [`Controller`]: replays a source's log into a store.
//!
//! It is UI-agnostic. A TUI/GUI layer is expected to provide:
//! - item measurements (a size oracle and/or measured extents after render)
//! - the viewport rect in virtual coordinates
//! - a scroll surface that honors the computed insets
#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

#[cfg(test)]
extern crate std;

#[macro_use]
mod macros;

mod classifier;
mod controller;
mod fenwick;
mod key;
mod options;
mod source;
mod store;
mod types;
mod viewport;


pub use classifier::classify;
pub use controller::{Controller, ReplayState, SyncOutcome};
pub use key::{Item, ItemId};
pub use options::{DEFAULT_VIRTUAL_EXTENT, LayoutOptions, SizeOracle};
pub use source::{DataSource, SourceId};
pub use store::PositionedItemStore;
pub use types::{
    ContentBounds, Operation, OperationKind, PositionedItem, Viewport, VisibleRange,
};
pub use viewport::{Insets, compute_insets};
