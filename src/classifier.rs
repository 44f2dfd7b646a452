use alloc::vec;
use alloc::vec::Vec;

use crate::key::{IdMap, IdSet};
use crate::{Item, Operation};

/// Infers the structural edits that turn `previous` into `next`.
///
/// The result is deterministic and replayable: applying the operations in order to a layout
/// of `previous` yields a layout of `next`. The emission order is always
/// `Remove` → `Update` → `Prepend` → `Insert`s (front to back) → `Append`, so removals and
/// payload changes are resolved before anything that shifts positions.
///
/// Items are compared by identity and payload. The changed region is the part left after
/// stripping the longest common prefix and suffix; inside it, identities present only in
/// `previous` are removed, identities present only in `next` are added, and shared
/// identities with a different payload are updated. Added identities are grouped into
/// contiguous runs: a run at the front of the list is a prepend, one at the back an append,
/// and every other run an insert (indexed after the earlier runs are in place). Prepend wins
/// when a run could be either.
///
/// Edits that cannot be expressed that way (shared items reordered, or no overlap at all)
/// collapse into a single `Replace`.
///
/// Runs in `O(n + k)` where `k` is the size of the changed region.
///
/// # Panics
///
/// Panics if `next` contains the same identity twice.
pub fn classify<T: Item>(previous: &[T], next: &[T]) -> Vec<Operation<T::Id>> {
    assert_unique(next);

    if previous.is_empty() {
        if next.is_empty() {
            return Vec::new();
        }
        return vec![replace(next)];
    }

    let max_common = previous.len().min(next.len());
    let prefix = previous
        .iter()
        .zip(next)
        .take_while(|(a, b)| same_item(*a, *b))
        .count();
    let suffix = previous[prefix..]
        .iter()
        .rev()
        .zip(next[prefix..].iter().rev())
        .take(max_common - prefix)
        .take_while(|(a, b)| same_item(*a, *b))
        .count();

    let old_mid = &previous[prefix..previous.len() - suffix];
    let new_mid = &next[prefix..next.len() - suffix];
    if old_mid.is_empty() && new_mid.is_empty() {
        return Vec::new();
    }

    let old_index: IdMap<T::Id, usize> = old_mid
        .iter()
        .enumerate()
        .map(|(i, item)| (item.id(), i))
        .collect();
    let new_ids: IdSet<T::Id> = new_mid.iter().map(Item::id).collect();
    let shares_identity = new_ids.iter().any(|id| old_index.contains_key(id));
    if prefix == 0 && suffix == 0 && !shares_identity {
        vtrace!(
            previous = previous.len(),
            next = next.len(),
            "classify: no overlap, replacing"
        );
        return vec![replace(next)];
    }

    let removed: Vec<T::Id> = old_mid
        .iter()
        .map(Item::id)
        .filter(|id| !new_ids.contains(id))
        .collect();

    // Shared identities must keep their relative order for the splices to work.
    let mut last_old = None;
    let mut changed = Vec::new();
    let mut added_runs: Vec<(usize, usize)> = Vec::new();
    for (offset, item) in new_mid.iter().enumerate() {
        let id = item.id();
        match old_index.get(&id) {
            Some(&old_pos) => {
                if last_old.is_some_and(|last| old_pos < last) {
                    vtrace!(offset, "classify: reordered, replacing");
                    return vec![replace(next)];
                }
                last_old = Some(old_pos);
                if old_mid[old_pos] != *item {
                    changed.push(id);
                }
            }
            None => match added_runs.last_mut() {
                Some((_, end)) if *end == offset => *end += 1,
                _ => added_runs.push((offset, offset + 1)),
            },
        }
    }

    let mut ops = Vec::with_capacity(2 + added_runs.len());
    if !removed.is_empty() {
        ops.push(Operation::Remove(removed));
    }
    if !changed.is_empty() {
        ops.push(Operation::Update(changed));
    }

    // Runs are applied front to back, so every earlier run is already in place when an
    // `Insert` index is taken. A trailing append goes last.
    let mut append = None;
    for (start, end) in added_runs {
        let ids: Vec<T::Id> = new_mid[start..end].iter().map(Item::id).collect();
        if prefix == 0 && start == 0 {
            ops.push(Operation::Prepend(ids));
        } else if suffix == 0 && end == new_mid.len() {
            append = Some(Operation::Append(ids));
        } else {
            ops.push(Operation::Insert {
                at: prefix + start,
                ids,
            });
        }
    }
    ops.extend(append);
    vtrace!(prefix, suffix, operations = ops.len(), "classify");
    ops
}

fn same_item<T: Item>(a: &T, b: &T) -> bool {
    a.id() == b.id() && a == b
}

fn replace<T: Item>(items: &[T]) -> Operation<T::Id> {
    Operation::Replace(items.iter().map(Item::id).collect())
}

fn assert_unique<T: Item>(items: &[T]) {
    let mut seen = IdSet::default();
    for item in items {
        let id = item.id();
        assert!(!seen.contains(&id), "duplicate identity {id:?} in item sequence");
        seen.insert(id);
    }
}
