//! Ordered-collection operations
//!
//! Maintains ordering of strophes, of verses within a strophe, and of the
//! music-structure tag sequence under drag-style reorders and structural
//! edits. All operations are pure/local: out-of-range indices are treated as
//! a no-op rather than an error, so a stale drag event can never poison the
//! tree. Element identity is preserved across every operation; only
//! positions change.

use uuid::Uuid;

/// Id accessor for elements of an ordered collection
pub trait Keyed {
    fn key(&self) -> Uuid;
}

/// Move the element at `from` to position `to`, shifting the elements in
/// between by one.
///
/// No-op when `from == to` or either index is out of bounds. Returns whether
/// anything moved. The id multiset is always preserved.
pub fn reorder<T>(items: &mut Vec<T>, from: usize, to: usize) -> bool {
    if from == to || from >= items.len() || to >= items.len() {
        return false;
    }
    let element = items.remove(from);
    items.insert(to, element);
    true
}

/// Move the element with `id` from `source` into `dest` at `dest_index`.
///
/// Used for relocating a verse between two strophes. The destination index
/// is clamped to the destination length. No-op when `id` is not in `source`.
pub fn move_across<T: Keyed>(
    source: &mut Vec<T>,
    dest: &mut Vec<T>,
    id: Uuid,
    dest_index: usize,
) -> bool {
    let Some(pos) = source.iter().position(|e| e.key() == id) else {
        return false;
    };
    let element = source.remove(pos);
    dest.insert(dest_index.min(dest.len()), element);
    true
}

/// Insert `element` immediately after the element with id `reference`.
///
/// Appends when `reference` is `None` or does not resolve.
pub fn insert_after<T: Keyed>(items: &mut Vec<T>, reference: Option<Uuid>, element: T) {
    let index = reference
        .and_then(|id| items.iter().position(|e| e.key() == id))
        .map(|p| p + 1)
        .unwrap_or(items.len());
    items.insert(index, element);
}

/// Remove the element with `id`, returning it.
///
/// Sibling `related_verses` references held elsewhere in the tree are NOT
/// rewritten; dangling ids are skipped at resolution time instead.
pub fn remove<T: Keyed>(items: &mut Vec<T>, id: Uuid) -> Option<T> {
    let pos = items.iter().position(|e| e.key() == id)?;
    Some(items.remove(pos))
}
