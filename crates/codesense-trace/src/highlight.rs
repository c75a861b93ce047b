//! Current source line derived from the playback cursor.

use crate::store::TraceStore;

/// Line of the step at `index`, or `None` when the store is empty or the
/// step has no line. Recompute on every cursor change.
pub fn highlighted_line(store: &TraceStore, index: usize) -> Option<u32> {
    store.get(index).ok()?.line
}
