//! Fixed-capacity array renderer.

use std::collections::BTreeSet;

use codesense_trace::{ArrayOperation, ArrayPayload, Visualization};

use crate::registry::Renderer;
use crate::view::{display_value, ArrayView, Marker, Slot, View};

/// Renders `array` payloads.
#[derive(Debug, Clone, Copy, Default)]
pub struct ArrayRenderer;

impl Renderer for ArrayRenderer {
    fn render(&self, payload: &Visualization) -> View {
        match payload {
            Visualization::Array(array) => View::Array(render_array(array)),
            Visualization::Unknown { tag, .. } => payload
                .decode_as::<ArrayPayload>()
                .map(|array| View::Array(render_array(&array)))
                .unwrap_or_else(|| View::mismatch("array", tag)),
            other => View::mismatch("array", other.tag()),
        }
    }
}

fn marker_for(operation: Option<ArrayOperation>) -> Option<Marker> {
    match operation? {
        ArrayOperation::PushBack | ArrayOperation::Insert => Some(Marker::Insertion),
        ArrayOperation::PopBack | ArrayOperation::Remove => Some(Marker::Removal),
        ArrayOperation::Comparing | ArrayOperation::Swap => Some(Marker::Compare),
        ArrayOperation::Resize | ArrayOperation::Iteration | ArrayOperation::Other => None,
    }
}

/// Most empty slots drawn after the elements; the view still reports the
/// full capacity.
pub const MAX_EMPTY_SLOTS: usize = 256;

/// Filled slots for the elements, then empty slots up to capacity.
pub fn render_array(array: &ArrayPayload) -> ArrayView {
    let len = array.elements.len();
    let capacity = array.capacity().max(len);
    let highlight: BTreeSet<usize> = array.highlight.iter().copied().collect();
    let marker = marker_for(array.operation);

    let filled = array.elements.iter().enumerate().map(|(index, value)| {
        let highlighted = highlight.contains(&index);
        Slot {
            index,
            value: Some(display_value(value)),
            highlighted,
            marker: marker.filter(|_| highlighted),
        }
    });
    let shown = capacity.min(len.saturating_add(MAX_EMPTY_SLOTS));
    let empty = (len..shown).map(|index| Slot {
        index,
        value: None,
        highlighted: false,
        marker: None,
    });

    let mut notices = Vec::new();
    if matches!(array.operation, Some(ArrayOperation::Resize)) {
        notices.push(format!("capacity grew to {capacity}"));
    }
    if shown < capacity {
        notices.push(format!("capacity {capacity}, showing first {shown} slots"));
    }
    let notice = (!notices.is_empty()).then(|| notices.join("; "));

    ArrayView {
        name: array.name.clone(),
        len,
        capacity,
        slots: filled.chain(empty).collect(),
        notice,
    }
}
