//! Stack, queue and visited-set renderers.

use std::collections::BTreeSet;

use codesense_trace::{
    QueueOperation, SequencePayload, StackOperation, Visualization, FALLBACK_TEXT,
};
use serde_json::Value;

use crate::registry::Renderer;
use crate::view::{display_value, Banner, Item, ItemTag, Marker, SequenceKind, SequenceView, View};

/// Renders `stack` payloads, top of stack first.
#[derive(Debug, Clone, Copy, Default)]
pub struct StackRenderer;

impl Renderer for StackRenderer {
    fn render(&self, payload: &Visualization) -> View {
        match payload {
            Visualization::Stack(stack) => View::Sequence(render_stack(stack)),
            Visualization::Unknown { tag, .. } => payload
                .decode_as::<SequencePayload<StackOperation>>()
                .map(|stack| View::Sequence(render_stack(&stack)))
                .unwrap_or_else(|| View::mismatch("stack", tag)),
            other => View::mismatch("stack", other.tag()),
        }
    }
}

/// Renders `queue` payloads front to back, and `visited` payloads as
/// membership badges in the same layout.
#[derive(Debug, Clone, Copy, Default)]
pub struct QueueRenderer;

impl Renderer for QueueRenderer {
    fn render(&self, payload: &Visualization) -> View {
        match payload {
            Visualization::Queue(queue) => View::Sequence(render_queue(queue)),
            Visualization::Visited(visited) => View::Sequence(render_visited(visited)),
            Visualization::Unknown { tag, .. } => payload
                .decode_as::<SequencePayload<QueueOperation>>()
                .map(|queue| View::Sequence(render_queue(&queue)))
                .unwrap_or_else(|| View::mismatch("queue", tag)),
            other => View::mismatch("queue", other.tag()),
        }
    }
}

fn banner(label: &str, removed: Option<&Value>) -> Banner {
    Banner {
        label: label.to_owned(),
        value: removed.map_or_else(|| FALLBACK_TEXT.to_owned(), display_value),
    }
}

fn highlight_set(highlight: &[usize]) -> BTreeSet<usize> {
    highlight.iter().copied().collect()
}

pub fn render_stack(stack: &SequencePayload<StackOperation>) -> SequenceView {
    let len = stack.elements.len();
    let highlight = highlight_set(&stack.highlight);
    let top = len.checked_sub(1);
    let pushed = matches!(stack.operation, Some(StackOperation::Push));

    let items = stack
        .elements
        .iter()
        .enumerate()
        .rev()
        .map(|(index, value)| {
            let mut tags = Vec::new();
            if Some(index) == top {
                tags.push(ItemTag::Top);
            }
            if index == 0 {
                tags.push(ItemTag::Bottom);
            }
            let highlighted = highlight.contains(&index);
            Item {
                index,
                value: display_value(value),
                highlighted,
                marker: (pushed && highlighted && Some(index) == top).then_some(Marker::Insertion),
                tags,
            }
        })
        .collect();

    SequenceView {
        kind: SequenceKind::Stack,
        name: stack.name.clone(),
        items,
        banner: matches!(stack.operation, Some(StackOperation::Pop))
            .then(|| banner("popped", stack.removed_value.as_ref())),
        empty_state: (len == 0).then(|| "stack is empty".to_owned()),
    }
}

pub fn render_queue(queue: &SequencePayload<QueueOperation>) -> SequenceView {
    let len = queue.elements.len();
    let highlight = highlight_set(&queue.highlight);
    let back = len.checked_sub(1);
    let enqueued = matches!(queue.operation, Some(QueueOperation::Enqueue));

    let items = queue
        .elements
        .iter()
        .enumerate()
        .map(|(index, value)| {
            let mut tags = Vec::new();
            if index == 0 {
                tags.push(ItemTag::Front);
            }
            if Some(index) == back {
                tags.push(ItemTag::Back);
            }
            let highlighted = highlight.contains(&index);
            Item {
                index,
                value: display_value(value),
                highlighted,
                marker: (enqueued && highlighted && Some(index) == back)
                    .then_some(Marker::Insertion),
                tags,
            }
        })
        .collect();

    SequenceView {
        kind: SequenceKind::Queue,
        name: queue.name.clone(),
        items,
        banner: matches!(queue.operation, Some(QueueOperation::Dequeue))
            .then(|| banner("dequeued", queue.removed_value.as_ref())),
        empty_state: (len == 0).then(|| "queue is empty".to_owned()),
    }
}

pub fn render_visited(visited: &SequencePayload<QueueOperation>) -> SequenceView {
    let highlight = highlight_set(&visited.highlight);
    let items = visited
        .elements
        .iter()
        .enumerate()
        .map(|(index, value)| Item {
            index,
            value: display_value(value),
            highlighted: highlight.contains(&index),
            tags: Vec::new(),
            marker: None,
        })
        .collect();

    SequenceView {
        kind: SequenceKind::Visited,
        name: visited.name.clone(),
        items,
        banner: None,
        empty_state: visited
            .elements
            .is_empty()
            .then(|| "nothing visited yet".to_owned()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn stack(value: Value) -> SequencePayload<StackOperation> {
        serde_json::from_value(value).unwrap()
    }

    fn queue(value: Value) -> SequencePayload<QueueOperation> {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn pop_shows_top_first_and_banner() {
        let view = render_stack(&stack(json!({
            "elements": ["a", "b", "c"],
            "operation": "pop",
            "removedValue": "c",
        })));

        assert_eq!(view.items[0].value, "c");
        assert!(view.items[0].has_tag(ItemTag::Top));
        assert!(view.items[2].has_tag(ItemTag::Bottom));
        assert_eq!(
            view.banner,
            Some(Banner {
                label: "popped".into(),
                value: "c".into()
            })
        );
    }

    #[test]
    fn push_marks_highlighted_top() {
        let view = render_stack(&stack(json!({
            "data": [1, 2],
            "highlight": [1],
            "operation": "push",
        })));
        assert_eq!(view.items[0].marker, Some(Marker::Insertion));
        assert_eq!(view.items[1].marker, None);
        assert_eq!(view.banner, None);
    }

    #[test]
    fn empty_stack_has_explicit_state() {
        let view = render_stack(&stack(json!({"data": []})));
        assert!(view.items.is_empty());
        assert_eq!(view.empty_state.as_deref(), Some("stack is empty"));
    }

    #[test]
    fn single_element_is_top_and_bottom() {
        let view = render_stack(&stack(json!({"data": [9]})));
        assert!(view.items[0].has_tag(ItemTag::Top));
        assert!(view.items[0].has_tag(ItemTag::Bottom));
    }

    #[test]
    fn queue_front_and_back() {
        let view = render_queue(&queue(json!({
            "data": ["x", "y", "z"],
            "highlight": [2],
            "operation": "enqueue",
        })));
        assert!(view.items[0].has_tag(ItemTag::Front));
        assert!(view.items[2].has_tag(ItemTag::Back));
        assert_eq!(view.items[2].marker, Some(Marker::Insertion));
    }

    #[test]
    fn dequeue_shows_banner() {
        let view = render_queue(&queue(json!({
            "data": ["y"],
            "operation": "dequeue",
            "removed_value": "x",
        })));
        assert_eq!(view.banner.unwrap().value, "x");
    }

    #[test]
    fn visited_has_no_front_or_back() {
        let view = QueueRenderer.render(&Visualization::from_value(json!({
            "type": "visited",
            "data": ["A", "B"],
        })));
        let View::Sequence(view) = view else {
            panic!("expected sequence view");
        };
        assert_eq!(view.kind, SequenceKind::Visited);
        assert!(view.items.iter().all(|item| item.tags.is_empty()));
    }
}
