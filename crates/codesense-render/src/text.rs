//! Plain-text rendering of views, used for logs, the `text` field of step
//! views and accessibility descriptions.

use std::fmt;

use crate::view::{
    ArrayView, CompositeView, EntriesView, GraphView, Item, MessageView, SequenceKind,
    SequenceView, Severity, Slot, VariableView, View,
};

fn or<'a>(name: &'a str, fallback: &'a str) -> &'a str {
    if name.is_empty() {
        fallback
    } else {
        name
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            View::Array(view) => view.fmt(f),
            View::Sequence(view) => view.fmt(f),
            View::Graph(view) => view.fmt(f),
            View::Composite(view) => view.fmt(f),
            View::Entries(view) => view.fmt(f),
            View::Variable(view) => view.fmt(f),
            View::Message(view) => view.fmt(f),
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.index, self.value.as_deref().unwrap_or("-"))?;
        if self.highlighted {
            f.write_str(" *")?;
        }
        if let Some(marker) = self.marker {
            write!(f, " {}", marker.symbol())?;
        }
        Ok(())
    }
}

impl fmt::Display for ArrayView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}/{}]", or(&self.name, "array"), self.len, self.capacity)?;
        for slot in &self.slots {
            write!(f, "\n  {slot}")?;
        }
        if let Some(notice) = &self.notice {
            write!(f, "\n{notice}")?;
        }
        Ok(())
    }
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)?;
        if self.highlighted {
            f.write_str(" *")?;
        }
        if let Some(marker) = self.marker {
            write!(f, " {}", marker.symbol())?;
        }
        if !self.tags.is_empty() {
            let labels: Vec<&str> = self.tags.iter().map(|t| t.label()).collect();
            write!(f, " <{}>", labels.join(", "))?;
        }
        Ok(())
    }
}

impl fmt::Display for SequenceView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.kind {
            SequenceKind::Stack => "stack",
            SequenceKind::Queue => "queue",
            SequenceKind::Visited => "visited",
        };
        f.write_str(or(&self.name, kind))?;
        if !self.name.is_empty() {
            write!(f, " ({kind})")?;
        }
        if let Some(empty) = &self.empty_state {
            write!(f, "\n  {empty}")?;
        }
        for item in &self.items {
            write!(f, "\n  {item}")?;
        }
        if let Some(banner) = &self.banner {
            write!(f, "\n{}: {}", banner.label, banner.value)?;
        }
        Ok(())
    }
}

impl fmt::Display for GraphView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(or(&self.name, "graph"))?;
        for line in &self.adjacency {
            write!(f, "\n  {line}")?;
        }
        Ok(())
    }
}

impl fmt::Display for CompositeView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.graph.fmt(f)?;
        if let Some(companion) = &self.companion {
            write!(f, "\n{companion}")?;
        }
        write!(f, "\n{}", self.status)
    }
}

impl fmt::Display for EntriesView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(or(&self.name, "dict"))?;
        if self.entries.is_empty() {
            return f.write_str("\n  (empty)");
        }
        for entry in &self.entries {
            write!(f, "\n  {entry}")?;
        }
        Ok(())
    }
}

impl fmt::Display for VariableView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {} ({})", self.name, self.value, self.type_label)
    }
}

impl fmt::Display for MessageView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.severity {
            Severity::Info => f.write_str(&self.text),
            Severity::Warning => write!(f, "warning: {}", self.text),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::registry::Registry;
    use codesense_trace::Visualization;
    use serde_json::json;

    fn text(payload: serde_json::Value) -> String {
        Registry::with_defaults()
            .render(&Visualization::from_value(payload))
            .to_string()
    }

    #[test]
    fn array_text() {
        let out = text(json!({
            "type": "array",
            "name": "v",
            "data": [1, 2],
            "capacity": 3,
            "highlight": [1],
            "operation": "push_back",
        }));
        assert_eq!(out, "v [2/3]\n  [0] 1\n  [1] 2 * (+)\n  [2] -");
    }

    #[test]
    fn stack_text() {
        let out = text(json!({
            "type": "stack",
            "data": ["a", "b"],
            "operation": "pop",
            "removed_value": "c",
        }));
        assert_eq!(out, "stack\n  b <top>\n  a <bottom>\npopped: c");
    }

    #[test]
    fn empty_queue_text() {
        let out = text(json!({"type": "queue", "name": "q", "data": []}));
        assert_eq!(out, "q (queue)\n  queue is empty");
    }

    #[test]
    fn graph_text_is_adjacency() {
        let out = text(json!({
            "type": "graph",
            "nodes": ["A", "B"],
            "edges": {"A": ["B"]},
            "current_node": "A",
        }));
        assert_eq!(out, "graph\n  A [current] -> B\n  B -> (none)");
    }

    #[test]
    fn warning_text() {
        assert_eq!(
            text(json!({"type": "heap"})),
            "warning: unrecognized visualization type: `heap`"
        );
    }
}
