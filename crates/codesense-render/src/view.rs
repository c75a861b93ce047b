//! Static view model produced by the renderers.
//!
//! Views are plain data: the frontend draws them, [`std::fmt::Display`]
//! turns them into text and [`crate::svg`] turns graph views into SVG.

use codesense_trace::{NodeId, Position};
use serde::Serialize;
use serde_json::Value;

use crate::theme::{NodeState, NodeStyle};

/// Rendered form of one visualization payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum View {
    Array(ArrayView),
    Sequence(SequenceView),
    Graph(GraphView),
    Composite(CompositeView),
    Entries(EntriesView),
    Variable(VariableView),
    Message(MessageView),
}

impl View {
    pub fn info(text: impl Into<String>) -> Self {
        View::Message(MessageView {
            severity: Severity::Info,
            text: text.into(),
        })
    }

    pub fn warning(text: impl Into<String>) -> Self {
        View::Message(MessageView {
            severity: Severity::Warning,
            text: text.into(),
        })
    }

    /// Shown when no renderer is registered for `tag`.
    pub fn unrecognized(tag: &str) -> Self {
        View::warning(format!("unrecognized visualization type: `{tag}`"))
    }

    /// Shown when a renderer is handed a payload it cannot interpret.
    pub fn mismatch(renderer: &str, tag: &str) -> Self {
        View::warning(format!("the {renderer} renderer cannot display `{tag}` payloads"))
    }

    pub fn as_graph(&self) -> Option<&GraphView> {
        match self {
            View::Graph(graph) => Some(graph),
            View::Composite(composite) => Some(&composite.graph),
            _ => None,
        }
    }
}

/// Emphasis attached to a slot or item by the step's operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Marker {
    Insertion,
    Removal,
    Compare,
}

impl Marker {
    pub fn symbol(self) -> &'static str {
        match self {
            Marker::Insertion => "(+)",
            Marker::Removal => "(-)",
            Marker::Compare => "(?)",
        }
    }
}

/// One array cell; `value` is `None` for unused capacity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Slot {
    pub index: usize,
    pub value: Option<String>,
    pub highlighted: bool,
    pub marker: Option<Marker>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArrayView {
    pub name: String,
    pub len: usize,
    pub capacity: usize,
    pub slots: Vec<Slot>,
    /// One-shot notice such as a capacity change.
    pub notice: Option<String>,
}

impl ArrayView {
    pub fn filled(&self) -> impl Iterator<Item = &Slot> {
        self.slots.iter().filter(|s| s.value.is_some())
    }

    pub fn empty(&self) -> impl Iterator<Item = &Slot> {
        self.slots.iter().filter(|s| s.value.is_none())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SequenceKind {
    Stack,
    Queue,
    Visited,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemTag {
    Top,
    Bottom,
    Front,
    Back,
}

impl ItemTag {
    pub fn label(self) -> &'static str {
        match self {
            ItemTag::Top => "top",
            ItemTag::Bottom => "bottom",
            ItemTag::Front => "front",
            ItemTag::Back => "back",
        }
    }
}

/// One displayed element of a stack, queue or visited set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Item {
    /// Index into the payload's `elements`.
    pub index: usize,
    pub value: String,
    pub highlighted: bool,
    pub tags: Vec<ItemTag>,
    pub marker: Option<Marker>,
}

impl Item {
    pub fn has_tag(&self, tag: ItemTag) -> bool {
        self.tags.contains(&tag)
    }
}

/// Removed-value banner shown after a pop or dequeue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Banner {
    pub label: String,
    pub value: String,
}

/// Stack, queue or visited set, items in display order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SequenceView {
    pub kind: SequenceKind,
    pub name: String,
    pub items: Vec<Item>,
    pub banner: Option<Banner>,
    /// Set instead of items when there is nothing to show.
    pub empty_state: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeView {
    pub id: NodeId,
    pub position: Position,
    pub state: NodeState,
    pub style: NodeStyle,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EdgePath {
    Straight {
        start: Position,
        end: Position,
    },
    /// Quadratic curve, used when the reverse edge also exists.
    Curved {
        start: Position,
        control: Position,
        end: Position,
    },
    /// Edge from a node to itself.
    Loop {
        center: Position,
        radius: f64,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EdgeView {
    pub from: NodeId,
    pub to: NodeId,
    pub weight: Option<f64>,
    pub path: EdgePath,
    /// Edge from the current node to a node being explored.
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphView {
    pub name: String,
    pub nodes: Vec<NodeView>,
    pub edges: Vec<EdgeView>,
    /// Plain-text adjacency listing, one line per node.
    pub adjacency: Vec<String>,
}

impl GraphView {
    pub fn node(&self, id: &str) -> Option<&NodeView> {
        self.nodes.iter().find(|n| n.id.as_str() == id)
    }

    pub fn edge(&self, from: &str, to: &str) -> Option<&EdgeView> {
        self.edges
            .iter()
            .find(|e| e.from.as_str() == from && e.to.as_str() == to)
    }
}

/// Graph traversal with its frontier structure.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompositeView {
    pub graph: GraphView,
    pub companion: Option<SequenceView>,
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntriesView {
    pub name: String,
    pub entries: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VariableView {
    pub name: String,
    pub value: String,
    pub type_label: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessageView {
    pub severity: Severity,
    pub text: String,
}

/// Display string for a traced value.
///
/// Strings are shown without JSON quotes.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "null".to_owned(),
        other => other.to_string(),
    }
}
