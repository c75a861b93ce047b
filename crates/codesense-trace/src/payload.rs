//! Visualization payloads attached to each step.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use tracing::warn;

use crate::graph::GraphPayload;
use crate::pairs;

/// What to draw for a step, selected by the `type` field on the wire.
///
/// Unknown tags are kept as [`Visualization::Unknown`] together with the raw
/// JSON so a renderer registered later can still interpret them. A known tag
/// with a malformed body degrades to [`Visualization::Error`].
#[derive(Debug, Clone, PartialEq)]
pub enum Visualization {
    Array(ArrayPayload),
    Stack(SequencePayload<StackOperation>),
    Queue(SequencePayload<QueueOperation>),
    Visited(SequencePayload<QueueOperation>),
    Graph(GraphPayload),
    GraphWithDs(GraphWithDsPayload),
    Dict(DictPayload),
    Variable(VariablePayload),
    None(MessagePayload),
    Error(MessagePayload),
    Unknown { tag: String, raw: Value },
}

impl Visualization {
    /// The wire tag of this payload.
    pub fn tag(&self) -> &str {
        match self {
            Visualization::Array(_) => "array",
            Visualization::Stack(_) => "stack",
            Visualization::Queue(_) => "queue",
            Visualization::Visited(_) => "visited",
            Visualization::Graph(_) => "graph",
            Visualization::GraphWithDs(_) => "graph_with_ds",
            Visualization::Dict(_) => "dict",
            Visualization::Variable(_) => "variable",
            Visualization::None(_) => "none",
            Visualization::Error(_) => "error",
            Visualization::Unknown { tag, .. } => tag,
        }
    }

    /// A `none` payload with the given message.
    pub fn nothing(message: impl Into<String>) -> Self {
        Visualization::None(MessagePayload::new(message))
    }

    /// Decode a payload from its JSON form.
    pub fn from_value(raw: Value) -> Self {
        let tag = match &raw {
            Value::Null => return Visualization::default(),
            Value::Object(map) => map
                .get("type")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_owned(),
            _ => String::new(),
        };

        match tag.as_str() {
            "array" => decode(&tag, raw, Visualization::Array),
            "stack" => decode(&tag, raw, Visualization::Stack),
            "queue" => decode(&tag, raw, Visualization::Queue),
            "visited" => decode(&tag, raw, Visualization::Visited),
            "graph" => decode(&tag, raw, Visualization::Graph),
            "graph_with_ds" => decode(&tag, raw, Visualization::GraphWithDs),
            "dict" => decode(&tag, raw, Visualization::Dict),
            "variable" => decode(&tag, raw, Visualization::Variable),
            "none" => decode(&tag, raw, Visualization::None),
            "error" => decode(&tag, raw, Visualization::Error),
            _ => Visualization::Unknown { tag, raw },
        }
    }

    /// Interpret this payload as `T`.
    ///
    /// Used to alias a tag onto another shape: an unknown payload is decoded
    /// from its raw JSON, a known payload through its serialized form.
    pub fn decode_as<T: DeserializeOwned>(&self) -> Option<T> {
        let value = match self {
            Visualization::Unknown { raw, .. } => raw.clone(),
            other => serde_json::to_value(other).ok()?,
        };
        serde_json::from_value(value).ok()
    }
}

impl Default for Visualization {
    fn default() -> Self {
        Visualization::nothing("No variables to visualize")
    }
}

fn decode<T: DeserializeOwned>(
    tag: &str,
    raw: Value,
    wrap: fn(T) -> Visualization,
) -> Visualization {
    match serde_json::from_value(raw) {
        Ok(payload) => wrap(payload),
        Err(e) => {
            warn!(tag, error = %e, "malformed visualization payload");
            Visualization::Error(MessagePayload::new(format!(
                "malformed `{tag}` visualization: {e}"
            )))
        }
    }
}

impl Serialize for Visualization {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let body = match self {
            Visualization::Unknown { raw, .. } => return raw.serialize(serializer),
            Visualization::Array(p) => serde_json::to_value(p),
            Visualization::Stack(p) => serde_json::to_value(p),
            Visualization::Queue(p) | Visualization::Visited(p) => serde_json::to_value(p),
            Visualization::Graph(p) => serde_json::to_value(p),
            Visualization::GraphWithDs(p) => serde_json::to_value(p),
            Visualization::Dict(p) => serde_json::to_value(p),
            Visualization::Variable(p) => serde_json::to_value(p),
            Visualization::None(p) | Visualization::Error(p) => serde_json::to_value(p),
        }
        .map_err(serde::ser::Error::custom)?;

        let mut map = Map::new();
        map.insert("type".to_owned(), Value::String(self.tag().to_owned()));
        if let Value::Object(fields) = body {
            map.extend(fields);
        }
        map.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Visualization {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(Visualization::from_value)
    }
}

/// Operation shown on an array step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArrayOperation {
    PushBack,
    PopBack,
    Insert,
    Remove,
    Resize,
    Comparing,
    Swap,
    Iteration,
    #[serde(other)]
    Other,
}

/// Fixed-capacity buffer view.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArrayPayload {
    #[serde(default)]
    pub name: String,
    #[serde(default, alias = "data")]
    pub elements: Vec<Value>,
    /// Allocated capacity; `None` means exactly the element count.
    #[serde(default)]
    pub capacity: Option<usize>,
    #[serde(default)]
    pub highlight: Vec<usize>,
    #[serde(default)]
    pub operation: Option<ArrayOperation>,
}

impl ArrayPayload {
    pub fn capacity(&self) -> usize {
        self.capacity.unwrap_or(self.elements.len())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StackOperation {
    Push,
    Pop,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueueOperation {
    Enqueue,
    Dequeue,
    #[serde(other)]
    Other,
}

/// Stack, queue and visited-set views share this shape.
///
/// For a stack `elements` run bottom to top, for a queue front to back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(deserialize = "Op: Deserialize<'de>"))]
pub struct SequencePayload<Op> {
    #[serde(default)]
    pub name: String,
    #[serde(default, alias = "data")]
    pub elements: Vec<Value>,
    #[serde(default)]
    pub highlight: Vec<usize>,
    #[serde(default)]
    pub operation: Option<Op>,
    #[serde(default, alias = "removedValue")]
    pub removed_value: Option<Value>,
}

impl<Op> Default for SequencePayload<Op> {
    fn default() -> Self {
        Self {
            name: String::new(),
            elements: Vec::new(),
            highlight: Vec::new(),
            operation: None,
            removed_value: None,
        }
    }
}

/// Frontier structure rendered next to a graph traversal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Companion {
    Stack(SequencePayload<StackOperation>),
    Queue(SequencePayload<QueueOperation>),
    Visited(SequencePayload<QueueOperation>),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphWithDsPayload {
    #[serde(default)]
    pub graph: GraphPayload,
    #[serde(default, alias = "dataStructure")]
    pub data_structure: Option<Companion>,
}

/// Associative mapping in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DictPayload {
    #[serde(default)]
    pub name: String,
    #[serde(default, alias = "data", with = "pairs")]
    pub entries: Vec<(String, Value)>,
    /// Display strings prepared by the generator, one per entry.
    #[serde(default)]
    pub formatted: Vec<String>,
}

/// Scalar snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VariablePayload {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub value: Value,
    #[serde(default, alias = "varType")]
    pub var_type: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MessagePayload {
    #[serde(default)]
    pub message: String,
}

impl MessagePayload {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
