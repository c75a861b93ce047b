//! Graph payloads: node ids, weighted adjacency and layout positions.

use std::collections::{BTreeMap, HashSet};
use std::f64::consts::PI;
use std::fmt;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::pairs;

/// Radius of the fallback circular layout.
const FALLBACK_RADIUS: f64 = 180.0;

/// Centre of the fallback circular layout.
const FALLBACK_CENTER: (f64, f64) = (400.0, 250.0);

/// Identifier of a graph node.
///
/// Generators emit node ids as strings or numbers (adjacency keys of a traced
/// dictionary); both normalize to their string form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl Serialize for NodeId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for NodeId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct NodeIdVisitor;

        impl Visitor<'_> for NodeIdVisitor {
            type Value = NodeId;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a node id string or number")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<NodeId, E> {
                Ok(NodeId(v.to_owned()))
            }

            fn visit_string<E: de::Error>(self, v: String) -> Result<NodeId, E> {
                Ok(NodeId(v))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<NodeId, E> {
                Ok(NodeId(v.to_string()))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<NodeId, E> {
                Ok(NodeId(v.to_string()))
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<NodeId, E> {
                if v.fract() == 0.0 && v.abs() < 1e15 {
                    Ok(NodeId(format!("{}", v as i64)))
                } else {
                    Ok(NodeId(v.to_string()))
                }
            }

            fn visit_bool<E: de::Error>(self, v: bool) -> Result<NodeId, E> {
                Ok(NodeId(v.to_string()))
            }
        }

        deserializer.deserialize_any(NodeIdVisitor)
    }
}

/// Target of an edge, optionally weighted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Neighbor {
    Plain(NodeId),
    Weighted(NodeId, f64),
}

impl Neighbor {
    pub fn node(&self) -> &NodeId {
        match self {
            Neighbor::Plain(id) | Neighbor::Weighted(id, _) => id,
        }
    }

    pub fn weight(&self) -> Option<f64> {
        match self {
            Neighbor::Plain(_) => None,
            Neighbor::Weighted(_, w) => Some(*w),
        }
    }
}

/// Canvas position of a node.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawPosition")]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawPosition {
    Point { x: f64, y: f64 },
    Pair(f64, f64),
}

impl From<RawPosition> for Position {
    fn from(raw: RawPosition) -> Self {
        match raw {
            RawPosition::Point { x, y } | RawPosition::Pair(x, y) => Position { x, y },
        }
    }
}

/// Position of node `i` of `n` on the fallback circle, first node at the top.
pub fn fallback_position(i: usize, n: usize) -> Position {
    let n = n.max(1) as f64;
    let angle = 2.0 * PI * i as f64 / n - PI / 2.0;
    Position {
        x: (FALLBACK_CENTER.0 + FALLBACK_RADIUS * angle.cos()).trunc(),
        y: (FALLBACK_CENTER.1 + FALLBACK_RADIUS * angle.sin()).trunc(),
    }
}

/// A graph with traversal state overlay.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphPayload {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub nodes: Vec<NodeId>,
    /// Adjacency in the order received.
    #[serde(default, with = "pairs")]
    pub edges: Vec<(NodeId, Vec<Neighbor>)>,
    #[serde(default)]
    pub positions: BTreeMap<NodeId, Position>,
    #[serde(default, alias = "currentNode")]
    pub current_node: Option<NodeId>,
    #[serde(default)]
    pub visited: Vec<NodeId>,
    #[serde(default)]
    pub exploring: Vec<NodeId>,
}

impl GraphPayload {
    /// Every node mentioned by the payload, in order of first appearance:
    /// declared nodes, then adjacency keys, then edge targets.
    pub fn all_nodes(&self) -> Vec<&NodeId> {
        let mut seen = HashSet::new();
        let declared = self.nodes.iter();
        let keys = self.edges.iter().map(|(id, _)| id);
        let targets = self
            .edges
            .iter()
            .flat_map(|(_, neighbors)| neighbors.iter().map(Neighbor::node));

        declared
            .chain(keys)
            .chain(targets)
            .filter(|id| seen.insert(*id))
            .collect()
    }

    /// Outgoing neighbors of `id`.
    pub fn neighbors(&self, id: &NodeId) -> &[Neighbor] {
        self.edges
            .iter()
            .find(|(from, _)| from == id)
            .map(|(_, neighbors)| neighbors.as_slice())
            .unwrap_or(&[])
    }

    /// Whether the directed edge `from -> to` exists.
    pub fn has_edge(&self, from: &NodeId, to: &NodeId) -> bool {
        self.neighbors(from).iter().any(|n| n.node() == to)
    }

    /// Positions of every node; nodes without a supplied position get a slot
    /// on the fallback circle.
    pub fn layout(&self) -> Vec<(NodeId, Position)> {
        let nodes = self.all_nodes();
        let n = nodes.len();
        nodes
            .into_iter()
            .enumerate()
            .map(|(i, id)| {
                let pos = self
                    .positions
                    .get(id)
                    .copied()
                    .unwrap_or_else(|| fallback_position(i, n));
                (id.clone(), pos)
            })
            .collect()
    }
}
