//! Graph renderer: positioned nodes, directed edges, traversal overlay.

use std::collections::HashMap;

use codesense_trace::{GraphPayload, Neighbor, NodeId, Position, Visualization};

use crate::registry::Renderer;
use crate::theme::{NodeState, Theme};
use crate::view::{EdgePath, EdgeView, GraphView, NodeView, View};

/// Radius of a drawn node; edges start and end on its rim.
pub const NODE_RADIUS: f64 = 22.0;

/// Distance of the control point from the straight line for curved edges.
const CURVE_OFFSET: f64 = 28.0;

const LOOP_RADIUS: f64 = 14.0;

/// Renders `graph` payloads.
#[derive(Debug, Clone, Default)]
pub struct GraphRenderer {
    theme: Theme,
}

impl GraphRenderer {
    pub fn new(theme: Theme) -> Self {
        Self { theme }
    }
}

impl Renderer for GraphRenderer {
    fn render(&self, payload: &Visualization) -> View {
        match payload {
            Visualization::Graph(graph) => View::Graph(render_graph(graph, &self.theme)),
            Visualization::Unknown { tag, .. } => payload
                .decode_as::<GraphPayload>()
                .map(|graph| View::Graph(render_graph(&graph, &self.theme)))
                .unwrap_or_else(|| View::mismatch("graph", tag)),
            other => View::mismatch("graph", other.tag()),
        }
    }
}

/// State of `id` with precedence `current > exploring > visited > default`.
pub fn node_state(graph: &GraphPayload, id: &NodeId) -> NodeState {
    if graph.current_node.as_ref() == Some(id) {
        NodeState::Current
    } else if graph.exploring.contains(id) {
        NodeState::Exploring
    } else if graph.visited.contains(id) {
        NodeState::Visited
    } else {
        NodeState::Default
    }
}

pub fn render_graph(graph: &GraphPayload, theme: &Theme) -> GraphView {
    let layout = graph.layout();
    let positions: HashMap<&NodeId, Position> = layout.iter().map(|(id, pos)| (id, *pos)).collect();

    let nodes = layout
        .iter()
        .map(|(id, position)| {
            let state = node_state(graph, id);
            NodeView {
                id: id.clone(),
                position: *position,
                state,
                style: theme.style(state),
            }
        })
        .collect();

    let mut edges = Vec::new();
    for (from, neighbors) in &graph.edges {
        for neighbor in neighbors {
            let to = neighbor.node();
            let (Some(&start), Some(&end)) = (positions.get(from), positions.get(to)) else {
                continue;
            };
            let path = if from == to {
                loop_path(start)
            } else {
                edge_path(start, end, graph.has_edge(to, from))
            };
            edges.push(EdgeView {
                from: from.clone(),
                to: to.clone(),
                weight: neighbor.weight(),
                path,
                active: graph.current_node.as_ref() == Some(from) && graph.exploring.contains(to),
            });
        }
    }

    let adjacency = layout
        .iter()
        .map(|(id, _)| adjacency_line(graph, id))
        .collect();

    GraphView {
        name: graph.name.clone(),
        nodes,
        edges,
        adjacency,
    }
}

fn adjacency_line(graph: &GraphPayload, id: &NodeId) -> String {
    let state = match node_state(graph, id) {
        NodeState::Default => String::new(),
        state => format!(" [{}]", state.label()),
    };
    let neighbors: Vec<String> = graph
        .neighbors(id)
        .iter()
        .map(|n| match n {
            Neighbor::Plain(to) => to.to_string(),
            Neighbor::Weighted(to, w) => format!("{to} ({w})"),
        })
        .collect();
    let targets = if neighbors.is_empty() {
        "(none)".to_owned()
    } else {
        neighbors.join(", ")
    };
    format!("{id}{state} -> {targets}")
}

fn toward(from: Position, to: Position, distance: f64) -> Position {
    let (dx, dy) = (to.x - from.x, to.y - from.y);
    let len = dx.hypot(dy);
    if len < f64::EPSILON {
        return from;
    }
    Position::new(from.x + dx / len * distance, from.y + dy / len * distance)
}

fn loop_path(center: Position) -> EdgePath {
    EdgePath::Loop {
        center: Position::new(center.x, center.y - NODE_RADIUS - LOOP_RADIUS / 2.0),
        radius: LOOP_RADIUS,
    }
}

/// Straight edge between node rims, or a curve bent to the left of the
/// direction of travel when the reverse edge exists, so the pair never overlaps.
fn edge_path(start: Position, end: Position, bidirectional: bool) -> EdgePath {
    let (dx, dy) = (end.x - start.x, end.y - start.y);
    let len = dx.hypot(dy);
    if len < f64::EPSILON {
        return loop_path(start);
    }

    if !bidirectional {
        return EdgePath::Straight {
            start: toward(start, end, NODE_RADIUS),
            end: toward(end, start, NODE_RADIUS),
        };
    }

    let (nx, ny) = (dy / len, -dx / len);
    let control = Position::new(
        (start.x + end.x) / 2.0 + nx * CURVE_OFFSET,
        (start.y + end.y) / 2.0 + ny * CURVE_OFFSET,
    );
    EdgePath::Curved {
        start: toward(start, control, NODE_RADIUS),
        control,
        end: toward(end, control, NODE_RADIUS),
    }
}
