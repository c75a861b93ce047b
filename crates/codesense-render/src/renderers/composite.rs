//! Graph traversal rendered next to its frontier structure.

use codesense_trace::{Companion, GraphPayload, GraphWithDsPayload, Visualization};

use crate::registry::Renderer;
use crate::renderers::graph::render_graph;
use crate::renderers::sequence::{render_queue, render_stack, render_visited};
use crate::theme::Theme;
use crate::view::{CompositeView, View};

/// Renders `graph_with_ds` payloads.
#[derive(Debug, Clone, Default)]
pub struct GraphWithDsRenderer {
    theme: Theme,
}

impl GraphWithDsRenderer {
    pub fn new(theme: Theme) -> Self {
        Self { theme }
    }
}

impl Renderer for GraphWithDsRenderer {
    fn render(&self, payload: &Visualization) -> View {
        match payload {
            Visualization::GraphWithDs(composite) => {
                View::Composite(render_composite(composite, &self.theme))
            }
            Visualization::Unknown { tag, .. } => payload
                .decode_as::<GraphWithDsPayload>()
                .map(|composite| View::Composite(render_composite(&composite, &self.theme)))
                .unwrap_or_else(|| View::mismatch("graph_with_ds", tag)),
            other => View::mismatch("graph_with_ds", other.tag()),
        }
    }
}

pub fn render_composite(payload: &GraphWithDsPayload, theme: &Theme) -> CompositeView {
    let companion = payload.data_structure.as_ref().map(|ds| match ds {
        Companion::Stack(stack) => render_stack(stack),
        Companion::Queue(queue) => render_queue(queue),
        Companion::Visited(visited) => render_visited(visited),
    });

    CompositeView {
        graph: render_graph(&payload.graph, theme),
        companion,
        status: traversal_status(&payload.graph),
    }
}

/// One-line description of where the traversal is.
pub fn traversal_status(graph: &GraphPayload) -> String {
    match (&graph.current_node, graph.exploring.first()) {
        (Some(current), Some(next)) => {
            format!("Processing node {current}, checking neighbor {next}")
        }
        (Some(current), None) => format!("Processing node {current}"),
        (None, Some(next)) => format!("Checking neighbor {next}"),
        (None, None) if graph.visited.is_empty() => "Traversal not started".to_owned(),
        (None, None) => format!("Visited {} of {} nodes", graph.visited.len(), graph.all_nodes().len()),
    }
}
