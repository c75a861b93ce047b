//! Built-in renderers, one per structure tag.

mod array;
mod composite;
mod graph;
mod inline;
mod sequence;

pub use array::{render_array, ArrayRenderer, MAX_EMPTY_SLOTS};
pub use composite::{render_composite, traversal_status, GraphWithDsRenderer};
pub use graph::{node_state, render_graph, GraphRenderer, NODE_RADIUS};
pub use inline::{render_inline, InlineKind};
pub use sequence::{render_queue, render_stack, render_visited, QueueRenderer, StackRenderer};
