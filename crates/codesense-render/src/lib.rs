//! CodeSense Render
//!
//! Turns trace steps into drawable views.
//!
//! # Architecture
//!
//! - **Registry**: maps a visualization tag to a renderer component or to
//!   the shared inline dispatcher; new structure kinds are one `register` away
//! - **Renderers**: one per structure (array, stack, queue/visited, graph,
//!   graph with companion structure)
//! - **View**: plain data the frontend draws, also printable as text
//! - **Theme**: node-state colours plus shapes and patterns
//! - **SVG**: standalone export of graph views
//!
//! # Usage
//!
//! ```
//! use codesense_render::{render_step, Registry};
//! use codesense_trace::{Step, Visualization};
//! use serde_json::json;
//!
//! let registry = Registry::with_defaults();
//! let payload = Visualization::from_value(json!({"type": "stack", "data": [1, 2]}));
//! let view = render_step(&registry, &Step::new(0, Some(3), payload));
//!
//! assert_eq!(view.text, "stack\n  2 <top>\n  1 <bottom>");
//! ```

pub mod registry;
pub mod renderers;
pub mod svg;
mod text;
pub mod theme;
pub mod view;

pub use registry::{render_step, Registry, Renderer, RendererEntry, StepView};
pub use renderers::InlineKind;
pub use svg::graph_svg;
pub use theme::{Color, NodeState, NodeStyle, Pattern, Shape, Theme};
pub use view::View;
