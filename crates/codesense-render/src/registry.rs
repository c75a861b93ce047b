//! Tag to renderer dispatch.
//!
//! The registry is owned by whoever composes the application; nothing here is
//! global, so tests build their own and new structure kinds are added with a
//! single [`Registry::register`] call.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use codesense_trace::{Step, Visualization};
use serde::Serialize;
use tracing::{debug, warn};

use crate::renderers::{
    render_inline, ArrayRenderer, GraphRenderer, GraphWithDsRenderer, InlineKind, QueueRenderer,
    StackRenderer,
};
use crate::theme::Theme;
use crate::view::View;

/// Turns a visualization payload into a view.
///
/// Rendering never fails: a payload the renderer does not understand becomes
/// a notice view.
pub trait Renderer: Send + Sync {
    fn render(&self, payload: &Visualization) -> View;
}

impl<F> Renderer for F
where
    F: Fn(&Visualization) -> View + Send + Sync,
{
    fn render(&self, payload: &Visualization) -> View {
        self(payload)
    }
}

/// What a tag resolves to.
#[derive(Clone)]
pub enum RendererEntry {
    /// A dedicated renderer component.
    Component(Arc<dyn Renderer>),
    /// A shape handled by the shared inline dispatcher.
    Inline(InlineKind),
}

impl RendererEntry {
    pub fn component<R: Renderer + 'static>(renderer: R) -> Self {
        RendererEntry::Component(Arc::new(renderer))
    }

    pub fn render(&self, payload: &Visualization) -> View {
        match self {
            RendererEntry::Component(renderer) => renderer.render(payload),
            RendererEntry::Inline(kind) => render_inline(*kind, payload),
        }
    }
}

impl From<Arc<dyn Renderer>> for RendererEntry {
    fn from(renderer: Arc<dyn Renderer>) -> Self {
        RendererEntry::Component(renderer)
    }
}

impl From<InlineKind> for RendererEntry {
    fn from(kind: InlineKind) -> Self {
        RendererEntry::Inline(kind)
    }
}

impl fmt::Debug for RendererEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RendererEntry::Component(_) => f.write_str("Component(..)"),
            RendererEntry::Inline(kind) => f.debug_tuple("Inline").field(kind).finish(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Registry {
    entries: HashMap<String, RendererEntry>,
}

impl Registry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every built-in structure kind.
    pub fn with_defaults() -> Self {
        Self::with_theme(Theme::default())
    }

    pub fn with_theme(theme: Theme) -> Self {
        let queue: Arc<dyn Renderer> = Arc::new(QueueRenderer);

        let mut registry = Self::new();
        registry.register("array", RendererEntry::component(ArrayRenderer));
        registry.register("stack", RendererEntry::component(StackRenderer));
        registry.register("queue", queue.clone());
        registry.register("visited", queue);
        registry.register("graph", RendererEntry::component(GraphRenderer::new(theme.clone())));
        registry.register("graph_with_ds", RendererEntry::component(GraphWithDsRenderer::new(theme)));
        registry.register("dict", InlineKind::Dict);
        registry.register("variable", InlineKind::Variable);
        registry.register("none", InlineKind::None);
        registry.register("error", InlineKind::Error);
        registry
    }

    /// Insert or overwrite the entry for `tag`, returning the previous one.
    pub fn register(
        &mut self,
        tag: impl Into<String>,
        entry: impl Into<RendererEntry>,
    ) -> Option<RendererEntry> {
        let tag = tag.into();
        debug!(tag = %tag, "registering renderer");
        self.entries.insert(tag, entry.into())
    }

    pub fn unregister(&mut self, tag: &str) -> Option<RendererEntry> {
        self.entries.remove(tag)
    }

    pub fn resolve(&self, tag: &str) -> Option<RendererEntry> {
        self.entries.get(tag).cloned()
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.entries.contains_key(tag)
    }

    /// Registered tags, sorted.
    pub fn tags(&self) -> Vec<&str> {
        let mut tags: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        tags.sort_unstable();
        tags
    }

    /// Render a payload through its registered entry.
    pub fn render(&self, payload: &Visualization) -> View {
        let tag = payload.tag();
        match self.entries.get(tag) {
            Some(entry) => entry.render(payload),
            None => {
                warn!(tag, "no renderer registered");
                View::unrecognized(tag)
            }
        }
    }
}

/// Everything the frontend needs to draw one step.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepView {
    pub index: usize,
    pub line: Option<u32>,
    pub code: String,
    pub description: String,
    pub tag: String,
    pub view: View,
    /// Plain-text rendering of `view`.
    pub text: String,
}

pub fn render_step(registry: &Registry, step: &Step) -> StepView {
    let view = registry.render(&step.visualization);
    StepView {
        index: step.index,
        line: step.line,
        code: step.code_or_fallback().to_owned(),
        description: step.description_or_fallback().to_owned(),
        tag: step.visualization.tag().to_owned(),
        text: view.to_string(),
        view,
    }
}
