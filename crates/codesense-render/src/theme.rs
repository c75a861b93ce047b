//! Node-state colours and shapes for graph views.
//!
//! Every state is encoded twice, by colour and by shape/pattern, so the
//! traversal overlay stays readable without colour vision.

use serde::{Serialize, Serializer};

/// RGB colour.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Darken the color by a factor (0.0 = unchanged, 1.0 = black)
    pub fn darken(self, factor: f64) -> Self {
        let f = 1.0 - factor.clamp(0.0, 1.0);
        Self {
            r: (self.r as f64 * f) as u8,
            g: (self.g as f64 * f) as u8,
            b: (self.b as f64 * f) as u8,
        }
    }

    pub fn to_css(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_css())
    }
}

/// Traversal state of a node.
///
/// Ordered by display precedence: `Current > Exploring > Visited > Default`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeState {
    Default,
    Visited,
    Exploring,
    Current,
}

impl NodeState {
    pub fn label(self) -> &'static str {
        match self {
            NodeState::Default => "unvisited",
            NodeState::Visited => "visited",
            NodeState::Exploring => "exploring",
            NodeState::Current => "current",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Shape {
    Circle,
    Square,
    Diamond,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Pattern {
    Plain,
    Solid,
    Striped,
    Dotted,
}

/// Visual encoding of one node state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NodeStyle {
    pub fill: Color,
    pub stroke: Color,
    pub shape: Shape,
    pub pattern: Pattern,
}

impl NodeStyle {
    const fn new(fill: Color, stroke: Color, shape: Shape, pattern: Pattern) -> Self {
        Self {
            fill,
            stroke,
            shape,
            pattern,
        }
    }
}

/// Styles per node state plus edge colours.
#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    pub current: NodeStyle,
    pub exploring: NodeStyle,
    pub visited: NodeStyle,
    pub default: NodeStyle,
    pub edge: Color,
    pub active_edge: Color,
    pub label: Color,
}

impl Default for Theme {
    fn default() -> Self {
        let amber = Color::rgb(245, 158, 11);
        let blue = Color::rgb(59, 130, 246);
        let green = Color::rgb(16, 185, 129);
        let slate = Color::rgb(148, 163, 184);

        Self {
            current: NodeStyle::new(amber, amber.darken(0.35), Shape::Diamond, Pattern::Solid),
            exploring: NodeStyle::new(blue, blue.darken(0.35), Shape::Square, Pattern::Striped),
            visited: NodeStyle::new(green, green.darken(0.35), Shape::Circle, Pattern::Dotted),
            default: NodeStyle::new(slate, slate.darken(0.35), Shape::Circle, Pattern::Plain),
            edge: Color::rgb(100, 116, 139),
            active_edge: amber,
            label: Color::rgb(15, 23, 42),
        }
    }
}

impl Theme {
    pub fn style(&self, state: NodeState) -> NodeStyle {
        match state {
            NodeState::Current => self.current,
            NodeState::Exploring => self.exploring,
            NodeState::Visited => self.visited,
            NodeState::Default => self.default,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn precedence_order() {
        assert!(NodeState::Current > NodeState::Exploring);
        assert!(NodeState::Exploring > NodeState::Visited);
        assert!(NodeState::Visited > NodeState::Default);
    }

    #[test]
    fn states_differ_in_shape_or_pattern() {
        let theme = Theme::default();
        let styles = [
            theme.current,
            theme.exploring,
            theme.visited,
            theme.default,
        ];
        for (i, a) in styles.iter().enumerate() {
            for b in &styles[i + 1..] {
                assert!(a.shape != b.shape || a.pattern != b.pattern);
                assert_ne!(a.fill, b.fill);
            }
        }
    }

    #[test]
    fn css_hex() {
        assert_eq!(Color::rgb(255, 0, 16).to_css(), "#ff0010");
        assert_eq!(Color::rgb(200, 100, 50).darken(1.0).to_css(), "#000000");
    }
}
