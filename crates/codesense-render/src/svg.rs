//! SVG export of graph views.

use std::fmt::Write;

use codesense_trace::Position;

use crate::renderers::NODE_RADIUS;
use crate::theme::{Pattern, Shape, Theme};
use crate::view::{EdgePath, EdgeView, GraphView, NodeView};

const MARGIN: f64 = NODE_RADIUS + 24.0;

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c => out.push(c),
        }
    }
    out
}

/// Bounding box of the node centres, `(min_x, min_y, width, height)`.
fn view_box(view: &GraphView) -> (f64, f64, f64, f64) {
    if view.nodes.is_empty() {
        return (0.0, 0.0, 800.0, 500.0);
    }
    let (mut min_x, mut min_y) = (f64::MAX, f64::MAX);
    let (mut max_x, mut max_y) = (f64::MIN, f64::MIN);
    for node in &view.nodes {
        min_x = min_x.min(node.position.x);
        min_y = min_y.min(node.position.y);
        max_x = max_x.max(node.position.x);
        max_y = max_y.max(node.position.y);
    }
    (
        min_x - MARGIN,
        min_y - MARGIN,
        max_x - min_x + 2.0 * MARGIN,
        max_y - min_y + 2.0 * MARGIN,
    )
}

/// Render a graph view as a standalone SVG document.
///
/// The adjacency listing goes into `<desc>` so screen readers get the same
/// information as the drawing.
pub fn graph_svg(view: &GraphView, theme: &Theme) -> String {
    let (x, y, w, h) = view_box(view);
    let title = if view.name.is_empty() { "graph" } else { &view.name };

    let mut out = String::new();
    let _ = writeln!(
        out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="{x:.1} {y:.1} {w:.1} {h:.1}" role="img">"#
    );
    let _ = writeln!(out, "<title>{}</title>", escape(title));
    let _ = writeln!(out, "<desc>{}</desc>", escape(&view.adjacency.join("\n")));
    write_defs(&mut out, theme);

    for edge in &view.edges {
        write_edge(&mut out, edge, theme);
    }
    for node in &view.nodes {
        write_node(&mut out, node, theme);
    }

    out.push_str("</svg>\n");
    out
}

fn write_defs(out: &mut String, theme: &Theme) {
    let edge = theme.edge.to_css();
    let active = theme.active_edge.to_css();
    let _ = writeln!(
        out,
        concat!(
            "<defs>\n",
            r#"<marker id="arrow" viewBox="0 0 10 10" refX="9" refY="5" markerWidth="6" markerHeight="6" orient="auto-start-reverse"><path d="M0,0 L10,5 L0,10 z" fill="{edge}"/></marker>"#,
            "\n",
            r#"<marker id="arrow-active" viewBox="0 0 10 10" refX="9" refY="5" markerWidth="6" markerHeight="6" orient="auto-start-reverse"><path d="M0,0 L10,5 L0,10 z" fill="{active}"/></marker>"#,
            "\n",
            r#"<pattern id="stripes" width="6" height="6" patternUnits="userSpaceOnUse" patternTransform="rotate(45)"><rect width="3" height="6" fill="black" fill-opacity="0.25"/></pattern>"#,
            "\n",
            r#"<pattern id="dots" width="6" height="6" patternUnits="userSpaceOnUse"><circle cx="3" cy="3" r="1.2" fill="black" fill-opacity="0.3"/></pattern>"#,
            "\n</defs>"
        ),
        edge = edge,
        active = active,
    );
}

fn write_edge(out: &mut String, edge: &EdgeView, theme: &Theme) {
    let (color, width, marker) = if edge.active {
        (theme.active_edge.to_css(), 3.0, "arrow-active")
    } else {
        (theme.edge.to_css(), 1.5, "arrow")
    };
    let stroke = format!(r#"fill="none" stroke="{color}" stroke-width="{width}""#);

    let label_at = match &edge.path {
        EdgePath::Straight { start, end } => {
            let _ = writeln!(
                out,
                r#"<line x1="{:.1}" y1="{:.1}" x2="{:.1}" y2="{:.1}" {stroke} marker-end="url(#{marker})"/>"#,
                start.x, start.y, end.x, end.y
            );
            Position::new((start.x + end.x) / 2.0, (start.y + end.y) / 2.0)
        }
        EdgePath::Curved {
            start,
            control,
            end,
        } => {
            let _ = writeln!(
                out,
                r#"<path d="M{:.1},{:.1} Q{:.1},{:.1} {:.1},{:.1}" {stroke} marker-end="url(#{marker})"/>"#,
                start.x, start.y, control.x, control.y, end.x, end.y
            );
            Position::new(
                0.25 * start.x + 0.5 * control.x + 0.25 * end.x,
                0.25 * start.y + 0.5 * control.y + 0.25 * end.y,
            )
        }
        EdgePath::Loop { center, radius } => {
            let _ = writeln!(
                out,
                r#"<circle cx="{:.1}" cy="{:.1}" r="{radius:.1}" {stroke}/>"#,
                center.x, center.y
            );
            Position::new(center.x, center.y - radius)
        }
    };

    if let Some(weight) = edge.weight {
        let _ = writeln!(
            out,
            r#"<text x="{:.1}" y="{:.1}" font-size="11" text-anchor="middle" fill="{}">{weight}</text>"#,
            label_at.x,
            label_at.y - 4.0,
            theme.label.to_css()
        );
    }
}

fn write_node(out: &mut String, node: &NodeView, theme: &Theme) {
    let Position { x, y } = node.position;
    let r = NODE_RADIUS;
    let shape = |fill: &str, stroke: &str| -> String {
        let paint = format!(r#"fill="{fill}" stroke="{stroke}" stroke-width="2""#);
        match node.style.shape {
            Shape::Circle => format!(r#"<circle cx="{x:.1}" cy="{y:.1}" r="{r:.1}" {paint}/>"#),
            Shape::Square => {
                let half = r * 0.85;
                format!(
                    r#"<rect x="{:.1}" y="{:.1}" width="{:.1}" height="{:.1}" {paint}/>"#,
                    x - half,
                    y - half,
                    2.0 * half,
                    2.0 * half
                )
            }
            Shape::Diamond => format!(
                r#"<polygon points="{:.1},{:.1} {:.1},{:.1} {:.1},{:.1} {:.1},{:.1}" {paint}/>"#,
                x,
                y - r,
                x + r,
                y,
                x,
                y + r,
                x - r,
                y
            ),
        }
    };

    let _ = writeln!(
        out,
        r#"<g class="node {}"><title>{} ({})</title>"#,
        node.state.label(),
        escape(node.id.as_str()),
        node.state.label()
    );
    let _ = writeln!(out, "{}", shape(&node.style.fill.to_css(), &node.style.stroke.to_css()));
    let overlay = match node.style.pattern {
        Pattern::Striped => Some("url(#stripes)"),
        Pattern::Dotted => Some("url(#dots)"),
        Pattern::Plain | Pattern::Solid => None,
    };
    if let Some(overlay) = overlay {
        let _ = writeln!(out, "{}", shape(overlay, "none"));
    }
    let _ = writeln!(
        out,
        r#"<text x="{x:.1}" y="{:.1}" font-size="13" text-anchor="middle" fill="{}">{}</text></g>"#,
        y + 4.5,
        theme.label.to_css(),
        escape(node.id.as_str())
    );
}
