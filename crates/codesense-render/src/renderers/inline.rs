//! Shared dispatcher for the simple shapes that get no dedicated renderer.

use codesense_trace::{DictPayload, MessagePayload, VariablePayload, Visualization};
use serde::Serialize;

use crate::view::{display_value, EntriesView, VariableView, View};

/// Shapes rendered inline by [`render_inline`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InlineKind {
    Dict,
    Variable,
    None,
    Error,
}

impl InlineKind {
    pub fn name(self) -> &'static str {
        match self {
            InlineKind::Dict => "dict",
            InlineKind::Variable => "variable",
            InlineKind::None => "none",
            InlineKind::Error => "error",
        }
    }
}

pub fn render_inline(kind: InlineKind, payload: &Visualization) -> View {
    match (kind, payload) {
        (InlineKind::Dict, Visualization::Dict(dict)) => View::Entries(render_dict(dict)),
        (InlineKind::Variable, Visualization::Variable(var)) => {
            View::Variable(render_variable(var))
        }
        (InlineKind::None, Visualization::None(msg)) => render_none(msg),
        (InlineKind::Error, Visualization::Error(msg)) => render_error(msg),
        (kind, Visualization::Unknown { tag, .. }) => {
            let rendered = match kind {
                InlineKind::Dict => payload
                    .decode_as::<DictPayload>()
                    .map(|dict| View::Entries(render_dict(&dict))),
                InlineKind::Variable => payload
                    .decode_as::<VariablePayload>()
                    .map(|var| View::Variable(render_variable(&var))),
                InlineKind::None => payload.decode_as::<MessagePayload>().map(|m| render_none(&m)),
                InlineKind::Error => payload.decode_as::<MessagePayload>().map(|m| render_error(&m)),
            };
            rendered.unwrap_or_else(|| View::mismatch(kind.name(), tag))
        }
        (kind, other) => View::mismatch(kind.name(), other.tag()),
    }
}

fn render_dict(dict: &DictPayload) -> EntriesView {
    let entries = if dict.formatted.is_empty() {
        dict.entries
            .iter()
            .map(|(key, value)| format!("{key}: {}", display_value(value)))
            .collect()
    } else {
        dict.formatted.clone()
    };
    EntriesView {
        name: dict.name.clone(),
        entries,
    }
}

fn render_variable(var: &VariablePayload) -> VariableView {
    VariableView {
        name: var.name.clone(),
        value: display_value(&var.value),
        type_label: var.var_type.clone().unwrap_or_else(|| type_of(&var.value).to_owned()),
    }
}

fn type_of(value: &serde_json::Value) -> &'static str {
    use serde_json::Value;
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(n) if n.is_f64() => "float",
        Value::Number(_) => "int",
        Value::String(_) => "str",
        Value::Array(_) => "list",
        Value::Object(_) => "dict",
    }
}

fn render_none(msg: &MessagePayload) -> View {
    if msg.message.is_empty() {
        View::info("Nothing to visualize at this step")
    } else {
        View::info(msg.message.clone())
    }
}

fn render_error(msg: &MessagePayload) -> View {
    if msg.message.is_empty() {
        View::warning("Visualization failed for this step")
    } else {
        View::warning(msg.message.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::Severity;
    use serde_json::json;

    #[test]
    fn dict_prefers_formatted_lines() {
        let viz = Visualization::from_value(json!({
            "type": "dict",
            "name": "counts",
            "data": {"a": 1},
            "formatted": ["a -> 1"],
        }));
        let View::Entries(view) = render_inline(InlineKind::Dict, &viz) else {
            panic!("expected entries view");
        };
        assert_eq!(view.entries, vec!["a -> 1"]);
    }

    #[test]
    fn dict_formats_entries_in_order() {
        let viz = Visualization::from_value(json!({
            "type": "dict",
            "entries": [["b", 2], ["a", "x"]],
        }));
        let View::Entries(view) = render_inline(InlineKind::Dict, &viz) else {
            panic!("expected entries view");
        };
        assert_eq!(view.entries, vec!["b: 2", "a: x"]);
    }

    #[test]
    fn variable_triple() {
        let viz = Visualization::from_value(json!({
            "type": "variable", "name": "x", "value": 5, "var_type": "int",
        }));
        assert_eq!(
            render_inline(InlineKind::Variable, &viz),
            View::Variable(VariableView {
                name: "x".into(),
                value: "5".into(),
                type_label: "int".into(),
            })
        );
    }

    #[test]
    fn variable_type_is_inferred_when_missing() {
        let viz = Visualization::from_value(json!({"type": "variable", "name": "f", "value": 1.5}));
        let View::Variable(view) = render_inline(InlineKind::Variable, &viz) else {
            panic!("expected variable view");
        };
        assert_eq!(view.type_label, "float");
    }

    #[test]
    fn none_and_error_messages() {
        let none = Visualization::nothing("No variables to visualize");
        let View::Message(msg) = render_inline(InlineKind::None, &none) else {
            panic!("expected message");
        };
        assert_eq!(msg.severity, Severity::Info);

        let error = Visualization::from_value(json!({"type": "error", "message": "boom"}));
        let View::Message(msg) = render_inline(InlineKind::Error, &error) else {
            panic!("expected message");
        };
        assert_eq!(msg.severity, Severity::Warning);
        assert_eq!(msg.text, "boom");
    }

    #[test]
    fn mismatched_kind_is_a_notice() {
        let viz = Visualization::nothing("idle");
        let View::Message(msg) = render_inline(InlineKind::Dict, &viz) else {
            panic!("expected message");
        };
        assert!(msg.text.contains("dict"));
    }
}
