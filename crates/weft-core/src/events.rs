// crates/weft-core/src/events.rs
use crate::{format_number, Value};

/// Event attributes a template can bind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Click,
    Change,
}

impl EventKind {
    pub fn attribute(&self) -> &'static str {
        match self {
            EventKind::Click => "onClick",
            EventKind::Change => "onChange",
        }
    }
}

/// User-editable state carried by input, switch and slider views.
#[derive(Debug, Clone, PartialEq)]
pub enum ControlValue {
    Bool(bool),
    Number(f64),
    Text(String),
}

impl ControlValue {
    /// Source text of an expression literal that evaluates back to this value.
    pub fn to_literal(&self) -> String {
        match self {
            ControlValue::Bool(b) => b.to_string(),
            ControlValue::Number(n) if n.is_finite() => format_number(*n),
            ControlValue::Number(_) => "0".to_string(),
            ControlValue::Text(text) => {
                let mut literal = String::with_capacity(text.len() + 2);
                literal.push('"');
                for c in text.chars() {
                    match c {
                        '"' => literal.push_str("\\\""),
                        '\\' => literal.push_str("\\\\"),
                        '\n' => literal.push_str("\\n"),
                        '\r' => literal.push_str("\\r"),
                        '\t' => literal.push_str("\\t"),
                        other => literal.push(other),
                    }
                }
                literal.push('"');
                literal
            }
        }
    }
}

impl From<&ControlValue> for Value {
    fn from(value: &ControlValue) -> Self {
        match value {
            ControlValue::Bool(b) => Value::Bool(*b),
            ControlValue::Number(n) => Value::Number(*n),
            ControlValue::Text(text) => Value::String(text.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literals_escape_quotes_and_newlines() {
        let value = ControlValue::Text("say \"hi\"\\\nbye".into());
        assert_eq!(value.to_literal(), r#""say \"hi\"\\\nbye""#);
        assert_eq!(ControlValue::Bool(false).to_literal(), "false");
        assert_eq!(ControlValue::Number(0.25).to_literal(), "0.25");
        assert_eq!(ControlValue::Number(4.0).to_literal(), "4");
    }
}
