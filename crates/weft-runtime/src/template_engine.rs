// crates/weft-runtime/src/template_engine.rs

use std::sync::OnceLock;

use regex::Regex;
use tracing::{debug, warn};
use weft_core::{Attributes, Value};

use crate::scope::Scope;
use crate::script::{EvalError, ExpressionEvaluator, HostFunction};

fn placeholder_regex() -> &'static Regex {
    static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();
    PLACEHOLDER.get_or_init(|| Regex::new(r"\{\{(.+?)\}\}").expect("placeholder pattern compiles"))
}

fn sole_placeholder_regex() -> &'static Regex {
    static SOLE: OnceLock<Regex> = OnceLock::new();
    SOLE.get_or_init(|| Regex::new(r"^\s*\{\{(.+?)\}\}\s*$").expect("placeholder pattern compiles"))
}

/// Evaluates expressions and `{{ }}` placeholders against a scope.
///
/// Evaluation never fails from the caller's point of view: errors are logged and read as
/// `undefined`.
pub struct TemplateEngine {
    evaluator: Box<dyn ExpressionEvaluator>,
}

impl TemplateEngine {
    pub fn new(evaluator: Box<dyn ExpressionEvaluator>) -> Self {
        Self { evaluator }
    }

    pub fn register_function(&mut self, name: &str, function: HostFunction) -> bool {
        self.evaluator.register_function(name, function)
    }

    /// Evaluates `expr` under `scope`. A binding error in a non-root scope is retried once
    /// against the root scope.
    pub fn try_evaluate(&self, expr: &str, scope: &Scope) -> Result<Value, EvalError> {
        match self.evaluator.evaluate(expr, scope) {
            Err(err) if err.is_binding() && !scope.is_root() => {
                debug!("'{}' failed in local scope ({}); retrying at root", expr, err);
                self.evaluator.evaluate(expr, &scope.root_scope())
            }
            result => result,
        }
    }

    /// Like [`TemplateEngine::try_evaluate`], but failures are logged and become `undefined`.
    pub fn evaluate(&self, expr: &str, scope: &Scope) -> Value {
        match self.try_evaluate(expr, scope) {
            Ok(value) => value,
            Err(err) if err.is_binding() => {
                debug!("'{}': {}", expr, err);
                Value::Undefined
            }
            Err(err) => {
                warn!("Expression '{}' failed: {}", expr, err);
                Value::Undefined
            }
        }
    }

    pub fn is_truthy(&self, expr: &str, scope: &Scope) -> bool {
        self.evaluate(expr, scope).is_truthy()
    }

    /// Replaces every `{{expr}}` in `text` with the display form of its value.
    ///
    /// Matches are substituted from last to first so earlier offsets stay valid.
    pub fn resolve_interpolations(&self, text: &str, scope: &Scope) -> String {
        if !text.contains("{{") {
            return text.to_string();
        }
        let matches: Vec<_> = placeholder_regex()
            .captures_iter(text)
            .filter_map(|capture| Some((capture.get(0)?.range(), capture.get(1)?.as_str())))
            .collect();

        let mut result = text.to_string();
        for (range, expr) in matches.into_iter().rev() {
            let value = self.evaluate(expr.trim(), scope);
            result.replace_range(range, &value.to_display_string());
        }
        result
    }

    pub fn resolve_attributes(&self, attributes: &Attributes, scope: &Scope) -> Attributes {
        attributes
            .iter()
            .map(|(key, value)| (key.clone(), self.resolve_interpolations(value, scope)))
            .collect()
    }
}

/// The expression of an attribute that consists of exactly one placeholder, e.g. `form.name`
/// for `"{{ form.name }}"`. Such attributes are two-way bindable.
pub fn sole_binding(raw: &str) -> Option<&str> {
    let capture = sole_placeholder_regex().captures(raw)?;
    let expr = capture.get(1)?.as_str().trim();
    if expr.contains("{{") || expr.contains("}}") {
        return None;
    }
    Some(expr)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scope::{shared_model, Binding};
    use crate::script::BuiltinEvaluator;

    fn engine() -> TemplateEngine {
        TemplateEngine::new(Box::new(BuiltinEvaluator::new()))
    }

    fn root() -> Scope {
        Scope::root(
            shared_model(Value::map([
                ("user", Value::map([("name", Value::from("Ada"))])),
                ("count", Value::from(3)),
            ])),
            "viewModel",
        )
    }

    #[test]
    fn interpolates_every_placeholder() {
        let text = engine().resolve_interpolations("Hello {{ user.name }}, you have {{count}} new", &root());
        assert_eq!(text, "Hello Ada, you have 3 new");
    }

    #[test]
    fn failed_placeholders_render_empty() {
        let engine = engine();
        let scope = root();
        assert_eq!(engine.resolve_interpolations("[{{ missing }}]", &scope), "[]");
        assert_eq!(engine.resolve_interpolations("[{{ count + }}]", &scope), "[]");
        assert_eq!(engine.resolve_interpolations("no placeholders", &scope), "no placeholders");
    }

    #[test]
    fn detached_scopes_fall_back_to_root_on_binding_errors() {
        let engine = engine();
        let cell = root().detached([("index", Binding::Value(Value::from(1)))]);
        assert_eq!(engine.evaluate("index", &cell), Value::from(1));
        assert_eq!(engine.evaluate("user.name", &cell), Value::from("Ada"));
        // The retry runs the whole expression at the root, where `index` is unbound.
        assert_eq!(engine.evaluate("count + index", &cell), Value::Undefined);
        assert_eq!(engine.evaluate("nothing.here", &cell), Value::Undefined);
    }

    #[test]
    fn recognises_sole_placeholders() {
        assert_eq!(sole_binding("{{ form.name }}"), Some("form.name"));
        assert_eq!(sole_binding("{{a}} and {{b}}"), None);
        assert_eq!(sole_binding("Name: {{ form.name }}"), None);
        assert_eq!(sole_binding("plain"), None);
    }
}
