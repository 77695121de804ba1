// crates/weft-runtime/src/script/interpreter.rs
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use tracing::{debug, info};
use weft_core::{format_number, DataPath, PathSegment, Value};

use super::parser::{parse, AssignOp, BinaryOp, Expr, UnaryOp};
use super::{EvalError, ExpressionEvaluator, HostFunction};
use crate::scope::{Binding, Scope};

/// Tree-walking interpreter over the shared scope chain.
///
/// Parsed expressions are cached by source text, since templates evaluate the same handful
/// of expressions on every render.
pub struct BuiltinEvaluator {
    functions: HashMap<String, HostFunction>,
    cache: RefCell<HashMap<String, Rc<Expr>>>,
}

/// Where an assignment lands.
enum Place {
    Model(DataPath),
    /// A value bound in a scope frame or a root global, plus a path inside it.
    Local { name: String, path: Vec<PathSegment> },
}

impl BuiltinEvaluator {
    pub fn new() -> Self {
        let mut evaluator = Self {
            functions: HashMap::new(),
            cache: RefCell::new(HashMap::new()),
        };
        evaluator.register("log", |args, _| {
            let line: Vec<String> = args.iter().map(Value::to_string).collect();
            info!("[template] {}", line.join(" "));
            Ok(Value::Undefined)
        });
        evaluator.register("String", |args, _| {
            Ok(Value::String(
                args.first().map(Value::to_string).unwrap_or_default(),
            ))
        });
        evaluator.register("Number", |args, _| {
            Ok(Value::Number(args.first().map(to_number).unwrap_or(0.0)))
        });
        evaluator.register("Boolean", |args, _| {
            Ok(Value::Bool(args.first().is_some_and(Value::is_truthy)))
        });
        evaluator
    }

    pub fn register<F>(&mut self, name: &str, function: F)
    where
        F: Fn(&[Value], &Scope) -> Result<Value, EvalError> + 'static,
    {
        self.functions.insert(name.to_string(), Rc::new(function));
    }

    pub fn has_function(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    fn parsed(&self, source: &str) -> Result<Rc<Expr>, EvalError> {
        if let Some(expr) = self.cache.borrow().get(source) {
            return Ok(expr.clone());
        }
        let expr = Rc::new(parse(source)?);
        self.cache
            .borrow_mut()
            .insert(source.to_string(), expr.clone());
        Ok(expr)
    }

    fn eval(&self, expr: &Expr, scope: &Scope) -> Result<Value, EvalError> {
        match expr {
            Expr::Literal(value) => Ok(value.clone()),
            Expr::Array(items) => Ok(Value::List(
                items
                    .iter()
                    .map(|item| self.eval(item, scope))
                    .collect::<Result<_, _>>()?,
            )),
            Expr::Ident(name) => scope
                .lookup(name)
                .ok_or_else(|| EvalError::Unbound(name.clone())),
            Expr::Member(object, key) => member(self.eval(object, scope)?, key),
            Expr::Index(object, index) => {
                let object = self.eval(object, scope)?;
                match self.eval(index, scope)? {
                    Value::String(key) => member(object, &key),
                    Value::Number(n) => index_number(object, n),
                    other => Err(EvalError::Type(format!(
                        "cannot index with a {}",
                        other.type_name()
                    ))),
                }
            }
            Expr::Call(name, args) => {
                let function = self
                    .functions
                    .get(name)
                    .cloned()
                    .ok_or_else(|| EvalError::Unbound(name.clone()))?;
                let args = args
                    .iter()
                    .map(|arg| self.eval(arg, scope))
                    .collect::<Result<Vec<_>, _>>()?;
                function(&args, scope)
            }
            Expr::Unary(op, operand) => {
                let value = self.eval(operand, scope)?;
                Ok(match op {
                    UnaryOp::Not => Value::Bool(!value.is_truthy()),
                    UnaryOp::Negate => Value::Number(-to_number(&value)),
                    UnaryOp::Plus => Value::Number(to_number(&value)),
                })
            }
            Expr::Binary(op, left, right) => {
                let left = self.eval(left, scope)?;
                let right = self.eval(right, scope)?;
                Ok(binary(*op, &left, &right))
            }
            Expr::And(left, right) => {
                let left = self.eval(left, scope)?;
                if left.is_truthy() {
                    self.eval(right, scope)
                } else {
                    Ok(left)
                }
            }
            Expr::Or(left, right) => {
                let left = self.eval(left, scope)?;
                if left.is_truthy() {
                    Ok(left)
                } else {
                    self.eval(right, scope)
                }
            }
            Expr::Conditional {
                test,
                then,
                otherwise,
            } => {
                if self.eval(test, scope)?.is_truthy() {
                    self.eval(then, scope)
                } else {
                    self.eval(otherwise, scope)
                }
            }
            Expr::Assign { op, target, value } => self.assign(*op, target, value, scope),
            Expr::Sequence(statements) => {
                let mut last = Value::Undefined;
                for statement in statements {
                    last = self.eval(statement, scope)?;
                }
                Ok(last)
            }
        }
    }

    fn place(&self, target: &Expr, scope: &Scope) -> Result<Place, EvalError> {
        match target {
            Expr::Ident(name) => match scope.resolve(name) {
                Some(Binding::Path(path)) => Ok(Place::Model(path)),
                Some(Binding::Value(_)) => Ok(Place::Local {
                    name: name.clone(),
                    path: Vec::new(),
                }),
                // Assigning an unknown name at the root creates a model field.
                None if scope.is_root() => Ok(Place::Model(DataPath::root().key(name.as_str()))),
                // Names no local frame binds are assigned at the root.
                None => self.place(target, &scope.root_scope()),
            },
            Expr::Member(object, key) => {
                Ok(push_segment(self.place(object, scope)?, PathSegment::Key(key.clone())))
            }
            Expr::Index(object, index) => {
                let segment = match self.eval(index, scope)? {
                    Value::String(key) => PathSegment::Key(key),
                    Value::Number(n) if n >= 0.0 && n.fract() == 0.0 => PathSegment::Index(n as usize),
                    other => {
                        return Err(EvalError::Type(format!(
                            "invalid index {} in assignment",
                            other
                        )))
                    }
                };
                Ok(push_segment(self.place(object, scope)?, segment))
            }
            _ => Err(EvalError::Assignment {
                target: format!("{:?}", target),
                reason: "not an assignable expression".to_string(),
            }),
        }
    }

    fn read_place(&self, place: &Place, scope: &Scope) -> Value {
        match place {
            Place::Model(path) => scope.read(path),
            Place::Local { name, path } => scope
                .lookup(name)
                .and_then(|value| {
                    value
                        .at_path(&DataPath::from_segments(path.clone()))
                        .cloned()
                })
                .unwrap_or_default(),
        }
    }

    fn assign(
        &self,
        op: AssignOp,
        target: &Expr,
        value: &Expr,
        scope: &Scope,
    ) -> Result<Value, EvalError> {
        let place = self.place(target, scope)?;
        let value = self.eval(value, scope)?;
        let value = match op {
            AssignOp::Set => value,
            AssignOp::Add => binary(BinaryOp::Add, &self.read_place(&place, scope), &value),
            AssignOp::Sub => binary(BinaryOp::Sub, &self.read_place(&place, scope), &value),
        };

        match place {
            Place::Model(path) => {
                scope
                    .write(&path, value.clone())
                    .map_err(|err| EvalError::Assignment {
                        target: path.to_string(),
                        reason: err.to_string(),
                    })?;
                debug!("Assigned {} = {}", path, value);
            }
            Place::Local { name, path } => {
                let mut current = scope.lookup(&name).unwrap_or_default();
                let inner = DataPath::from_segments(path);
                current
                    .set_path(&inner, value.clone())
                    .map_err(|err| EvalError::Assignment {
                        target: name.clone(),
                        reason: err.to_string(),
                    })?;
                if !scope.set_local(&name, current.clone()) {
                    scope.set_global(name, current);
                }
            }
        }
        Ok(value)
    }
}

impl Default for BuiltinEvaluator {
    fn default() -> Self {
        Self::new()
    }
}

impl ExpressionEvaluator for BuiltinEvaluator {
    fn evaluate(&self, expr: &str, scope: &Scope) -> Result<Value, EvalError> {
        let parsed = self.parsed(expr)?;
        self.eval(&parsed, scope)
    }

    fn register_function(&mut self, name: &str, function: HostFunction) -> bool {
        self.functions.insert(name.to_string(), function);
        true
    }
}

fn push_segment(place: Place, segment: PathSegment) -> Place {
    match place {
        Place::Model(path) => Place::Model(path.join(&[segment])),
        Place::Local { name, mut path } => {
            path.push(segment);
            Place::Local { name, path }
        }
    }
}

fn member(object: Value, key: &str) -> Result<Value, EvalError> {
    match object {
        Value::Undefined | Value::Null => Err(EvalError::Type(format!(
            "cannot read '{}' of {}",
            key,
            object.type_name()
        ))),
        Value::List(items) if key == "length" => Ok(Value::from(items.len())),
        Value::String(text) if key == "length" => Ok(Value::from(text.chars().count())),
        Value::Map(mut map) => Ok(map.remove(key).unwrap_or_default()),
        Value::List(mut items) => Ok(key
            .parse::<usize>()
            .ok()
            .filter(|index| *index < items.len())
            .map(|index| items.swap_remove(index))
            .unwrap_or_default()),
        _ => Ok(Value::Undefined),
    }
}

fn index_number(object: Value, n: f64) -> Result<Value, EvalError> {
    if !(n >= 0.0 && n.fract() == 0.0) {
        return member(object, &format_number(n));
    }
    let index = n as usize;
    match object {
        Value::List(mut items) if index < items.len() => Ok(items.swap_remove(index)),
        Value::String(text) => Ok(text
            .chars()
            .nth(index)
            .map(|c| Value::String(c.to_string()))
            .unwrap_or_default()),
        other => member(other, &index.to_string()),
    }
}

fn to_number(value: &Value) -> f64 {
    match value {
        Value::Number(n) => *n,
        Value::Bool(b) => f64::from(u8::from(*b)),
        Value::Null => 0.0,
        Value::String(s) if s.trim().is_empty() => 0.0,
        Value::String(s) => s.trim().parse().unwrap_or(f64::NAN),
        Value::Undefined | Value::List(_) | Value::Map(_) => f64::NAN,
    }
}

/// Same type and same value; lists and maps compare structurally.
fn strict_equals(left: &Value, right: &Value) -> bool {
    left == right
}

fn loose_equals(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (a, b) if a.is_nullish() || b.is_nullish() => a.is_nullish() && b.is_nullish(),
        (Value::String(_), Value::String(_)) => left == right,
        (
            Value::Number(_) | Value::String(_) | Value::Bool(_),
            Value::Number(_) | Value::String(_) | Value::Bool(_),
        ) => to_number(left) == to_number(right),
        _ => strict_equals(left, right),
    }
}

fn compare(op: BinaryOp, left: &Value, right: &Value) -> bool {
    let ordering = match (left, right) {
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        _ => to_number(left).partial_cmp(&to_number(right)),
    };
    let Some(ordering) = ordering else {
        return false;
    };
    match op {
        BinaryOp::Lt => ordering.is_lt(),
        BinaryOp::Le => ordering.is_le(),
        BinaryOp::Gt => ordering.is_gt(),
        _ => ordering.is_ge(),
    }
}

fn binary(op: BinaryOp, left: &Value, right: &Value) -> Value {
    match op {
        BinaryOp::Add => {
            let textual = |v: &Value| matches!(v, Value::String(_) | Value::List(_) | Value::Map(_));
            if textual(left) || textual(right) {
                Value::String(format!("{}{}", left, right))
            } else {
                Value::Number(to_number(left) + to_number(right))
            }
        }
        BinaryOp::Sub => Value::Number(to_number(left) - to_number(right)),
        BinaryOp::Mul => Value::Number(to_number(left) * to_number(right)),
        BinaryOp::Div => Value::Number(to_number(left) / to_number(right)),
        BinaryOp::Rem => Value::Number(to_number(left) % to_number(right)),
        BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge => {
            Value::Bool(compare(op, left, right))
        }
        BinaryOp::Eq => Value::Bool(loose_equals(left, right)),
        BinaryOp::Ne => Value::Bool(!loose_equals(left, right)),
        BinaryOp::StrictEq => Value::Bool(strict_equals(left, right)),
        BinaryOp::StrictNe => Value::Bool(!strict_equals(left, right)),
    }
}
