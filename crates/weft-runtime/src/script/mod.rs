// crates/weft-runtime/src/script/mod.rs
//! Expression evaluation for templates and event handlers.
//!
//! The renderer only depends on [`ExpressionEvaluator`]; [`BuiltinEvaluator`] is the default
//! implementation, a small interpreter for the expression subset templates use:
//!
//! ```text
//! literals      1  2.5  'text'  "text"  true  false  null  undefined  [a, b]
//! access        name  a.b  a[0]  a['key']  list.length
//! operators     !  -  *  /  %  +  -  <  <=  >  >=  ==  !=  ===  !==  &&  ||  ?:
//! assignment    path = expr   path += expr   path -= expr
//! calls         hostFunction(args...)
//! statements    expr; expr; ...
//! ```

use std::rc::Rc;

use weft_core::Value;

use crate::scope::Scope;

pub mod error;
pub mod interpreter;
pub mod parser;

pub use error::EvalError;
pub use interpreter::BuiltinEvaluator;

/// Host callback invoked by `name(args...)` in an expression.
pub type HostFunction = Rc<dyn Fn(&[Value], &Scope) -> Result<Value, EvalError>>;

pub trait ExpressionEvaluator {
    fn evaluate(&self, expr: &str, scope: &Scope) -> Result<Value, EvalError>;

    /// Makes `function` callable by `name`. Evaluators without host calls ignore this and
    /// return `false`.
    fn register_function(&mut self, _name: &str, _function: HostFunction) -> bool {
        false
    }
}
