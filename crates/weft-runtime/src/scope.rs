// crates/weft-runtime/src/scope.rs
//! Lexical scopes for template evaluation.
//!
//! A screen has one root scope wrapping the shared view-model. Repeats and list cells push
//! child frames that bind names either to plain values or to locations inside the model, so
//! an assignment such as `item.done = true` lands in the model rather than in a copy.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use weft_core::{CoreError, DataPath, PathSegment, Value};

/// The view-model shared between a screen, its scopes and its host functions.
pub type SharedModel = Rc<RefCell<Value>>;

pub fn shared_model(value: Value) -> SharedModel {
    Rc::new(RefCell::new(value))
}

/// What a local name stands for.
#[derive(Debug, Clone, PartialEq)]
pub enum Binding {
    Value(Value),
    /// An alias for a location inside the model.
    Path(DataPath),
}

impl From<Value> for Binding {
    fn from(value: Value) -> Self {
        Binding::Value(value)
    }
}

impl From<DataPath> for Binding {
    fn from(path: DataPath) -> Self {
        Binding::Path(path)
    }
}

struct RootFrame {
    model: SharedModel,
    globals: RefCell<HashMap<String, Value>>,
    model_alias: String,
}

struct LocalFrame {
    bindings: RefCell<HashMap<String, Binding>>,
    parent: Option<Scope>,
    root: Scope,
}

enum Frame {
    Root(RootFrame),
    Local(LocalFrame),
}

#[derive(Clone)]
pub struct Scope {
    frame: Rc<Frame>,
}

impl Scope {
    /// Root scope; the whole model is also reachable under `model_alias`.
    pub fn root(model: SharedModel, model_alias: impl Into<String>) -> Self {
        Self {
            frame: Rc::new(Frame::Root(RootFrame {
                model,
                globals: RefCell::new(HashMap::new()),
                model_alias: model_alias.into(),
            })),
        }
    }

    /// A frame whose lookups fall through to `self`.
    pub fn child<I, K>(&self, bindings: I) -> Self
    where
        I: IntoIterator<Item = (K, Binding)>,
        K: Into<String>,
    {
        self.local(bindings, Some(self.clone()))
    }

    /// A frame that sees only its own bindings. Evaluation against it falls back to the root
    /// scope when a name is unbound.
    pub fn detached<I, K>(&self, bindings: I) -> Self
    where
        I: IntoIterator<Item = (K, Binding)>,
        K: Into<String>,
    {
        self.local(bindings, None)
    }

    fn local<I, K>(&self, bindings: I, parent: Option<Scope>) -> Self
    where
        I: IntoIterator<Item = (K, Binding)>,
        K: Into<String>,
    {
        let bindings = bindings.into_iter().map(|(k, v)| (k.into(), v)).collect();
        Self {
            frame: Rc::new(Frame::Local(LocalFrame {
                bindings: RefCell::new(bindings),
                parent,
                root: self.root_scope(),
            })),
        }
    }

    pub fn is_root(&self) -> bool {
        matches!(*self.frame, Frame::Root(_))
    }

    pub fn root_scope(&self) -> Scope {
        match &*self.frame {
            Frame::Root(_) => self.clone(),
            Frame::Local(local) => local.root.clone(),
        }
    }

    fn root_frame(&self) -> &RootFrame {
        match &*self.frame {
            Frame::Root(root) => root,
            Frame::Local(local) => local.root.root_frame(),
        }
    }

    pub fn model(&self) -> SharedModel {
        self.root_frame().model.clone()
    }

    pub fn model_alias(&self) -> &str {
        &self.root_frame().model_alias
    }

    pub fn set_global(&self, name: impl Into<String>, value: Value) {
        self.root_frame().globals.borrow_mut().insert(name.into(), value);
    }

    /// Resolves `name` through the frame chain.
    ///
    /// Model fields resolve to paths; globals and value bindings resolve to values.
    pub fn resolve(&self, name: &str) -> Option<Binding> {
        match &*self.frame {
            Frame::Root(root) => {
                if name == root.model_alias {
                    return Some(Binding::Path(DataPath::root()));
                }
                if root.model.borrow().get(name).is_some() {
                    return Some(Binding::Path(DataPath::root().key(name)));
                }
                root.globals.borrow().get(name).cloned().map(Binding::Value)
            }
            Frame::Local(local) => {
                if let Some(binding) = local.bindings.borrow().get(name) {
                    return Some(binding.clone());
                }
                local.parent.as_ref().and_then(|parent| parent.resolve(name))
            }
        }
    }

    /// Value of `name`, or `None` when it is unbound.
    pub fn lookup(&self, name: &str) -> Option<Value> {
        match self.resolve(name)? {
            Binding::Value(value) => Some(value),
            Binding::Path(path) => Some(self.read(&path)),
        }
    }

    /// Model location of a plain accessor chain such as `item.tags[0]`.
    ///
    /// Like evaluation, a name unbound in a local frame is looked up again at the root.
    pub fn locate(&self, expr: &str) -> Option<DataPath> {
        let path = DataPath::parse(expr)?;
        let (head, tail) = path.segments().split_first()?;
        let PathSegment::Key(name) = head else {
            return None;
        };
        match self.resolve(name) {
            Some(Binding::Path(base)) => Some(base.join(tail)),
            Some(Binding::Value(_)) => None,
            None if !self.is_root() => self.root_scope().locate(expr),
            None => None,
        }
    }

    pub fn read(&self, path: &DataPath) -> Value {
        self.model()
            .borrow()
            .at_path(path)
            .cloned()
            .unwrap_or_default()
    }

    pub fn write(&self, path: &DataPath, value: Value) -> Result<(), CoreError> {
        self.model().borrow_mut().set_path(path, value)
    }

    /// Rebinds a local name in the nearest frame that defines it. Returns `false` when no
    /// local frame does.
    pub fn set_local(&self, name: &str, value: Value) -> bool {
        let mut current = Some(self);
        while let Some(scope) = current {
            match &*scope.frame {
                Frame::Root(_) => return false,
                Frame::Local(local) => {
                    if let Some(slot) = local.bindings.borrow_mut().get_mut(name) {
                        *slot = Binding::Value(value);
                        return true;
                    }
                    current = local.parent.as_ref();
                }
            }
        }
        false
    }
}

impl fmt::Debug for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &*self.frame {
            Frame::Root(root) => f
                .debug_struct("Scope::Root")
                .field("model_alias", &root.model_alias)
                .finish(),
            Frame::Local(local) => {
                let mut names: Vec<String> = local.bindings.borrow().keys().cloned().collect();
                names.sort();
                f.debug_struct("Scope::Local")
                    .field("bindings", &names)
                    .field("detached", &local.parent.is_none())
                    .finish()
            }
        }
    }
}
