use std::{cell::RefCell, rc::Rc};

use indexmap::IndexMap;

use crate::{
    diagnostics::{Diagnostic, DiagnosticKind, QbError},
    value::Value,
};

pub type EnvironmentRef = Rc<RefCell<Environment>>;

/// One lexical frame: an append-only name table plus a parent link.
/// Frames are shared (a closure keeps its defining frame alive), so the
/// chain is held behind `Rc<RefCell<_>>`; parents never reference children.
#[derive(Debug, Default)]
pub struct Environment {
    parent: Option<EnvironmentRef>,
    bindings: IndexMap<String, Value>,
}

impl Environment {
    pub fn new() -> EnvironmentRef {
        Rc::new(RefCell::new(Self {
            parent: None,
            bindings: IndexMap::new(),
        }))
    }

    pub fn with_parent(parent: EnvironmentRef) -> EnvironmentRef {
        Rc::new(RefCell::new(Self {
            parent: Some(parent),
            bindings: IndexMap::new(),
        }))
    }

    /// The initial frame with every builtin registered.
    pub fn global() -> EnvironmentRef {
        let env = Self::new();
        crate::builtins::install(&env);
        env
    }

    /// Bind or rebind a name in this frame. Rebinding overwrites silently;
    /// nothing is ever deleted.
    pub fn define(&mut self, name: String, value: Value) {
        self.bindings.insert(name, value);
    }

    /// Look a name up the chain, innermost frame first.
    pub fn get(env: &EnvironmentRef, name: &str) -> Result<Value, QbError> {
        if let Some(value) = env.borrow().bindings.get(name) {
            return Ok(value.clone());
        }
        if let Some(parent) = env.borrow().parent.clone() {
            return Environment::get(&parent, name);
        }
        Err(QbError::from(Diagnostic::new(
            DiagnosticKind::UnboundName,
            format!("unbound name `{name}`"),
        )))
    }
}
