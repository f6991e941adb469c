//! Environment for variable bindings in the Mica interpreter.

use std::cell::RefCell;
use std::rc::Rc;

use rustc_hash::FxHashMap;
use smol_str::SmolStr;

use crate::Value;

/// A binding with its mutability flag; `let` bindings refuse assignment.
#[derive(Debug, Clone)]
struct Binding {
    value: Value,
    mutable: bool,
}

/// Outcome of defining a name in a scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefineStatus {
    NoError,
    /// The name is already bound in this scope (shadowing an outer scope
    /// is not a duplicate)
    Duplicate,
}

/// Outcome of assigning to a name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignStatus {
    Assigned,
    Immutable,
    Undefined,
}

/// An environment holds variable bindings and optionally a parent scope.
#[derive(Debug, Default)]
pub struct Environment {
    /// Variable bindings in this scope
    bindings: FxHashMap<SmolStr, Binding>,

    /// Parent scope (for lexical scoping)
    parent: Option<Rc<RefCell<Environment>>>,
}

impl Environment {
    /// Create a new empty global environment.
    pub fn new() -> Self {
        Environment {
            bindings: FxHashMap::default(),
            parent: None,
        }
    }

    /// Create a new child environment with the given parent.
    pub fn with_parent(parent: Rc<RefCell<Environment>>) -> Self {
        Environment {
            bindings: FxHashMap::default(),
            parent: Some(parent),
        }
    }

    /// Define a new variable in the current scope. Only the local scope is
    /// consulted for duplicates.
    pub fn define(&mut self, name: SmolStr, value: Value, mutable: bool) -> DefineStatus {
        if self.bindings.contains_key(&name) {
            return DefineStatus::Duplicate;
        }
        self.bindings.insert(name, Binding { value, mutable });
        DefineStatus::NoError
    }

    /// Get the value of a variable, searching up through parent scopes.
    pub fn get(&self, name: &str) -> Option<Value> {
        if let Some(binding) = self.bindings.get(name) {
            Some(binding.value.clone())
        } else if let Some(parent) = &self.parent {
            parent.borrow().get(name)
        } else {
            None
        }
    }

    /// Assign to an existing variable, searching up through parent scopes.
    pub fn assign(&mut self, name: &str, value: Value) -> AssignStatus {
        if let Some(binding) = self.bindings.get_mut(name) {
            if !binding.mutable {
                return AssignStatus::Immutable;
            }
            binding.value = value;
            AssignStatus::Assigned
        } else if let Some(parent) = &self.parent {
            parent.borrow_mut().assign(name, value)
        } else {
            AssignStatus::Undefined
        }
    }

    /// Get the parent environment if it exists.
    pub fn parent(&self) -> Option<Rc<RefCell<Environment>>> {
        self.parent.clone()
    }
}
