//! Runtime values for the Mica interpreter.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;
use mica_ast::{Expr, Param, Span};
use smol_str::SmolStr;

use crate::Environment;

/// Runtime values in the Mica interpreter.
#[derive(Debug, Clone)]
pub enum Value {
    /// Null value (absence of value)
    Null,

    /// Unit value (statements, if without else)
    Unit,

    /// Boolean value
    Bool(bool),

    /// 64-bit signed integer
    Int(i64),

    /// 64-bit floating point number
    Float(f64),

    /// String value
    Str(SmolStr),

    /// Array of values, shared by reference
    Array(Rc<RefCell<Vec<Value>>>),

    /// Struct value with ordered fields, shared by reference
    Struct(Rc<RefCell<IndexMap<SmolStr, Value>>>),

    /// Half-open integer range
    Range { start: i64, end: i64 },

    /// Function value closing over its defining environment
    Func(Rc<Closure>),

    /// A runtime error, propagated as a first-class value
    Error(Rc<EvalError>),
}

/// A function value: parameters, body, and the captured environment.
///
/// The environment is captured by shared reference, so the closure
/// observes later updates to its defining scope, and two closures made
/// in one scope share bindings.
#[derive(Debug, Clone)]
pub struct Closure {
    pub params: Vec<Param>,
    pub body: Expr,
    pub env: Rc<RefCell<Environment>>,
}

/// A runtime failure carried inside [`Value::Error`].
#[derive(Debug, Clone, PartialEq)]
pub struct EvalError {
    pub message: String,
    pub span: Span,
}

impl Value {
    /// Build an error value.
    pub fn error(message: impl Into<String>, span: Span) -> Value {
        Value::Error(Rc::new(EvalError {
            message: message.into(),
            span,
        }))
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Value::Error(_))
    }

    /// Get the type name of this value.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "Null",
            Value::Unit => "Unit",
            Value::Bool(_) => "Bool",
            Value::Int(_) => "Int",
            Value::Float(_) => "Float",
            Value::Str(_) => "String",
            Value::Array(_) => "Array",
            Value::Struct(_) => "Struct",
            Value::Range { .. } => "Range",
            Value::Func(_) => "Func",
            Value::Error(_) => "Error",
        }
    }
}

impl PartialEq for Value {
    /// Structural equality. Ints and floats compare across variants, so
    /// `1 == 1.0` holds at runtime just as `Int` widens in the checker.
    /// Functions compare by identity.
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Unit, Value::Unit) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Int(a), Value::Float(b)) | (Value::Float(b), Value::Int(a)) => {
                *a as f64 == *b
            }
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => *a.borrow() == *b.borrow(),
            (Value::Struct(a), Value::Struct(b)) => *a.borrow() == *b.borrow(),
            (
                Value::Range { start: a, end: b },
                Value::Range { start: c, end: d },
            ) => a == c && b == d,
            (Value::Func(a), Value::Func(b)) => Rc::ptr_eq(a, b),
            (Value::Error(a), Value::Error(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Unit => write!(f, "()"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(n) => write!(f, "{}", n),
            Value::Float(n) => write!(f, "{}", n),
            Value::Str(s) => write!(f, "{}", s),
            Value::Array(items) => {
                write!(f, "[")?;
                for (i, item) in items.borrow().iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            Value::Struct(fields) => {
                write!(f, "{{ ")?;
                for (i, (name, value)) in fields.borrow().iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", name, value)?;
                }
                write!(f, " }}")
            }
            Value::Range { start, end } => write!(f, "{}..{}", start, end),
            Value::Func(closure) => {
                write!(f, "func(")?;
                for (i, param) in closure.params.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", param.name.node)?;
                }
                write!(f, ")")
            }
            Value::Error(e) => write!(f, "error: {}", e.message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_cross_numeric_equality() {
        assert_eq!(Value::Int(1), Value::Float(1.0));
        assert_eq!(Value::Float(2.5), Value::Float(2.5));
        assert_ne!(Value::Int(1), Value::Float(1.5));
    }

    #[test]
    fn test_distinct_variants_never_equal() {
        assert_ne!(Value::Null, Value::Unit);
        assert_ne!(Value::Bool(true), Value::Int(1));
        assert_ne!(Value::Str("1".into()), Value::Int(1));
    }

    #[test]
    fn test_array_equality_is_structural() {
        let a = Value::Array(Rc::new(RefCell::new(vec![Value::Int(1), Value::Int(2)])));
        let b = Value::Array(Rc::new(RefCell::new(vec![Value::Int(1), Value::Int(2)])));
        assert_eq!(a, b);
    }

    #[test]
    fn test_display() {
        assert_eq!(Value::Int(42).to_string(), "42");
        assert_eq!(Value::Str("hi".into()).to_string(), "hi");
        assert_eq!(Value::Range { start: 0, end: 3 }.to_string(), "0..3");
        assert_eq!(
            Value::Array(Rc::new(RefCell::new(vec![Value::Int(1), Value::Bool(true)])))
                .to_string(),
            "[1, true]"
        );
        assert_eq!(
            Value::error("boom", Span::dummy()).to_string(),
            "error: boom"
        );
    }

    #[test]
    fn test_type_names() {
        assert_eq!(Value::Unit.type_name(), "Unit");
        assert_eq!(Value::Str("".into()).type_name(), "String");
        assert_eq!(Value::error("x", Span::dummy()).type_name(), "Error");
    }
}
