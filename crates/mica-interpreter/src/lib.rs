//! Mica Language Interpreter
//!
//! Tree-walking evaluator over the parsed AST. Runtime failures are
//! ordinary values: `eval` returns [`Value`], and an error is a
//! [`Value::Error`] that every composite operation passes through
//! unchanged. There is no panic path and no Rust error type in the
//! evaluation core.
//!
//! Static types are advisory; the evaluator never consults the type
//! checker's output and happily runs a module that carries diagnostics.

mod environment;
mod eval;
mod value;

pub use environment::{AssignStatus, DefineStatus, Environment};
pub use eval::{eval_block, eval_expr, eval_module, eval_stmt};
pub use value::{Closure, EvalError, Value};
