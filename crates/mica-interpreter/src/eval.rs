//! Tree-walking evaluation for the Mica interpreter.
//!
//! Every function here returns a plain [`Value`]. A runtime failure is a
//! `Value::Error`; each composite rule checks its operands and returns the
//! first error it sees, so errors short-circuit outward without a Rust
//! error type in the signatures.

use std::cell::RefCell;
use std::rc::Rc;

use indexmap::IndexMap;
use mica_ast::{BinaryOp, Block, Expr, ExprKind, Module, Span, Stmt, StmtKind, UnaryOp};

use crate::{AssignStatus, Closure, DefineStatus, Environment, Value};

/// Evaluate a module in the given environment.
///
/// Returns the value of the last statement (an expression statement's
/// value, `Unit` otherwise), or the first error encountered.
pub fn eval_module(module: &Module, env: &Rc<RefCell<Environment>>) -> Value {
    let mut last = Value::Unit;
    for stmt in &module.stmts {
        last = eval_stmt(stmt, env);
        if last.is_error() {
            return last;
        }
    }
    last
}

/// Evaluate a single statement. Declarations and loops evaluate to `Unit`
/// and apply their side effects to `env`.
pub fn eval_stmt(stmt: &Stmt, env: &Rc<RefCell<Environment>>) -> Value {
    match &stmt.kind {
        StmtKind::Let { name, value, .. } => define(name, value, false, env),
        StmtKind::Var { name, value, .. } => define(name, value, true, env),
        // aliases are a static construct with no runtime effect
        StmtKind::TypeAlias { .. } => Value::Unit,
        StmtKind::For {
            var,
            iterable,
            body,
        } => eval_for(var, iterable, body, env),
        StmtKind::Expr(expr) => eval_expr(expr, env),
    }
}

fn define(
    name: &mica_ast::Ident,
    value: &Expr,
    mutable: bool,
    env: &Rc<RefCell<Environment>>,
) -> Value {
    let value = eval_expr(value, env);
    if value.is_error() {
        return value;
    }
    match env.borrow_mut().define(name.node.clone(), value, mutable) {
        DefineStatus::NoError => Value::Unit,
        DefineStatus::Duplicate => Value::error(
            format!("duplicate binding `{}` in this scope", name.node),
            name.span,
        ),
    }
}

fn eval_for(
    var: &mica_ast::Ident,
    iterable: &Expr,
    body: &Block,
    env: &Rc<RefCell<Environment>>,
) -> Value {
    let iter_value = eval_expr(iterable, env);
    match iter_value {
        Value::Error(_) => iter_value,
        // ranges iterate lazily; materializing one would let a large bound
        // exhaust memory
        Value::Range { start, end } => {
            for i in start..end {
                let result = run_iteration(var, Value::Int(i), body, env);
                if result.is_error() {
                    return result;
                }
            }
            Value::Unit
        }
        // snapshot the array so the body can mutate it freely
        Value::Array(items) => {
            let items: Vec<Value> = items.borrow().clone();
            for item in items {
                let result = run_iteration(var, item, body, env);
                if result.is_error() {
                    return result;
                }
            }
            Value::Unit
        }
        other => Value::error(
            format!("cannot iterate over a value of type {}", other.type_name()),
            iterable.span,
        ),
    }
}

/// One loop pass: a fresh child scope holding the iteration variable.
fn run_iteration(
    var: &mica_ast::Ident,
    item: Value,
    body: &Block,
    env: &Rc<RefCell<Environment>>,
) -> Value {
    let scope = Rc::new(RefCell::new(Environment::with_parent(env.clone())));
    let status = scope.borrow_mut().define(var.node.clone(), item, false);
    if status == DefineStatus::Duplicate {
        return Value::error(
            format!("duplicate binding `{}` in this scope", var.node),
            var.span,
        );
    }
    for stmt in &body.stmts {
        let result = eval_stmt(stmt, &scope);
        if result.is_error() {
            return result;
        }
    }
    Value::Unit
}

/// Evaluate a block in a fresh child scope. The block's value is the value
/// of its trailing expression statement, `Unit` otherwise.
pub fn eval_block(block: &Block, env: &Rc<RefCell<Environment>>) -> Value {
    let scope = Rc::new(RefCell::new(Environment::with_parent(env.clone())));
    let mut last = Value::Unit;
    for stmt in &block.stmts {
        last = eval_stmt(stmt, &scope);
        if last.is_error() {
            return last;
        }
    }
    last
}

/// Evaluate an expression.
pub fn eval_expr(expr: &Expr, env: &Rc<RefCell<Environment>>) -> Value {
    match &expr.kind {
        ExprKind::Int(n) => Value::Int(*n),
        ExprKind::Float(n) => Value::Float(*n),
        ExprKind::Str(s) => Value::Str(s.clone()),
        ExprKind::Bool(b) => Value::Bool(*b),

        ExprKind::Ident(name) => match env.borrow().get(name) {
            Some(value) => value,
            None => Value::error(format!("unknown identifier `{}`", name), expr.span),
        },

        ExprKind::Unary { op, operand } => {
            let value = eval_expr(operand, env);
            if value.is_error() {
                return value;
            }
            match (op, value) {
                (UnaryOp::Neg, Value::Int(n)) => int_arith(n.checked_neg(), operand.span),
                (UnaryOp::Neg, Value::Float(n)) => Value::Float(-n),
                (UnaryOp::Not, Value::Bool(b)) => Value::Bool(!b),
                (op, value) => Value::error(
                    format!("cannot apply `{}` to {}", op, value.type_name()),
                    operand.span,
                ),
            }
        }

        ExprKind::Binary { op, left, right } => {
            let lhs = eval_expr(left, env);
            if lhs.is_error() {
                return lhs;
            }
            let rhs = eval_expr(right, env);
            if rhs.is_error() {
                return rhs;
            }
            apply_binary(*op, lhs, rhs, expr.span)
        }

        ExprKind::Assign { name, value } => {
            let value = eval_expr(value, env);
            if value.is_error() {
                return value;
            }
            match env.borrow_mut().assign(&name.node, value) {
                AssignStatus::Assigned => Value::Unit,
                AssignStatus::Immutable => Value::error(
                    format!("cannot assign to immutable binding `{}`", name.node),
                    name.span,
                ),
                AssignStatus::Undefined => Value::error(
                    format!("cannot assign to undefined variable `{}`", name.node),
                    name.span,
                ),
            }
        }

        ExprKind::Range { start, end } => {
            let start_value = eval_expr(start, env);
            if start_value.is_error() {
                return start_value;
            }
            let end_value = eval_expr(end, env);
            if end_value.is_error() {
                return end_value;
            }
            match (start_value, end_value) {
                (Value::Int(s), Value::Int(e)) => Value::Range { start: s, end: e },
                (s, e) => Value::error(
                    format!(
                        "range bounds must be Int, found {} and {}",
                        s.type_name(),
                        e.type_name()
                    ),
                    expr.span,
                ),
            }
        }

        ExprKind::Func { params, body, .. } => Value::Func(Rc::new(Closure {
            params: params.clone(),
            body: (**body).clone(),
            env: env.clone(),
        })),

        ExprKind::Call { callee, args } => {
            let callee_value = eval_expr(callee, env);
            if callee_value.is_error() {
                return callee_value;
            }
            let mut arg_values = Vec::with_capacity(args.len());
            for arg in args {
                let value = eval_expr(arg, env);
                if value.is_error() {
                    return value;
                }
                arg_values.push(value);
            }
            match callee_value {
                Value::Func(closure) => call_closure(&closure, arg_values, expr.span),
                other => Value::error(
                    format!("cannot call a value of type {}", other.type_name()),
                    callee.span,
                ),
            }
        }

        ExprKind::Array(elements) => {
            let mut values = Vec::with_capacity(elements.len());
            for element in elements {
                let value = eval_expr(element, env);
                if value.is_error() {
                    return value;
                }
                values.push(value);
            }
            Value::Array(Rc::new(RefCell::new(values)))
        }

        ExprKind::StructLit(fields) => {
            let mut map = IndexMap::with_capacity(fields.len());
            for (name, value) in fields {
                let value = eval_expr(value, env);
                if value.is_error() {
                    return value;
                }
                map.insert(name.node.clone(), value);
            }
            Value::Struct(Rc::new(RefCell::new(map)))
        }

        ExprKind::If { cond, then, els } => {
            // the condition is eager, the branches are not: exactly one runs
            let cond_value = eval_expr(cond, env);
            match cond_value {
                Value::Error(_) => cond_value,
                Value::Bool(true) => eval_block(then, env),
                Value::Bool(false) => match els {
                    Some(els) => eval_block(els, env),
                    None => Value::Unit,
                },
                other => Value::error(
                    format!("condition must be Bool, found {}", other.type_name()),
                    cond.span,
                ),
            }
        }

        ExprKind::Block(block) => eval_block(block, env),

        ExprKind::Field { object, name } => {
            let object_value = eval_expr(object, env);
            match &object_value {
                Value::Error(_) => object_value,
                Value::Struct(fields) => match fields.borrow().get(&name.node) {
                    Some(value) => value.clone(),
                    None => Value::error(format!("no field `{}`", name.node), name.span),
                },
                other => Value::error(
                    format!(
                        "no field `{}` on a value of type {}",
                        name.node,
                        other.type_name()
                    ),
                    name.span,
                ),
            }
        }

        ExprKind::Index { object, index } => {
            let object_value = eval_expr(object, env);
            if object_value.is_error() {
                return object_value;
            }
            let index_value = eval_expr(index, env);
            if index_value.is_error() {
                return index_value;
            }
            match (object_value, index_value) {
                (Value::Array(items), Value::Int(i)) => {
                    let items = items.borrow();
                    if i < 0 || i as usize >= items.len() {
                        Value::error(
                            format!("index {} out of bounds (len {})", i, items.len()),
                            index.span,
                        )
                    } else {
                        items[i as usize].clone()
                    }
                }
                (Value::Array(_), idx) => Value::error(
                    format!("array index must be Int, found {}", idx.type_name()),
                    index.span,
                ),
                (other, _) => Value::error(
                    format!("cannot index a value of type {}", other.type_name()),
                    object.span,
                ),
            }
        }
    }
}

/// Apply a function value: a fresh scope is parented at the environment the
/// closure captured, never the caller's. Omitted trailing arguments fall
/// back to parameter defaults, evaluated in the call scope.
fn call_closure(closure: &Closure, args: Vec<Value>, call_span: Span) -> Value {
    if args.len() > closure.params.len() {
        return Value::error(
            format!(
                "too many arguments: expected at most {}, found {}",
                closure.params.len(),
                args.len()
            ),
            call_span,
        );
    }

    let scope = Rc::new(RefCell::new(Environment::with_parent(closure.env.clone())));
    let mut args = args.into_iter();
    for param in &closure.params {
        let value = match args.next() {
            Some(value) => value,
            None => match &param.default {
                Some(default) => {
                    let value = eval_expr(default, &scope);
                    if value.is_error() {
                        return value;
                    }
                    value
                }
                None => {
                    return Value::error(
                        format!("missing argument for parameter `{}`", param.name.node),
                        call_span,
                    )
                }
            },
        };
        let status = scope
            .borrow_mut()
            .define(param.name.node.clone(), value, false);
        if status == DefineStatus::Duplicate {
            return Value::error(
                format!("duplicate parameter `{}`", param.name.node),
                param.name.span,
            );
        }
    }

    eval_expr(&closure.body, &scope)
}

fn int_arith(result: Option<i64>, span: Span) -> Value {
    match result {
        Some(n) => Value::Int(n),
        None => Value::error("integer overflow", span),
    }
}

fn apply_binary(op: BinaryOp, lhs: Value, rhs: Value, span: Span) -> Value {
    use BinaryOp::*;
    use Value::*;

    match (op, lhs, rhs) {
        // equality is structural over every value kind
        (Eq, a, b) => Bool(a == b),
        (NotEq, a, b) => Bool(a != b),

        // integer arithmetic; out-of-range results are error values, never
        // a process abort
        (Add, Int(a), Int(b)) => int_arith(a.checked_add(b), span),
        (Sub, Int(a), Int(b)) => int_arith(a.checked_sub(b), span),
        (Mul, Int(a), Int(b)) => int_arith(a.checked_mul(b), span),
        (Div, Int(_), Int(0)) => Value::error("division by zero", span),
        (Div, Int(a), Int(b)) => int_arith(a.checked_div(b), span),

        // mixed numeric arithmetic promotes to float
        (op, Int(a), Float(b)) => apply_binary(op, Float(a as f64), Float(b), span),
        (op, Float(a), Int(b)) => apply_binary(op, Float(a), Float(b as f64), span),
        (Add, Float(a), Float(b)) => Float(a + b),
        (Sub, Float(a), Float(b)) => Float(a - b),
        (Mul, Float(a), Float(b)) => Float(a * b),
        (Div, Float(_), Float(b)) if b == 0.0 => Value::error("division by zero", span),
        (Div, Float(a), Float(b)) => Float(a / b),

        // string concatenation
        (Add, Str(a), Str(b)) => Str(format!("{}{}", a, b).into()),

        // numeric comparison
        (Lt, Int(a), Int(b)) => Bool(a < b),
        (Gt, Int(a), Int(b)) => Bool(a > b),
        (LtEq, Int(a), Int(b)) => Bool(a <= b),
        (GtEq, Int(a), Int(b)) => Bool(a >= b),
        (Lt, Float(a), Float(b)) => Bool(a < b),
        (Gt, Float(a), Float(b)) => Bool(a > b),
        (LtEq, Float(a), Float(b)) => Bool(a <= b),
        (GtEq, Float(a), Float(b)) => Bool(a >= b),

        (op, a, b) => Value::error(
            format!(
                "cannot apply `{}` to {} and {}",
                op,
                a.type_name(),
                b.type_name()
            ),
            span,
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn run(source: &str) -> Value {
        let (module, errors) = mica_parser::parse(source);
        assert!(errors.is_empty(), "parse errors for {source:?}: {errors:?}");
        let env = Rc::new(RefCell::new(Environment::new()));
        eval_module(&module, &env)
    }

    #[test]
    fn test_binary_promotion() {
        assert_eq!(apply_binary(BinaryOp::Add, Value::Int(2), Value::Int(3), Span::dummy()), Value::Int(5));
        assert_eq!(
            apply_binary(BinaryOp::Mul, Value::Int(2), Value::Float(1.5), Span::dummy()),
            Value::Float(3.0)
        );
    }

    #[test]
    fn test_division_by_zero_is_an_error_value() {
        assert!(run("1 / 0").is_error());
        assert!(run("1.0 / 0.0").is_error());
        assert_eq!(run("4 / 2"), Value::Int(2));
    }

    #[test]
    fn test_comparison_mixes_ints_and_floats() {
        assert_eq!(run("1 < 1.5"), Value::Bool(true));
        assert_eq!(run("2 >= 2.0"), Value::Bool(true));
    }

    #[test]
    fn test_type_confusion_is_an_error_value() {
        let result = run("1 + true");
        match result {
            Value::Error(e) => assert!(e.message.contains("Int") && e.message.contains("Bool")),
            other => panic!("expected an error value, got {other:?}"),
        }
    }

    #[test]
    fn test_if_runs_exactly_one_branch() {
        // the untaken branch would fail if evaluated
        assert_eq!(run("if true { 1 } else { 1 / 0 }"), Value::Int(1));
        assert_eq!(run("if false { 1 / 0 } else { 2 }"), Value::Int(2));
        assert_eq!(run("if false { 1 }"), Value::Unit);
    }

    #[test]
    fn test_string_indexing_is_rejected() {
        assert!(run(r#""abc"[0]"#).is_error());
    }
}
