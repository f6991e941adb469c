//! Mica Language Type System
//!
//! Semantic type representations and the type checker. The checker runs a
//! single top-down pass over a parsed module and never aborts: every
//! diagnostic is collected, the offending node is typed `Error`, and
//! checking continues. `Error` is compatible with everything, so one
//! mistake does not cascade into a wall of follow-on diagnostics.
//!
//! Inferred types land in a [`TypeTable`] keyed by the parser-assigned
//! [`NodeId`]s; the tree itself is never mutated.

use std::fmt;

use mica_ast::{
    BinaryOp, Block, Expr, ExprKind, Module, NodeId, Span, Stmt, StmtKind, TypeExpr, UnaryOp,
};
use rustc_hash::FxHashMap;
use smol_str::SmolStr;
use thiserror::Error;

// ============================================================================
// Types
// ============================================================================

/// A resolved semantic type.
///
/// `Display` renders the canonical signature; structural equality is
/// field-wise and therefore coincides with signature equality.
#[derive(Debug, Clone, PartialEq)]
pub enum Type {
    Int,
    Float,
    Bool,
    Str,
    Unit,
    Null,

    /// Placeholder assigned to nodes that failed to check. Compatible with
    /// every type to suppress cascading diagnostics.
    Error,

    /// Function type: `(Int, Int) => Int`
    Func { params: Vec<Type>, ret: Box<Type> },

    /// Parametrized type: `Array[Int]`, `Range[Int]`
    Parametrized { name: SmolStr, args: Vec<Type> },

    /// Structural type: `{ x: Int, y: Int }`, fields in declaration order
    Struct(Vec<(SmolStr, Type)>),
}

impl Type {
    pub fn is_numeric(&self) -> bool {
        matches!(self, Type::Int | Type::Float)
    }

    pub fn array(elem: Type) -> Type {
        Type::Parametrized {
            name: SmolStr::new("Array"),
            args: vec![elem],
        }
    }

    pub fn range(elem: Type) -> Type {
        Type::Parametrized {
            name: SmolStr::new("Range"),
            args: vec![elem],
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Int => write!(f, "Int"),
            Type::Float => write!(f, "Float"),
            Type::Bool => write!(f, "Bool"),
            Type::Str => write!(f, "String"),
            Type::Unit => write!(f, "Unit"),
            Type::Null => write!(f, "Null"),
            Type::Error => write!(f, "<error>"),
            Type::Func { params, ret } => {
                write!(f, "(")?;
                for (i, p) in params.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", p)?;
                }
                write!(f, ") => {}", ret)
            }
            Type::Parametrized { name, args } => {
                write!(f, "{}[", name)?;
                for (i, a) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", a)?;
                }
                write!(f, "]")
            }
            Type::Struct(fields) => {
                write!(f, "{{ ")?;
                for (i, (name, ty)) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", name, ty)?;
                }
                write!(f, " }}")
            }
        }
    }
}

// ============================================================================
// Errors
// ============================================================================

/// Type checking diagnostics. All carry a source span; hosts render
/// line/column with `Position::of`.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum TypeError {
    #[error("Unknown identifier `{name}`")]
    UnknownIdentifier { name: SmolStr, span: Span },

    #[error("Unknown type name `{name}`")]
    UnknownTypeName { name: SmolStr, span: Span },

    #[error("Type mismatch: expected `{expected}`, found `{found}`")]
    Mismatch {
        expected: Type,
        found: Type,
        span: Span,
    },

    #[error("Expected a numeric operand, found `{found}`")]
    NonNumericOperand { found: Type, span: Span },

    #[error("Expected a `Bool` operand, found `{found}`")]
    NonBoolOperand { found: Type, span: Span },

    #[error("Condition must be `Bool`, found `{found}`")]
    NonBoolCondition { found: Type, span: Span },

    #[error("Wrong number of arguments: expected at most {expected}, found {found}")]
    WrongArity {
        expected: usize,
        found: usize,
        span: Span,
    },

    #[error("Cannot call a value of type `{found}`")]
    NotCallable { found: Type, span: Span },

    #[error("Cannot index a value of type `{found}`")]
    NotIndexable { found: Type, span: Span },

    #[error("No field `{field}` on value of type `{object}`")]
    UnknownField {
        field: SmolStr,
        object: Type,
        span: Span,
    },

    #[error("Duplicate binding `{name}` in this scope")]
    DuplicateBinding { name: SmolStr, span: Span },

    #[error("Parameter `{name}` needs a type annotation or a default value")]
    MissingParamType { name: SmolStr, span: Span },

    #[error("Return type mismatch: declared `{declared}`, body has type `{found}`")]
    ReturnMismatch {
        declared: Type,
        found: Type,
        span: Span,
    },

    #[error("If branches disagree: `{then_ty}` vs `{else_ty}`")]
    BranchMismatch {
        then_ty: Type,
        else_ty: Type,
        span: Span,
    },

    #[error("Cannot assign to immutable binding `{name}`")]
    AssignToImmutable { name: SmolStr, span: Span },

    #[error("Cannot assign to undefined variable `{name}`")]
    AssignToUndefined { name: SmolStr, span: Span },

    #[error("Cannot iterate over a value of type `{found}`")]
    NotIterable { found: Type, span: Span },
}

impl TypeError {
    pub fn span(&self) -> Span {
        match self {
            TypeError::UnknownIdentifier { span, .. }
            | TypeError::UnknownTypeName { span, .. }
            | TypeError::Mismatch { span, .. }
            | TypeError::NonNumericOperand { span, .. }
            | TypeError::NonBoolOperand { span, .. }
            | TypeError::NonBoolCondition { span, .. }
            | TypeError::WrongArity { span, .. }
            | TypeError::NotCallable { span, .. }
            | TypeError::NotIndexable { span, .. }
            | TypeError::UnknownField { span, .. }
            | TypeError::DuplicateBinding { span, .. }
            | TypeError::MissingParamType { span, .. }
            | TypeError::ReturnMismatch { span, .. }
            | TypeError::BranchMismatch { span, .. }
            | TypeError::AssignToImmutable { span, .. }
            | TypeError::AssignToUndefined { span, .. }
            | TypeError::NotIterable { span, .. } => *span,
        }
    }
}

// ============================================================================
// Type Table
// ============================================================================

/// Side table mapping expression nodes to their inferred types.
#[derive(Debug, Clone, Default)]
pub struct TypeTable {
    map: FxHashMap<NodeId, Type>,
}

impl TypeTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, id: NodeId, ty: Type) {
        self.map.insert(id, ty);
    }

    pub fn get(&self, id: NodeId) -> Option<&Type> {
        self.map.get(&id)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&NodeId, &Type)> {
        self.map.iter()
    }
}

// ============================================================================
// Environment
// ============================================================================

#[derive(Debug, Clone)]
pub struct VarInfo {
    pub ty: Type,
    pub mutable: bool,
}

#[derive(Debug, Clone, Default)]
struct Scope {
    variables: FxHashMap<SmolStr, VarInfo>,
    types: FxHashMap<SmolStr, Type>,
}

/// Lexically scoped symbol table: a stack of scopes, innermost last.
/// `push_scope`/`pop_scope` must nest strictly.
#[derive(Debug, Clone)]
pub struct TypeEnv {
    scopes: Vec<Scope>,
}

impl TypeEnv {
    /// An environment with one empty scope and no names defined.
    pub fn new() -> Self {
        Self {
            scopes: vec![Scope::default()],
        }
    }

    /// An environment with the primitive type names pre-defined.
    pub fn prelude() -> Self {
        let mut env = Self::new();
        for (name, ty) in [
            ("Int", Type::Int),
            ("Float", Type::Float),
            ("Bool", Type::Bool),
            ("String", Type::Str),
            ("Unit", Type::Unit),
            ("Null", Type::Null),
        ] {
            env.define_type(SmolStr::new(name), ty);
        }
        env
    }

    pub fn push_scope(&mut self) {
        self.scopes.push(Scope::default());
    }

    pub fn pop_scope(&mut self) {
        debug_assert!(self.scopes.len() > 1, "cannot pop the root scope");
        self.scopes.pop();
    }

    fn local(&mut self) -> &mut Scope {
        self.scopes.last_mut().expect("at least one scope")
    }

    /// Define a variable in the innermost scope. Returns `false` when the
    /// name is already bound there; shadowing an outer scope is fine.
    pub fn define_var(&mut self, name: SmolStr, ty: Type, mutable: bool) -> bool {
        let scope = self.local();
        if scope.variables.contains_key(&name) {
            return false;
        }
        scope.variables.insert(name, VarInfo { ty, mutable });
        true
    }

    /// Define a type alias in the innermost scope.
    pub fn define_type(&mut self, name: SmolStr, ty: Type) -> bool {
        let scope = self.local();
        if scope.types.contains_key(&name) {
            return false;
        }
        scope.types.insert(name, ty);
        true
    }

    pub fn lookup_var(&self, name: &str) -> Option<&VarInfo> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.variables.get(name))
    }

    pub fn lookup_type(&self, name: &str) -> Option<&Type> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.types.get(name))
    }
}

impl Default for TypeEnv {
    fn default() -> Self {
        Self::prelude()
    }
}

// ============================================================================
// Checker
// ============================================================================

/// Check a module, returning the inferred types and all diagnostics.
pub fn check(module: &Module, env: &mut TypeEnv) -> (TypeTable, Vec<TypeError>) {
    let mut checker = TypeChecker::new();
    for stmt in &module.stmts {
        checker.check_stmt(stmt, env);
    }
    (checker.table, checker.errors)
}

struct TypeChecker {
    table: TypeTable,
    errors: Vec<TypeError>,
}

/// `found` is acceptable where `expected` is wanted. Int widens to Float;
/// `Error` on either side is always acceptable.
fn compat(found: &Type, expected: &Type) -> bool {
    if found == expected || matches!(found, Type::Error) || matches!(expected, Type::Error) {
        return true;
    }
    matches!((found, expected), (Type::Int, Type::Float))
}

impl TypeChecker {
    fn new() -> Self {
        Self {
            table: TypeTable::new(),
            errors: Vec::new(),
        }
    }

    fn error(&mut self, error: TypeError) {
        self.errors.push(error);
    }

    fn check_stmt(&mut self, stmt: &Stmt, env: &mut TypeEnv) {
        match &stmt.kind {
            StmtKind::Let {
                name, ty, value, ..
            } => self.check_binding(name, ty.as_ref(), value, false, env),
            StmtKind::Var {
                name, ty, value, ..
            } => self.check_binding(name, ty.as_ref(), value, true, env),
            StmtKind::TypeAlias { name, ty, .. } => {
                let resolved = self.resolve_type_expr(ty, env);
                if !env.define_type(name.node.clone(), resolved) {
                    self.error(TypeError::DuplicateBinding {
                        name: name.node.clone(),
                        span: name.span,
                    });
                }
            }
            StmtKind::For {
                var,
                iterable,
                body,
            } => {
                let iter_ty = self.infer_expr(iterable, env);
                let elem_ty = self.element_type(&iter_ty, iterable.span);
                env.push_scope();
                env.define_var(var.node.clone(), elem_ty, false);
                for stmt in &body.stmts {
                    self.check_stmt(stmt, env);
                }
                env.pop_scope();
            }
            StmtKind::Expr(expr) => {
                self.infer_expr(expr, env);
            }
        }
    }

    fn check_binding(
        &mut self,
        name: &mica_ast::Ident,
        annotation: Option<&TypeExpr>,
        value: &Expr,
        mutable: bool,
        env: &mut TypeEnv,
    ) {
        let value_ty = self.infer_expr(value, env);
        let binding_ty = match annotation {
            Some(te) => {
                let declared = self.resolve_type_expr(te, env);
                if !compat(&value_ty, &declared) {
                    self.error(TypeError::Mismatch {
                        expected: declared.clone(),
                        found: value_ty,
                        span: value.span,
                    });
                }
                declared
            }
            None => value_ty,
        };
        if !env.define_var(name.node.clone(), binding_ty, mutable) {
            self.error(TypeError::DuplicateBinding {
                name: name.node.clone(),
                span: name.span,
            });
        }
    }

    /// The binding type for a loop variable iterating over `iter_ty`.
    fn element_type(&mut self, iter_ty: &Type, span: Span) -> Type {
        match iter_ty {
            Type::Error => Type::Error,
            Type::Parametrized { name, args } if args.len() == 1 => match name.as_str() {
                "Range" | "Array" => args[0].clone(),
                _ => {
                    self.error(TypeError::NotIterable {
                        found: iter_ty.clone(),
                        span,
                    });
                    Type::Error
                }
            },
            _ => {
                self.error(TypeError::NotIterable {
                    found: iter_ty.clone(),
                    span,
                });
                Type::Error
            }
        }
    }

    /// Infer an expression's type, recording it in the table.
    fn infer_expr(&mut self, expr: &Expr, env: &mut TypeEnv) -> Type {
        let ty = self.infer_expr_inner(expr, env);
        self.table.record(expr.id, ty.clone());
        ty
    }

    fn infer_expr_inner(&mut self, expr: &Expr, env: &mut TypeEnv) -> Type {
        match &expr.kind {
            ExprKind::Int(_) => Type::Int,
            ExprKind::Float(_) => Type::Float,
            ExprKind::Str(_) => Type::Str,
            ExprKind::Bool(_) => Type::Bool,

            ExprKind::Ident(name) => match env.lookup_var(name) {
                Some(info) => info.ty.clone(),
                None => {
                    self.error(TypeError::UnknownIdentifier {
                        name: name.clone(),
                        span: expr.span,
                    });
                    Type::Error
                }
            },

            ExprKind::Unary { op, operand } => {
                let operand_ty = self.infer_expr(operand, env);
                match op {
                    UnaryOp::Neg => {
                        if operand_ty.is_numeric() || operand_ty == Type::Error {
                            operand_ty
                        } else {
                            self.error(TypeError::NonNumericOperand {
                                found: operand_ty,
                                span: operand.span,
                            });
                            Type::Error
                        }
                    }
                    UnaryOp::Not => {
                        if matches!(operand_ty, Type::Bool | Type::Error) {
                            Type::Bool
                        } else {
                            self.error(TypeError::NonBoolOperand {
                                found: operand_ty,
                                span: operand.span,
                            });
                            Type::Error
                        }
                    }
                }
            }

            ExprKind::Binary { op, left, right } => {
                let lt = self.infer_expr(left, env);
                let rt = self.infer_expr(right, env);
                self.check_binary(*op, lt, rt, left.span, right.span)
            }

            ExprKind::Assign { name, value } => {
                let value_ty = self.infer_expr(value, env);
                match env.lookup_var(&name.node) {
                    None => {
                        self.error(TypeError::AssignToUndefined {
                            name: name.node.clone(),
                            span: name.span,
                        });
                    }
                    Some(info) => {
                        if !info.mutable {
                            self.error(TypeError::AssignToImmutable {
                                name: name.node.clone(),
                                span: name.span,
                            });
                        } else if !compat(&value_ty, &info.ty) {
                            self.error(TypeError::Mismatch {
                                expected: info.ty.clone(),
                                found: value_ty,
                                span: value.span,
                            });
                        }
                    }
                }
                Type::Unit
            }

            ExprKind::Range { start, end } => {
                let st = self.infer_expr(start, env);
                let et = self.infer_expr(end, env);
                if st == Type::Error || et == Type::Error {
                    return Type::Error;
                }
                let mut ok = true;
                if st != Type::Int {
                    self.error(TypeError::Mismatch {
                        expected: Type::Int,
                        found: st,
                        span: start.span,
                    });
                    ok = false;
                }
                if et != Type::Int {
                    self.error(TypeError::Mismatch {
                        expected: Type::Int,
                        found: et,
                        span: end.span,
                    });
                    ok = false;
                }
                if ok {
                    Type::range(Type::Int)
                } else {
                    Type::Error
                }
            }

            ExprKind::Func {
                params,
                return_ty,
                body,
            } => self.check_func(params, return_ty.as_ref(), body, env),

            ExprKind::Call { callee, args } => {
                let callee_ty = self.infer_expr(callee, env);
                let arg_tys: Vec<Type> = args.iter().map(|a| self.infer_expr(a, env)).collect();
                match callee_ty {
                    Type::Error => Type::Error,
                    Type::Func { params, ret } => {
                        // trailing parameters may be filled by defaults, so
                        // only an excess of arguments is a definite error
                        if arg_tys.len() > params.len() {
                            self.error(TypeError::WrongArity {
                                expected: params.len(),
                                found: arg_tys.len(),
                                span: expr.span,
                            });
                        }
                        for (i, (arg_ty, param_ty)) in arg_tys.iter().zip(&params).enumerate() {
                            if !compat(arg_ty, param_ty) {
                                self.error(TypeError::Mismatch {
                                    expected: param_ty.clone(),
                                    found: arg_ty.clone(),
                                    span: args[i].span,
                                });
                            }
                        }
                        *ret
                    }
                    other => {
                        self.error(TypeError::NotCallable {
                            found: other,
                            span: callee.span,
                        });
                        Type::Error
                    }
                }
            }

            ExprKind::Array(elements) => {
                let tys: Vec<Type> = elements.iter().map(|e| self.infer_expr(e, env)).collect();
                let elem_ty = match tys.first() {
                    None => Type::Null,
                    Some(first) => {
                        for (i, ty) in tys.iter().enumerate().skip(1) {
                            if !compat(ty, first) {
                                self.error(TypeError::Mismatch {
                                    expected: first.clone(),
                                    found: ty.clone(),
                                    span: elements[i].span,
                                });
                            }
                        }
                        first.clone()
                    }
                };
                Type::array(elem_ty)
            }

            ExprKind::StructLit(fields) => {
                let field_tys = fields
                    .iter()
                    .map(|(name, value)| (name.node.clone(), self.infer_expr(value, env)))
                    .collect();
                Type::Struct(field_tys)
            }

            ExprKind::If { cond, then, els } => {
                let cond_ty = self.infer_expr(cond, env);
                if !matches!(cond_ty, Type::Bool | Type::Error) {
                    self.error(TypeError::NonBoolCondition {
                        found: cond_ty,
                        span: cond.span,
                    });
                }
                let then_ty = self.check_block(then, env);
                match els {
                    None => Type::Unit,
                    Some(els) => {
                        let else_ty = self.check_block(els, env);
                        self.join_branches(then_ty, else_ty, expr.span)
                    }
                }
            }

            ExprKind::Block(block) => self.check_block(block, env),

            ExprKind::Field { object, name } => {
                let obj_ty = self.infer_expr(object, env);
                match &obj_ty {
                    Type::Error => Type::Error,
                    Type::Struct(fields) => {
                        match fields.iter().find(|(fname, _)| fname == &name.node) {
                            Some((_, ty)) => ty.clone(),
                            None => {
                                self.error(TypeError::UnknownField {
                                    field: name.node.clone(),
                                    object: obj_ty.clone(),
                                    span: name.span,
                                });
                                Type::Error
                            }
                        }
                    }
                    _ => {
                        self.error(TypeError::UnknownField {
                            field: name.node.clone(),
                            object: obj_ty,
                            span: name.span,
                        });
                        Type::Error
                    }
                }
            }

            ExprKind::Index { object, index } => {
                let obj_ty = self.infer_expr(object, env);
                let idx_ty = self.infer_expr(index, env);
                if idx_ty != Type::Int && idx_ty != Type::Error {
                    self.error(TypeError::Mismatch {
                        expected: Type::Int,
                        found: idx_ty,
                        span: index.span,
                    });
                }
                match obj_ty {
                    Type::Error => Type::Error,
                    Type::Parametrized { ref name, ref args }
                        if name == "Array" && args.len() == 1 =>
                    {
                        args[0].clone()
                    }
                    other => {
                        self.error(TypeError::NotIndexable {
                            found: other,
                            span: object.span,
                        });
                        Type::Error
                    }
                }
            }
        }
    }

    fn check_binary(
        &mut self,
        op: BinaryOp,
        lt: Type,
        rt: Type,
        left_span: Span,
        right_span: Span,
    ) -> Type {
        if op.is_equality() {
            // equality always types Bool; incomparable operands are still
            // diagnosed so `1 == "one"` does not pass silently
            if !compat(&lt, &rt) && !compat(&rt, &lt) {
                self.error(TypeError::Mismatch {
                    expected: lt,
                    found: rt,
                    span: right_span,
                });
            }
            return Type::Bool;
        }

        if lt == Type::Error || rt == Type::Error {
            return Type::Error;
        }

        if op.is_comparison() {
            if !lt.is_numeric() {
                self.error(TypeError::NonNumericOperand {
                    found: lt,
                    span: left_span,
                });
                return Type::Error;
            }
            if !rt.is_numeric() {
                self.error(TypeError::NonNumericOperand {
                    found: rt,
                    span: right_span,
                });
                return Type::Error;
            }
            return Type::Bool;
        }

        // arithmetic
        if op == BinaryOp::Add && lt == Type::Str && rt == Type::Str {
            return Type::Str;
        }
        if !lt.is_numeric() {
            self.error(TypeError::NonNumericOperand {
                found: lt,
                span: left_span,
            });
            return Type::Error;
        }
        if !rt.is_numeric() {
            self.error(TypeError::NonNumericOperand {
                found: rt,
                span: right_span,
            });
            return Type::Error;
        }
        if lt == Type::Float || rt == Type::Float {
            Type::Float
        } else {
            Type::Int
        }
    }

    fn check_func(
        &mut self,
        params: &[mica_ast::Param],
        return_ty: Option<&TypeExpr>,
        body: &Expr,
        env: &mut TypeEnv,
    ) -> Type {
        // parameter types resolve in the enclosing scope; a default's type
        // stands in when the annotation is missing
        let mut param_tys = Vec::with_capacity(params.len());
        for param in params {
            let ty = match (&param.ty, &param.default) {
                (Some(te), default) => {
                    let declared = self.resolve_type_expr(te, env);
                    if let Some(default) = default {
                        let default_ty = self.infer_expr(default, env);
                        if !compat(&default_ty, &declared) {
                            self.error(TypeError::Mismatch {
                                expected: declared.clone(),
                                found: default_ty,
                                span: default.span,
                            });
                        }
                    }
                    declared
                }
                (None, Some(default)) => self.infer_expr(default, env),
                (None, None) => {
                    self.error(TypeError::MissingParamType {
                        name: param.name.node.clone(),
                        span: param.span,
                    });
                    Type::Error
                }
            };
            param_tys.push(ty);
        }

        env.push_scope();
        for (param, ty) in params.iter().zip(&param_tys) {
            if !env.define_var(param.name.node.clone(), ty.clone(), false) {
                self.error(TypeError::DuplicateBinding {
                    name: param.name.node.clone(),
                    span: param.name.span,
                });
            }
        }
        let body_ty = self.infer_expr(body, env);
        env.pop_scope();

        let ret = match return_ty {
            Some(te) => {
                let declared = self.resolve_type_expr(te, env);
                if !compat(&body_ty, &declared) {
                    self.error(TypeError::ReturnMismatch {
                        declared: declared.clone(),
                        found: body_ty,
                        span: body.span,
                    });
                }
                declared
            }
            None => body_ty,
        };

        Type::Func {
            params: param_tys,
            ret: Box::new(ret),
        }
    }

    fn check_block(&mut self, block: &Block, env: &mut TypeEnv) -> Type {
        env.push_scope();
        for stmt in &block.stmts {
            self.check_stmt(stmt, env);
        }
        let ty = match block.stmts.last() {
            Some(Stmt {
                kind: StmtKind::Expr(e),
                ..
            }) => self.table.get(e.id).cloned().unwrap_or(Type::Error),
            _ => Type::Unit,
        };
        env.pop_scope();
        ty
    }

    fn join_branches(&mut self, then_ty: Type, else_ty: Type, span: Span) -> Type {
        match (&then_ty, &else_ty) {
            (Type::Error, _) => else_ty,
            (_, Type::Error) => then_ty,
            _ if then_ty == else_ty => then_ty,
            (Type::Int, Type::Float) | (Type::Float, Type::Int) => Type::Float,
            _ => {
                self.error(TypeError::BranchMismatch {
                    then_ty,
                    else_ty,
                    span,
                });
                Type::Error
            }
        }
    }

    /// Resolve a surface type expression to a semantic type.
    fn resolve_type_expr(&mut self, te: &TypeExpr, env: &mut TypeEnv) -> Type {
        match te {
            TypeExpr::Basic(name) => match env.lookup_type(&name.node) {
                Some(ty) => ty.clone(),
                None => {
                    self.error(TypeError::UnknownTypeName {
                        name: name.node.clone(),
                        span: name.span,
                    });
                    Type::Error
                }
            },
            TypeExpr::Parametrized { name, args, .. } => {
                let args = args
                    .iter()
                    .map(|a| self.resolve_type_expr(a, env))
                    .collect();
                Type::Parametrized {
                    name: name.node.clone(),
                    args,
                }
            }
            TypeExpr::Func { params, ret, .. } => {
                let params = params
                    .iter()
                    .map(|p| self.resolve_type_expr(p, env))
                    .collect();
                let ret = Box::new(self.resolve_type_expr(ret, env));
                Type::Func { params, ret }
            }
            TypeExpr::Struct { fields, .. } => {
                let fields = fields
                    .iter()
                    .map(|(name, ty)| (name.node.clone(), self.resolve_type_expr(ty, env)))
                    .collect();
                Type::Struct(fields)
            }
        }
    }
}
