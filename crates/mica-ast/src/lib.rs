//! Mica Language Abstract Syntax Tree
//!
//! Defines all AST node types for the Mica programming language.
//! The tree is a passive data model: the parser builds it, the type
//! checker annotates it through `NodeId` side tables, and the
//! interpreter walks it.

use std::fmt;

use rustc_hash::FxHashMap;

// Re-export common types for use by other crates
pub use mica_lexer::Span;
pub use smol_str::SmolStr;

/// A spanned value - wraps any value with source location info
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned<T> {
    pub node: T,
    pub span: Span,
}

impl<T> Spanned<T> {
    pub fn new(node: T, span: Span) -> Self {
        Self { node, span }
    }

    pub fn dummy(node: T) -> Self {
        Self {
            node,
            span: Span::dummy(),
        }
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Spanned<U> {
        Spanned {
            node: f(self.node),
            span: self.span,
        }
    }
}

/// Identifier (variable names, field names, type names)
pub type Ident = Spanned<SmolStr>;

/// Dense per-module expression identifier, assigned by the parser.
///
/// Later passes attach information to expressions through side tables
/// keyed by `NodeId` instead of mutating the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub u32);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}", self.0)
    }
}

// ============================================================================
// Program Structure
// ============================================================================

/// A complete Mica module.
///
/// `exports` maps an exported name to the index of its defining statement
/// in `stmts`. Statement order is significant; export order is not.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Module {
    pub stmts: Vec<Stmt>,
    pub exports: FxHashMap<SmolStr, usize>,
}

// ============================================================================
// Statements
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct Stmt {
    pub kind: StmtKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StmtKind {
    /// Immutable binding: `let x: Int = expr`
    Let {
        name: Ident,
        ty: Option<TypeExpr>,
        value: Expr,
        exported: bool,
    },

    /// Mutable binding: `var x = expr`
    Var {
        name: Ident,
        ty: Option<TypeExpr>,
        value: Expr,
        exported: bool,
    },

    /// Type alias: `type Point = { x: Int, y: Int }`
    TypeAlias {
        name: Ident,
        ty: TypeExpr,
        exported: bool,
    },

    /// For loop: `for i in 0..10 { ... }`
    For {
        var: Ident,
        iterable: Expr,
        body: Block,
    },

    /// Expression statement
    Expr(Expr),
}

/// A braced sequence of statements.
///
/// As an expression, a block's value is the value of its trailing
/// expression statement, or unit when there is none.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub stmts: Vec<Stmt>,
    pub span: Span,
}

// ============================================================================
// Expressions
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub id: NodeId,
    pub kind: ExprKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    // Literals
    Int(i64),
    Float(f64),
    Str(SmolStr),
    Bool(bool),

    // Identifiers
    Ident(SmolStr),

    // Operators
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },

    /// Assignment to a mutable binding: `x = expr`
    Assign {
        name: Ident,
        value: Box<Expr>,
    },

    /// Half-open integer range: `a..b`
    Range {
        start: Box<Expr>,
        end: Box<Expr>,
    },

    /// Function literal: `func (a: Int, b = 2): Int => a + b`
    Func {
        params: Vec<Param>,
        return_ty: Option<TypeExpr>,
        body: Box<Expr>,
    },

    /// Function call
    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
    },

    // Collections
    Array(Vec<Expr>),

    /// Anonymous struct literal: `{ x: 1, y: 2 }`
    StructLit(Vec<(Ident, Expr)>),

    /// If expression; without `else` the value is unit
    If {
        cond: Box<Expr>,
        then: Block,
        els: Option<Block>,
    },

    /// Block expression
    Block(Block),

    /// Field access: `point.x`
    Field {
        object: Box<Expr>,
        name: Ident,
    },

    /// Index access: `items[0]`
    Index {
        object: Box<Expr>,
        index: Box<Expr>,
    },
}

/// A function parameter.
///
/// The type comes from the annotation when present, otherwise it is
/// inferred from the default value.
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: Ident,
    pub ty: Option<TypeExpr>,
    pub default: Option<Expr>,
    pub span: Span,
}

// ============================================================================
// Operators
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    // Arithmetic
    Add,
    Sub,
    Mul,
    Div,

    // Comparison
    Eq,
    NotEq,
    Lt,
    Gt,
    LtEq,
    GtEq,
}

impl BinaryOp {
    pub fn is_arithmetic(self) -> bool {
        matches!(
            self,
            BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div
        )
    }

    pub fn is_equality(self) -> bool {
        matches!(self, BinaryOp::Eq | BinaryOp::NotEq)
    }

    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            BinaryOp::Lt | BinaryOp::Gt | BinaryOp::LtEq | BinaryOp::GtEq
        )
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Eq => "==",
            BinaryOp::NotEq => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Gt => ">",
            BinaryOp::LtEq => "<=",
            BinaryOp::GtEq => ">=",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Not,
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            UnaryOp::Neg => "-",
            UnaryOp::Not => "!",
        };
        write!(f, "{}", s)
    }
}

// ============================================================================
// Surface Types
// ============================================================================

/// Type expressions as written in source, before resolution
#[derive(Debug, Clone, PartialEq)]
pub enum TypeExpr {
    /// Simple named type: `Int`, `String`, `Point`
    Basic(Ident),

    /// Parametrized type: `Array[Int]`, `Range[Int]`
    Parametrized {
        name: Ident,
        args: Vec<TypeExpr>,
        span: Span,
    },

    /// Function type: `(Int, Int) => Int`
    Func {
        params: Vec<TypeExpr>,
        ret: Box<TypeExpr>,
        span: Span,
    },

    /// Structural type: `{ x: Int, y: Int }`
    Struct {
        fields: Vec<(Ident, TypeExpr)>,
        span: Span,
    },
}

impl TypeExpr {
    pub fn span(&self) -> Span {
        match self {
            TypeExpr::Basic(id) => id.span,
            TypeExpr::Parametrized { span, .. } => *span,
            TypeExpr::Func { span, .. } => *span,
            TypeExpr::Struct { span, .. } => *span,
        }
    }
}

impl fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeExpr::Basic(id) => write!(f, "{}", id.node),
            TypeExpr::Parametrized { name, args, .. } => {
                write!(f, "{}[", name.node)?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                write!(f, "]")
            }
            TypeExpr::Func { params, ret, .. } => {
                write!(f, "(")?;
                for (i, p) in params.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", p)?;
                }
                write!(f, ") => {}", ret)
            }
            TypeExpr::Struct { fields, .. } => {
                write!(f, "{{ ")?;
                for (i, (name, ty)) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", name.node, ty)?;
                }
                write!(f, " }}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn ident(name: &str) -> Ident {
        Spanned::dummy(SmolStr::new(name))
    }

    #[test]
    fn test_type_expr_display() {
        let int = TypeExpr::Basic(ident("Int"));
        assert_eq!(int.to_string(), "Int");

        let array = TypeExpr::Parametrized {
            name: ident("Array"),
            args: vec![TypeExpr::Basic(ident("Int"))],
            span: Span::dummy(),
        };
        assert_eq!(array.to_string(), "Array[Int]");

        let func = TypeExpr::Func {
            params: vec![TypeExpr::Basic(ident("Int")), TypeExpr::Basic(ident("Int"))],
            ret: Box::new(TypeExpr::Basic(ident("Int"))),
            span: Span::dummy(),
        };
        assert_eq!(func.to_string(), "(Int, Int) => Int");

        let strukt = TypeExpr::Struct {
            fields: vec![
                (ident("x"), TypeExpr::Basic(ident("Int"))),
                (ident("y"), TypeExpr::Basic(ident("Float"))),
            ],
            span: Span::dummy(),
        };
        assert_eq!(strukt.to_string(), "{ x: Int, y: Float }");
    }

    #[test]
    fn test_operator_display() {
        assert_eq!(BinaryOp::Add.to_string(), "+");
        assert_eq!(BinaryOp::NotEq.to_string(), "!=");
        assert_eq!(UnaryOp::Not.to_string(), "!");
    }

    #[test]
    fn test_operator_classes() {
        assert!(BinaryOp::Add.is_arithmetic());
        assert!(!BinaryOp::Eq.is_arithmetic());
        assert!(BinaryOp::Eq.is_equality());
        assert!(BinaryOp::LtEq.is_comparison());
    }
}
