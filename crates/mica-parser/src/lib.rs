//! Mica Language Parser
//!
//! Recursive descent parser that produces an AST from the token stream.
//! Errors are collected rather than aborting: on a malformed statement the
//! parser records a diagnostic, resynchronizes at the next `;` or closing
//! delimiter, and keeps going, so one pass over a module surfaces several
//! independent problems. `parse_module` always returns a best-effort tree.

use mica_ast::*;
use mica_lexer::{Lexer, Token, TokenKind};
use thiserror::Error;

/// Parser error type with detailed, helpful error messages
#[derive(Debug, Clone, Error)]
pub enum ParseError {
    #[error("Unexpected token: expected {expected}, found {found} at position {span:?}")]
    UnexpectedToken {
        expected: String,
        found: String,
        span: Span,
    },

    #[error("Unexpected end of file - expected {expected}")]
    UnexpectedEof { expected: String, span: Span },

    #[error("Unrecognized character at position {span:?}")]
    IllegalToken { span: Span },

    #[error("Invalid type at position {span:?}: {hint}")]
    InvalidType { span: Span, hint: String },

    #[error("Invalid numeric literal at position {span:?}")]
    InvalidLiteral { span: Span },

    #[error("`export` is only allowed at the top level of a module")]
    ExportInBlock { span: Span },
}

impl ParseError {
    pub fn span(&self) -> Span {
        match self {
            ParseError::UnexpectedToken { span, .. }
            | ParseError::UnexpectedEof { span, .. }
            | ParseError::IllegalToken { span }
            | ParseError::InvalidType { span, .. }
            | ParseError::InvalidLiteral { span }
            | ParseError::ExportInBlock { span } => *span,
        }
    }
}

/// Result type for parser operations
pub type ParseResult<T> = Result<T, ParseError>;

/// Parse a source string into a module plus any diagnostics.
pub fn parse(source: &str) -> (Module, Vec<ParseError>) {
    let mut parser = Parser::new(source);
    let module = parser.parse_module();
    (module, parser.into_errors())
}

/// Parser state
pub struct Parser<'src> {
    source: &'src str,
    tokens: Vec<Token>,
    pos: usize,
    errors: Vec<ParseError>,
    next_node_id: u32,
}

impl<'src> Parser<'src> {
    /// Create a new parser from source code
    pub fn new(source: &'src str) -> Self {
        let tokens = Lexer::new(source).tokenize();
        Self {
            source,
            tokens,
            pos: 0,
            errors: Vec::new(),
            next_node_id: 0,
        }
    }

    pub fn source(&self) -> &'src str {
        self.source
    }

    /// Get collected errors
    pub fn errors(&self) -> &[ParseError] {
        &self.errors
    }

    pub fn into_errors(self) -> Vec<ParseError> {
        self.errors
    }

    /// Parse the entire module, collecting errors along the way.
    pub fn parse_module(&mut self) -> Module {
        let mut module = Module::default();

        while !self.at_eof() {
            let before = self.pos;
            match self.parse_stmt(true) {
                Ok(stmt) => {
                    if let Err(e) = self.expect_terminator(&stmt) {
                        self.errors.push(e);
                        self.recover_to_stmt_boundary();
                    }
                    if let Some(name) = exported_name(&stmt) {
                        module.exports.insert(name, module.stmts.len());
                    }
                    module.stmts.push(stmt);
                }
                Err(e) => {
                    self.errors.push(e);
                    self.recover_to_stmt_boundary();
                }
            }
            // guarantee progress even when recovery stops immediately
            if self.pos == before && !self.at_eof() {
                self.advance();
            }
        }

        module
    }

    // ========================================================================
    // Token Navigation
    // ========================================================================

    fn current(&self) -> &Token {
        // the token vector always ends with Eof
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn current_kind(&self) -> &TokenKind {
        &self.current().kind
    }

    fn current_span(&self) -> Span {
        self.current().span
    }

    fn previous_span(&self) -> Span {
        if self.pos > 0 {
            self.tokens[self.pos - 1].span
        } else {
            Span::dummy()
        }
    }

    fn at_eof(&self) -> bool {
        matches!(self.current_kind(), TokenKind::Eof)
    }

    fn advance(&mut self) -> Token {
        let token = self.current().clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        token
    }

    fn check(&self, kind: &TokenKind) -> bool {
        self.current_kind() == kind
    }

    fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn peek_kind(&self) -> &TokenKind {
        self.peek_kind_at(1)
    }

    fn peek_kind_at(&self, n: usize) -> &TokenKind {
        let idx = (self.pos + n).min(self.tokens.len() - 1);
        &self.tokens[idx].kind
    }

    fn unexpected(&self, expected: &str) -> ParseError {
        match self.current_kind() {
            TokenKind::Eof => ParseError::UnexpectedEof {
                expected: expected.to_string(),
                span: self.current_span(),
            },
            TokenKind::Illegal => ParseError::IllegalToken {
                span: self.current_span(),
            },
            kind => ParseError::UnexpectedToken {
                expected: expected.to_string(),
                found: kind.describe(),
                span: self.current_span(),
            },
        }
    }

    fn expect(&mut self, kind: &TokenKind, expected: &str) -> ParseResult<Span> {
        if self.check(kind) {
            Ok(self.advance().span)
        } else {
            Err(self.unexpected(expected))
        }
    }

    fn expect_ident(&mut self, expected: &str) -> ParseResult<Ident> {
        match self.current_kind() {
            TokenKind::Ident(name) => {
                let ident = Spanned::new(name.clone(), self.current_span());
                self.advance();
                Ok(ident)
            }
            _ => Err(self.unexpected(expected)),
        }
    }

    fn new_expr(&mut self, kind: ExprKind, span: Span) -> Expr {
        let id = NodeId(self.next_node_id);
        self.next_node_id += 1;
        Expr { id, kind, span }
    }

    // ========================================================================
    // Error Recovery
    // ========================================================================

    /// Skip ahead to a statement boundary: past the next `;`, or up to (but
    /// not past) a closing delimiter, a statement-leading keyword, or EOF.
    fn recover_to_stmt_boundary(&mut self) {
        loop {
            match self.current_kind() {
                TokenKind::Eof
                | TokenKind::RBrace
                | TokenKind::RParen
                | TokenKind::RBracket
                | TokenKind::Let
                | TokenKind::Var
                | TokenKind::Type
                | TokenKind::For
                | TokenKind::Export => break,
                TokenKind::Semicolon => {
                    self.advance();
                    break;
                }
                _ => {
                    self.advance();
                }
            }
        }
    }

    /// Consume the statement terminator. The `;` is optional after block-like
    /// statements and before `}` / EOF.
    fn expect_terminator(&mut self, stmt: &Stmt) -> ParseResult<()> {
        if self.eat(&TokenKind::Semicolon) {
            return Ok(());
        }
        if !stmt_needs_semicolon(stmt) {
            return Ok(());
        }
        match self.current_kind() {
            TokenKind::RBrace | TokenKind::Eof => Ok(()),
            _ => Err(self.unexpected("`;`")),
        }
    }

    // ========================================================================
    // Statements
    // ========================================================================

    fn parse_stmt(&mut self, top_level: bool) -> ParseResult<Stmt> {
        match self.current_kind() {
            TokenKind::Export => {
                let export_span = self.advance().span;
                if !top_level {
                    return Err(ParseError::ExportInBlock { span: export_span });
                }
                match self.current_kind() {
                    TokenKind::Let => self.parse_let(true, export_span),
                    TokenKind::Var => self.parse_var(true, export_span),
                    TokenKind::Type => self.parse_type_alias(true, export_span),
                    _ => Err(self.unexpected("`let`, `var`, or `type` after `export`")),
                }
            }
            TokenKind::Let => {
                let span = self.current_span();
                self.parse_let(false, span)
            }
            TokenKind::Var => {
                let span = self.current_span();
                self.parse_var(false, span)
            }
            TokenKind::Type => {
                let span = self.current_span();
                self.parse_type_alias(false, span)
            }
            TokenKind::For => self.parse_for(),
            _ => {
                let expr = self.parse_expression()?;
                let span = expr.span;
                Ok(Stmt {
                    kind: StmtKind::Expr(expr),
                    span,
                })
            }
        }
    }

    fn parse_let(&mut self, exported: bool, start: Span) -> ParseResult<Stmt> {
        self.expect(&TokenKind::Let, "`let`")?;
        let name = self.expect_ident("binding name")?;
        let ty = if self.eat(&TokenKind::Colon) {
            Some(self.parse_type_expr()?)
        } else {
            None
        };
        self.expect(&TokenKind::Assign, "`=`")?;
        let value = self.parse_expression()?;
        let span = start.merge(value.span);
        Ok(Stmt {
            kind: StmtKind::Let {
                name,
                ty,
                value,
                exported,
            },
            span,
        })
    }

    fn parse_var(&mut self, exported: bool, start: Span) -> ParseResult<Stmt> {
        self.expect(&TokenKind::Var, "`var`")?;
        let name = self.expect_ident("binding name")?;
        let ty = if self.eat(&TokenKind::Colon) {
            Some(self.parse_type_expr()?)
        } else {
            None
        };
        self.expect(&TokenKind::Assign, "`=`")?;
        let value = self.parse_expression()?;
        let span = start.merge(value.span);
        Ok(Stmt {
            kind: StmtKind::Var {
                name,
                ty,
                value,
                exported,
            },
            span,
        })
    }

    fn parse_type_alias(&mut self, exported: bool, start: Span) -> ParseResult<Stmt> {
        self.expect(&TokenKind::Type, "`type`")?;
        let name = self.expect_ident("type name")?;
        self.expect(&TokenKind::Assign, "`=`")?;
        let ty = self.parse_type_expr()?;
        let span = start.merge(ty.span());
        Ok(Stmt {
            kind: StmtKind::TypeAlias { name, ty, exported },
            span,
        })
    }

    fn parse_for(&mut self) -> ParseResult<Stmt> {
        let start = self.expect(&TokenKind::For, "`for`")?;
        let var = self.expect_ident("loop variable")?;
        self.expect(&TokenKind::In, "`in`")?;
        let iterable = self.parse_expression()?;
        let body = self.parse_block()?;
        let span = start.merge(body.span);
        Ok(Stmt {
            kind: StmtKind::For {
                var,
                iterable,
                body,
            },
            span,
        })
    }

    // ========================================================================
    // Expressions
    // ========================================================================
    //
    // Precedence, lowest first: assignment, equality, comparison, range,
    // additive, multiplicative, unary, postfix, primary.

    pub fn parse_expression(&mut self) -> ParseResult<Expr> {
        self.parse_assignment()
    }

    fn parse_assignment(&mut self) -> ParseResult<Expr> {
        // `name = value` with a single-token lookahead; `==` is a distinct
        // token so equality never misfires here
        if let TokenKind::Ident(name) = self.current_kind() {
            if self.peek_kind() == &TokenKind::Assign {
                let name = Spanned::new(name.clone(), self.current_span());
                self.advance();
                self.advance();
                let value = self.parse_assignment()?;
                let span = name.span.merge(value.span);
                return Ok(self.new_expr(
                    ExprKind::Assign {
                        name,
                        value: Box::new(value),
                    },
                    span,
                ));
            }
        }
        self.parse_equality()
    }

    fn parse_equality(&mut self) -> ParseResult<Expr> {
        let mut left = self.parse_comparison()?;
        loop {
            let op = match self.current_kind() {
                TokenKind::Eq => BinaryOp::Eq,
                TokenKind::NotEq => BinaryOp::NotEq,
                _ => break,
            };
            self.advance();
            let right = self.parse_comparison()?;
            let span = left.span.merge(right.span);
            left = self.new_expr(
                ExprKind::Binary {
                    op,
                    left: Box::new(left),
                    right: Box::new(right),
                },
                span,
            );
        }
        Ok(left)
    }

    fn parse_comparison(&mut self) -> ParseResult<Expr> {
        let mut left = self.parse_range()?;
        loop {
            let op = match self.current_kind() {
                TokenKind::Lt => BinaryOp::Lt,
                TokenKind::Gt => BinaryOp::Gt,
                TokenKind::LtEq => BinaryOp::LtEq,
                TokenKind::GtEq => BinaryOp::GtEq,
                _ => break,
            };
            self.advance();
            let right = self.parse_range()?;
            let span = left.span.merge(right.span);
            left = self.new_expr(
                ExprKind::Binary {
                    op,
                    left: Box::new(left),
                    right: Box::new(right),
                },
                span,
            );
        }
        Ok(left)
    }

    /// Ranges do not chain: `a..b..c` parses as `(a..b)` then errors on `..`.
    fn parse_range(&mut self) -> ParseResult<Expr> {
        let start = self.parse_additive()?;
        if self.eat(&TokenKind::DotDot) {
            let end = self.parse_additive()?;
            let span = start.span.merge(end.span);
            return Ok(self.new_expr(
                ExprKind::Range {
                    start: Box::new(start),
                    end: Box::new(end),
                },
                span,
            ));
        }
        Ok(start)
    }

    fn parse_additive(&mut self) -> ParseResult<Expr> {
        let mut left = self.parse_multiplicative()?;
        loop {
            let op = match self.current_kind() {
                TokenKind::Plus => BinaryOp::Add,
                TokenKind::Minus => BinaryOp::Sub,
                _ => break,
            };
            self.advance();
            let right = self.parse_multiplicative()?;
            let span = left.span.merge(right.span);
            left = self.new_expr(
                ExprKind::Binary {
                    op,
                    left: Box::new(left),
                    right: Box::new(right),
                },
                span,
            );
        }
        Ok(left)
    }

    fn parse_multiplicative(&mut self) -> ParseResult<Expr> {
        let mut left = self.parse_unary()?;
        loop {
            let op = match self.current_kind() {
                TokenKind::Star => BinaryOp::Mul,
                TokenKind::Slash => BinaryOp::Div,
                _ => break,
            };
            self.advance();
            let right = self.parse_unary()?;
            let span = left.span.merge(right.span);
            left = self.new_expr(
                ExprKind::Binary {
                    op,
                    left: Box::new(left),
                    right: Box::new(right),
                },
                span,
            );
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> ParseResult<Expr> {
        let op = match self.current_kind() {
            TokenKind::Bang => UnaryOp::Not,
            TokenKind::Minus => UnaryOp::Neg,
            _ => return self.parse_postfix(),
        };
        let start = self.advance().span;
        let operand = self.parse_unary()?;
        let span = start.merge(operand.span);
        Ok(self.new_expr(
            ExprKind::Unary {
                op,
                operand: Box::new(operand),
            },
            span,
        ))
    }

    fn parse_postfix(&mut self) -> ParseResult<Expr> {
        let mut expr = self.parse_primary()?;
        loop {
            match self.current_kind() {
                TokenKind::LParen => {
                    self.advance();
                    let args = self.parse_expr_list(&TokenKind::RParen)?;
                    let end = self.expect(&TokenKind::RParen, "`)`")?;
                    let span = expr.span.merge(end);
                    expr = self.new_expr(
                        ExprKind::Call {
                            callee: Box::new(expr),
                            args,
                        },
                        span,
                    );
                }
                TokenKind::LBracket => {
                    self.advance();
                    let index = self.parse_expression()?;
                    let end = self.expect(&TokenKind::RBracket, "`]`")?;
                    let span = expr.span.merge(end);
                    expr = self.new_expr(
                        ExprKind::Index {
                            object: Box::new(expr),
                            index: Box::new(index),
                        },
                        span,
                    );
                }
                TokenKind::Dot => {
                    self.advance();
                    let name = self.expect_ident("field name")?;
                    let span = expr.span.merge(name.span);
                    expr = self.new_expr(
                        ExprKind::Field {
                            object: Box::new(expr),
                            name,
                        },
                        span,
                    );
                }
                _ => break,
            }
        }
        Ok(expr)
    }

    fn parse_primary(&mut self) -> ParseResult<Expr> {
        let span = self.current_span();
        match self.current_kind().clone() {
            TokenKind::Int(text) => {
                self.advance();
                let value: i64 = text
                    .parse()
                    .map_err(|_| ParseError::InvalidLiteral { span })?;
                Ok(self.new_expr(ExprKind::Int(value), span))
            }
            TokenKind::Float(text) => {
                self.advance();
                let value: f64 = text
                    .parse()
                    .map_err(|_| ParseError::InvalidLiteral { span })?;
                Ok(self.new_expr(ExprKind::Float(value), span))
            }
            TokenKind::Str(raw) => {
                self.advance();
                Ok(self.new_expr(ExprKind::Str(unescape(&raw)), span))
            }
            TokenKind::True => {
                self.advance();
                Ok(self.new_expr(ExprKind::Bool(true), span))
            }
            TokenKind::False => {
                self.advance();
                Ok(self.new_expr(ExprKind::Bool(false), span))
            }
            TokenKind::Ident(name) => {
                self.advance();
                Ok(self.new_expr(ExprKind::Ident(name), span))
            }
            TokenKind::LParen => {
                self.advance();
                let inner = self.parse_expression()?;
                self.expect(&TokenKind::RParen, "`)`")?;
                Ok(inner)
            }
            TokenKind::LBracket => {
                self.advance();
                let elements = self.parse_expr_list(&TokenKind::RBracket)?;
                let end = self.expect(&TokenKind::RBracket, "`]`")?;
                Ok(self.new_expr(ExprKind::Array(elements), span.merge(end)))
            }
            TokenKind::LBrace => {
                if self.starts_struct_literal() {
                    self.parse_struct_literal()
                } else {
                    let block = self.parse_block()?;
                    let span = block.span;
                    Ok(self.new_expr(ExprKind::Block(block), span))
                }
            }
            TokenKind::Func => self.parse_func_literal(),
            TokenKind::If => self.parse_if(),
            TokenKind::Illegal => Err(ParseError::IllegalToken { span }),
            _ => Err(self.unexpected("expression")),
        }
    }

    /// At a `{`: a struct literal starts with `}` (empty) or `ident :`,
    /// anything else is a block expression.
    fn starts_struct_literal(&self) -> bool {
        match self.peek_kind() {
            TokenKind::RBrace => true,
            TokenKind::Ident(_) => self.peek_kind_at(2) == &TokenKind::Colon,
            _ => false,
        }
    }

    fn parse_struct_literal(&mut self) -> ParseResult<Expr> {
        let start = self.expect(&TokenKind::LBrace, "`{`")?;
        let mut fields = Vec::new();
        while !self.check(&TokenKind::RBrace) && !self.at_eof() {
            let name = self.expect_ident("field name")?;
            self.expect(&TokenKind::Colon, "`:`")?;
            let value = self.parse_expression()?;
            fields.push((name, value));
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        let end = self.expect(&TokenKind::RBrace, "`}`")?;
        Ok(self.new_expr(ExprKind::StructLit(fields), start.merge(end)))
    }

    fn parse_block(&mut self) -> ParseResult<Block> {
        let start = self.expect(&TokenKind::LBrace, "`{`")?;
        let mut stmts = Vec::new();

        while !self.check(&TokenKind::RBrace) && !self.at_eof() {
            let before = self.pos;
            match self.parse_stmt(false) {
                Ok(stmt) => {
                    if let Err(e) = self.expect_terminator(&stmt) {
                        self.errors.push(e);
                        self.recover_to_stmt_boundary();
                    }
                    stmts.push(stmt);
                }
                Err(e) => {
                    self.errors.push(e);
                    self.recover_to_stmt_boundary();
                }
            }
            if self.pos == before && !self.check(&TokenKind::RBrace) && !self.at_eof() {
                self.advance();
            }
        }

        let end = self.expect(&TokenKind::RBrace, "`}`")?;
        Ok(Block {
            stmts,
            span: start.merge(end),
        })
    }

    /// `func (a: Int, b = 2): Int => body`
    fn parse_func_literal(&mut self) -> ParseResult<Expr> {
        let start = self.expect(&TokenKind::Func, "`func`")?;
        self.expect(&TokenKind::LParen, "`(`")?;

        let mut params = Vec::new();
        while !self.check(&TokenKind::RParen) && !self.at_eof() {
            let name = self.expect_ident("parameter name")?;
            let ty = if self.eat(&TokenKind::Colon) {
                Some(self.parse_type_expr()?)
            } else {
                None
            };
            let default = if self.eat(&TokenKind::Assign) {
                Some(self.parse_expression()?)
            } else {
                None
            };
            let span = match (&ty, &default) {
                (_, Some(d)) => name.span.merge(d.span),
                (Some(t), None) => name.span.merge(t.span()),
                (None, None) => name.span,
            };
            params.push(Param {
                name,
                ty,
                default,
                span,
            });
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        self.expect(&TokenKind::RParen, "`)`")?;

        let return_ty = if self.eat(&TokenKind::Colon) {
            Some(self.parse_type_expr()?)
        } else {
            None
        };
        self.expect(&TokenKind::Arrow, "`=>`")?;
        let body = self.parse_expression()?;
        let span = start.merge(body.span);
        Ok(self.new_expr(
            ExprKind::Func {
                params,
                return_ty,
                body: Box::new(body),
            },
            span,
        ))
    }

    fn parse_if(&mut self) -> ParseResult<Expr> {
        let start = self.expect(&TokenKind::If, "`if`")?;
        let cond = self.parse_expression()?;
        let then = self.parse_block()?;
        let mut span = start.merge(then.span);

        let els = if self.eat(&TokenKind::Else) {
            let block = if self.check(&TokenKind::If) {
                // `else if`: wrap the nested if-expression in a block
                let nested = self.parse_if()?;
                let nested_span = nested.span;
                Block {
                    stmts: vec![Stmt {
                        span: nested_span,
                        kind: StmtKind::Expr(nested),
                    }],
                    span: nested_span,
                }
            } else {
                self.parse_block()?
            };
            span = span.merge(block.span);
            Some(block)
        } else {
            None
        };

        Ok(self.new_expr(
            ExprKind::If {
                cond: Box::new(cond),
                then,
                els,
            },
            span,
        ))
    }

    /// Comma-separated expressions up to (not including) the closing token.
    /// Trailing commas are tolerated.
    fn parse_expr_list(&mut self, close: &TokenKind) -> ParseResult<Vec<Expr>> {
        let mut exprs = Vec::new();
        while !self.check(close) && !self.at_eof() {
            exprs.push(self.parse_expression()?);
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        Ok(exprs)
    }

    // ========================================================================
    // Types
    // ========================================================================

    /// `Name`, `Name[T, ...]`, `(T, ...) => T`, or `{ k: T, ... }`
    pub fn parse_type_expr(&mut self) -> ParseResult<TypeExpr> {
        let span = self.current_span();
        match self.current_kind().clone() {
            TokenKind::Ident(name) => {
                let name = Spanned::new(name, span);
                self.advance();
                if self.eat(&TokenKind::LBracket) {
                    let mut args = Vec::new();
                    while !self.check(&TokenKind::RBracket) && !self.at_eof() {
                        args.push(self.parse_type_expr()?);
                        if !self.eat(&TokenKind::Comma) {
                            break;
                        }
                    }
                    let end = self.expect(&TokenKind::RBracket, "`]`")?;
                    Ok(TypeExpr::Parametrized {
                        name,
                        args,
                        span: span.merge(end),
                    })
                } else {
                    Ok(TypeExpr::Basic(name))
                }
            }
            TokenKind::LParen => {
                self.advance();
                let mut params = Vec::new();
                while !self.check(&TokenKind::RParen) && !self.at_eof() {
                    params.push(self.parse_type_expr()?);
                    if !self.eat(&TokenKind::Comma) {
                        break;
                    }
                }
                self.expect(&TokenKind::RParen, "`)`")?;
                self.expect(&TokenKind::Arrow, "`=>`")?;
                let ret = self.parse_type_expr()?;
                let full = span.merge(ret.span());
                Ok(TypeExpr::Func {
                    params,
                    ret: Box::new(ret),
                    span: full,
                })
            }
            TokenKind::LBrace => {
                self.advance();
                let mut fields = Vec::new();
                while !self.check(&TokenKind::RBrace) && !self.at_eof() {
                    let name = self.expect_ident("field name")?;
                    self.expect(&TokenKind::Colon, "`:`")?;
                    let ty = self.parse_type_expr()?;
                    fields.push((name, ty));
                    if !self.eat(&TokenKind::Comma) {
                        break;
                    }
                }
                let end = self.expect(&TokenKind::RBrace, "`}`")?;
                Ok(TypeExpr::Struct {
                    fields,
                    span: span.merge(end),
                })
            }
            _ => Err(ParseError::InvalidType {
                span,
                hint: "expected a type name, `(`, or `{`".to_string(),
            }),
        }
    }
}

/// For-loops and block-valued expression statements close themselves; the
/// rest require a `;` unless they sit before `}` or EOF.
fn stmt_needs_semicolon(stmt: &Stmt) -> bool {
    match &stmt.kind {
        StmtKind::For { .. } => false,
        StmtKind::Expr(e) => !matches!(e.kind, ExprKind::If { .. } | ExprKind::Block(_)),
        _ => true,
    }
}

fn exported_name(stmt: &Stmt) -> Option<SmolStr> {
    match &stmt.kind {
        StmtKind::Let {
            name,
            exported: true,
            ..
        }
        | StmtKind::Var {
            name,
            exported: true,
            ..
        }
        | StmtKind::TypeAlias {
            name,
            exported: true,
            ..
        } => Some(name.node.clone()),
        _ => None,
    }
}

/// Strip the quotes from a raw string slice and process escapes.
/// Unknown escapes keep the escaped character as written.
fn unescape(raw: &str) -> SmolStr {
    let inner = &raw[1..raw.len() - 1];
    if !inner.contains('\\') {
        return SmolStr::new(inner);
    }
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('"') => out.push('"'),
            Some('\\') => out.push('\\'),
            Some(other) => out.push(other),
            None => {}
        }
    }
    SmolStr::new(out)
}
