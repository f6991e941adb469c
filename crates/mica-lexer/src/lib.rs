//! Mica Language Lexer
//!
//! Tokenizes Mica source code into the closed token set consumed by the
//! parser. Uses the `logos` crate for efficient lexing.

use logos::Logos;
use smol_str::SmolStr;
use std::fmt;
use std::ops::Range;

/// Source span representing a byte range in the source code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn merge(self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    pub fn dummy() -> Self {
        Self { start: 0, end: 0 }
    }
}

impl From<Range<usize>> for Span {
    fn from(range: Range<usize>) -> Self {
        Span::new(range.start, range.end)
    }
}

impl From<Span> for Range<usize> {
    fn from(span: Span) -> Self {
        span.start..span.end
    }
}

/// A 1-based line/column pair, computed on demand from a span start.
///
/// Diagnostics carry spans; hosts call this when rendering them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn of(source: &str, offset: usize) -> Self {
        let offset = offset.min(source.len());
        let before = &source[..offset];
        let line = before.matches('\n').count() + 1;
        // columns count characters, not bytes
        let column = match before.rfind('\n') {
            Some(nl) => before[nl + 1..].chars().count() + 1,
            None => before.chars().count() + 1,
        };
        Position { line, column }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A token with its kind and source location
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }
}

/// All token types in the Mica language
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\n]+")]
pub enum TokenKind {
    // ========== Keywords ==========
    #[token("func")]
    Func,
    #[token("let")]
    Let,
    #[token("var")]
    Var,
    #[token("if")]
    If,
    #[token("else")]
    Else,
    #[token("for")]
    For,
    #[token("in")]
    In,
    #[token("type")]
    Type,
    #[token("export")]
    Export,
    #[token("true")]
    True,
    #[token("false")]
    False,

    // ========== Operators ==========
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("==")]
    Eq,
    #[token("!=")]
    NotEq,
    #[token("<")]
    Lt,
    #[token(">")]
    Gt,
    #[token("<=")]
    LtEq,
    #[token(">=")]
    GtEq,
    #[token("=")]
    Assign,
    #[token("=>")]
    Arrow,
    #[token("..")]
    DotDot,
    #[token("!")]
    Bang,

    // ========== Delimiters ==========
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token(",")]
    Comma,
    #[token(";")]
    Semicolon,
    #[token(":")]
    Colon,
    #[token(".")]
    Dot,

    // ========== Literals ==========
    /// Integer literal. The float rule requires a digit after the decimal
    /// point, so `1..2` lexes as Int DotDot Int and `1.foo` as Int Dot Ident.
    #[regex(r"[0-9]+", |lex| SmolStr::new(lex.slice()))]
    Int(SmolStr),

    /// Float literal; at most one decimal point, a second `.` terminates
    /// the numeral without being consumed (`1.2.3` is Float Dot Int).
    #[regex(r"[0-9]+\.[0-9]+", |lex| SmolStr::new(lex.slice()))]
    Float(SmolStr),

    /// String literal (double quotes, backslash escapes). The slice keeps
    /// its quotes; the parser strips and unescapes.
    #[regex(r#""(?:[^"\\]|\\.)*""#, |lex| SmolStr::new(lex.slice()))]
    Str(SmolStr),

    /// Identifier: a maximal run of letters.
    #[regex(r"[A-Za-z]+", |lex| SmolStr::new(lex.slice()))]
    Ident(SmolStr),

    // ========== Sentinels ==========
    /// Unrecognized character; the parser turns this into a diagnostic.
    Illegal,

    /// End of input. `next_token` produces this forever once exhausted.
    Eof,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Func => write!(f, "func"),
            TokenKind::Let => write!(f, "let"),
            TokenKind::Var => write!(f, "var"),
            TokenKind::If => write!(f, "if"),
            TokenKind::Else => write!(f, "else"),
            TokenKind::For => write!(f, "for"),
            TokenKind::In => write!(f, "in"),
            TokenKind::Type => write!(f, "type"),
            TokenKind::Export => write!(f, "export"),
            TokenKind::True => write!(f, "true"),
            TokenKind::False => write!(f, "false"),
            TokenKind::Plus => write!(f, "+"),
            TokenKind::Minus => write!(f, "-"),
            TokenKind::Star => write!(f, "*"),
            TokenKind::Slash => write!(f, "/"),
            TokenKind::Eq => write!(f, "=="),
            TokenKind::NotEq => write!(f, "!="),
            TokenKind::Lt => write!(f, "<"),
            TokenKind::Gt => write!(f, ">"),
            TokenKind::LtEq => write!(f, "<="),
            TokenKind::GtEq => write!(f, ">="),
            TokenKind::Assign => write!(f, "="),
            TokenKind::Arrow => write!(f, "=>"),
            TokenKind::DotDot => write!(f, ".."),
            TokenKind::Bang => write!(f, "!"),
            TokenKind::LParen => write!(f, "("),
            TokenKind::RParen => write!(f, ")"),
            TokenKind::LBracket => write!(f, "["),
            TokenKind::RBracket => write!(f, "]"),
            TokenKind::LBrace => write!(f, "{{"),
            TokenKind::RBrace => write!(f, "}}"),
            TokenKind::Comma => write!(f, ","),
            TokenKind::Semicolon => write!(f, ";"),
            TokenKind::Colon => write!(f, ":"),
            TokenKind::Dot => write!(f, "."),
            TokenKind::Int(s) => write!(f, "{}", s),
            TokenKind::Float(s) => write!(f, "{}", s),
            TokenKind::Str(s) => write!(f, "{}", s),
            TokenKind::Ident(s) => write!(f, "{}", s),
            TokenKind::Illegal => write!(f, "<illegal>"),
            TokenKind::Eof => write!(f, "<eof>"),
        }
    }
}

impl TokenKind {
    /// Check if this token is a keyword
    pub fn is_keyword(&self) -> bool {
        matches!(
            self,
            TokenKind::Func
                | TokenKind::Let
                | TokenKind::Var
                | TokenKind::If
                | TokenKind::Else
                | TokenKind::For
                | TokenKind::In
                | TokenKind::Type
                | TokenKind::Export
                | TokenKind::True
                | TokenKind::False
        )
    }

    /// A short description of the token for diagnostics.
    pub fn describe(&self) -> String {
        match self {
            TokenKind::Int(s) => format!("integer `{}`", s),
            TokenKind::Float(s) => format!("float `{}`", s),
            TokenKind::Str(_) => "string literal".to_string(),
            TokenKind::Ident(s) => format!("identifier `{}`", s),
            TokenKind::Illegal => "unrecognized character".to_string(),
            TokenKind::Eof => "end of input".to_string(),
            other => format!("`{}`", other),
        }
    }
}

/// Lexer for Mica source code
pub struct Lexer<'src> {
    source: &'src str,
    inner: logos::Lexer<'src, TokenKind>,
    done: bool,
}

impl<'src> Lexer<'src> {
    /// Create a new lexer for the given source code
    pub fn new(source: &'src str) -> Self {
        Self {
            source,
            inner: TokenKind::lexer(source),
            done: false,
        }
    }

    /// Get the source code being lexed
    pub fn source(&self) -> &'src str {
        self.source
    }

    /// Produce the next token. Once the input is exhausted this returns
    /// an `Eof` token forever.
    pub fn next_token(&mut self) -> Token {
        match self.inner.next() {
            Some(Ok(kind)) => Token::new(kind, Span::from(self.inner.span())),
            Some(Err(())) => Token::new(TokenKind::Illegal, Span::from(self.inner.span())),
            None => {
                self.done = true;
                let end = self.source.len();
                Token::new(TokenKind::Eof, Span::new(end, end))
            }
        }
    }

    /// Tokenize the entire source, including the trailing `Eof` token.
    pub fn tokenize(mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token();
            let at_end = token.kind == TokenKind::Eof;
            tokens.push(token);
            if at_end {
                break;
            }
        }
        tokens
    }
}

impl<'src> Iterator for Lexer<'src> {
    type Item = Token;

    /// Yields every token followed by a single `Eof`, then `None`.
    fn next(&mut self) -> Option<Token> {
        if self.done {
            return None;
        }
        Some(self.next_token())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn kinds(source: &str) -> Vec<TokenKind> {
        let mut out: Vec<TokenKind> = Lexer::new(source).map(|t| t.kind).collect();
        assert_eq!(out.pop(), Some(TokenKind::Eof));
        out
    }

    #[test]
    fn test_keywords() {
        let tokens = kinds("func let var if else for in type export true false");
        assert_eq!(
            tokens,
            vec![
                TokenKind::Func,
                TokenKind::Let,
                TokenKind::Var,
                TokenKind::If,
                TokenKind::Else,
                TokenKind::For,
                TokenKind::In,
                TokenKind::Type,
                TokenKind::Export,
                TokenKind::True,
                TokenKind::False,
            ]
        );
    }

    #[test]
    fn test_operators() {
        let tokens = kinds("+ - * / == != <= >= = => .. !");
        assert_eq!(tokens[0], TokenKind::Plus);
        assert_eq!(tokens[4], TokenKind::Eq);
        assert_eq!(tokens[8], TokenKind::Assign);
        assert_eq!(tokens[9], TokenKind::Arrow);
        assert_eq!(tokens[10], TokenKind::DotDot);
        assert_eq!(tokens[11], TokenKind::Bang);
    }

    #[test]
    fn test_multi_char_operators_win_over_prefixes() {
        let tokens = kinds("a==b a=b a<=b a<b");
        assert_eq!(tokens[1], TokenKind::Eq);
        assert_eq!(tokens[4], TokenKind::Assign);
        assert_eq!(tokens[7], TokenKind::LtEq);
        assert_eq!(tokens[10], TokenKind::Lt);
    }

    #[test]
    fn test_integers_and_floats() {
        let tokens = kinds("42 3.14 0 0.5");
        assert!(matches!(&tokens[0], TokenKind::Int(s) if s == "42"));
        assert!(matches!(&tokens[1], TokenKind::Float(s) if s == "3.14"));
        assert!(matches!(&tokens[2], TokenKind::Int(s) if s == "0"));
        assert!(matches!(&tokens[3], TokenKind::Float(s) if s == "0.5"));
    }

    #[test]
    fn test_range_wins_over_float() {
        let tokens = kinds("1..2");
        assert!(matches!(&tokens[0], TokenKind::Int(s) if s == "1"));
        assert_eq!(tokens[1], TokenKind::DotDot);
        assert!(matches!(&tokens[2], TokenKind::Int(s) if s == "2"));
    }

    #[test]
    fn test_second_dot_terminates_numeral() {
        let tokens = kinds("1.2.3");
        assert!(matches!(&tokens[0], TokenKind::Float(s) if s == "1.2"));
        assert_eq!(tokens[1], TokenKind::Dot);
        assert!(matches!(&tokens[2], TokenKind::Int(s) if s == "3"));
    }

    #[test]
    fn test_trailing_dot_is_separate_token() {
        let tokens = kinds("1.foo");
        assert!(matches!(&tokens[0], TokenKind::Int(s) if s == "1"));
        assert_eq!(tokens[1], TokenKind::Dot);
        assert!(matches!(&tokens[2], TokenKind::Ident(s) if s == "foo"));
    }

    #[test]
    fn test_identifiers_are_letter_runs() {
        let tokens = kinds("abc forx Typed");
        assert!(matches!(&tokens[0], TokenKind::Ident(s) if s == "abc"));
        // keyword prefix followed by more letters stays one identifier
        assert!(matches!(&tokens[1], TokenKind::Ident(s) if s == "forx"));
        assert!(matches!(&tokens[2], TokenKind::Ident(s) if s == "Typed"));
    }

    #[test]
    fn test_strings() {
        let tokens = kinds(r#""hello" "with \"quote\"""#);
        assert!(matches!(&tokens[0], TokenKind::Str(s) if s == "\"hello\""));
        assert!(matches!(&tokens[1], TokenKind::Str(_)));
    }

    #[test]
    fn test_illegal_character() {
        let tokens = kinds("valid $ also");
        assert!(matches!(&tokens[0], TokenKind::Ident(s) if s == "valid"));
        assert_eq!(tokens[1], TokenKind::Illegal);
        assert!(matches!(&tokens[2], TokenKind::Ident(s) if s == "also"));
    }

    #[test]
    fn test_whitespace_and_newlines_skipped() {
        let tokens = kinds("let\n  x\t=\r\n1");
        assert_eq!(tokens.len(), 4);
    }

    #[test]
    fn test_eof_is_idempotent() {
        let mut lexer = Lexer::new("x");
        assert!(matches!(lexer.next_token().kind, TokenKind::Ident(_)));
        assert_eq!(lexer.next_token().kind, TokenKind::Eof);
        assert_eq!(lexer.next_token().kind, TokenKind::Eof);
        assert_eq!(lexer.next_token().kind, TokenKind::Eof);
    }

    #[test]
    fn test_span_correctness() {
        let tokens: Vec<Token> = Lexer::new("let x = 42").collect();
        assert_eq!(tokens[0].span, Span::new(0, 3));
        assert_eq!(tokens[1].span, Span::new(4, 5));
        assert_eq!(tokens[2].span, Span::new(6, 7));
        assert_eq!(tokens[3].span, Span::new(8, 10));
    }

    #[test]
    fn test_position_of() {
        let source = "let x = 1;\nlet y = 2;";
        assert_eq!(Position::of(source, 0), Position { line: 1, column: 1 });
        assert_eq!(Position::of(source, 4), Position { line: 1, column: 5 });
        assert_eq!(Position::of(source, 11), Position { line: 2, column: 1 });
        assert_eq!(Position::of(source, 15), Position { line: 2, column: 5 });
    }

    #[test]
    fn test_position_counts_chars_not_bytes() {
        // "α" and "β" are two bytes each
        let source = "αβ x\ny";
        assert_eq!(Position::of(source, 5), Position { line: 1, column: 4 });
        assert_eq!(Position::of(source, 7), Position { line: 2, column: 1 });
    }

    #[test]
    fn test_round_trip() {
        // Re-rendering a token stream with single-space separation and
        // lexing it again reproduces the same kinds.
        let source = r#"export let add = func ( a : Int , b : Int ) : Int => a + b ; add ( 1 , 2.5 ) == 3.5"#;
        let original = kinds(source);
        let rendered = original
            .iter()
            .map(|k| k.to_string())
            .collect::<Vec<_>>()
            .join(" ");
        assert_eq!(kinds(&rendered), original);
    }
}
