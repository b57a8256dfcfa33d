use lazy_static::lazy_static;
use std::{collections::HashSet, fmt::Display};

use crate::Span;

lazy_static! {
    pub static ref RESERVED_LOOKUP: HashSet<&'static str> = {
        let mut set = HashSet::new();
        set.insert("fn");
        set.insert("if");
        set.insert("else");
        set.insert("while");
        set.insert("return");
        set.insert("let");
        set.insert("const");
        set.insert("switch");
        set.insert("default");
        set.insert("use");
        set.insert("as");
        set.insert("pub");
        set.insert("extern");
        set.insert("true");
        set.insert("false");
        set.insert("null");
        set
    };
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum TokenKind {
    EOF,
    EOL,
    Identifier,
    Keyword,
    Operator,
    Delimiter,
    Number,
    String,
    Comment,
}

impl Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub literal: String,
    pub span: Span,
}

impl Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.kind {
            TokenKind::EOF => write!(f, "end of input"),
            TokenKind::EOL => write!(f, "end of line"),
            _ => write!(f, "{}", self.literal),
        }
    }
}

impl Token {
    /// Whether this token is the given keyword, operator or delimiter.
    pub fn is(&self, kind: TokenKind, literal: &str) -> bool {
        self.kind == kind && self.literal == literal
    }

    pub fn is_keyword(&self, keyword: &str) -> bool {
        self.is(TokenKind::Keyword, keyword)
    }

    pub fn is_operator(&self, operator: &str) -> bool {
        self.is(TokenKind::Operator, operator)
    }

    pub fn is_delimiter(&self, delimiter: &str) -> bool {
        self.is(TokenKind::Delimiter, delimiter)
    }
}
