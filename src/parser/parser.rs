//! Parser implementation for building the Abstract Syntax Tree.
//!
//! This module contains the main Parser struct and the program entry point.
//! Statements are dispatched on their leading keyword and expressions are
//! parsed by precedence climbing; see `stmt` and `expr`.

use crate::{
    ast::{ast::Program, statements::Modifier},
    errors::errors::{Error, ErrorImpl},
    lexer::tokens::{Token, TokenKind},
    Position, Span,
};

use super::stmt::{expect_statement_end, parse_stmt};

/// The main parser structure that maintains parsing state.
///
/// Holds the token stream, the cursor into it and the modifiers (`pub`, `extern`)
/// seen since the last declaration.
pub struct Parser {
    /// The list of tokens to parse, always ending in EOF
    tokens: Vec<Token>,
    /// Current position in the token stream
    pos: usize,
    /// Modifiers waiting for the declaration they apply to
    pub pending_modifiers: Vec<Modifier>,
}

impl Parser {
    /// Creates a new Parser instance.
    ///
    /// A missing EOF sentinel is appended so the cursor can never run off the end.
    pub fn new(mut tokens: Vec<Token>) -> Self {
        if tokens.last().map(|token| token.kind) != Some(TokenKind::EOF) {
            let end = tokens
                .last()
                .map(|token| token.span.end.clone())
                .unwrap_or_else(Position::null);

            tokens.push(Token {
                kind: TokenKind::EOF,
                literal: String::from("EOF"),
                span: Span {
                    start: end.clone(),
                    end,
                },
            });
        }

        Parser {
            tokens,
            pos: 0,
            pending_modifiers: vec![],
        }
    }

    /// Returns the current token without advancing.
    pub fn current_token(&self) -> &Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    /// Returns the kind of the current token.
    pub fn current_token_kind(&self) -> TokenKind {
        self.current_token().kind
    }

    /// Advances to the next token and returns the previous one. Never moves past EOF.
    pub fn advance(&mut self) -> Token {
        let token = self.current_token().clone();
        if token.kind != TokenKind::EOF {
            self.pos += 1;
        }
        token
    }

    /// Returns the first token at or after the cursor that is not a line end.
    pub fn peek_past_newlines(&self) -> &Token {
        self.tokens[self.pos..]
            .iter()
            .find(|token| token.kind != TokenKind::EOL)
            .unwrap_or_else(|| self.current_token())
    }

    /// Skips line ends and `;` separators.
    pub fn skip_newlines(&mut self) {
        while self.current_token_kind() == TokenKind::EOL || self.current_token().is_delimiter(";")
        {
            self.advance();
        }
    }

    /// Skips line ends and comments, used inside bracketed lists.
    pub fn skip_trivia(&mut self) {
        while matches!(
            self.current_token_kind(),
            TokenKind::EOL | TokenKind::Comment
        ) {
            self.advance();
        }
    }

    /// Builds an "expected X, got Y" error for the current token.
    pub fn error_expected(&self, expected: &str) -> Error {
        let token = self.current_token();

        if token.kind == TokenKind::EOF {
            Error::new(
                ErrorImpl::UnexpectedEndOfInput {
                    expected: expected.to_string(),
                },
                token.span.start.clone(),
            )
        } else {
            Error::new(
                ErrorImpl::ExpectedToken {
                    expected: expected.to_string(),
                    received: token.to_string(),
                },
                token.span.start.clone(),
            )
        }
    }

    /// Expects a token of the given kind and literal.
    pub fn expect(&mut self, kind: TokenKind, literal: &str) -> Result<Token, Error> {
        if self.current_token().is(kind, literal) {
            Ok(self.advance())
        } else {
            Err(self.error_expected(&format!("`{}`", literal)))
        }
    }

    /// Expects an identifier and returns its name.
    pub fn expect_identifier(&mut self, what: &str) -> Result<String, Error> {
        if self.current_token_kind() == TokenKind::Identifier {
            Ok(self.advance().literal)
        } else {
            Err(self.error_expected(what))
        }
    }

    /// Returns the current position in the source file.
    pub fn get_position(&self) -> Position {
        self.current_token().span.start.clone()
    }
}

/// Parses a stream of tokens into a Program.
///
/// This is the main entry point for parsing. Any malformed construct aborts the
/// whole parse; there is no recovery.
pub fn parse_program(tokens: Vec<Token>) -> Result<Program, Error> {
    let mut parser = Parser::new(tokens);
    let mut body = vec![];

    loop {
        parser.skip_newlines();
        if parser.current_token_kind() == TokenKind::EOF {
            break;
        }

        body.push(parse_stmt(&mut parser)?);
        expect_statement_end(&mut parser)?;
    }

    Ok(Program { body })
}
