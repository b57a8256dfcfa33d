//! Lexical analysis module for the front-end.
//!
//! This module contains the lexer (tokenizer) that converts source code
//! into a stream of tokens for parsing. It handles:
//!
//! - Tokenization of source code using anchored regex patterns
//! - Recognition of keywords, identifiers, literals, operators and delimiters
//! - Line ends and comments, which the parser needs to see
//! - Token position tracking for error reporting

pub mod lexer;
pub mod tokens;

#[cfg(test)]
mod tests;
