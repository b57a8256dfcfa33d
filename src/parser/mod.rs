//! Parser module for building an Abstract Syntax Tree (AST).
//!
//! This module contains the parser that transforms a stream of tokens
//! into a Program. It handles:
//!
//! - Statement parsing, dispatched on the leading keyword
//! - Expression parsing by precedence climbing with a postfix loop
//!   for `++`/`--`, member access and calls
//! - Type annotations
//!
//! Every error is fatal: the first malformed construct aborts the parse.

pub mod expr;
pub mod lookups;
pub mod parser;
pub mod stmt;
pub mod types;
