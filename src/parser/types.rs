//! Type annotation parsing.
//!
//! Annotations are single type names (`int`, `i32`, `string`, ...). `null` is a
//! keyword but is accepted as a type name too. Whether the name denotes a real
//! type is decided later against the root scope.

use crate::{ast::types::TypeAnnotation, errors::errors::Error, lexer::tokens::TokenKind};

use super::parser::Parser;

pub fn parse_type(parser: &mut Parser) -> Result<TypeAnnotation, Error> {
    let token = parser.current_token();

    if token.kind == TokenKind::Identifier || token.is_keyword("null") {
        let token = parser.advance();
        Ok(TypeAnnotation {
            name: token.literal,
            position: token.span.start,
        })
    } else {
        Err(parser.error_expected("type name"))
    }
}
