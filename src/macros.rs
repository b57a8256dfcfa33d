//! Utility macros for the front-end.
//!
//! This module defines helper macros used by the lexer:
//!
//! - `MK_TOKEN!` - Creates a Token instance
//! - `MK_DEFAULT_HANDLER!` - Creates a default lexer handler for fixed-text tokens
//!
//! These macros reduce boilerplate in the lexer implementation.

/// Creates a Token instance.
///
/// # Arguments
///
/// * `$kind` - The TokenKind
/// * `$literal` - The token's source text
/// * `$span` - The source span
///
/// # Example
///
/// ```ignore
/// let token = MK_TOKEN!(TokenKind::Number, "42".to_string(), span);
/// ```
#[macro_export]
macro_rules! MK_TOKEN {
    ($kind:expr, $literal:expr, $span:expr) => {
        Token {
            kind: $kind,
            literal: $literal,
            span: $span,
        }
    };
}

/// Creates a default lexer handler for fixed-text operators and delimiters.
///
/// Generates a handler function that pushes a token with the given kind and
/// literal and advances the lexer position by the literal's length.
///
/// # Example
///
/// ```ignore
/// RegexPattern {
///     regex: Regex::new("^\\+\\+").unwrap(),
///     handler: MK_DEFAULT_HANDLER!(TokenKind::Operator, "++"),
/// }
/// ```
#[macro_export]
macro_rules! MK_DEFAULT_HANDLER {
    ($kind:expr, $literal:literal) => {
        |lexer: &mut Lexer, _regex: &Regex| {
            let span = lexer.span_of($literal.len());
            lexer.push(MK_TOKEN!($kind, String::from($literal), span));
            lexer.advance_n($literal.len());
            Ok::<(), $crate::errors::errors::Error>(())
        }
    };
}
