//! Unit tests for the lexer module.
//!
//! This module contains tests for tokenization including:
//! - Keywords and identifiers
//! - Numeric literals (integers and floats)
//! - String literals with escape sequences
//! - Operators and delimiters
//! - Line ends and comments
//! - Error cases

use super::{lexer::tokenize, tokens::TokenKind};

fn kinds(source: &str) -> Vec<TokenKind> {
    tokenize(source.to_string(), Some("test.lang".to_string()))
        .unwrap()
        .iter()
        .map(|token| token.kind)
        .collect()
}

fn literals(source: &str) -> Vec<String> {
    tokenize(source.to_string(), Some("test.lang".to_string()))
        .unwrap()
        .into_iter()
        .map(|token| token.literal)
        .collect()
}

#[test]
fn test_tokenize_keywords() {
    let source = "fn if else while return let const switch default use as pub extern true false null";
    let tokens = tokenize(source.to_string(), Some("test.lang".to_string())).unwrap();

    assert_eq!(tokens.len(), 17);
    for token in &tokens[..16] {
        assert_eq!(token.kind, TokenKind::Keyword, "{}", token.literal);
    }
    assert_eq!(tokens[0].literal, "fn");
    assert_eq!(tokens[15].literal, "null");
    assert_eq!(tokens[16].kind, TokenKind::EOF);
}

#[test]
fn test_tokenize_identifiers() {
    let source = "foo bar baz_123 _underscore CamelCase letter";
    let tokens = tokenize(source.to_string(), Some("test.lang".to_string())).unwrap();

    for token in &tokens[..6] {
        assert_eq!(token.kind, TokenKind::Identifier);
    }
    assert_eq!(tokens[2].literal, "baz_123");
    // Keyword prefixes do not split identifiers
    assert_eq!(tokens[5].literal, "letter");
    assert_eq!(tokens[6].kind, TokenKind::EOF);
}

#[test]
fn test_tokenize_numbers() {
    assert_eq!(literals("42 3.14 0 100.5"), vec!["42", "3.14", "0", "100.5", "EOF"]);
    assert_eq!(
        kinds("42 3.14"),
        vec![TokenKind::Number, TokenKind::Number, TokenKind::EOF]
    );
}

#[test]
fn test_tokenize_strings() {
    let source = r#""hello" "multiple words" "tab\there" "quote \"inside\"""#;
    let tokens = tokenize(source.to_string(), Some("test.lang".to_string())).unwrap();

    assert_eq!(tokens[0].kind, TokenKind::String);
    assert_eq!(tokens[0].literal, "hello");
    assert_eq!(tokens[1].literal, "multiple words");
    assert_eq!(tokens[2].literal, "tab\there");
    assert_eq!(tokens[3].literal, "quote \"inside\"");
    assert_eq!(tokens[4].kind, TokenKind::EOF);
}

#[test]
fn test_tokenize_hex_escape() {
    let tokens = tokenize(r#""\x41\x62""#.to_string(), None).unwrap();
    assert_eq!(tokens[0].literal, "Ab");
}

#[test]
fn test_tokenize_operators() {
    let source = ":= -> == != <= >= && || ++ -- + - * / < > ! = .";
    let tokens = tokenize(source.to_string(), None).unwrap();
    let expected: Vec<&str> = source.split(' ').collect();

    assert_eq!(tokens.len(), expected.len() + 1);
    for (token, literal) in tokens.iter().zip(expected) {
        assert_eq!(token.kind, TokenKind::Operator);
        assert_eq!(token.literal, literal);
    }
}

#[test]
fn test_tokenize_delimiters() {
    assert_eq!(
        kinds("( ) { } , : ;"),
        vec![
            TokenKind::Delimiter,
            TokenKind::Delimiter,
            TokenKind::Delimiter,
            TokenKind::Delimiter,
            TokenKind::Delimiter,
            TokenKind::Delimiter,
            TokenKind::Delimiter,
            TokenKind::EOF
        ]
    );
}

#[test]
fn test_tokenize_without_spaces() {
    assert_eq!(
        literals("x:=a.b()+1++"),
        vec!["x", ":=", "a", ".", "b", "(", ")", "+", "1", "++", "EOF"]
    );
}

#[test]
fn test_line_ends_collapse() {
    assert_eq!(
        kinds("a\n\n   \nb\n"),
        vec![
            TokenKind::Identifier,
            TokenKind::EOL,
            TokenKind::Identifier,
            TokenKind::EOL,
            TokenKind::EOF
        ]
    );
}

#[test]
fn test_leading_newlines_are_dropped() {
    assert_eq!(kinds("\n\nx"), vec![TokenKind::Identifier, TokenKind::EOF]);
}

#[test]
fn test_tokenize_comments() {
    let tokens = tokenize("let x := 1 // the answer\n".to_string(), None).unwrap();

    assert_eq!(tokens[4].kind, TokenKind::Comment);
    assert_eq!(tokens[4].literal, "the answer");
    assert_eq!(tokens[5].kind, TokenKind::EOL);
    assert_eq!(tokens[6].kind, TokenKind::EOF);
}

#[test]
fn test_division_is_not_a_comment() {
    assert_eq!(literals("4 / 2"), vec!["4", "/", "2", "EOF"]);
}

#[test]
fn test_token_positions() {
    let tokens = tokenize("let  value".to_string(), Some("pos.lang".to_string())).unwrap();

    assert_eq!(tokens[0].span.start.0, 0);
    assert_eq!(tokens[0].span.end.0, 3);
    assert_eq!(tokens[1].span.start.0, 5);
    assert_eq!(tokens[1].span.end.0, 10);
    assert_eq!(tokens[1].span.start.1.as_str(), "pos.lang");
}

#[test]
fn test_empty_source() {
    assert_eq!(kinds(""), vec![TokenKind::EOF]);
}

#[test]
fn test_unrecognised_character() {
    let error = tokenize("let x := @".to_string(), None).unwrap_err();

    assert_eq!(error.get_error_name(), "UnrecognisedToken");
    assert_eq!(error.get_position().0, 9);
}

#[test]
fn test_unterminated_string() {
    let error = tokenize("\"open".to_string(), None).unwrap_err();
    assert_eq!(error.get_error_name(), "UnrecognisedToken");
}
