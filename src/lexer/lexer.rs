use std::rc::Rc;

use lazy_static::lazy_static;
use regex::Regex;

use crate::{
    errors::errors::{Error, ErrorImpl},
    Position, Span, MK_DEFAULT_HANDLER, MK_TOKEN,
};

use super::tokens::{Token, TokenKind, RESERVED_LOOKUP};

pub type RegexHandler = fn(&mut Lexer, &Regex) -> Result<(), Error>;

pub struct RegexPattern {
    regex: Regex,
    handler: RegexHandler,
}

fn pattern(regex: &str, handler: RegexHandler) -> RegexPattern {
    RegexPattern {
        regex: Regex::new(regex).expect("token patterns are valid regular expressions"),
        handler,
    }
}

lazy_static! {
    // Tried in order; every pattern is anchored so only a match at the cursor counts.
    static ref PATTERNS: Vec<RegexPattern> = vec![
        pattern("^[a-zA-Z_][a-zA-Z0-9_]*", symbol_handler),
        pattern("^[0-9]+(\\.[0-9]+)?", number_handler),
        pattern("^(\\r?\\n[ \\t\\r]*)+", newline_handler),
        pattern("^[ \\t\\r]+", skip_handler),
        pattern("^\"(\\\\.|[^\"\\\\])*\"", string_handler),
        pattern("^//[^\\n]*", comment_handler),
        pattern("^:=", MK_DEFAULT_HANDLER!(TokenKind::Operator, ":=")),
        pattern("^->", MK_DEFAULT_HANDLER!(TokenKind::Operator, "->")),
        pattern("^==", MK_DEFAULT_HANDLER!(TokenKind::Operator, "==")),
        pattern("^!=", MK_DEFAULT_HANDLER!(TokenKind::Operator, "!=")),
        pattern("^<=", MK_DEFAULT_HANDLER!(TokenKind::Operator, "<=")),
        pattern("^>=", MK_DEFAULT_HANDLER!(TokenKind::Operator, ">=")),
        pattern("^&&", MK_DEFAULT_HANDLER!(TokenKind::Operator, "&&")),
        pattern("^\\|\\|", MK_DEFAULT_HANDLER!(TokenKind::Operator, "||")),
        pattern("^\\+\\+", MK_DEFAULT_HANDLER!(TokenKind::Operator, "++")),
        pattern("^--", MK_DEFAULT_HANDLER!(TokenKind::Operator, "--")),
        pattern("^\\+", MK_DEFAULT_HANDLER!(TokenKind::Operator, "+")),
        pattern("^-", MK_DEFAULT_HANDLER!(TokenKind::Operator, "-")),
        pattern("^\\*", MK_DEFAULT_HANDLER!(TokenKind::Operator, "*")),
        pattern("^/", MK_DEFAULT_HANDLER!(TokenKind::Operator, "/")),
        pattern("^<", MK_DEFAULT_HANDLER!(TokenKind::Operator, "<")),
        pattern("^>", MK_DEFAULT_HANDLER!(TokenKind::Operator, ">")),
        pattern("^!", MK_DEFAULT_HANDLER!(TokenKind::Operator, "!")),
        pattern("^=", MK_DEFAULT_HANDLER!(TokenKind::Operator, "=")),
        pattern("^\\.", MK_DEFAULT_HANDLER!(TokenKind::Operator, ".")),
        pattern("^\\(", MK_DEFAULT_HANDLER!(TokenKind::Delimiter, "(")),
        pattern("^\\)", MK_DEFAULT_HANDLER!(TokenKind::Delimiter, ")")),
        pattern("^\\{", MK_DEFAULT_HANDLER!(TokenKind::Delimiter, "{")),
        pattern("^\\}", MK_DEFAULT_HANDLER!(TokenKind::Delimiter, "}")),
        pattern("^,", MK_DEFAULT_HANDLER!(TokenKind::Delimiter, ",")),
        pattern("^:", MK_DEFAULT_HANDLER!(TokenKind::Delimiter, ":")),
        pattern("^;", MK_DEFAULT_HANDLER!(TokenKind::Delimiter, ";")),
    ];
}

pub struct Lexer {
    tokens: Vec<Token>,
    source: String,
    pos: usize,
    file: Rc<String>,
}

impl Lexer {
    pub fn new(source: String, file: Option<String>) -> Lexer {
        let file_name = if let Some(file) = file {
            Rc::new(file)
        } else {
            Rc::new(String::from("shell"))
        };

        Lexer {
            pos: 0,
            tokens: vec![],
            source,
            file: file_name,
        }
    }

    pub fn advance_n(&mut self, n: usize) {
        self.pos += n;
    }

    pub fn push(&mut self, token: Token) {
        self.tokens.push(token);
    }

    pub fn remainder(&self) -> &str {
        &self.source[self.pos..]
    }

    pub fn at_eof(&self) -> bool {
        self.pos >= self.source.len()
    }

    pub fn position(&self) -> Position {
        Position(self.pos as u32, Rc::clone(&self.file))
    }

    /// Span covering the next `len` bytes from the cursor.
    pub fn span_of(&self, len: usize) -> Span {
        Span {
            start: self.position(),
            end: Position((self.pos + len) as u32, Rc::clone(&self.file)),
        }
    }

    fn matched(&self, regex: &Regex) -> Result<String, Error> {
        regex
            .find(self.remainder())
            .map(|m| m.as_str().to_string())
            .ok_or_else(|| self.unrecognised())
    }

    fn unrecognised(&self) -> Error {
        let token = self
            .remainder()
            .chars()
            .next()
            .map(String::from)
            .unwrap_or_default();

        Error::new(ErrorImpl::UnrecognisedToken { token }, self.position())
    }
}

fn number_handler(lexer: &mut Lexer, regex: &Regex) -> Result<(), Error> {
    let matched = lexer.matched(regex)?;
    let span = lexer.span_of(matched.len());

    lexer.advance_n(matched.len());
    lexer.push(MK_TOKEN!(TokenKind::Number, matched, span));
    Ok(())
}

fn skip_handler(lexer: &mut Lexer, regex: &Regex) -> Result<(), Error> {
    let matched = lexer.matched(regex)?;
    lexer.advance_n(matched.len());
    Ok(())
}

fn newline_handler(lexer: &mut Lexer, regex: &Regex) -> Result<(), Error> {
    let matched = lexer.matched(regex)?;
    let span = lexer.span_of(matched.len());

    lexer.advance_n(matched.len());

    // A newline right after another newline (or at the very start) carries no meaning.
    let follows_statement = lexer
        .tokens
        .last()
        .is_some_and(|token| token.kind != TokenKind::EOL);
    if follows_statement {
        lexer.push(MK_TOKEN!(TokenKind::EOL, String::from("\n"), span));
    }
    Ok(())
}

fn comment_handler(lexer: &mut Lexer, regex: &Regex) -> Result<(), Error> {
    let matched = lexer.matched(regex)?;
    let span = lexer.span_of(matched.len());

    lexer.advance_n(matched.len());
    lexer.push(MK_TOKEN!(
        TokenKind::Comment,
        matched.trim_start_matches("//").trim().to_string(),
        span
    ));
    Ok(())
}

fn string_handler(lexer: &mut Lexer, regex: &Regex) -> Result<(), Error> {
    let matched = lexer.matched(regex)?;
    let span = lexer.span_of(matched.len());
    let raw = &matched[1..matched.len() - 1];

    let mut result = String::new();
    let mut chars = raw.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch != '\\' {
            result.push(ch);
            continue;
        }

        match chars.peek().copied() {
            Some('n') => {
                result.push('\n');
                chars.next();
            }
            Some('t') => {
                result.push('\t');
                chars.next();
            }
            Some('r') => {
                result.push('\r');
                chars.next();
            }
            Some('\\') => {
                result.push('\\');
                chars.next();
            }
            Some('"') => {
                result.push('"');
                chars.next();
            }
            Some('0') => {
                result.push('\0');
                chars.next();
            }
            Some('x') => {
                chars.next();

                let mut hex = String::new();
                while hex.len() < 2 {
                    match chars.peek() {
                        Some(ch) if ch.is_ascii_hexdigit() => {
                            hex.push(*ch);
                            chars.next();
                        }
                        _ => break,
                    }
                }

                let byte = u8::from_str_radix(&hex, 16).map_err(|_| {
                    Error::new(
                        ErrorImpl::UnrecognisedToken {
                            token: format!("\\x{}", hex),
                        },
                        span.start.clone(),
                    )
                })?;
                result.push(byte as char);
            }
            // Unknown escapes keep their backslash
            _ => result.push(ch),
        }
    }

    lexer.advance_n(matched.len());
    lexer.push(MK_TOKEN!(TokenKind::String, result, span));
    Ok(())
}

fn symbol_handler(lexer: &mut Lexer, regex: &Regex) -> Result<(), Error> {
    let value = lexer.matched(regex)?;
    let span = lexer.span_of(value.len());

    let kind = if RESERVED_LOOKUP.contains(value.as_str()) {
        TokenKind::Keyword
    } else {
        TokenKind::Identifier
    };

    lexer.advance_n(value.len());
    lexer.push(MK_TOKEN!(kind, value, span));
    Ok(())
}

pub fn tokenize(source: String, file: Option<String>) -> Result<Vec<Token>, Error> {
    let mut lex = Lexer::new(source, file);

    while !lex.at_eof() {
        let pattern = PATTERNS
            .iter()
            .find(|pattern| pattern.regex.is_match(lex.remainder()));

        match pattern {
            Some(pattern) => (pattern.handler)(&mut lex, &pattern.regex)?,
            None => return Err(lex.unrecognised()),
        }
    }

    let span = lex.span_of(0);
    lex.push(MK_TOKEN!(TokenKind::EOF, String::from("EOF"), span));
    Ok(lex.tokens)
}
