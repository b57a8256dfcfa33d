#![allow(clippy::module_inception)]

use std::rc::Rc;

use crate::{
    ast::ast::Program,
    errors::errors::{Error, ErrorTip},
    resolver::resolver::{ModuleResolver, SourceLoader},
};

pub mod ast;
pub mod errors;
pub mod lexer;
pub mod macros;
pub mod parser;
pub mod resolver;
pub mod type_checker;

extern crate regex;

const NULL_FILE: &str = "<null>";

/// A byte offset into a named source file.
#[derive(Debug, Clone, PartialEq)]
pub struct Position(pub u32, pub Rc<String>);

impl Position {
    pub fn null() -> Self {
        Position(0, Rc::new(String::from(NULL_FILE)))
    }

    pub fn is_null(&self) -> bool {
        self.1.as_str() == NULL_FILE
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

/// Result of running the whole front-end over one source file.
#[derive(Debug)]
pub struct Analysis {
    /// The annotated program, ready for a backend once `diagnostics` is empty.
    pub program: Program,
    pub diagnostics: Vec<Error>,
}

/// Tokenizes, parses, infers and checks `source`.
///
/// Fatal errors (parse, scope, inference, unresolved types, structural checker failures)
/// come back as `Err`. Accumulated checker findings are returned in the `Analysis`.
pub fn analyze(source: &str, file: &str) -> Result<Analysis, Error> {
    let tokens = lexer::lexer::tokenize(source.to_string(), Some(file.to_string()))?;
    let program = parser::parser::parse_program(tokens)?;
    let program = type_checker::inference::infer(program)?;
    let diagnostics = type_checker::type_checker::check(&program)?;

    Ok(Analysis {
        program,
        diagnostics,
    })
}

/// Like [`analyze`], but merges every `use`d module through `resolver` before inference.
pub fn analyze_with_resolver<L: SourceLoader>(
    source: &str,
    file: &str,
    resolver: &mut ModuleResolver<L>,
) -> Result<Analysis, Error> {
    let tokens = lexer::lexer::tokenize(source.to_string(), Some(file.to_string()))?;
    let program = parser::parser::parse_program(tokens)?;
    let program = resolver.resolve_program(program)?;
    let program = type_checker::inference::infer(program)?;
    let diagnostics = type_checker::type_checker::check(&program)?;

    Ok(Analysis {
        program,
        diagnostics,
    })
}

/// Finds the line holding byte `position` in `content`.
///
/// Returns the 1-based line number, the line text (with its newline) and the column.
pub fn get_line_at_position(content: &str, position: u32) -> Option<(usize, String, usize)> {
    let pos = position as usize;

    if pos >= content.len() {
        return None;
    }

    let mut start = 0;

    for (index, line) in content.split_inclusive('\n').enumerate() {
        let end = start + line.len();

        if (start..end).contains(&pos) {
            return Some((index + 1, line.to_string(), pos - start));
        }

        start = end;
    }

    None
}

/// Renders an error the way the driver prints it.
///
/// ```text
/// Error: TypeMatchError (Expected type `string`, received `float`)
/// -> main.lang
///    |
/// 20 | let a: string = 43 / 2
///    | ----------------^
/// ```
pub fn render_error(error: &Error, source: &str) -> String {
    let mut out = String::new();

    if let ErrorTip::None = error.get_tip() {
        out.push_str(&format!("Error: {}\n", error.get_error_name()));
    } else {
        out.push_str(&format!(
            "Error: {} ({})\n",
            error.get_error_name(),
            error.get_tip()
        ));
    }

    let position = error.get_position();
    if position.is_null() {
        return out;
    }

    out.push_str(&format!("-> {}\n", position.1));

    let Some((line, line_text, line_pos)) = get_line_at_position(source, position.0) else {
        return out;
    };

    let line_string = line.to_string();
    let padding = line_string.len() + 2;

    out.push_str(&format!("{:>padding$}\n", "|"));

    let (line_text_removed, removed_whitespace) = remove_starting_whitespace(&line_text);
    out.push_str(&format!("{} | {}\n", line_string, line_text_removed.trim()));

    let arrows = line_pos.saturating_sub(removed_whitespace) + 1;
    out.push_str(&format!("{:>padding$} {:->arrows$}\n", "|", "^"));

    out
}

fn remove_starting_whitespace(string: &str) -> (String, usize) {
    let start = string.chars().take_while(|c| *c == ' ' || *c == '\t').count();

    (String::from(&string[start..]), start)
}
