use crate::{
    ast::{
        ast::Expr,
        statements::{
            Case, CasePattern, Comment, Else, FunctionDeclaration, FunctionParam, If, Import,
            Modifier, Return, Switch, VariableDeclaration, While,
        },
    },
    errors::errors::{Error, ErrorImpl},
    lexer::tokens::TokenKind,
    parser::{expr::parse_expr, lookups::BindingPower},
};

use super::{lookups::Keyword, parser::Parser, types::parse_type};

pub fn parse_stmt(parser: &mut Parser) -> Result<Expr, Error> {
    let token = parser.current_token().clone();

    match token.kind {
        TokenKind::Keyword => match Keyword::from_literal(&token.literal) {
            Some(Keyword::Fn) => parse_fn_decl_stmt(parser),
            Some(Keyword::Pub) => parse_modifier(parser, Modifier::Public),
            Some(Keyword::Extern) => parse_modifier(parser, Modifier::Extern),
            Some(Keyword::If) => parse_if_stmt(parser),
            Some(Keyword::While) => parse_while_stmt(parser),
            Some(Keyword::Return) => parse_return_stmt(parser),
            Some(Keyword::Let) | Some(Keyword::Const) => parse_var_decl_stmt(parser),
            Some(Keyword::Switch) => parse_switch_stmt(parser),
            Some(Keyword::Use) => parse_import_stmt(parser),
            Some(Keyword::True) | Some(Keyword::False) | Some(Keyword::Null) => {
                parse_expr(parser, BindingPower::Default)
            }
            Some(Keyword::Else) | Some(Keyword::Default) | Some(Keyword::As) | None => {
                Err(Error::new(
                    ErrorImpl::UnexpectedToken {
                        token: token.literal,
                    },
                    token.span.start,
                ))
            }
        },
        TokenKind::Comment => {
            parser.advance();
            Ok(Expr::Comment(Comment {
                text: token.literal,
            }))
        }
        _ => parse_expr(parser, BindingPower::Default),
    }
}

/// A statement ends at a line end or `;`; EOF, `}` and a trailing comment also end
/// it but are left for the caller.
pub fn expect_statement_end(parser: &mut Parser) -> Result<(), Error> {
    let token = parser.current_token();

    match token.kind {
        TokenKind::EOL => {
            parser.advance();
            Ok(())
        }
        TokenKind::EOF | TokenKind::Comment => Ok(()),
        TokenKind::Delimiter if token.literal == ";" => {
            parser.advance();
            Ok(())
        }
        TokenKind::Delimiter if token.literal == "}" => Ok(()),
        _ => Err(parser.error_expected("end of statement")),
    }
}

/// Parses `{ statements }`. Reaching EOF before `}` is an error.
pub fn parse_block(parser: &mut Parser) -> Result<Vec<Expr>, Error> {
    parser.expect(TokenKind::Delimiter, "{")?;

    let mut statements = Vec::new();

    loop {
        parser.skip_newlines();

        if parser.current_token().is_delimiter("}") {
            parser.advance();
            break;
        }
        if parser.current_token_kind() == TokenKind::EOF {
            return Err(parser.error_expected("`}`"));
        }

        statements.push(parse_stmt(parser)?);
        expect_statement_end(parser)?;
    }

    Ok(statements)
}

fn parse_modifier(parser: &mut Parser, modifier: Modifier) -> Result<Expr, Error> {
    let token = parser.advance();

    if parser.pending_modifiers.contains(&modifier) {
        return Err(Error::new(
            ErrorImpl::UnexpectedToken {
                token: token.literal,
            },
            token.span.start,
        ));
    }
    parser.pending_modifiers.push(modifier);

    let next = parser.current_token();
    if next.is_keyword("fn") || next.is_keyword("pub") || next.is_keyword("extern") {
        parse_stmt(parser)
    } else {
        Err(parser.error_expected("`fn` after modifier"))
    }
}

pub fn parse_fn_decl_stmt(parser: &mut Parser) -> Result<Expr, Error> {
    let modifiers = std::mem::take(&mut parser.pending_modifiers);
    let position = parser.advance().span.start;

    let name = parser.expect_identifier("function name")?;

    parser.expect(TokenKind::Delimiter, "(")?;

    let mut params = Vec::new();
    loop {
        parser.skip_trivia();
        if parser.current_token().is_delimiter(")") {
            break;
        }

        let name = parser.expect_identifier("parameter name")?;
        parser.expect(TokenKind::Delimiter, ":")?;
        let annotation = parse_type(parser)?;
        params.push(FunctionParam { name, annotation });

        parser.skip_trivia();
        if parser.current_token().is_delimiter(",") {
            parser.advance();
        } else if !parser.current_token().is_delimiter(")") {
            return Err(parser.error_expected("`,` or `)`"));
        }
    }

    parser.expect(TokenKind::Delimiter, ")")?;

    let return_type = if parser.current_token().is_operator("->") {
        parser.advance();
        Some(parse_type(parser)?)
    } else {
        None
    };

    let body = if modifiers.contains(&Modifier::Extern) {
        if parser.current_token().is_delimiter("{") {
            return Err(parser.error_expected("end of extern declaration"));
        }
        None
    } else {
        Some(parse_block(parser)?)
    };

    Ok(Expr::FunctionDeclaration(FunctionDeclaration {
        name,
        params,
        return_type,
        body,
        modifiers,
        position,
        resolved_return_type: None,
    }))
}

pub fn parse_var_decl_stmt(parser: &mut Parser) -> Result<Expr, Error> {
    let start_token = parser.advance();
    let mutable = start_token.literal == "let";

    let name = parser.expect_identifier("identifier during variable declaration")?;

    let (annotation, value) = if parser.current_token().is_operator(":=") {
        parser.advance();
        (None, Some(parse_expr(parser, BindingPower::Default)?))
    } else if parser.current_token().is_delimiter(":") {
        parser.advance();
        let annotation = parse_type(parser)?;

        if parser.current_token().is_operator("=") {
            parser.advance();
            (Some(annotation), Some(parse_expr(parser, BindingPower::Default)?))
        } else {
            (Some(annotation), None)
        }
    } else {
        (None, None)
    };

    if !mutable && value.is_none() {
        return Err(parser.error_expected("initializer in constant definition"));
    }

    Ok(Expr::VariableDeclaration(VariableDeclaration {
        name,
        mutable,
        annotation,
        value: value.map(Box::new),
        position: start_token.span.start,
        resolved_type: None,
    }))
}

pub fn parse_import_stmt(parser: &mut Parser) -> Result<Expr, Error> {
    let position = parser.advance().span.start;

    let mut path = parser.expect_identifier("module path")?;
    while parser.current_token().is_operator("/") {
        parser.advance();
        path.push('/');
        path.push_str(&parser.expect_identifier("module path segment after `/`")?);
    }

    let alias = if parser.current_token().is_keyword("as") {
        parser.advance();
        Some(parser.expect_identifier("alias after `as`")?)
    } else {
        None
    };

    Ok(Expr::Import(Import {
        path,
        alias,
        position,
    }))
}

pub fn parse_if_stmt(parser: &mut Parser) -> Result<Expr, Error> {
    parser.advance();

    let condition = parse_expr(parser, BindingPower::Default)?;
    let body = parse_block(parser)?;

    let alternate = if parser.peek_past_newlines().is_keyword("else") {
        parser.skip_newlines();
        parser.advance();

        if parser.current_token().is_keyword("if") {
            Some(Box::new(parse_if_stmt(parser)?))
        } else {
            Some(Box::new(Expr::Else(Else {
                body: parse_block(parser)?,
            })))
        }
    } else {
        None
    };

    Ok(Expr::If(If {
        condition: Box::new(condition),
        body,
        alternate,
    }))
}

pub fn parse_while_stmt(parser: &mut Parser) -> Result<Expr, Error> {
    parser.advance();

    let condition = parse_expr(parser, BindingPower::Default)?;
    let body = parse_block(parser)?;

    Ok(Expr::While(While {
        condition: Box::new(condition),
        body,
    }))
}

pub fn parse_switch_stmt(parser: &mut Parser) -> Result<Expr, Error> {
    parser.advance();

    let value = parse_expr(parser, BindingPower::Default)?;
    parser.expect(TokenKind::Delimiter, "{")?;

    let mut cases = Vec::new();
    loop {
        parser.skip_trivia();
        parser.skip_newlines();

        if parser.current_token().is_delimiter("}") {
            parser.advance();
            break;
        }
        if parser.current_token_kind() == TokenKind::EOF {
            return Err(parser.error_expected("`}`"));
        }

        let pattern = if parser.current_token().is_keyword("default") {
            parser.advance();
            CasePattern::Default
        } else {
            CasePattern::Value(parse_expr(parser, BindingPower::Default)?)
        };

        parser.expect(TokenKind::Operator, "->")?;
        let body = parse_block(parser)?;

        cases.push(Case { pattern, body });
    }

    Ok(Expr::Switch(Switch {
        value: Box::new(value),
        cases,
    }))
}

pub fn parse_return_stmt(parser: &mut Parser) -> Result<Expr, Error> {
    parser.advance();

    let token = parser.current_token();
    let ends_here = matches!(
        token.kind,
        TokenKind::EOL | TokenKind::EOF | TokenKind::Comment
    ) || token.is_delimiter("}")
        || token.is_delimiter(";");

    let value = if ends_here {
        None
    } else {
        Some(Box::new(parse_expr(parser, BindingPower::Default)?))
    };

    Ok(Expr::Return(Return { value }))
}
