use crate::{
    ast::{
        ast::Expr,
        expressions::{
            Binary, BinaryOperator, BooleanLiteral, FunctionCall, Identifier, MemberAccess,
            NullLiteral, NumberLiteral, PostUnary, PostfixOperator, PreUnary, PrefixOperator,
            StringLiteral,
        },
    },
    errors::errors::{Error, ErrorImpl},
    lexer::tokens::TokenKind,
};

use super::{
    lookups::{binding_power, BindingPower, Keyword},
    parser::Parser,
};

/// Parses an expression whose binary operators all bind tighter than `bp`.
///
/// After the primary expression, postfix `++`/`--`, member access, calls and binary
/// operators are applied in whatever order they appear, so `a.b().c + 1++` parses as
/// `((a.b)().c) + (1++)`.
pub fn parse_expr(parser: &mut Parser, bp: BindingPower) -> Result<Expr, Error> {
    let mut left = parse_primary_expr(parser)?;

    loop {
        let token = parser.current_token();

        if token.is_operator("++") || token.is_operator("--") {
            left = parse_postfix_expr(parser, left)?;
        } else if token.is_operator(".") {
            left = parse_member_expr(parser, left)?;
        } else if token.is_delimiter("(") {
            left = parse_call_expr(parser, left)?;
        } else if token.kind == TokenKind::Operator {
            match BinaryOperator::from_literal(&token.literal) {
                Some(operator) if binding_power(operator) > bp => {
                    left = parse_binary_expr(parser, left, operator)?;
                }
                _ => break,
            }
        } else {
            break;
        }
    }

    Ok(left)
}

pub fn parse_primary_expr(parser: &mut Parser) -> Result<Expr, Error> {
    let token = parser.current_token().clone();

    match token.kind {
        TokenKind::Number => {
            let valid = if token.literal.contains('.') {
                token.literal.parse::<f64>().is_ok()
            } else {
                token.literal.parse::<i64>().is_ok()
            };

            if !valid {
                return Err(Error::new(
                    ErrorImpl::NumberParseError {
                        token: token.literal,
                    },
                    token.span.start,
                ));
            }

            parser.advance();
            Ok(Expr::NumberLiteral(NumberLiteral {
                value: token.literal,
            }))
        }
        TokenKind::String => {
            parser.advance();
            Ok(Expr::StringLiteral(StringLiteral {
                value: token.literal,
            }))
        }
        TokenKind::Identifier => {
            parser.advance();
            Ok(Expr::Identifier(Identifier {
                name: token.literal,
                position: token.span.start,
            }))
        }
        TokenKind::Keyword => match Keyword::from_literal(&token.literal) {
            Some(Keyword::True) => {
                parser.advance();
                Ok(Expr::BooleanLiteral(BooleanLiteral { value: true }))
            }
            Some(Keyword::False) => {
                parser.advance();
                Ok(Expr::BooleanLiteral(BooleanLiteral { value: false }))
            }
            Some(Keyword::Null) => {
                parser.advance();
                Ok(Expr::NullLiteral(NullLiteral))
            }
            _ => Err(parser.error_expected("expression")),
        },
        TokenKind::Delimiter if token.literal == "(" => parse_grouping_expr(parser),
        TokenKind::Operator if token.literal == "-" => parse_prefix_expr(parser, PrefixOperator::Negate),
        TokenKind::Operator if token.literal == "!" => parse_prefix_expr(parser, PrefixOperator::Not),
        _ => Err(parser.error_expected("expression")),
    }
}

pub fn parse_binary_expr(
    parser: &mut Parser,
    left: Expr,
    operator: BinaryOperator,
) -> Result<Expr, Error> {
    parser.advance();
    parser.skip_trivia();

    let right = parse_expr(parser, binding_power(operator))?;

    Ok(Expr::Binary(Binary {
        left: Box::new(left),
        operator,
        right: Box::new(right),
    }))
}

pub fn parse_prefix_expr(parser: &mut Parser, operator: PrefixOperator) -> Result<Expr, Error> {
    parser.advance();
    let operand = parse_expr(parser, BindingPower::Unary)?;

    Ok(Expr::PreUnary(PreUnary {
        operator,
        operand: Box::new(operand),
    }))
}

pub fn parse_postfix_expr(parser: &mut Parser, operand: Expr) -> Result<Expr, Error> {
    let operator = if parser.advance().literal == "++" {
        PostfixOperator::Increment
    } else {
        PostfixOperator::Decrement
    };

    Ok(Expr::PostUnary(PostUnary {
        operator,
        operand: Box::new(operand),
    }))
}

pub fn parse_grouping_expr(parser: &mut Parser) -> Result<Expr, Error> {
    parser.advance();
    parser.skip_trivia();

    let expr = parse_expr(parser, BindingPower::Default)?;

    parser.skip_trivia();
    parser.expect(TokenKind::Delimiter, ")")?;

    Ok(expr)
}

pub fn parse_call_expr(parser: &mut Parser, callee: Expr) -> Result<Expr, Error> {
    parser.advance();

    let mut arguments = vec![];

    loop {
        parser.skip_trivia();
        if parser.current_token().is_delimiter(")") {
            break;
        }

        arguments.push(parse_expr(parser, BindingPower::Default)?);
        parser.skip_trivia();

        if parser.current_token().is_delimiter(",") {
            parser.advance();
        } else if !parser.current_token().is_delimiter(")") {
            return Err(parser.error_expected("`,` or `)`"));
        }
    }

    parser.expect(TokenKind::Delimiter, ")")?;

    Ok(Expr::FunctionCall(FunctionCall {
        callee: Box::new(callee),
        arguments,
    }))
}

pub fn parse_member_expr(parser: &mut Parser, object: Expr) -> Result<Expr, Error> {
    parser.advance();
    let property = parser.expect_identifier("property name after `.`")?;

    Ok(Expr::MemberAccess(MemberAccess {
        object: Box::new(object),
        property,
    }))
}
