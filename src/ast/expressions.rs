use std::fmt::Display;

use crate::Position;

use super::ast::Expr;

// OPERATORS

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOperator {
    Add,
    Subtract,
    Multiply,
    Divide,
    Equals,
    NotEquals,
    Less,
    Greater,
    LessEquals,
    GreaterEquals,
    And,
    Or,
}

impl BinaryOperator {
    pub fn from_literal(literal: &str) -> Option<Self> {
        match literal {
            "+" => Some(BinaryOperator::Add),
            "-" => Some(BinaryOperator::Subtract),
            "*" => Some(BinaryOperator::Multiply),
            "/" => Some(BinaryOperator::Divide),
            "==" => Some(BinaryOperator::Equals),
            "!=" => Some(BinaryOperator::NotEquals),
            "<" => Some(BinaryOperator::Less),
            ">" => Some(BinaryOperator::Greater),
            "<=" => Some(BinaryOperator::LessEquals),
            ">=" => Some(BinaryOperator::GreaterEquals),
            "&&" => Some(BinaryOperator::And),
            "||" => Some(BinaryOperator::Or),
            _ => None,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            BinaryOperator::Add => "+",
            BinaryOperator::Subtract => "-",
            BinaryOperator::Multiply => "*",
            BinaryOperator::Divide => "/",
            BinaryOperator::Equals => "==",
            BinaryOperator::NotEquals => "!=",
            BinaryOperator::Less => "<",
            BinaryOperator::Greater => ">",
            BinaryOperator::LessEquals => "<=",
            BinaryOperator::GreaterEquals => ">=",
            BinaryOperator::And => "&&",
            BinaryOperator::Or => "||",
        }
    }

    pub fn is_arithmetic(&self) -> bool {
        matches!(
            self,
            BinaryOperator::Add
                | BinaryOperator::Subtract
                | BinaryOperator::Multiply
                | BinaryOperator::Divide
        )
    }

    pub fn is_comparison(&self) -> bool {
        matches!(
            self,
            BinaryOperator::Equals
                | BinaryOperator::NotEquals
                | BinaryOperator::Less
                | BinaryOperator::Greater
                | BinaryOperator::LessEquals
                | BinaryOperator::GreaterEquals
        )
    }

    pub fn is_logical(&self) -> bool {
        matches!(self, BinaryOperator::And | BinaryOperator::Or)
    }
}

impl Display for BinaryOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrefixOperator {
    Negate,
    Not,
}

impl Display for PrefixOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PrefixOperator::Negate => write!(f, "-"),
            PrefixOperator::Not => write!(f, "!"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostfixOperator {
    Increment,
    Decrement,
}

impl Display for PostfixOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PostfixOperator::Increment => write!(f, "++"),
            PostfixOperator::Decrement => write!(f, "--"),
        }
    }
}

// LITERALS

/// Numeric literal, kept as written so inference can tell `4` from `4.0`.
#[derive(Debug, Clone, PartialEq)]
pub struct NumberLiteral {
    pub value: String,
}

impl NumberLiteral {
    pub fn is_float(&self) -> bool {
        self.value.contains('.')
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StringLiteral {
    pub value: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BooleanLiteral {
    pub value: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NullLiteral;

// COMPLEX

#[derive(Debug, Clone, PartialEq)]
pub struct Identifier {
    pub name: String,
    pub position: Position,
}

/// `object.property`. Only module namespaces have members.
#[derive(Debug, Clone, PartialEq)]
pub struct MemberAccess {
    pub object: Box<Expr>,
    pub property: String,
}

impl MemberAccess {
    /// `ns.name` when the object is a bare identifier.
    pub fn qualified_name(&self) -> Option<String> {
        match self.object.as_ref() {
            Expr::Identifier(identifier) => {
                Some(format!("{}.{}", identifier.name, self.property))
            }
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionCall {
    pub callee: Box<Expr>,
    pub arguments: Vec<Expr>,
}

impl FunctionCall {
    /// Name of the called symbol, if the callee names one directly.
    pub fn callee_name(&self) -> Option<String> {
        match self.callee.as_ref() {
            Expr::Identifier(identifier) => Some(identifier.name.clone()),
            Expr::MemberAccess(member) => member.qualified_name(),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Binary {
    pub left: Box<Expr>,
    pub operator: BinaryOperator,
    pub right: Box<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PreUnary {
    pub operator: PrefixOperator,
    pub operand: Box<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PostUnary {
    pub operator: PostfixOperator,
    pub operand: Box<Expr>,
}
