use crate::ast::expressions::BinaryOperator;

/// Operator precedence, weakest first.
#[derive(PartialEq, PartialOrd, Clone, Copy, Debug)]
pub enum BindingPower {
    Default,
    Logical,
    Equality,
    Relational,
    Additive,
    Multiplicative,
    /// Prefix `-` and `!`; tighter than every binary operator.
    Unary,
}

pub fn binding_power(operator: BinaryOperator) -> BindingPower {
    match operator {
        BinaryOperator::And | BinaryOperator::Or => BindingPower::Logical,
        BinaryOperator::Equals | BinaryOperator::NotEquals => BindingPower::Equality,
        BinaryOperator::Less
        | BinaryOperator::Greater
        | BinaryOperator::LessEquals
        | BinaryOperator::GreaterEquals => BindingPower::Relational,
        BinaryOperator::Add | BinaryOperator::Subtract => BindingPower::Additive,
        BinaryOperator::Multiply | BinaryOperator::Divide => BindingPower::Multiplicative,
    }
}

#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum Keyword {
    Fn,
    If,
    Else,
    While,
    Return,
    Let,
    Const,
    Switch,
    Default,
    Use,
    As,
    Pub,
    Extern,
    True,
    False,
    Null,
}

impl Keyword {
    pub fn from_literal(literal: &str) -> Option<Keyword> {
        match literal {
            "fn" => Some(Keyword::Fn),
            "if" => Some(Keyword::If),
            "else" => Some(Keyword::Else),
            "while" => Some(Keyword::While),
            "return" => Some(Keyword::Return),
            "let" => Some(Keyword::Let),
            "const" => Some(Keyword::Const),
            "switch" => Some(Keyword::Switch),
            "default" => Some(Keyword::Default),
            "use" => Some(Keyword::Use),
            "as" => Some(Keyword::As),
            "pub" => Some(Keyword::Pub),
            "extern" => Some(Keyword::Extern),
            "true" => Some(Keyword::True),
            "false" => Some(Keyword::False),
            "null" => Some(Keyword::Null),
            _ => None,
        }
    }
}
