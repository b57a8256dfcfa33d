use crate::Position;

use super::{
    expressions::{
        Binary, BooleanLiteral, FunctionCall, Identifier, MemberAccess, NullLiteral,
        NumberLiteral, PostUnary, PreUnary, StringLiteral,
    },
    statements::{
        Case, CasePattern, Comment, Else, FunctionDeclaration, FunctionParam, If, Import,
        Return, Switch, VariableDeclaration, While,
    },
};

/// A parsed source file, or an imported module merged into one.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Program {
    pub body: Vec<Expr>,
}

/// Every node of the language.
///
/// Statements are expressions too; the union is closed so passes can match on it
/// exhaustively. Only `resolved_type` / `resolved_return_type` on declarations are
/// written after parsing.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Program(Program),
    Identifier(Identifier),
    MemberAccess(MemberAccess),
    Import(Import),
    FunctionDeclaration(FunctionDeclaration),
    FunctionParam(FunctionParam),
    FunctionCall(FunctionCall),
    Return(Return),
    If(If),
    Else(Else),
    While(While),
    Switch(Switch),
    Case(Box<Case>),
    Binary(Binary),
    PreUnary(PreUnary),
    PostUnary(PostUnary),
    VariableDeclaration(VariableDeclaration),
    NumberLiteral(NumberLiteral),
    StringLiteral(StringLiteral),
    BooleanLiteral(BooleanLiteral),
    NullLiteral(NullLiteral),
    Comment(Comment),
}

impl Expr {
    /// First source position found in this node, searching left to right.
    ///
    /// Literals carry no position, so `1 + 2` has none.
    pub fn position(&self) -> Option<Position> {
        match self {
            Expr::Identifier(identifier) => Some(identifier.position.clone()),
            Expr::Import(import) => Some(import.position.clone()),
            Expr::FunctionDeclaration(function) => Some(function.position.clone()),
            Expr::VariableDeclaration(decl) => Some(decl.position.clone()),
            Expr::FunctionParam(param) => Some(param.annotation.position.clone()),
            Expr::MemberAccess(member) => member.object.position(),
            Expr::FunctionCall(call) => call
                .callee
                .position()
                .or_else(|| call.arguments.iter().find_map(Expr::position)),
            Expr::Binary(binary) => binary.left.position().or_else(|| binary.right.position()),
            Expr::PreUnary(unary) => unary.operand.position(),
            Expr::PostUnary(unary) => unary.operand.position(),
            Expr::Return(ret) => ret.value.as_ref().and_then(|value| value.position()),
            Expr::If(if_) => if_.condition.position(),
            Expr::While(while_) => while_.condition.position(),
            Expr::Switch(switch) => switch.value.position(),
            Expr::Program(_)
            | Expr::Else(_)
            | Expr::Case(_)
            | Expr::NumberLiteral(_)
            | Expr::StringLiteral(_)
            | Expr::BooleanLiteral(_)
            | Expr::NullLiteral(_)
            | Expr::Comment(_) => None,
        }
    }

    /// Calls `f` on every direct child node, in source order.
    pub fn for_each_child_mut<F: FnMut(&mut Expr)>(&mut self, f: &mut F) {
        match self {
            Expr::Program(program) => program.body.iter_mut().for_each(f),
            Expr::MemberAccess(member) => f(&mut *member.object),
            Expr::FunctionDeclaration(function) => {
                if let Some(body) = function.body.as_mut() {
                    body.iter_mut().for_each(f);
                }
            }
            Expr::FunctionCall(call) => {
                f(&mut *call.callee);
                call.arguments.iter_mut().for_each(f);
            }
            Expr::Return(ret) => {
                if let Some(value) = ret.value.as_mut() {
                    f(&mut **value);
                }
            }
            Expr::If(if_) => {
                f(&mut *if_.condition);
                if_.body.iter_mut().for_each(&mut *f);
                if let Some(alternate) = if_.alternate.as_mut() {
                    f(&mut **alternate);
                }
            }
            Expr::Else(else_) => else_.body.iter_mut().for_each(f),
            Expr::While(while_) => {
                f(&mut *while_.condition);
                while_.body.iter_mut().for_each(f);
            }
            Expr::Switch(switch) => {
                f(&mut *switch.value);
                for case in switch.cases.iter_mut() {
                    if let CasePattern::Value(value) = &mut case.pattern {
                        f(value);
                    }
                    case.body.iter_mut().for_each(&mut *f);
                }
            }
            Expr::Case(case) => {
                if let CasePattern::Value(value) = &mut case.pattern {
                    f(value);
                }
                case.body.iter_mut().for_each(f);
            }
            Expr::Binary(binary) => {
                f(&mut *binary.left);
                f(&mut *binary.right);
            }
            Expr::PreUnary(unary) => f(&mut *unary.operand),
            Expr::PostUnary(unary) => f(&mut *unary.operand),
            Expr::VariableDeclaration(decl) => {
                if let Some(value) = decl.value.as_mut() {
                    f(&mut **value);
                }
            }
            Expr::Identifier(_)
            | Expr::Import(_)
            | Expr::FunctionParam(_)
            | Expr::NumberLiteral(_)
            | Expr::StringLiteral(_)
            | Expr::BooleanLiteral(_)
            | Expr::NullLiteral(_)
            | Expr::Comment(_) => {}
        }
    }

    /// Short node name used in diagnostics.
    pub fn node_name(&self) -> &'static str {
        match self {
            Expr::Program(_) => "program",
            Expr::Identifier(_) => "identifier",
            Expr::MemberAccess(_) => "member access",
            Expr::Import(_) => "import",
            Expr::FunctionDeclaration(_) => "function declaration",
            Expr::FunctionParam(_) => "function parameter",
            Expr::FunctionCall(_) => "function call",
            Expr::Return(_) => "return",
            Expr::If(_) => "if",
            Expr::Else(_) => "else",
            Expr::While(_) => "while",
            Expr::Switch(_) => "switch",
            Expr::Case(_) => "case",
            Expr::Binary(_) => "binary expression",
            Expr::PreUnary(_) => "prefix expression",
            Expr::PostUnary(_) => "postfix expression",
            Expr::VariableDeclaration(_) => "variable declaration",
            Expr::NumberLiteral(_) => "number",
            Expr::StringLiteral(_) => "string",
            Expr::BooleanLiteral(_) => "boolean",
            Expr::NullLiteral(_) => "null",
            Expr::Comment(_) => "comment",
        }
    }
}
