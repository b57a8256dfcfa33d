use crate::Position;

use super::{
    ast::Expr,
    types::{ConcreteType, TypeAnnotation, TypeTerm},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Modifier {
    Public,
    Extern,
}

/// `use std/io as io`
#[derive(Debug, Clone, PartialEq)]
pub struct Import {
    /// Slash-joined path segments, e.g. `std/io`.
    pub path: String,
    pub alias: Option<String>,
    pub position: Position,
}

impl Import {
    /// The prefix imported declarations are qualified with.
    pub fn namespace(&self) -> &str {
        match &self.alias {
            Some(alias) => alias,
            None => self.path.rsplit('/').next().unwrap_or(&self.path),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionParam {
    pub name: String,
    pub annotation: TypeAnnotation,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDeclaration {
    pub name: String,
    pub params: Vec<FunctionParam>,
    pub return_type: Option<TypeAnnotation>,
    /// `None` for `extern` functions.
    pub body: Option<Vec<Expr>>,
    pub modifiers: Vec<Modifier>,
    pub position: Position,
    /// Filled in by inference.
    pub resolved_return_type: Option<TypeTerm>,
}

impl FunctionDeclaration {
    pub fn is_extern(&self) -> bool {
        self.modifiers.contains(&Modifier::Extern)
    }

    pub fn is_public(&self) -> bool {
        self.modifiers.contains(&Modifier::Public)
    }

    pub fn resolved_concrete(&self) -> Option<ConcreteType> {
        self.resolved_return_type.and_then(|term| term.as_concrete())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Return {
    pub value: Option<Box<Expr>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct If {
    pub condition: Box<Expr>,
    pub body: Vec<Expr>,
    /// Either another `If` (an `else if` chain) or an `Else`.
    pub alternate: Option<Box<Expr>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Else {
    pub body: Vec<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct While {
    pub condition: Box<Expr>,
    pub body: Vec<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CasePattern {
    Value(Expr),
    Default,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Case {
    pub pattern: CasePattern,
    pub body: Vec<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Switch {
    pub value: Box<Expr>,
    pub cases: Vec<Case>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VariableDeclaration {
    pub name: String,
    pub mutable: bool,
    pub annotation: Option<TypeAnnotation>,
    pub value: Option<Box<Expr>>,
    pub position: Position,
    /// Filled in by inference.
    pub resolved_type: Option<TypeTerm>,
}

impl VariableDeclaration {
    pub fn resolved_concrete(&self) -> Option<ConcreteType> {
        self.resolved_type.and_then(|term| term.as_concrete())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Comment {
    pub text: String,
}
