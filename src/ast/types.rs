//! Type representations shared by the parser, inference and checker.
//!
//! A [`TypeTerm`] is either a fully determined [`ConcreteType`] or a placeholder
//! [`TypeVar`] waiting for unification. Placeholders are plain indices into the
//! inference pass's type-variable table, so copying a term never aliases state.

use std::fmt::Display;

use crate::Position;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKind {
    Int,
    Float,
    Bool,
    String,
    Void,
    Null,
}

impl Display for TypeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            TypeKind::Int => "int",
            TypeKind::Float => "float",
            TypeKind::Bool => "bool",
            TypeKind::String => "string",
            TypeKind::Void => "void",
            TypeKind::Null => "null",
        };
        write!(f, "{}", name)
    }
}

/// A primitive type. Sized integers are `Int` with a bit width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConcreteType {
    pub kind: TypeKind,
    pub width: Option<u8>,
}

impl ConcreteType {
    pub const INT: ConcreteType = ConcreteType::of(TypeKind::Int);
    pub const FLOAT: ConcreteType = ConcreteType::of(TypeKind::Float);
    pub const BOOL: ConcreteType = ConcreteType::of(TypeKind::Bool);
    pub const STRING: ConcreteType = ConcreteType::of(TypeKind::String);
    pub const VOID: ConcreteType = ConcreteType::of(TypeKind::Void);
    pub const NULL: ConcreteType = ConcreteType::of(TypeKind::Null);

    pub const fn of(kind: TypeKind) -> Self {
        ConcreteType { kind, width: None }
    }

    pub const fn sized_int(width: u8) -> Self {
        ConcreteType {
            kind: TypeKind::Int,
            width: Some(width),
        }
    }

    /// Maps a builtin type name onto its type.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "int" => Some(ConcreteType::INT),
            "float" => Some(ConcreteType::FLOAT),
            "bool" => Some(ConcreteType::BOOL),
            "string" => Some(ConcreteType::STRING),
            "void" => Some(ConcreteType::VOID),
            "null" => Some(ConcreteType::NULL),
            "i8" => Some(ConcreteType::sized_int(8)),
            "i16" => Some(ConcreteType::sized_int(16)),
            "i32" => Some(ConcreteType::sized_int(32)),
            "i64" => Some(ConcreteType::sized_int(64)),
            _ => None,
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self.kind, TypeKind::Int | TypeKind::Float)
    }

    /// Kinds agree; integer widths are not compared.
    pub fn same_kind(&self, other: &ConcreteType) -> bool {
        self.kind == other.kind
    }
}

impl Display for ConcreteType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.width {
            Some(width) => write!(f, "i{}", width),
            None => write!(f, "{}", self.kind),
        }
    }
}

/// Names registered in the root scope before any program is walked.
pub const BUILTIN_TYPE_NAMES: [&str; 10] = [
    "int", "float", "bool", "string", "void", "null", "i8", "i16", "i32", "i64",
];

/// Index of a placeholder slot in the type-variable table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeVar(pub usize);

impl Display for TypeVar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "?{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeTerm {
    Concrete(ConcreteType),
    Placeholder(TypeVar),
}

impl TypeTerm {
    pub fn as_concrete(&self) -> Option<ConcreteType> {
        match self {
            TypeTerm::Concrete(ty) => Some(*ty),
            TypeTerm::Placeholder(_) => None,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self, TypeTerm::Placeholder(_))
    }
}

impl From<ConcreteType> for TypeTerm {
    fn from(ty: ConcreteType) -> Self {
        TypeTerm::Concrete(ty)
    }
}

impl Display for TypeTerm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TypeTerm::Concrete(ty) => write!(f, "{}", ty),
            TypeTerm::Placeholder(var) => write!(f, "{}", var),
        }
    }
}

/// A type name as written in the source, e.g. the `int` in `x: int`.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeAnnotation {
    pub name: String,
    pub position: Position,
}
