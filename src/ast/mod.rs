/// AST (Abstract Syntax Tree) module
/// Contains all definitions related to the AST structure
///
/// Submodules:
/// - ast: The closed node union and the program root
/// - expressions: Operators, literals and value-producing nodes
/// - statements: Declarations and control flow
/// - types: Concrete types, placeholders and source type annotations
pub mod ast;
pub mod expressions;
pub mod statements;
pub mod types;
