//! Type inference and semantic analysis module.
//!
//! This module runs over the parsed AST in two passes, each owning its own scope
//! stack:
//!
//! - Inference assigns every expression a type term, defers what cannot be decided
//!   yet behind placeholders, sweeps the collected constraints once and annotates
//!   declarations with the result
//! - Checking re-walks the annotated tree and collects operator, call, condition,
//!   return and declaration mismatches as diagnostics
//!
//! Scopes are pushed for function bodies, if/else branches, while bodies and switch
//! cases, and popped again on the way out.

pub mod environment;
pub mod inference;
pub mod type_checker;
pub mod unification;

#[cfg(test)]
mod tests;
