//! Lexical scopes shared by the inference and checking passes.
//!
//! Each pass owns its own [`ScopeStack`]. The root scope is created with every builtin
//! type name registered, and can never be popped.

use std::collections::HashMap;

use crate::{
    ast::types::{ConcreteType, TypeAnnotation, TypeTerm, BUILTIN_TYPE_NAMES},
    errors::errors::{Error, ErrorImpl},
    Position,
};

#[derive(Debug, Clone, PartialEq)]
pub enum Symbol {
    Variable { ty: TypeTerm, mutable: bool },
    /// Parameters always carry annotations, so only the return type can be pending.
    Function {
        params: Vec<ConcreteType>,
        ret: TypeTerm,
    },
    Builtin(ConcreteType),
}

/// Returned by [`ScopeStack::push`] and handed back to [`ScopeStack::pop`].
#[derive(Debug, PartialEq, Eq)]
#[must_use = "a pushed scope has to be popped again"]
pub struct ScopeHandle(usize);

#[derive(Debug, Default)]
struct Scope {
    symbols: HashMap<String, Symbol>,
}

#[derive(Debug)]
pub struct ScopeStack {
    scopes: Vec<Scope>,
}

impl Default for ScopeStack {
    fn default() -> Self {
        Self::new()
    }
}

impl ScopeStack {
    pub fn new() -> Self {
        let mut root = Scope::default();

        for name in BUILTIN_TYPE_NAMES {
            if let Some(ty) = ConcreteType::from_name(name) {
                root.symbols.insert(name.to_string(), Symbol::Builtin(ty));
            }
        }

        ScopeStack { scopes: vec![root] }
    }

    pub fn push(&mut self) -> ScopeHandle {
        self.scopes.push(Scope::default());
        ScopeHandle(self.scopes.len() - 1)
    }

    /// Pops the innermost scope, which must be the one `handle` was issued for.
    pub fn pop(&mut self, handle: ScopeHandle) {
        debug_assert_eq!(handle.0, self.scopes.len() - 1, "scopes popped out of order");

        if self.scopes.len() > 1 {
            self.scopes.pop();
        }
    }

    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    pub fn is_root(&self) -> bool {
        self.scopes.len() == 1
    }

    /// Adds `name` to the innermost scope.
    ///
    /// Fails if the innermost scope already holds `name`, or if `name` is a builtin type
    /// (at any depth).
    pub fn define(&mut self, name: &str, symbol: Symbol, position: Position) -> Result<(), Error> {
        if BUILTIN_TYPE_NAMES.contains(&name) {
            return Err(Error::new(
                ErrorImpl::BuiltinRedefinition {
                    name: name.to_string(),
                },
                position,
            ));
        }

        // The root scope is never popped
        let innermost = self.scopes.len() - 1;
        let scope = &mut self.scopes[innermost];

        if scope.symbols.contains_key(name) {
            return Err(Error::new(
                ErrorImpl::VariableAlreadyDeclared {
                    variable: name.to_string(),
                },
                position,
            ));
        }

        scope.symbols.insert(name.to_string(), symbol);
        Ok(())
    }

    /// Finds `name`, innermost scope first.
    pub fn resolve(&self, name: &str) -> Option<&Symbol> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.symbols.get(name))
    }

    /// Like [`ScopeStack::resolve`], but an unknown name is an error.
    pub fn lookup(&self, name: &str, position: Position) -> Result<&Symbol, Error> {
        self.resolve(name).ok_or_else(|| {
            Error::new(
                ErrorImpl::VariableNotDeclared {
                    variable: name.to_string(),
                },
                position,
            )
        })
    }

    pub fn defined_in_current(&self, name: &str) -> bool {
        self.scopes
            .last()
            .is_some_and(|scope| scope.symbols.contains_key(name))
    }

    /// Maps an annotation onto the builtin type it names.
    pub fn resolve_type(&self, annotation: &TypeAnnotation) -> Result<ConcreteType, Error> {
        match self.resolve(&annotation.name) {
            Some(Symbol::Builtin(ty)) => Ok(*ty),
            _ => Err(Error::new(
                ErrorImpl::UnknownType {
                    type_: annotation.name.clone(),
                },
                annotation.position.clone(),
            )),
        }
    }
}
