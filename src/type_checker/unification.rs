//! Placeholder storage and the unification sweep.
//!
//! Placeholders live in a [`TypeVarTable`] and are addressed by index. Binding or
//! merging a placeholder writes into its slot, so every environment entry, declaration
//! and constraint holding that index sees the substitution at once.

use crate::ast::types::{ConcreteType, TypeTerm, TypeVar};

#[derive(Debug, Clone, Copy, PartialEq)]
enum Slot {
    Unbound,
    Bound(ConcreteType),
    /// Merged into another placeholder's class.
    Link(TypeVar),
}

#[derive(Debug, Default)]
pub struct TypeVarTable {
    slots: Vec<Slot>,
}

impl TypeVarTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fresh(&mut self) -> TypeVar {
        self.slots.push(Slot::Unbound);
        TypeVar(self.slots.len() - 1)
    }

    /// Number of placeholders created so far.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Representative of `var`'s class. Links are followed, not compressed.
    pub fn find(&self, var: TypeVar) -> TypeVar {
        let mut current = var;
        while let Some(Slot::Link(next)) = self.slots.get(current.0) {
            current = *next;
        }
        current
    }

    /// Applies every substitution made so far to `term`.
    pub fn resolve(&self, term: TypeTerm) -> TypeTerm {
        match term {
            TypeTerm::Concrete(_) => term,
            TypeTerm::Placeholder(var) => {
                let root = self.find(var);
                match self.slots.get(root.0) {
                    Some(Slot::Bound(ty)) => TypeTerm::Concrete(*ty),
                    _ => TypeTerm::Placeholder(root),
                }
            }
        }
    }

    fn bind(&mut self, var: TypeVar, ty: ConcreteType) {
        let root = self.find(var);
        if let Some(slot) = self.slots.get_mut(root.0) {
            if *slot == Slot::Unbound {
                *slot = Slot::Bound(ty);
            }
        }
    }

    fn link(&mut self, from: TypeVar, to: TypeVar) {
        let (from, to) = (self.find(from), self.find(to));
        if from == to {
            return;
        }
        if let Some(slot) = self.slots.get_mut(from.0) {
            *slot = Slot::Link(to);
        }
    }
}

/// An equality requirement between two terms.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Constraint {
    pub left: TypeTerm,
    pub right: TypeTerm,
}

impl Constraint {
    pub fn new(left: TypeTerm, right: TypeTerm) -> Self {
        Constraint { left, right }
    }
}

/// Runs one forward pass over `constraints`, consuming them.
///
/// Each constraint is read through the substitutions made by the constraints before it:
/// - both concrete: nothing to do, kinds are not compared here
/// - placeholder and concrete: the placeholder's class is bound to the concrete type
/// - two placeholders: the classes are merged
///
/// A class that is already bound is never rebound, so of two conflicting bindings the
/// first one wins and the checker reports the mismatch. Constraints are not revisited.
pub fn unify(table: &mut TypeVarTable, constraints: Vec<Constraint>) {
    for constraint in constraints {
        let left = table.resolve(constraint.left);
        let right = table.resolve(constraint.right);

        match (left, right) {
            (TypeTerm::Concrete(_), TypeTerm::Concrete(_)) => {}
            (TypeTerm::Placeholder(var), TypeTerm::Concrete(ty))
            | (TypeTerm::Concrete(ty), TypeTerm::Placeholder(var)) => table.bind(var, ty),
            (TypeTerm::Placeholder(left), TypeTerm::Placeholder(right)) => {
                table.link(left, right)
            }
        }
    }
}
