//! Semantic checks over an inferred tree.
//!
//! The checker walks the program with a fresh scope stack and collects every type
//! mismatch it finds instead of stopping at the first one. Only failures that leave
//! the symbol table unusable (an unknown type name, a declaration with no type
//! information at all, an undefined symbol) abort the walk.

use crate::{
    ast::{
        ast::{Expr, Program},
        expressions::{
            Binary, BinaryOperator, FunctionCall, PostUnary, PreUnary, PrefixOperator,
        },
        statements::{
            CasePattern, FunctionDeclaration, FunctionParam, If, Return, Switch,
            VariableDeclaration,
        },
        types::{ConcreteType, TypeKind},
    },
    errors::errors::{Error, ErrorImpl},
    Position,
};

use super::environment::{ScopeStack, Symbol};

pub struct TypeChecker {
    scopes: ScopeStack,
    diagnostics: Vec<Error>,
    /// Declared or resolved return type of each enclosing function.
    return_types: Vec<ConcreteType>,
    anchor: Position,
}

/// Checks an inferred program and returns the accumulated diagnostics.
pub fn check(program: &Program) -> Result<Vec<Error>, Error> {
    let mut checker = TypeChecker::new();

    checker.hoist(&program.body)?;
    checker.check_block(&program.body)?;

    Ok(checker.diagnostics)
}

/// A root variable can be registered ahead of its declaration when its type does not
/// depend on walking the initializer.
fn hoistable(decl: &VariableDeclaration) -> bool {
    decl.annotation.is_some() || decl.resolved_concrete().is_some()
}

impl Default for TypeChecker {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeChecker {
    pub fn new() -> Self {
        TypeChecker {
            scopes: ScopeStack::new(),
            diagnostics: vec![],
            return_types: vec![],
            anchor: Position::null(),
        }
    }

    fn report(&mut self, error: ErrorImpl, position: Position) {
        self.diagnostics.push(Error::new(error, position));
    }

    fn position_of(&self, expr: &Expr) -> Position {
        expr.position().unwrap_or_else(|| self.anchor.clone())
    }

    /// Registers root functions and typed root variables so later code can refer back
    /// to them from anywhere.
    fn hoist(&mut self, body: &[Expr]) -> Result<(), Error> {
        for expr in body {
            match expr {
                Expr::Program(program) => self.hoist(&program.body)?,
                Expr::FunctionDeclaration(function) => {
                    let symbol = self.function_symbol(function)?;
                    self.define(&function.name, symbol, function.position.clone());
                }
                Expr::VariableDeclaration(decl) if hoistable(decl) => {
                    let ty = self.declared_type(decl)?;
                    self.define(
                        &decl.name,
                        Symbol::Variable {
                            ty: ty.into(),
                            mutable: decl.mutable,
                        },
                        decl.position.clone(),
                    );
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Defines `name`, reporting a redeclaration instead of aborting.
    fn define(&mut self, name: &str, symbol: Symbol, position: Position) {
        if let Err(error) = self.scopes.define(name, symbol, position) {
            self.diagnostics.push(error);
        }
    }

    fn function_symbol(&self, function: &FunctionDeclaration) -> Result<Symbol, Error> {
        let params = function
            .params
            .iter()
            .map(|param| self.scopes.resolve_type(&param.annotation))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Symbol::Function {
            params,
            ret: self.return_type(function)?.into(),
        })
    }

    fn return_type(&self, function: &FunctionDeclaration) -> Result<ConcreteType, Error> {
        if let Some(annotation) = &function.return_type {
            return self.scopes.resolve_type(annotation);
        }

        match function.resolved_concrete() {
            Some(ty) => Ok(ty),
            None if function.is_extern() => Ok(ConcreteType::VOID),
            None => Err(Error::new(
                ErrorImpl::UnresolvedType {
                    name: function.name.clone(),
                },
                function.position.clone(),
            )),
        }
    }

    /// The annotation if present, else the inferred type.
    fn declared_type(&self, decl: &VariableDeclaration) -> Result<ConcreteType, Error> {
        if let Some(annotation) = &decl.annotation {
            return self.scopes.resolve_type(annotation);
        }

        decl.resolved_concrete().ok_or_else(|| {
            Error::new(
                ErrorImpl::UnresolvedType {
                    name: decl.name.clone(),
                },
                decl.position.clone(),
            )
        })
    }

    fn check_block(&mut self, body: &[Expr]) -> Result<(), Error> {
        for expr in body {
            self.type_of(expr)?;
        }
        Ok(())
    }

    fn check_scoped_block(&mut self, body: &[Expr]) -> Result<(), Error> {
        let handle = self.scopes.push();
        let result = self.check_block(body);
        self.scopes.pop(handle);
        result
    }

    /// Type of `expr`, or `None` when it could not be determined because of an error
    /// that has already been reported.
    fn type_of(&mut self, expr: &Expr) -> Result<Option<ConcreteType>, Error> {
        match expr {
            Expr::Program(program) => {
                self.check_block(&program.body)?;
                Ok(Some(ConcreteType::VOID))
            }
            Expr::Identifier(identifier) => {
                self.type_of_name(&identifier.name, identifier.position.clone())
            }
            Expr::MemberAccess(member) => match member.qualified_name() {
                Some(name) => {
                    let position = self.position_of(&member.object);
                    self.type_of_name(&name, position)
                }
                None => {
                    let position = self.position_of(&member.object);
                    self.report(
                        ErrorImpl::InvalidMemberAccess {
                            property: member.property.clone(),
                        },
                        position,
                    );
                    Ok(None)
                }
            },
            Expr::Import(_) | Expr::Comment(_) => Ok(Some(ConcreteType::VOID)),
            Expr::FunctionDeclaration(function) => {
                self.check_function(function)?;
                Ok(Some(ConcreteType::VOID))
            }
            Expr::FunctionParam(param) => self.check_param(param).map(Some),
            Expr::FunctionCall(call) => self.check_call(call),
            Expr::Return(ret) => {
                self.check_return(ret)?;
                Ok(Some(ConcreteType::VOID))
            }
            Expr::If(if_) => {
                self.check_if(if_)?;
                Ok(Some(ConcreteType::VOID))
            }
            Expr::Else(else_) => {
                self.check_scoped_block(&else_.body)?;
                Ok(Some(ConcreteType::VOID))
            }
            Expr::While(while_) => {
                self.check_condition(&while_.condition)?;
                self.check_scoped_block(&while_.body)?;
                Ok(Some(ConcreteType::VOID))
            }
            Expr::Switch(switch) => {
                self.check_switch(switch)?;
                Ok(Some(ConcreteType::VOID))
            }
            Expr::Case(case) => {
                if let CasePattern::Value(value) = &case.pattern {
                    self.type_of(value)?;
                }
                self.check_scoped_block(&case.body)?;
                Ok(Some(ConcreteType::VOID))
            }
            Expr::Binary(binary) => self.check_binary(binary),
            Expr::PreUnary(unary) => self.check_prefix(unary),
            Expr::PostUnary(unary) => self.check_postfix(unary),
            Expr::VariableDeclaration(decl) => {
                self.check_variable(decl)?;
                Ok(Some(ConcreteType::VOID))
            }
            Expr::NumberLiteral(number) => Ok(Some(if number.is_float() {
                ConcreteType::FLOAT
            } else {
                ConcreteType::INT
            })),
            Expr::StringLiteral(_) => Ok(Some(ConcreteType::STRING)),
            Expr::BooleanLiteral(_) => Ok(Some(ConcreteType::BOOL)),
            Expr::NullLiteral(_) => Ok(Some(ConcreteType::NULL)),
        }
    }

    fn type_of_name(
        &mut self,
        name: &str,
        position: Position,
    ) -> Result<Option<ConcreteType>, Error> {
        match self.scopes.lookup(name, position.clone())? {
            Symbol::Variable { ty, .. } => Ok(ty.as_concrete()),
            Symbol::Function { ret, .. } => Ok(ret.as_concrete()),
            Symbol::Builtin(ty) => {
                let received = format!("type {}", ty);
                self.report(
                    ErrorImpl::TypeMatchError {
                        expected: String::from("value"),
                        received,
                    },
                    position,
                );
                Ok(None)
            }
        }
    }

    fn check_variable(&mut self, decl: &VariableDeclaration) -> Result<(), Error> {
        self.anchor = decl.position.clone();

        if decl.annotation.is_none() && decl.value.is_none() {
            return Err(Error::new(
                ErrorImpl::ExpectedExplicitValue {
                    variable: decl.name.clone(),
                },
                decl.position.clone(),
            ));
        }

        let annotated = decl
            .annotation
            .as_ref()
            .map(|annotation| self.scopes.resolve_type(annotation))
            .transpose()?;
        let value = match &decl.value {
            Some(value) => self.type_of(value)?,
            None => None,
        };

        // Without an annotation the inferred type is what later code was checked against
        let expected = annotated.or(decl.resolved_concrete());

        if let (Some(expected), Some(received)) = (expected, value) {
            if !expected.same_kind(&received) {
                self.report(
                    ErrorImpl::TypeMatchError {
                        expected: expected.to_string(),
                        received: received.to_string(),
                    },
                    decl.position.clone(),
                );
            }
        }

        if self.scopes.is_root() && hoistable(decl) {
            return Ok(());
        }

        let ty = match annotated.or(decl.resolved_concrete()).or(value) {
            Some(ty) => ty,
            None => self.declared_type(decl)?,
        };

        self.define(
            &decl.name,
            Symbol::Variable {
                ty: ty.into(),
                mutable: decl.mutable,
            },
            decl.position.clone(),
        );
        Ok(())
    }

    fn check_param(&mut self, param: &FunctionParam) -> Result<ConcreteType, Error> {
        let ty = self.scopes.resolve_type(&param.annotation)?;

        self.define(
            &param.name,
            Symbol::Variable {
                ty: ty.into(),
                mutable: true,
            },
            param.annotation.position.clone(),
        );

        Ok(ty)
    }

    fn check_function(&mut self, function: &FunctionDeclaration) -> Result<(), Error> {
        self.anchor = function.position.clone();

        if !self.scopes.is_root() {
            let symbol = self.function_symbol(function)?;
            self.define(&function.name, symbol, function.position.clone());
        }

        let Some(body) = &function.body else {
            return Ok(());
        };

        let ret = self.return_type(function)?;

        let handle = self.scopes.push();
        self.return_types.push(ret);

        let result = self.check_function_body(&function.params, body);

        self.return_types.pop();
        self.scopes.pop(handle);
        result
    }

    fn check_function_body(&mut self, params: &[FunctionParam], body: &[Expr]) -> Result<(), Error> {
        for param in params {
            self.check_param(param)?;
        }
        self.check_block(body)
    }

    fn check_return(&mut self, ret: &Return) -> Result<(), Error> {
        let actual = match &ret.value {
            Some(value) => self.type_of(value)?,
            None => Some(ConcreteType::VOID),
        };

        let Some(expected) = self.return_types.last().copied() else {
            return Ok(());
        };

        if let Some(actual) = actual {
            if !expected.same_kind(&actual) {
                let position = ret
                    .value
                    .as_ref()
                    .and_then(|value| value.position())
                    .unwrap_or_else(|| self.anchor.clone());

                self.report(
                    ErrorImpl::TypeMatchError {
                        expected: expected.to_string(),
                        received: actual.to_string(),
                    },
                    position,
                );
            }
        }

        Ok(())
    }

    fn check_condition(&mut self, condition: &Expr) -> Result<(), Error> {
        if let Some(ty) = self.type_of(condition)? {
            if ty.kind != TypeKind::Bool {
                let position = self.position_of(condition);
                self.report(
                    ErrorImpl::TypeMatchError {
                        expected: ConcreteType::BOOL.to_string(),
                        received: ty.to_string(),
                    },
                    position,
                );
            }
        }
        Ok(())
    }

    fn check_if(&mut self, if_: &If) -> Result<(), Error> {
        self.check_condition(&if_.condition)?;
        self.check_scoped_block(&if_.body)?;

        if let Some(alternate) = &if_.alternate {
            self.type_of(alternate)?;
        }

        Ok(())
    }

    fn check_switch(&mut self, switch: &Switch) -> Result<(), Error> {
        let subject = self.type_of(&switch.value)?;

        for case in &switch.cases {
            if let CasePattern::Value(value) = &case.pattern {
                let arm = self.type_of(value)?;

                if let (Some(subject), Some(arm)) = (subject, arm) {
                    if !subject.same_kind(&arm) {
                        let position = self.position_of(value);
                        self.report(
                            ErrorImpl::TypeMatchError {
                                expected: subject.to_string(),
                                received: arm.to_string(),
                            },
                            position,
                        );
                    }
                }
            }

            self.check_scoped_block(&case.body)?;
        }

        Ok(())
    }

    fn check_call(&mut self, call: &FunctionCall) -> Result<Option<ConcreteType>, Error> {
        let mut arguments = Vec::with_capacity(call.arguments.len());
        for argument in &call.arguments {
            arguments.push(self.type_of(argument)?);
        }

        let position = self.position_of(&call.callee);

        let Some(name) = call.callee_name() else {
            self.type_of(&call.callee)?;
            self.report(
                ErrorImpl::NotCallable {
                    name: call.callee.node_name().to_string(),
                },
                position,
            );
            return Ok(None);
        };

        let (params, ret) = match self.scopes.lookup(&name, position.clone())? {
            Symbol::Function { params, ret } => (params.clone(), ret.as_concrete()),
            Symbol::Variable { .. } | Symbol::Builtin(_) => {
                self.report(ErrorImpl::NotCallable { name }, position);
                return Ok(None);
            }
        };

        if arguments.len() > params.len() {
            self.report(
                ErrorImpl::UnexpectedArguments {
                    expected: params.len(),
                    received: arguments.len(),
                },
                position,
            );
        } else if arguments.len() < params.len() {
            self.report(
                ErrorImpl::MissingArguments {
                    expected: params.len(),
                    received: arguments.len(),
                },
                position,
            );
        } else {
            for ((argument, expr), param) in arguments.iter().zip(&call.arguments).zip(&params) {
                if let Some(argument) = argument {
                    if !argument.same_kind(param) {
                        let position = self.position_of(expr);
                        self.report(
                            ErrorImpl::ArgumentTypeMatchError {
                                expected: param.to_string(),
                                received: argument.to_string(),
                            },
                            position,
                        );
                    }
                }
            }
        }

        Ok(ret)
    }

    fn check_binary(&mut self, binary: &Binary) -> Result<Option<ConcreteType>, Error> {
        let left = self.type_of(&binary.left)?;
        let right = self.type_of(&binary.right)?;
        let operator = binary.operator;

        let (Some(left), Some(right)) = (left, right) else {
            return Ok(None);
        };

        // `/` mixes numeric kinds; the other arithmetic operators need one kind
        let legal = if operator.is_arithmetic() {
            left.is_numeric()
                && right.is_numeric()
                && (operator == BinaryOperator::Divide || left.same_kind(&right))
        } else if operator.is_comparison() {
            left.same_kind(&right) && left.kind != TypeKind::Null && right.kind != TypeKind::Null
        } else {
            left.kind == TypeKind::Bool && right.kind == TypeKind::Bool
        };

        if !legal {
            let position = binary
                .left
                .position()
                .or_else(|| binary.right.position())
                .unwrap_or_else(|| self.anchor.clone());

            self.report(
                ErrorImpl::OperatorTypeError {
                    operator: operator.to_string(),
                    left: left.to_string(),
                    right: Some(right.to_string()),
                },
                position,
            );
            return Ok(None);
        }

        let result = if operator.is_comparison() || operator.is_logical() {
            ConcreteType::BOOL
        } else if operator == BinaryOperator::Divide {
            ConcreteType::FLOAT
        } else {
            left
        };

        Ok(Some(result))
    }

    fn check_prefix(&mut self, unary: &PreUnary) -> Result<Option<ConcreteType>, Error> {
        let Some(operand) = self.type_of(&unary.operand)? else {
            return Ok(None);
        };

        let legal = match unary.operator {
            PrefixOperator::Negate => operand.is_numeric(),
            PrefixOperator::Not => operand.kind == TypeKind::Bool,
        };

        if !legal {
            let position = self.position_of(&unary.operand);
            self.report(
                ErrorImpl::OperatorTypeError {
                    operator: unary.operator.to_string(),
                    left: operand.to_string(),
                    right: None,
                },
                position,
            );
            return Ok(None);
        }

        Ok(Some(operand))
    }

    fn check_postfix(&mut self, unary: &PostUnary) -> Result<Option<ConcreteType>, Error> {
        let operand = self.type_of(&unary.operand)?;
        let position = self.position_of(&unary.operand);

        let Expr::Identifier(identifier) = unary.operand.as_ref() else {
            self.report(
                ErrorImpl::NotAssignable {
                    operator: unary.operator.to_string(),
                },
                position,
            );
            return Ok(None);
        };

        if let Some(Symbol::Variable { mutable: false, .. }) = self.scopes.resolve(&identifier.name) {
            self.report(
                ErrorImpl::ImmutableAssignment {
                    variable: identifier.name.clone(),
                },
                position.clone(),
            );
        }

        match operand {
            Some(ty) if ty.is_numeric() => Ok(Some(ty)),
            Some(ty) => {
                self.report(
                    ErrorImpl::OperatorTypeError {
                        operator: unary.operator.to_string(),
                        left: ty.to_string(),
                        right: None,
                    },
                    position,
                );
                Ok(None)
            }
            None => Ok(None),
        }
    }
}
