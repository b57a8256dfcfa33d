//! Type inference over the parsed tree.
//!
//! The walk assigns every expression a [`TypeTerm`]. Anything that cannot be decided
//! on the spot (a name used before its declaration, an operator applied to a pending
//! operand, a function whose returns are still pending) gets a placeholder and an
//! equality [`Constraint`]. Once the whole tree has been walked the constraints are
//! swept once and the results written back into `resolved_type` /
//! `resolved_return_type`.

use std::collections::HashMap;

use crate::{
    ast::{
        ast::{Expr, Program},
        expressions::{Binary, BinaryOperator, FunctionCall, PreUnary, PrefixOperator},
        statements::{
            Case, CasePattern, FunctionDeclaration, FunctionParam, If, Return, VariableDeclaration,
        },
        types::{ConcreteType, TypeTerm, TypeVar},
    },
    errors::errors::{Error, ErrorImpl},
    Position,
};

use super::{
    environment::{ScopeStack, Symbol},
    unification::{unify, Constraint, TypeVarTable},
};

const VOID: TypeTerm = TypeTerm::Concrete(ConcreteType::VOID);
const BOOL: TypeTerm = TypeTerm::Concrete(ConcreteType::BOOL);
const FLOAT: TypeTerm = TypeTerm::Concrete(ConcreteType::FLOAT);

pub struct TypeInference {
    scopes: ScopeStack,
    table: TypeVarTable,
    constraints: Vec<Constraint>,
    /// Names used before any declaration. Only a root-scope declaration settles them.
    forward_refs: HashMap<String, (TypeVar, Position)>,
    /// Root signatures already made concrete by an earlier run.
    known: HashMap<String, Symbol>,
    /// Return terms of each function body being walked, innermost last.
    function_frames: Vec<Vec<TypeTerm>>,
    /// Root variable whose initializer is being walked. It cannot settle its own
    /// forward reference.
    declaring: Option<String>,
    /// Position of the last declaration entered, for nodes that carry none.
    anchor: Position,
}

impl Default for TypeInference {
    fn default() -> Self {
        Self::new()
    }
}

/// Infers and annotates `program`.
///
/// Scope errors and operators applied to irreconcilable concrete kinds abort. A
/// declaration still holding a placeholder after the sweep is an `UnresolvedType` error.
pub fn infer(program: Program) -> Result<Program, Error> {
    TypeInference::new().run(program)
}

impl TypeInference {
    pub fn new() -> Self {
        TypeInference {
            scopes: ScopeStack::new(),
            table: TypeVarTable::new(),
            constraints: vec![],
            forward_refs: HashMap::new(),
            known: HashMap::new(),
            function_frames: vec![],
            declaring: None,
            anchor: Position::null(),
        }
    }

    /// Number of placeholders this pass has created.
    pub fn placeholder_count(&self) -> usize {
        self.table.len()
    }

    pub fn run(&mut self, mut program: Program) -> Result<Program, Error> {
        self.collect_known(&program.body);
        self.infer_block(&mut program.body)?;
        self.report_forward_refs()?;

        unify(&mut self.table, std::mem::take(&mut self.constraints));

        self.substitute_block(&mut program.body)?;
        Ok(program)
    }

    fn collect_known(&mut self, body: &[Expr]) {
        for expr in body {
            match expr {
                Expr::Program(program) => self.collect_known(&program.body),
                Expr::VariableDeclaration(decl) => {
                    if let Some(ty) = decl.resolved_concrete() {
                        self.known.insert(
                            decl.name.clone(),
                            Symbol::Variable {
                                ty: ty.into(),
                                mutable: decl.mutable,
                            },
                        );
                    }
                }
                Expr::FunctionDeclaration(function) => {
                    let Some(ret) = function.resolved_concrete() else {
                        continue;
                    };
                    let params = function
                        .params
                        .iter()
                        .map(|param| self.scopes.resolve_type(&param.annotation))
                        .collect::<Result<Vec<_>, _>>();

                    // A bad annotation is reported when the declaration is walked
                    if let Ok(params) = params {
                        self.known.insert(
                            function.name.clone(),
                            Symbol::Function {
                                params,
                                ret: ret.into(),
                            },
                        );
                    }
                }
                _ => {}
            }
        }
    }

    fn constrain(&mut self, left: TypeTerm, right: TypeTerm) {
        if left.is_placeholder() || right.is_placeholder() {
            self.constraints.push(Constraint::new(left, right));
        }
    }

    fn lookup_symbol(&self, name: &str) -> Option<&Symbol> {
        self.scopes.resolve(name).or_else(|| self.known.get(name))
    }

    fn position_of(&self, expr: &Expr) -> Position {
        expr.position().unwrap_or_else(|| self.anchor.clone())
    }

    fn infer_block(&mut self, body: &mut [Expr]) -> Result<(), Error> {
        for expr in body.iter_mut() {
            self.infer_expr(expr)?;
        }
        Ok(())
    }

    fn infer_scoped_block(&mut self, body: &mut [Expr]) -> Result<(), Error> {
        let handle = self.scopes.push();
        let result = self.infer_block(body);
        self.scopes.pop(handle);
        result
    }

    pub fn infer_expr(&mut self, expr: &mut Expr) -> Result<TypeTerm, Error> {
        match expr {
            // Merged imports share the importer's root scope
            Expr::Program(program) => {
                self.infer_block(&mut program.body)?;
                Ok(VOID)
            }
            Expr::Identifier(identifier) => {
                self.infer_identifier(&identifier.name, identifier.position.clone())
            }
            Expr::MemberAccess(member) => match member.qualified_name() {
                Some(name) => {
                    let position = self.position_of(&member.object);
                    self.infer_identifier(&name, position)
                }
                None => Err(Error::new(
                    ErrorImpl::InvalidMemberAccess {
                        property: member.property.clone(),
                    },
                    self.position_of(&member.object),
                )),
            },
            Expr::Import(_) | Expr::Comment(_) => Ok(VOID),
            Expr::FunctionDeclaration(function) => self.infer_function(function),
            Expr::FunctionParam(param) => self.infer_param(param),
            Expr::FunctionCall(call) => self.infer_call(call),
            Expr::Return(ret) => self.infer_return(ret),
            Expr::If(if_) => self.infer_if(if_),
            Expr::Else(else_) => {
                self.infer_scoped_block(&mut else_.body)?;
                Ok(VOID)
            }
            Expr::While(while_) => {
                let condition = self.infer_expr(&mut while_.condition)?;
                self.constrain(condition, BOOL);
                self.infer_scoped_block(&mut while_.body)?;
                Ok(VOID)
            }
            Expr::Switch(switch) => {
                let subject = self.infer_expr(&mut switch.value)?;
                for case in switch.cases.iter_mut() {
                    self.infer_case(case, Some(subject))?;
                }
                Ok(VOID)
            }
            Expr::Case(case) => self.infer_case(case, None),
            Expr::Binary(binary) => self.infer_binary(binary),
            Expr::PreUnary(unary) => self.infer_prefix(unary),
            Expr::PostUnary(unary) => self.infer_expr(&mut unary.operand),
            Expr::VariableDeclaration(decl) => self.infer_variable(decl),
            Expr::NumberLiteral(number) => Ok(if number.is_float() {
                FLOAT
            } else {
                ConcreteType::INT.into()
            }),
            Expr::StringLiteral(_) => Ok(ConcreteType::STRING.into()),
            Expr::BooleanLiteral(_) => Ok(BOOL),
            Expr::NullLiteral(_) => Ok(ConcreteType::NULL.into()),
        }
    }

    fn infer_identifier(&mut self, name: &str, position: Position) -> Result<TypeTerm, Error> {
        match self.lookup_symbol(name) {
            Some(Symbol::Variable { ty, .. }) => return Ok(*ty),
            Some(Symbol::Function { ret, .. }) => return Ok(*ret),
            Some(Symbol::Builtin(ty)) => {
                return Err(Error::new(
                    ErrorImpl::TypeMatchError {
                        expected: String::from("value"),
                        received: format!("type {}", ty),
                    },
                    position,
                ))
            }
            None => {}
        }

        if self.declaring.as_deref() == Some(name) {
            return Err(Error::new(
                ErrorImpl::VariableNotDeclared {
                    variable: name.to_string(),
                },
                position,
            ));
        }

        // Forward reference: every use of the name shares one placeholder
        if let Some((var, _)) = self.forward_refs.get(name) {
            return Ok(TypeTerm::Placeholder(*var));
        }

        let var = self.table.fresh();
        self.forward_refs.insert(name.to_string(), (var, position));
        Ok(TypeTerm::Placeholder(var))
    }

    /// Settles a pending forward reference with the term of a root declaration.
    fn satisfy_forward(&mut self, name: &str, term: TypeTerm) {
        if !self.scopes.is_root() {
            return;
        }

        if let Some((var, _)) = self.forward_refs.remove(name) {
            self.constrain(TypeTerm::Placeholder(var), term);
        }
    }

    fn report_forward_refs(&self) -> Result<(), Error> {
        let first = self
            .forward_refs
            .iter()
            .min_by_key(|(_, (_, position))| position.0);

        match first {
            Some((name, (_, position))) => Err(Error::new(
                ErrorImpl::VariableNotDeclared {
                    variable: name.clone(),
                },
                position.clone(),
            )),
            None => Ok(()),
        }
    }

    fn infer_variable(&mut self, decl: &mut VariableDeclaration) -> Result<TypeTerm, Error> {
        self.anchor = decl.position.clone();

        let annotated = decl
            .annotation
            .as_ref()
            .map(|annotation| self.scopes.resolve_type(annotation))
            .transpose()?;
        if self.scopes.is_root() {
            self.declaring = Some(decl.name.clone());
        }
        let value = match &mut decl.value {
            Some(value) => self.infer_expr(value).map(Some),
            None => Ok(None),
        };
        self.declaring = None;
        let value = value?;

        // The annotation wins; the checker compares it with the initializer
        let term = match (annotated, value) {
            (Some(ty), _) => TypeTerm::Concrete(ty),
            (None, Some(value)) => value,
            (None, None) => TypeTerm::Placeholder(self.table.fresh()),
        };

        if annotated.is_some() || value.is_some() {
            decl.resolved_type = Some(term);
        }

        self.scopes.define(
            &decl.name,
            Symbol::Variable {
                ty: term,
                mutable: decl.mutable,
            },
            decl.position.clone(),
        )?;
        self.satisfy_forward(&decl.name, term);

        Ok(term)
    }

    fn infer_param(&mut self, param: &FunctionParam) -> Result<TypeTerm, Error> {
        let ty = self.scopes.resolve_type(&param.annotation)?;

        self.scopes.define(
            &param.name,
            Symbol::Variable {
                ty: ty.into(),
                mutable: true,
            },
            param.annotation.position.clone(),
        )?;

        Ok(ty.into())
    }

    fn infer_function(&mut self, function: &mut FunctionDeclaration) -> Result<TypeTerm, Error> {
        self.anchor = function.position.clone();

        let params = function
            .params
            .iter()
            .map(|param| self.scopes.resolve_type(&param.annotation))
            .collect::<Result<Vec<_>, _>>()?;
        let declared = function
            .return_type
            .as_ref()
            .map(|annotation| self.scopes.resolve_type(annotation))
            .transpose()?;

        // Registered before the body is walked so recursive calls resolve
        let provisional = match (declared, function.resolved_concrete()) {
            (Some(ty), _) => ty.into(),
            (None, _) if function.is_extern() => VOID,
            (None, Some(ty)) => ty.into(),
            (None, None) => TypeTerm::Placeholder(self.table.fresh()),
        };

        self.scopes.define(
            &function.name,
            Symbol::Function {
                params,
                ret: provisional,
            },
            function.position.clone(),
        )?;
        self.satisfy_forward(&function.name, provisional);

        let Some(body) = function.body.as_mut() else {
            function.resolved_return_type = Some(provisional);
            return Ok(VOID);
        };

        let handle = self.scopes.push();
        self.function_frames.push(vec![]);

        let walked = self.infer_function_body(&function.params, body);

        let returns = self.function_frames.pop().unwrap_or_default();
        self.scopes.pop(handle);
        walked?;

        let resolved = match declared {
            Some(ty) => ty.into(),
            None => self.resolve_returns(&function.name, &returns, &function.position)?,
        };

        if resolved != provisional {
            self.constrain(provisional, resolved);
        }

        function.resolved_return_type = Some(if resolved.is_placeholder() {
            provisional
        } else {
            resolved
        });

        Ok(VOID)
    }

    fn infer_function_body(
        &mut self,
        params: &[FunctionParam],
        body: &mut [Expr],
    ) -> Result<(), Error> {
        for param in params {
            self.infer_param(param)?;
        }
        self.infer_block(body)
    }

    /// Return type of an unannotated function from the terms of its `return`s.
    fn resolve_returns(
        &mut self,
        function: &str,
        returns: &[TypeTerm],
        position: &Position,
    ) -> Result<TypeTerm, Error> {
        let Some(first) = returns.first().copied() else {
            return Ok(VOID);
        };

        if let Some(placeholder) = returns.iter().copied().find(TypeTerm::is_placeholder) {
            for term in returns {
                if *term != placeholder {
                    self.constrain(placeholder, *term);
                }
            }
            return Ok(placeholder);
        }

        for term in &returns[1..] {
            if let (Some(first), Some(other)) = (first.as_concrete(), term.as_concrete()) {
                if !first.same_kind(&other) {
                    return Err(Error::new(
                        ErrorImpl::ReturnTypeConflict {
                            function: function.to_string(),
                            first: first.to_string(),
                            second: other.to_string(),
                        },
                        position.clone(),
                    ));
                }
            }
        }

        Ok(first)
    }

    fn infer_return(&mut self, ret: &mut Return) -> Result<TypeTerm, Error> {
        let term = match &mut ret.value {
            Some(value) => self.infer_expr(value)?,
            None => VOID,
        };

        if let Some(frame) = self.function_frames.last_mut() {
            frame.push(term);
        }

        Ok(term)
    }

    fn infer_call(&mut self, call: &mut FunctionCall) -> Result<TypeTerm, Error> {
        let mut arguments = Vec::with_capacity(call.arguments.len());
        for argument in call.arguments.iter_mut() {
            arguments.push(self.infer_expr(argument)?);
        }

        let signature = call
            .callee_name()
            .and_then(|name| self.lookup_symbol(&name).cloned());

        match signature {
            Some(Symbol::Function { params, ret }) => {
                // Arity is the checker's concern
                if params.len() == arguments.len() {
                    for (argument, param) in arguments.into_iter().zip(params) {
                        self.constrain(argument, param.into());
                    }
                }
                Ok(ret)
            }
            _ => self.infer_expr(&mut call.callee),
        }
    }

    fn infer_if(&mut self, if_: &mut If) -> Result<TypeTerm, Error> {
        let condition = self.infer_expr(&mut if_.condition)?;
        self.constrain(condition, BOOL);

        self.infer_scoped_block(&mut if_.body)?;

        if let Some(alternate) = &mut if_.alternate {
            self.infer_expr(alternate)?;
        }

        Ok(VOID)
    }

    fn infer_case(&mut self, case: &mut Case, subject: Option<TypeTerm>) -> Result<TypeTerm, Error> {
        if let CasePattern::Value(value) = &mut case.pattern {
            let term = self.infer_expr(value)?;
            if let Some(subject) = subject {
                self.constrain(subject, term);
            }
        }

        self.infer_scoped_block(&mut case.body)?;
        Ok(VOID)
    }

    fn infer_binary(&mut self, binary: &mut Binary) -> Result<TypeTerm, Error> {
        let left = self.infer_expr(&mut binary.left)?;
        let right = self.infer_expr(&mut binary.right)?;
        let operator = binary.operator;
        let yields_bool = operator.is_comparison() || operator.is_logical();

        if let (Some(l), Some(r)) = (left.as_concrete(), right.as_concrete()) {
            if operator == BinaryOperator::Divide {
                return Ok(FLOAT);
            }

            if !l.same_kind(&r) {
                let position = binary
                    .left
                    .position()
                    .or_else(|| binary.right.position())
                    .unwrap_or_else(|| self.anchor.clone());

                return Err(Error::new(
                    ErrorImpl::OperatorTypeError {
                        operator: operator.to_string(),
                        left: l.to_string(),
                        right: Some(r.to_string()),
                    },
                    position,
                ));
            }

            return Ok(if yields_bool { BOOL } else { l.into() });
        }

        self.constrain(left, right);

        let result = TypeTerm::Placeholder(self.table.fresh());
        let tied = if operator == BinaryOperator::Divide {
            FLOAT
        } else if yields_bool {
            BOOL
        } else {
            left
        };
        self.constrain(result, tied);

        Ok(result)
    }

    fn infer_prefix(&mut self, unary: &mut PreUnary) -> Result<TypeTerm, Error> {
        let operand = self.infer_expr(&mut unary.operand)?;

        match unary.operator {
            PrefixOperator::Negate => Ok(operand),
            PrefixOperator::Not => {
                self.constrain(operand, BOOL);
                Ok(BOOL)
            }
        }
    }

    fn substitute_block(&self, body: &mut [Expr]) -> Result<(), Error> {
        for expr in body.iter_mut() {
            self.substitute(expr)?;
        }
        Ok(())
    }

    /// Writes the swept types into every declaration below `expr`.
    fn substitute(&self, expr: &mut Expr) -> Result<(), Error> {
        match expr {
            Expr::Program(program) => self.substitute_block(&mut program.body),
            Expr::VariableDeclaration(decl) => {
                if let Some(term) = decl.resolved_type {
                    decl.resolved_type = Some(self.settle(term, &decl.name, &decl.position)?);
                }
                Ok(())
            }
            Expr::FunctionDeclaration(function) => {
                if let Some(term) = function.resolved_return_type {
                    function.resolved_return_type =
                        Some(self.settle(term, &function.name, &function.position)?);
                }
                match function.body.as_mut() {
                    Some(body) => self.substitute_block(body),
                    None => Ok(()),
                }
            }
            Expr::If(if_) => {
                self.substitute_block(&mut if_.body)?;
                match if_.alternate.as_mut() {
                    Some(alternate) => self.substitute(alternate),
                    None => Ok(()),
                }
            }
            Expr::Else(else_) => self.substitute_block(&mut else_.body),
            Expr::While(while_) => self.substitute_block(&mut while_.body),
            Expr::Switch(switch) => {
                for case in switch.cases.iter_mut() {
                    self.substitute_block(&mut case.body)?;
                }
                Ok(())
            }
            Expr::Case(case) => self.substitute_block(&mut case.body),
            Expr::Identifier(_)
            | Expr::MemberAccess(_)
            | Expr::Import(_)
            | Expr::FunctionParam(_)
            | Expr::FunctionCall(_)
            | Expr::Return(_)
            | Expr::Binary(_)
            | Expr::PreUnary(_)
            | Expr::PostUnary(_)
            | Expr::NumberLiteral(_)
            | Expr::StringLiteral(_)
            | Expr::BooleanLiteral(_)
            | Expr::NullLiteral(_)
            | Expr::Comment(_) => Ok(()),
        }
    }

    fn settle(&self, term: TypeTerm, name: &str, position: &Position) -> Result<TypeTerm, Error> {
        match self.table.resolve(term) {
            TypeTerm::Placeholder(_) => Err(Error::new(
                ErrorImpl::UnresolvedType {
                    name: name.to_string(),
                },
                position.clone(),
            )),
            resolved => Ok(resolved),
        }
    }
}
