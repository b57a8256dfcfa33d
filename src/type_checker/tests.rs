//! Unit tests for scopes, unification, inference and checking.

use crate::{
    ast::{
        ast::{Expr, Program},
        statements::{FunctionDeclaration, VariableDeclaration},
        types::{ConcreteType, TypeAnnotation, TypeTerm, TypeVar},
    },
    errors::errors::{Error, ErrorCategory, ErrorImpl},
    lexer::lexer::tokenize,
    parser::parser::parse_program,
    Position,
};

use super::{
    environment::{ScopeStack, Symbol},
    inference::{infer, TypeInference},
    type_checker::check,
    unification::{unify, Constraint, TypeVarTable},
};

fn parse(source: &str) -> Program {
    let tokens = tokenize(source.to_string(), Some("test.lang".to_string())).unwrap();
    parse_program(tokens).unwrap()
}

fn infer_source(source: &str) -> Result<Program, Error> {
    infer(parse(source))
}

fn diagnostics(source: &str) -> Vec<Error> {
    let program = infer_source(source).unwrap();
    check(&program).unwrap()
}

fn names(errors: &[Error]) -> Vec<&str> {
    errors.iter().map(Error::get_error_name).collect()
}

fn find_variable<'a>(body: &'a [Expr], name: &str) -> Option<&'a VariableDeclaration> {
    body.iter().find_map(|expr| match expr {
        Expr::VariableDeclaration(decl) if decl.name == name => Some(decl),
        Expr::FunctionDeclaration(function) => function
            .body
            .as_deref()
            .and_then(|body| find_variable(body, name)),
        Expr::Program(program) => find_variable(&program.body, name),
        _ => None,
    })
}

fn find_function<'a>(body: &'a [Expr], name: &str) -> Option<&'a FunctionDeclaration> {
    body.iter().find_map(|expr| match expr {
        Expr::FunctionDeclaration(function) if function.name == name => Some(function),
        Expr::Program(program) => find_function(&program.body, name),
        _ => None,
    })
}

fn variable_type(program: &Program, name: &str) -> Option<TypeTerm> {
    find_variable(&program.body, name).and_then(|decl| decl.resolved_type)
}

fn return_type(program: &Program, name: &str) -> Option<TypeTerm> {
    find_function(&program.body, name).and_then(|function| function.resolved_return_type)
}

fn concrete(ty: ConcreteType) -> Option<TypeTerm> {
    Some(TypeTerm::Concrete(ty))
}

fn position() -> Position {
    Position::null()
}

// SCOPES

#[test]
fn test_scope_builtins_registered() {
    let scopes = ScopeStack::new();

    assert!(scopes.is_root());
    assert_eq!(scopes.resolve("int"), Some(&Symbol::Builtin(ConcreteType::INT)));
    assert_eq!(
        scopes.resolve("i16"),
        Some(&Symbol::Builtin(ConcreteType::sized_int(16)))
    );
    assert!(scopes.resolve("number").is_none());
}

#[test]
fn test_scope_define_and_shadow() {
    let mut scopes = ScopeStack::new();
    let int = Symbol::Variable {
        ty: ConcreteType::INT.into(),
        mutable: true,
    };
    let string = Symbol::Variable {
        ty: ConcreteType::STRING.into(),
        mutable: false,
    };

    scopes.define("a", int.clone(), position()).unwrap();

    let redeclared = scopes.define("a", string.clone(), position()).unwrap_err();
    assert_eq!(redeclared.get_category(), ErrorCategory::Scope);

    let handle = scopes.push();
    assert_eq!(scopes.depth(), 2);
    assert!(!scopes.defined_in_current("a"));
    scopes.define("a", string.clone(), position()).unwrap();
    assert_eq!(scopes.resolve("a"), Some(&string));
    scopes.pop(handle);

    assert_eq!(scopes.resolve("a"), Some(&int));
}

#[test]
fn test_scope_lookup_undefined() {
    let mut scopes = ScopeStack::new();
    let handle = scopes.push();

    let error = scopes.lookup("ghost", position()).unwrap_err();
    assert!(matches!(error.get_impl(), ErrorImpl::VariableNotDeclared { variable } if variable == "ghost"));

    scopes.pop(handle);
}

#[test]
fn test_scope_builtin_redefinition_at_any_depth() {
    let mut scopes = ScopeStack::new();
    let handle = scopes.push();

    let error = scopes
        .define("float", Symbol::Builtin(ConcreteType::FLOAT), position())
        .unwrap_err();
    assert!(matches!(error.get_impl(), ErrorImpl::BuiltinRedefinition { .. }));

    scopes.pop(handle);
}

#[test]
fn test_scope_resolve_type() {
    let scopes = ScopeStack::new();
    let annotation = |name: &str| TypeAnnotation {
        name: name.to_string(),
        position: position(),
    };

    assert_eq!(scopes.resolve_type(&annotation("bool")).unwrap(), ConcreteType::BOOL);

    let error = scopes.resolve_type(&annotation("Point")).unwrap_err();
    assert!(matches!(error.get_impl(), ErrorImpl::UnknownType { type_ } if type_ == "Point"));
}

// UNIFICATION

#[test]
fn test_unify_binds_placeholder() {
    let mut table = TypeVarTable::new();
    let a = table.fresh();

    unify(
        &mut table,
        vec![Constraint::new(TypeTerm::Placeholder(a), ConcreteType::INT.into())],
    );

    assert_eq!(table.resolve(TypeTerm::Placeholder(a)), ConcreteType::INT.into());
}

#[test]
fn test_unify_merges_then_binds() {
    let mut table = TypeVarTable::new();
    let (a, b, c) = (table.fresh(), table.fresh(), table.fresh());

    unify(
        &mut table,
        vec![
            Constraint::new(TypeTerm::Placeholder(a), TypeTerm::Placeholder(b)),
            Constraint::new(TypeTerm::Placeholder(b), TypeTerm::Placeholder(c)),
            Constraint::new(ConcreteType::FLOAT.into(), TypeTerm::Placeholder(a)),
        ],
    );

    for var in [a, b, c] {
        assert_eq!(table.resolve(TypeTerm::Placeholder(var)), ConcreteType::FLOAT.into());
    }
}

#[test]
fn test_unify_first_binding_wins() {
    let mut table = TypeVarTable::new();
    let a = table.fresh();

    unify(
        &mut table,
        vec![
            Constraint::new(TypeTerm::Placeholder(a), ConcreteType::INT.into()),
            Constraint::new(TypeTerm::Placeholder(a), ConcreteType::STRING.into()),
            Constraint::new(ConcreteType::BOOL.into(), ConcreteType::VOID.into()),
        ],
    );

    assert_eq!(table.resolve(TypeTerm::Placeholder(a)), ConcreteType::INT.into());
}

#[test]
fn test_unbound_placeholder_resolves_to_representative() {
    let mut table = TypeVarTable::new();
    let (a, b) = (table.fresh(), table.fresh());

    unify(
        &mut table,
        vec![Constraint::new(TypeTerm::Placeholder(a), TypeTerm::Placeholder(b))],
    );

    assert_eq!(table.find(a), table.find(b));
    assert!(table.resolve(TypeTerm::Placeholder(a)).is_placeholder());
    assert_eq!(table.len(), 2);
    assert_eq!(TypeVar(1).to_string(), "?1");
}

// INFERENCE

#[test]
fn test_division_against_string_annotation() {
    let program = infer_source("let x: string = 43 / 2").unwrap();
    assert_eq!(variable_type(&program, "x"), concrete(ConcreteType::STRING));

    let errors = check(&program).unwrap();
    assert_eq!(errors.len(), 1);
    assert_eq!(
        errors[0].get_impl(),
        &ErrorImpl::TypeMatchError {
            expected: "string".to_string(),
            received: "float".to_string(),
        }
    );
}

#[test]
fn test_division_always_float() {
    for (left, right) in [(43, 2), (2, 43), (0, 1), (7, 7), (1_000_000, 3)] {
        let mut expr = parse(&format!("{} / {}", left, right)).body.remove(0);
        let term = TypeInference::new().infer_expr(&mut expr).unwrap();
        assert_eq!(term, ConcreteType::FLOAT.into(), "{} / {}", left, right);
    }
}

#[test]
fn test_inferred_sum_against_string_annotation() {
    let program = infer_source("let x := 4\nlet y := 3\nlet z: string = x + y").unwrap();

    assert_eq!(variable_type(&program, "x"), concrete(ConcreteType::INT));
    assert_eq!(variable_type(&program, "y"), concrete(ConcreteType::INT));

    let errors = check(&program).unwrap();
    assert_eq!(errors.len(), 1);
    assert_eq!(
        errors[0].get_impl(),
        &ErrorImpl::TypeMatchError {
            expected: "string".to_string(),
            received: "int".to_string(),
        }
    );
}

#[test]
fn test_annotated_return_type() {
    let program = infer_source("fn main() -> int { return 5 }").unwrap();

    assert_eq!(return_type(&program, "main"), concrete(ConcreteType::INT));
    assert!(check(&program).unwrap().is_empty());
}

#[test]
fn test_literal_types() {
    let program = infer_source(
        "let a := 1\nlet b := 1.5\nlet c := \"s\"\nlet d := true\nlet e := null\nlet f := 1 < 2\nlet g := !d",
    )
    .unwrap();

    assert_eq!(variable_type(&program, "a"), concrete(ConcreteType::INT));
    assert_eq!(variable_type(&program, "b"), concrete(ConcreteType::FLOAT));
    assert_eq!(variable_type(&program, "c"), concrete(ConcreteType::STRING));
    assert_eq!(variable_type(&program, "d"), concrete(ConcreteType::BOOL));
    assert_eq!(variable_type(&program, "e"), concrete(ConcreteType::NULL));
    assert_eq!(variable_type(&program, "f"), concrete(ConcreteType::BOOL));
    assert_eq!(variable_type(&program, "g"), concrete(ConcreteType::BOOL));
}

#[test]
fn test_return_type_from_returns() {
    let program = infer_source(
        "fn none() {\n  let a := 1\n}\nfn both(flag: bool) {\n  if flag {\n    return 1\n  }\n  return 2\n}",
    )
    .unwrap();

    assert_eq!(return_type(&program, "none"), concrete(ConcreteType::VOID));
    assert_eq!(return_type(&program, "both"), concrete(ConcreteType::INT));
}

#[test]
fn test_return_type_conflict() {
    let error = infer_source("fn f(a: bool) {\n  if a {\n    return 1\n  } else {\n    return \"x\"\n  }\n}")
        .unwrap_err();

    assert!(matches!(
        error.get_impl(),
        ErrorImpl::ReturnTypeConflict { function, .. } if function == "f"
    ));
    assert_eq!(error.get_category(), ErrorCategory::Type);
}

#[test]
fn test_extern_function_return() {
    let program = infer_source("extern fn puts(s: string) -> int\nextern fn abort()").unwrap();

    assert_eq!(return_type(&program, "puts"), concrete(ConcreteType::INT));
    assert_eq!(return_type(&program, "abort"), concrete(ConcreteType::VOID));
}

#[test]
fn test_forward_reference_resolves() {
    let source = "fn main() -> int {\n  let v := helper(2)\n  return v\n}\nfn helper(n: int) {\n  return n * 2\n}";
    let program = infer_source(source).unwrap();

    assert_eq!(variable_type(&program, "v"), concrete(ConcreteType::INT));
    assert_eq!(return_type(&program, "helper"), concrete(ConcreteType::INT));
    assert!(check(&program).unwrap().is_empty());
}

#[test]
fn test_placeholder_operands_resolve() {
    let source = "fn twice() {\n  return later * 2.0\n}\nfn positive() {\n  return count > 0\n}\nlet later := 1.5\nlet count := 3";
    let program = infer_source(source).unwrap();

    assert_eq!(return_type(&program, "twice"), concrete(ConcreteType::FLOAT));
    assert_eq!(return_type(&program, "positive"), concrete(ConcreteType::BOOL));
    assert!(check(&program).unwrap().is_empty());
}

#[test]
fn test_forward_reference_to_variable() {
    let program = infer_source("fn show() -> int {\n  return limit\n}\nconst limit := 10").unwrap();
    assert!(check(&program).unwrap().is_empty());
}

#[test]
fn test_undeclared_symbol() {
    let error = infer_source("fn main() {\n  return missing()\n}").unwrap_err();

    assert!(matches!(error.get_impl(), ErrorImpl::VariableNotDeclared { variable } if variable == "missing"));
    assert_eq!(error.get_category(), ErrorCategory::Scope);
}

#[test]
fn test_nested_declaration_does_not_satisfy_forward_reference() {
    let error = infer_source("fn a() -> int {\n  return b\n}\nfn c() {\n  let b := 1\n}").unwrap_err();
    assert!(matches!(error.get_impl(), ErrorImpl::VariableNotDeclared { variable } if variable == "b"));
}

#[test]
fn test_unresolved_type() {
    let error = infer_source("fn spin() {\n  return spin()\n}").unwrap_err();

    assert!(matches!(error.get_impl(), ErrorImpl::UnresolvedType { name } if name == "spin"));
    assert_eq!(error.get_category(), ErrorCategory::UnresolvedType);
}

#[test]
fn test_operator_mismatch_aborts_inference() {
    let error = infer_source("let a := 1 + \"s\"").unwrap_err();

    assert!(matches!(error.get_impl(), ErrorImpl::OperatorTypeError { operator, .. } if operator == "+"));
    assert_eq!(error.get_category(), ErrorCategory::Type);
}

#[test]
fn test_unknown_annotation() {
    let error = infer_source("let a: number = 1").unwrap_err();
    assert!(matches!(error.get_impl(), ErrorImpl::UnknownType { type_ } if type_ == "number"));
}

#[test]
fn test_builtin_redefinition() {
    let error = infer_source("let int := 4").unwrap_err();
    assert!(matches!(error.get_impl(), ErrorImpl::BuiltinRedefinition { name } if name == "int"));
}

#[test]
fn test_invalid_member_access() {
    let error = infer_source("let a := (1).b").unwrap_err();
    assert!(matches!(error.get_impl(), ErrorImpl::InvalidMemberAccess { property } if property == "b"));
}

#[test]
fn test_redeclaration_in_same_scope() {
    for source in [
        "let a := 1\nlet a := 2",
        "fn f() {\n  let a := 1\n  let a := 2\n}",
        "fn f(a: int) {\n  let a := 2\n}",
        "fn f() {}\nfn f() {}",
    ] {
        let error = infer_source(source).unwrap_err();
        assert!(
            matches!(error.get_impl(), ErrorImpl::VariableAlreadyDeclared { .. }),
            "{:?}",
            source
        );
        assert_eq!(error.get_category(), ErrorCategory::Scope);
    }
}

#[test]
fn test_shadowing_in_nested_scope() {
    let source = "let a := 1\nfn f() -> int {\n  let a := 2\n  return a\n}\nif true {\n  let a := \"s\"\n} else {\n  let a := false\n}\nwhile false {\n  let a := 1.5\n}";
    let program = infer_source(source).unwrap();

    assert!(check(&program).unwrap().is_empty());
}

#[test]
fn test_inference_is_idempotent() {
    let source = "fn main() -> int {\n  let v := helper(2)\n  return v\n}\nfn helper(n: int) {\n  return n * 2\n}\nlet total := main() + 1";
    let first = infer_source(source).unwrap();

    let mut inference = TypeInference::new();
    let second = inference.run(first.clone()).unwrap();

    assert_eq!(second, first);
    assert_eq!(inference.placeholder_count(), 0);
}

// CHECKING

#[test]
fn test_checker_accumulates_diagnostics() {
    let source = "\
fn add(a: int, b: int) -> int {
  return a + b
}
let s := \"a\" + \"b\"
let n := add(1)
let m := add(1, 2, 3)
let k := add(\"x\", 2)
if 1 { }
const c := 1
c++
let q := 1 && 2
s(1)
5++
";

    let errors = diagnostics(source);
    assert_eq!(
        names(&errors),
        vec![
            "OperatorTypeError",
            "MissingArguments",
            "UnexpectedArguments",
            "ArgumentTypeMatchError",
            "TypeMatchError",
            "ImmutableAssignment",
            "OperatorTypeError",
            "NotCallable",
            "NotAssignable",
        ]
    );
    assert!(errors
        .iter()
        .all(|error| error.get_category() == ErrorCategory::Type));
}

#[test]
fn test_checker_comparisons() {
    let errors = diagnostics("let a := null == null\nlet b := \"x\" < \"y\"\nlet c := true != false");
    assert_eq!(names(&errors), vec!["OperatorTypeError"]);
}

#[test]
fn test_checker_prefix_operators() {
    let errors = diagnostics("let a := -\"s\"\nlet b := !1\nlet c := -2.5\nlet d := !true");
    assert_eq!(names(&errors), vec!["OperatorTypeError", "OperatorTypeError"]);
}

#[test]
fn test_checker_return_mismatch() {
    let errors = diagnostics("fn f() -> int {\n  return \"s\"\n}\nfn g() -> string {\n  return\n}");

    assert_eq!(
        errors.iter().map(|e| e.get_impl().clone()).collect::<Vec<_>>(),
        vec![
            ErrorImpl::TypeMatchError {
                expected: "int".to_string(),
                received: "string".to_string(),
            },
            ErrorImpl::TypeMatchError {
                expected: "string".to_string(),
                received: "void".to_string(),
            },
        ]
    );
}

#[test]
fn test_checker_switch_arms() {
    let source = "let v := 1\nswitch v {\n  1 -> { }\n  \"one\" -> { }\n  default -> { }\n}";
    let errors = diagnostics(source);

    assert_eq!(names(&errors), vec!["TypeMatchError"]);
}

#[test]
fn test_checker_while_condition() {
    let errors = diagnostics("let i := 0\nwhile i {\n  i++\n}\nwhile i < 10 {\n  i++\n}");
    assert_eq!(names(&errors), vec!["TypeMatchError"]);
}

#[test]
fn test_checker_sized_integers_compare_by_kind() {
    let errors = diagnostics("let small: i8 = 4\nlet wide: i64 = small + 1\nfn f(x: i32) -> int {\n  return x\n}");
    assert!(errors.is_empty(), "{:?}", errors);
}

#[test]
fn test_checker_requires_type_information() {
    let program = infer_source("let a").unwrap();
    let error = check(&program).unwrap_err();

    assert!(matches!(error.get_impl(), ErrorImpl::ExpectedExplicitValue { variable } if variable == "a"));
}

#[test]
fn test_checker_reports_redeclaration() {
    // Unchecked by inference, straight from the parser
    let program = parse("let a: int = 1\nlet a: int = 2");

    let errors = check(&program).unwrap();
    assert_eq!(names(&errors), vec!["VariableAlreadyDeclared"]);
}

#[test]
fn test_checker_unknown_type_aborts() {
    let program = parse("fn f(a: thing) {}");
    let error = check(&program).unwrap_err();

    assert!(matches!(error.get_impl(), ErrorImpl::UnknownType { .. }));
}

#[test]
fn test_case_node_on_its_own() {
    let Expr::Switch(mut switch) = parse("switch 1 {\n  1 -> {\n    let inner := 2\n  }\n}").body.remove(0) else {
        panic!("expected a switch");
    };
    let mut case = Expr::Case(Box::new(switch.cases.remove(0)));

    assert_eq!(case.position(), None);
    assert_eq!(
        TypeInference::new().infer_expr(&mut case).unwrap(),
        ConcreteType::VOID.into()
    );

    let mut visited = vec![];
    case.for_each_child_mut(&mut |child| visited.push(child.node_name()));
    assert_eq!(visited, vec!["number", "variable declaration"]);
}

#[test]
fn test_self_reference_in_root_initializer() {
    let error = infer_source("let x := x + 1").unwrap_err();

    assert!(matches!(error.get_impl(), ErrorImpl::VariableNotDeclared { variable } if variable == "x"));
    assert_eq!(error.get_position().0, 9);
}

#[test]
fn test_self_reference_after_earlier_use() {
    let error = infer_source("fn f() -> int {\n  return x\n}\nlet x := x * 2").unwrap_err();
    assert!(matches!(error.get_impl(), ErrorImpl::VariableNotDeclared { variable } if variable == "x"));
}

#[test]
fn test_nested_initializer_reads_outer_binding() {
    let source = "let x := 1\nfn f() -> int {\n  let x := x + 1\n  return x\n}";
    let program = infer_source(source).unwrap();

    assert!(check(&program).unwrap().is_empty());
}

#[test]
fn test_checker_rejects_forward_float_operand() {
    let source = "let a := f() + 1\nfn f() -> float {\n  return 1.5\n}";
    let program = infer_source(source).unwrap();

    let errors = check(&program).unwrap();
    assert_eq!(
        errors.iter().map(|e| e.get_impl().clone()).collect::<Vec<_>>(),
        vec![ErrorImpl::OperatorTypeError {
            operator: "+".to_string(),
            left: "float".to_string(),
            right: Some("int".to_string()),
        }]
    );
}

#[test]
fn test_checker_division_mixes_numeric_kinds() {
    let errors = diagnostics("let a := 1.5\nlet b := 2\nlet c := a / b\nlet d := b / a");
    assert!(errors.is_empty(), "{:?}", errors);
}

#[test]
fn test_checker_compares_declaration_with_inferred_type() {
    // `a` is bound to int through `a + 1` before `h` settles it as float
    let program = infer_source("let a := h\nlet c := a + 1\nlet h := 1.5").unwrap();
    assert_eq!(variable_type(&program, "a"), concrete(ConcreteType::INT));

    let errors = check(&program).unwrap();
    assert_eq!(
        errors.iter().map(|e| e.get_impl().clone()).collect::<Vec<_>>(),
        vec![ErrorImpl::TypeMatchError {
            expected: "int".to_string(),
            received: "float".to_string(),
        }]
    );
}

#[test]
fn test_comparison_yields_bool_not_operand_kind() {
    let program = infer_source("let b: int = 1 < 2\nlet c := 3 == 3").unwrap();
    assert_eq!(variable_type(&program, "c"), concrete(ConcreteType::BOOL));

    let errors = check(&program).unwrap();
    assert_eq!(
        errors.iter().map(|e| e.get_impl().clone()).collect::<Vec<_>>(),
        vec![ErrorImpl::TypeMatchError {
            expected: "int".to_string(),
            received: "bool".to_string(),
        }]
    );
}
