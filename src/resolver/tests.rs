use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};

use crate::{
    ast::{
        ast::{Expr, Program},
        statements::FunctionDeclaration,
        types::ConcreteType,
    },
    errors::errors::{Error, ErrorCategory},
    lexer::lexer::tokenize,
    parser::parser::parse_program,
    type_checker::{inference::infer, type_checker::check},
};

use super::resolver::{ModuleResolver, SourceLoader};

#[derive(Default)]
struct MemoryLoader {
    files: HashMap<PathBuf, String>,
}

impl MemoryLoader {
    fn with(mut self, path: &str, source: &str) -> Self {
        self.files.insert(PathBuf::from(path), source.to_string());
        self
    }
}

impl SourceLoader for MemoryLoader {
    fn load(&self, path: &Path) -> Option<String> {
        self.files.get(path).cloned()
    }
}

fn resolver(loader: MemoryLoader) -> ModuleResolver<MemoryLoader> {
    ModuleResolver::new(loader, "project", "stdlib")
}

fn parse(source: &str) -> Program {
    let tokens = tokenize(source.to_string(), Some("main.lang".to_string())).unwrap();
    parse_program(tokens).unwrap()
}

fn resolve(loader: MemoryLoader, source: &str) -> Result<Program, Error> {
    resolver(loader).resolve_program(parse(source))
}

fn modules(program: &Program) -> Vec<&Program> {
    program
        .body
        .iter()
        .filter_map(|expr| match expr {
            Expr::Program(module) => Some(module),
            _ => None,
        })
        .collect()
}

fn function<'a>(program: &'a Program, name: &str) -> &'a FunctionDeclaration {
    program
        .body
        .iter()
        .find_map(|expr| match expr {
            Expr::FunctionDeclaration(function) if function.name == name => Some(function),
            _ => None,
        })
        .unwrap()
}

/// Identifiers referenced by the last statement of `function`, which must be a return.
fn returned_names(function: &FunctionDeclaration) -> Vec<String> {
    let mut names = vec![];
    let mut body = function.body.clone().unwrap();

    match body.last_mut() {
        Some(Expr::Return(ret)) => collect_identifiers(ret.value.as_deref_mut().unwrap(), &mut names),
        other => panic!("expected a return, got {:?}", other),
    }

    names
}

fn collect_identifiers(expr: &mut Expr, names: &mut Vec<String>) {
    if let Expr::Identifier(identifier) = expr {
        names.push(identifier.name.clone());
    }
    expr.for_each_child_mut(&mut |child| collect_identifiers(child, names));
}

const MATH: &str = "fn add(a: int, b: int) -> int {
    return a + b
}
let base := 10
fn offset(base: int) -> int {
    return add(base, 1)
}
fn bump() -> int {
    return add(base, 1)
}
";

#[test]
fn test_module_paths() {
    let resolver = resolver(MemoryLoader::default());

    assert_eq!(
        resolver.module_path("std/io"),
        PathBuf::from("stdlib").join("io.lang")
    );
    assert_eq!(
        resolver.module_path("lib/math"),
        PathBuf::from("project").join("lib/math.lang")
    );
}

#[test]
fn test_module_declarations_are_qualified() {
    let loader = MemoryLoader::default().with("project/lib/math.lang", MATH);
    let program = resolve(loader, "use lib/math").unwrap();

    let modules = modules(&program);
    assert_eq!(modules.len(), 1);
    let math = modules[0];

    function(math, "math.add");
    assert!(math.body.iter().any(|expr| matches!(
        expr,
        Expr::VariableDeclaration(decl) if decl.name == "math.base"
    )));

    // The parameter shadows the module-level `base`
    assert_eq!(returned_names(function(math, "math.offset")), ["math.add", "base"]);
    assert_eq!(returned_names(function(math, "math.bump")), ["math.add", "math.base"]);
}

#[test]
fn test_parameters_are_not_qualified() {
    let loader = MemoryLoader::default().with("project/lib/math.lang", MATH);
    let program = resolve(loader, "use lib/math").unwrap();

    assert_eq!(returned_names(function(modules(&program)[0], "math.add")), ["a", "b"]);
}

#[test]
fn test_local_declaration_shadows_module_name() {
    let loader = MemoryLoader::default().with(
        "project/util.lang",
        "let limit := 3\nfn clamp() -> int {\n    let limit := 5\n    return limit\n}\n",
    );
    let program = resolve(loader, "use util").unwrap();

    assert_eq!(returned_names(function(modules(&program)[0], "util.clamp")), ["limit"]);
}

#[test]
fn test_member_access_is_rewritten() {
    let loader = MemoryLoader::default().with("project/lib/math.lang", MATH);
    let program = resolve(loader, "use lib/math as m\nlet total := m.add(1, 2)").unwrap();

    let Some(Expr::VariableDeclaration(decl)) = program.body.last() else {
        panic!("expected a declaration");
    };
    let Some(Expr::FunctionCall(call)) = decl.value.as_deref() else {
        panic!("expected a call");
    };
    let Expr::Identifier(callee) = call.callee.as_ref() else {
        panic!("expected an identifier");
    };

    assert_eq!(callee.name, "m.add");
    assert_eq!(callee.position.1.as_str(), "main.lang");
}

#[test]
fn test_unrelated_member_access_is_kept() {
    let loader = MemoryLoader::default().with("project/lib/math.lang", MATH);
    let program = resolve(loader, "use lib/math\nlet x := other.add").unwrap();

    let Some(Expr::VariableDeclaration(decl)) = program.body.last() else {
        panic!("expected a declaration");
    };
    assert!(matches!(decl.value.as_deref(), Some(Expr::MemberAccess(_))));
}

#[test]
fn test_duplicate_import_is_dropped() {
    let loader = MemoryLoader::default().with("project/lib/math.lang", MATH);
    let program = resolve(loader, "use lib/math\nuse lib/math").unwrap();

    assert_eq!(modules(&program).len(), 1);
    assert!(!program.body.iter().any(|expr| matches!(expr, Expr::Import(_))));
}

#[test]
fn test_import_cycle_terminates() {
    let loader = MemoryLoader::default()
        .with("project/a.lang", "use b\nfn one() -> int { return 1 }")
        .with("project/b.lang", "use a\nfn two() -> int { return 2 }");
    let program = resolve(loader, "use a").unwrap();

    let a = modules(&program)[0];
    function(a, "a.one");

    let b = modules(a)[0];
    function(b, "b.two");
    assert!(modules(b).is_empty());
}

#[test]
fn test_entry_file_marked_resolved() {
    let loader = MemoryLoader::default().with("project/main.lang", "fn main() {}");
    let mut resolver = resolver(loader);
    resolver.mark_resolved(PathBuf::from("project/main.lang"));

    let program = resolver.resolve_program(parse("use main")).unwrap();
    assert!(program.body.is_empty());
    assert!(resolver.is_resolved(Path::new("project/main.lang")));
}

#[test]
fn test_missing_module() {
    let error = resolve(MemoryLoader::default(), "let x := 1\nuse std/nothing").unwrap_err();

    assert_eq!(error.get_error_name(), "ModuleNotFound");
    assert_eq!(error.get_category(), ErrorCategory::Scope);
    assert_eq!(error.get_position().0, 11);
}

#[test]
fn test_module_parse_error_names_module_file() {
    let loader = MemoryLoader::default().with("stdlib/broken.lang", "let := 4");
    let error = resolve(loader, "use std/broken").unwrap_err();

    assert_eq!(error.get_category(), ErrorCategory::Parse);
    assert_eq!(
        error.get_position().1.as_str(),
        PathBuf::from("stdlib").join("broken.lang").display().to_string()
    );
}

#[test]
fn test_resolved_program_infers_and_checks() {
    let loader = MemoryLoader::default().with("project/lib/math.lang", MATH);
    let program = resolve(loader, "use lib/math\nlet total := math.add(1, math.base)").unwrap();

    let program = infer(program).unwrap();
    assert!(check(&program).unwrap().is_empty());

    let Some(Expr::VariableDeclaration(decl)) = program.body.last() else {
        panic!("expected a declaration");
    };
    assert_eq!(decl.resolved_concrete(), Some(ConcreteType::INT));
}

#[test]
fn test_realiased_import_points_at_merged_namespace() {
    let loader = MemoryLoader::default()
        .with(
            "stdlib/io.lang",
            "fn print(s: string) -> string {\n    return s\n}\n",
        )
        .with(
            "project/log.lang",
            "use std/io\nfn info(s: string) -> string {\n    return io.print(s)\n}\n",
        );
    let mut resolver = resolver(loader);

    let program = resolver
        .resolve_program(parse("use log\nuse std/io as out\nlet a := out.print(\"x\")"))
        .unwrap();

    assert_eq!(modules(&program).len(), 1);
    assert_eq!(
        resolver.merged_namespace(&PathBuf::from("stdlib").join("io.lang")),
        Some("io")
    );

    let Some(Expr::VariableDeclaration(decl)) = program.body.last() else {
        panic!("expected a declaration");
    };
    let Some(Expr::FunctionCall(call)) = decl.value.as_deref() else {
        panic!("expected a call");
    };
    assert!(matches!(call.callee.as_ref(), Expr::Identifier(callee) if callee.name == "io.print"));

    let program = infer(program).unwrap();
    assert!(check(&program).unwrap().is_empty());
    assert_eq!(
        program.body.last().and_then(|expr| match expr {
            Expr::VariableDeclaration(decl) => decl.resolved_concrete(),
            _ => None,
        }),
        Some(ConcreteType::STRING)
    );
}
