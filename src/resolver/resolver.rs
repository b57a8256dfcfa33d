//! Module resolution for `use` statements.
//!
//! Every `Import` in a program is replaced by a nested `Program` holding the imported
//! module. Inside that module each top-level declaration is renamed `namespace.name`
//! and every reference to it is rewritten to match, unless a parameter or local
//! binding shadows it. In the importing program `namespace.name` member accesses
//! become plain identifiers with the qualified name.

use std::{
    collections::{HashMap, HashSet},
    fs,
    path::{Path, PathBuf},
};

use crate::{
    ast::{
        ast::{Expr, Program},
        expressions::Identifier,
        statements::{CasePattern, Import},
    },
    errors::errors::{Error, ErrorImpl},
    lexer::lexer::tokenize,
    parser::parser::parse_program,
};

const MODULE_EXTENSION: &str = "lang";
const STD_PREFIX: &str = "std/";

/// Where module sources come from.
pub trait SourceLoader {
    fn load(&self, path: &Path) -> Option<String>;
}

/// Loads modules from disk.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsLoader;

impl SourceLoader for FsLoader {
    fn load(&self, path: &Path) -> Option<String> {
        fs::read_to_string(path).ok()
    }
}

pub struct ModuleResolver<L: SourceLoader> {
    loader: L,
    project_root: PathBuf,
    std_root: PathBuf,
    /// Files already merged somewhere; a second `use` of one is dropped.
    resolved: HashSet<PathBuf>,
    /// Namespace each merged file's declarations were qualified with.
    merged: HashMap<PathBuf, String>,
}

impl<L: SourceLoader> ModuleResolver<L> {
    pub fn new(loader: L, project_root: impl Into<PathBuf>, std_root: impl Into<PathBuf>) -> Self {
        ModuleResolver {
            loader,
            project_root: project_root.into(),
            std_root: std_root.into(),
            resolved: HashSet::new(),
            merged: HashMap::new(),
        }
    }

    /// File an import path refers to: `std/io` lives under the standard library root,
    /// anything else under the project root.
    pub fn module_path(&self, import_path: &str) -> PathBuf {
        match import_path.strip_prefix(STD_PREFIX) {
            Some(rest) => self.std_root.join(format!("{}.{}", rest, MODULE_EXTENSION)),
            None => self
                .project_root
                .join(format!("{}.{}", import_path, MODULE_EXTENSION)),
        }
    }

    /// Marks `path` as already resolved, e.g. the entry file, so a module importing it
    /// back does not merge it a second time.
    pub fn mark_resolved(&mut self, path: impl Into<PathBuf>) {
        self.resolved.insert(path.into());
    }

    pub fn is_resolved(&self, path: &Path) -> bool {
        self.resolved.contains(path)
    }

    /// Namespace the module at `path` was merged under, if it has been merged.
    pub fn merged_namespace(&self, path: &Path) -> Option<&str> {
        self.merged.get(path).map(String::as_str)
    }

    /// Replaces every top-level `use` in `program` with the module it names.
    ///
    /// A module merged earlier under another namespace is not merged again; accesses
    /// through this program's alias are pointed at the original namespace instead.
    pub fn resolve_program(&mut self, program: Program) -> Result<Program, Error> {
        // Alias used in this program -> namespace the declarations carry
        let mut namespaces = HashMap::new();
        let mut body = Vec::with_capacity(program.body.len());

        for expr in program.body {
            match expr {
                Expr::Import(import) => {
                    let path = self.module_path(&import.path);
                    let target = self
                        .merged_namespace(&path)
                        .unwrap_or(import.namespace())
                        .to_string();
                    namespaces.insert(import.namespace().to_string(), target);

                    if let Some(module) = self.load_module(&import)? {
                        body.push(Expr::Program(module));
                    }
                }
                other => body.push(other),
            }
        }

        for expr in body.iter_mut() {
            qualify_member_accesses(expr, &namespaces);
        }

        Ok(Program { body })
    }

    /// Loads, parses and qualifies the module behind `import`.
    ///
    /// Returns `None` when the file has been merged already.
    pub fn load_module(&mut self, import: &Import) -> Result<Option<Program>, Error> {
        let path = self.module_path(&import.path);

        if !self.resolved.insert(path.clone()) {
            return Ok(None);
        }
        self.merged.insert(path.clone(), import.namespace().to_string());

        let source = self.loader.load(&path).ok_or_else(|| {
            Error::new(
                ErrorImpl::ModuleNotFound {
                    path: import.path.clone(),
                },
                import.position.clone(),
            )
        })?;

        let tokens = tokenize(source, Some(path.display().to_string()))?;
        let module = parse_program(tokens)?;
        let mut module = self.resolve_program(module)?;

        Qualifier::new(import.namespace(), &module).qualify_block(&mut module.body, true);

        Ok(Some(module))
    }
}

/// Rewrites `alias.name` into the identifier `ns.name`, `ns` being the namespace the
/// aliased module was merged under.
fn qualify_member_accesses(expr: &mut Expr, namespaces: &HashMap<String, String>) {
    // Merged modules were rewritten when they were loaded
    if let Expr::Program(_) = expr {
        return;
    }

    let qualified = match expr {
        Expr::MemberAccess(member) => match member.object.as_ref() {
            Expr::Identifier(object) => {
                namespaces.get(&object.name).map(|namespace| Identifier {
                    name: format!("{}.{}", namespace, member.property),
                    position: object.position.clone(),
                })
            }
            _ => None,
        },
        _ => None,
    };

    match qualified {
        Some(identifier) => *expr = Expr::Identifier(identifier),
        None => expr.for_each_child_mut(&mut |child| qualify_member_accesses(child, namespaces)),
    }
}

/// Renames a module's top-level declarations and the references to them.
struct Qualifier<'a> {
    namespace: &'a str,
    exported: HashSet<String>,
    /// Names bound by parameters and local declarations, one set per open scope.
    locals: Vec<HashSet<String>>,
}

impl<'a> Qualifier<'a> {
    fn new(namespace: &'a str, module: &Program) -> Self {
        let exported = module
            .body
            .iter()
            .filter_map(|expr| match expr {
                Expr::FunctionDeclaration(function) => Some(function.name.clone()),
                Expr::VariableDeclaration(decl) => Some(decl.name.clone()),
                _ => None,
            })
            .collect();

        Qualifier {
            namespace,
            exported,
            locals: vec![],
        }
    }

    fn qualified(&self, name: &str) -> String {
        format!("{}.{}", self.namespace, name)
    }

    fn is_shadowed(&self, name: &str) -> bool {
        self.locals.iter().any(|scope| scope.contains(name))
    }

    fn qualify_block(&mut self, body: &mut [Expr], top_level: bool) {
        for expr in body.iter_mut() {
            self.qualify(expr, top_level);
        }
    }

    fn qualify_scoped_block(&mut self, body: &mut [Expr], bound: HashSet<String>) {
        self.locals.push(bound);
        self.qualify_block(body, false);
        self.locals.pop();
    }

    fn qualify(&mut self, expr: &mut Expr, top_level: bool) {
        match expr {
            // Nested modules carry their own namespace
            Expr::Program(_) => {}
            Expr::Identifier(identifier) => {
                if self.exported.contains(&identifier.name) && !self.is_shadowed(&identifier.name) {
                    identifier.name = self.qualified(&identifier.name);
                }
            }
            Expr::FunctionDeclaration(function) => {
                if top_level {
                    function.name = self.qualified(&function.name);
                } else if let Some(scope) = self.locals.last_mut() {
                    scope.insert(function.name.clone());
                }

                let params = function.params.iter().map(|param| param.name.clone()).collect();
                if let Some(body) = function.body.as_mut() {
                    self.qualify_scoped_block(body, params);
                }
            }
            Expr::VariableDeclaration(decl) => {
                if let Some(value) = decl.value.as_mut() {
                    self.qualify(value, false);
                }

                if top_level {
                    decl.name = self.qualified(&decl.name);
                } else if let Some(scope) = self.locals.last_mut() {
                    scope.insert(decl.name.clone());
                }
            }
            Expr::If(if_) => {
                self.qualify(&mut if_.condition, false);
                self.qualify_scoped_block(&mut if_.body, HashSet::new());
                if let Some(alternate) = if_.alternate.as_mut() {
                    self.qualify(alternate, false);
                }
            }
            Expr::Else(else_) => self.qualify_scoped_block(&mut else_.body, HashSet::new()),
            Expr::While(while_) => {
                self.qualify(&mut while_.condition, false);
                self.qualify_scoped_block(&mut while_.body, HashSet::new());
            }
            Expr::Switch(switch) => {
                self.qualify(&mut switch.value, false);
                for case in switch.cases.iter_mut() {
                    if let CasePattern::Value(value) = &mut case.pattern {
                        self.qualify(value, false);
                    }
                    self.qualify_scoped_block(&mut case.body, HashSet::new());
                }
            }
            Expr::Case(case) => {
                if let CasePattern::Value(value) = &mut case.pattern {
                    self.qualify(value, false);
                }
                self.qualify_scoped_block(&mut case.body, HashSet::new());
            }
            Expr::MemberAccess(_)
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
            | Expr::Comment(_) => expr.for_each_child_mut(&mut |child| self.qualify(child, false)),
        }
    }
}
