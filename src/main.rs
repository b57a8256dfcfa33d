use std::{
    env,
    fs::read_to_string,
    path::{Path, PathBuf},
    process::exit,
    time::Instant,
};

use frontend::{
    errors::errors::Error,
    lexer::lexer::tokenize,
    parser::parser::parse_program,
    render_error,
    resolver::resolver::{FsLoader, ModuleResolver},
    type_checker::{inference::infer, type_checker::check},
};

const DEFAULT_STD_ROOT: &str = "std";
const USAGE: &str = "Usage: frontend <file> [--std <dir>]";

struct Options {
    file: PathBuf,
    std_root: PathBuf,
}

fn parse_args(args: &[String]) -> Option<Options> {
    let mut file = None;
    let mut std_root = PathBuf::from(DEFAULT_STD_ROOT);
    let mut iter = args.iter().skip(1);

    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--std" => std_root = PathBuf::from(iter.next()?),
            _ if file.is_none() => file = Some(PathBuf::from(arg)),
            _ => return None,
        }
    }

    Some(Options {
        file: file?,
        std_root,
    })
}

fn main() {
    let args: Vec<String> = env::args().collect();

    let Some(options) = parse_args(&args) else {
        eprintln!("{}", USAGE);
        exit(2);
    };

    let Ok(source) = read_to_string(&options.file) else {
        eprintln!("Failed to read {}", options.file.display());
        exit(2);
    };

    let file_name = options.file.display().to_string();

    let start = Instant::now();

    let tokens = tokenize(source.clone(), Some(file_name.clone()))
        .unwrap_or_else(|e| fail(&e, &source, &file_name));
    println!("Tokenized in {:?}", start.elapsed());

    let parse_start = Instant::now();
    let program = parse_program(tokens).unwrap_or_else(|e| fail(&e, &source, &file_name));
    println!("Parsed in {:?}", parse_start.elapsed());

    let resolve_start = Instant::now();
    let project_root = options.file.parent().unwrap_or(Path::new("")).to_path_buf();
    let mut resolver = ModuleResolver::new(FsLoader, project_root, options.std_root);
    resolver.mark_resolved(options.file.clone());
    let program = resolver
        .resolve_program(program)
        .unwrap_or_else(|e| fail(&e, &source, &file_name));
    println!("Resolved modules in {:?}", resolve_start.elapsed());

    let infer_start = Instant::now();
    let program = infer(program).unwrap_or_else(|e| fail(&e, &source, &file_name));
    println!("Inferred in {:?}", infer_start.elapsed());

    let check_start = Instant::now();
    let diagnostics = check(&program).unwrap_or_else(|e| fail(&e, &source, &file_name));
    println!("Checked in {:?}", check_start.elapsed());

    for diagnostic in diagnostics.iter() {
        print!(
            "{}",
            render_error(diagnostic, &source_for(diagnostic, &source, &file_name))
        );
    }

    println!("Total time: {:?}", start.elapsed());

    if !diagnostics.is_empty() {
        exit(1);
    }
}

fn fail(error: &Error, source: &str, file_name: &str) -> ! {
    print!("{}", render_error(error, &source_for(error, source, file_name)));
    exit(1);
}

/// Source text an error points into: the entry file, or the imported module it came from.
fn source_for(error: &Error, entry_source: &str, entry_file: &str) -> String {
    let file = error.get_position().1.as_str();

    if file == entry_file {
        return entry_source.to_string();
    }

    read_to_string(file).unwrap_or_default()
}
