use std::{fs::read_to_string, path::PathBuf, process::ExitCode, rc::Rc, time::Instant};

use anyhow::{Context, Result};
use clap::Parser;
use comptime_core::{
    display_error, lexer::lexer::tokenize, parser::parser::parse,
    type_checker::type_checker::type_check,
};

#[derive(Parser)]
#[command(
    name = "comptime-core",
    version,
    about = "Resolve the types of a source file and report every type error."
)]
struct Cli {
    /// Path to the source file to check.
    input: PathBuf,

    /// Print the resolved type of every declared variable.
    #[arg(long)]
    types: bool,

    /// Only set the exit status; print no diagnostics.
    #[arg(long, short)]
    quiet: bool,
}

fn main() -> Result<ExitCode> {
    env_logger::init();
    let cli = Cli::parse();

    let source = read_to_string(&cli.input)
        .with_context(|| format!("failed to read {}", cli.input.display()))?;
    let file_name = cli
        .input
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| cli.input.display().to_string());

    let start = Instant::now();

    let tokens = match tokenize(source.clone(), Some(file_name.clone())) {
        Ok(tokens) => tokens,
        Err(error) => {
            if !cli.quiet {
                display_error(&error, &source, &file_name);
            }
            return Ok(ExitCode::FAILURE);
        }
    };
    log::info!("Tokenized in {:?}", start.elapsed());

    let parse_start = Instant::now();
    let (_, ast) = parse(tokens, Rc::new(file_name.clone()));
    let ast = match ast {
        Ok(ast) => ast,
        Err(error) => {
            if !cli.quiet {
                display_error(&error, &source, &file_name);
            }
            return Ok(ExitCode::FAILURE);
        }
    };
    log::info!("Parsed in {:?}", parse_start.elapsed());

    let check_start = Instant::now();
    let checker = type_check(&ast);
    log::info!("Type checked in {:?}", check_start.elapsed());

    if cli.types {
        for (name, ty) in checker.declarations() {
            println!("{} : {}", name, ty);
        }
    }

    let diagnostics = checker.diagnostics();
    if diagnostics.is_empty() {
        return Ok(ExitCode::SUCCESS);
    }

    if !cli.quiet {
        for error in diagnostics.entries() {
            display_error(error, &source, &file_name);
        }
        eprintln!("{} error(s) in {}", diagnostics.len(), file_name);
    }

    Ok(ExitCode::FAILURE)
}
