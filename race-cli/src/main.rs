use anyhow::{bail, Context, Result};
use clap::Parser;
use race_compiler::ast::printer;
use race_compiler::{compile_to_ast, compile_to_c};
use std::fs;
use std::path::PathBuf;
use std::process::Command;

#[derive(Parser)]
#[command(name = "racec")]
#[command(about = "A compiler for the RaceLang DSL")]
struct Args {
    /// Path to the RaceLang source file to compile
    file: PathBuf,

    /// Output binary path
    #[arg(short, long, default_value = "a.out")]
    output: PathBuf,

    /// Print the AST and exit
    #[arg(long)]
    ast: bool,

    /// Print the generated C source and exit
    #[arg(long)]
    emit_c: bool,

    /// C compiler to invoke
    #[arg(long, default_value = "gcc")]
    cc: String,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let source = fs::read_to_string(&args.file)
        .with_context(|| format!("Failed to read {}", args.file.display()))?;

    if args.ast {
        let program = compile_to_ast(&source)?;
        print!("{}", printer::print(&program));
        return Ok(());
    }

    let c_source = compile_to_c(&source)?;

    if args.emit_c {
        print!("{}", c_source);
        return Ok(());
    }

    // Stage the C source in a temp directory and hand it to the C compiler.
    let staging = tempfile::tempdir().context("Failed to create temp directory")?;
    let c_file = staging.path().join("out.c");
    fs::write(&c_file, &c_source)
        .with_context(|| format!("Failed to write {}", c_file.display()))?;

    let result = Command::new(&args.cc)
        .arg(&c_file)
        .arg("-o")
        .arg(&args.output)
        .output()
        .with_context(|| format!("Failed to run '{}'", args.cc))?;

    if !result.status.success() {
        bail!(
            "C compilation failed:\n{}",
            String::from_utf8_lossy(&result.stderr)
        );
    }

    let stdout = String::from_utf8_lossy(&result.stdout);
    if !stdout.is_empty() {
        print!("{}", stdout);
    }
    let stderr = String::from_utf8_lossy(&result.stderr);
    if !stderr.is_empty() {
        eprint!("{}", stderr);
    }

    println!("Binary created: {}", args.output.display());
    Ok(())
}
