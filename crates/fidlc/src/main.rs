//! FIDL front-end CLI

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use fidl_core::Module;
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "fidlc")]
#[command(author, version, about = "FIDL compiler front end", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check source files for errors
    #[command(name = "none")]
    Check {
        /// Input file(s) to check
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Check source files and dump declaration sizes and alignments
    ModuleDump {
        /// Input file(s) to dump
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Output resolved shapes, allocations included, as JSON
        #[arg(short, long)]
        json: bool,

        /// Pretty print JSON output
        #[arg(short, long, requires = "json")]
        pretty: bool,
    },

    /// Parse and dump AST
    Ast {
        /// Input file to parse
        file: PathBuf,

        /// Pretty print
        #[arg(short, long)]
        pretty: bool,

        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Check { files } => check(files),
        Commands::ModuleDump {
            files,
            json,
            pretty,
        } => module_dump(files, json, pretty),
        Commands::Ast { file, pretty, json } => dump_ast(file, pretty, json),
    }
}

/// Compile one file in a fresh module, printing diagnostics on failure.
fn compile(file: &Path) -> Result<Module> {
    let mut module = Module::new();
    tracing::debug!(file = %file.display(), "compiling");

    if module.compile_file(file).is_err() {
        eprint!("{}", module.render_diagnostics());
        anyhow::bail!("Failed to compile {}", file.display());
    }

    Ok(module)
}

fn check(files: Vec<PathBuf>) -> Result<()> {
    let mut declarations = 0;

    for file in &files {
        let module = compile(file)?;
        declarations += module.context().decls.len();
    }

    eprintln!(
        "OK: {} declaration(s) in {} file(s) checked",
        declarations,
        files.len()
    );
    Ok(())
}

fn module_dump(files: Vec<PathBuf>, json: bool, pretty: bool) -> Result<()> {
    for file in &files {
        let module = compile(file)?;

        if json {
            let shapes = module.resolved_shapes();
            let output = if pretty {
                serde_json::to_string_pretty(&shapes)
            } else {
                serde_json::to_string(&shapes)
            }
            .context("Failed to serialize shapes to JSON")?;
            println!("{}", output);
        } else {
            print!("{}", module.dump());
        }
    }

    Ok(())
}

fn dump_ast(file: PathBuf, pretty: bool, json: bool) -> Result<()> {
    let source = fs::read_to_string(&file)
        .with_context(|| format!("Failed to read file: {}", file.display()))?;

    let ast = fidl_core::parse(&source).map_err(|e| {
        eprintln!("Parse error: {}", e);
        anyhow::anyhow!("Failed to parse")
    })?;

    if json {
        if pretty {
            println!(
                "{}",
                serde_json::to_string_pretty(&ast).context("Failed to serialize AST to JSON")?
            );
        } else {
            println!(
                "{}",
                serde_json::to_string(&ast).context("Failed to serialize AST to JSON")?
            );
        }
    } else if pretty {
        println!("{:#?}", ast);
    } else {
        println!("{:?}", ast);
    }

    Ok(())
}
