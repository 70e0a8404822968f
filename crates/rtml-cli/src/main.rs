use clap::{Parser, Subcommand};
use std::path::Path;

#[derive(Parser)]
#[command(name = "rtml")]
#[command(about = "RTML — Reactive Template Markup Language compiler")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compile an .rtml template to HTML with its reactive script block
    Build {
        /// Input .rtml file
        path: String,
    },

    /// Check an .rtml template for errors without writing output
    Check {
        /// Input .rtml file
        path: String,
    },

    /// Compile a single expression and print its script form
    Expr {
        /// Expression source text
        source: String,

        /// Emit reactive runtime calls instead of plain syntax
        #[arg(long)]
        reactive: bool,
    },

    /// Compile a statement block and print its script form
    Script {
        /// Script source text
        source: String,

        /// Emit reactive runtime calls instead of plain syntax
        #[arg(long)]
        reactive: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Command::Build { path } => cmd_build(&path),
        Command::Check { path } => cmd_check(&path),
        Command::Expr { source, reactive } => cmd_expr(&source, reactive),
        Command::Script { source, reactive } => cmd_script(&source, reactive),
    }
}

fn read_source(path: &str) -> String {
    let p = Path::new(path);
    if !p.exists() {
        eprintln!("Error: file not found: {path}");
        std::process::exit(1);
    }
    match std::fs::read_to_string(p) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("Error reading {path}: {e}");
            std::process::exit(1);
        }
    }
}

fn cmd_build(path: &str) {
    let source = read_source(path);

    let output = match rtml_codegen::compile(path, &source) {
        Ok(output) => output,
        Err(e) => {
            eprintln!("{path}: {e}");
            std::process::exit(1);
        }
    };

    // Write the result next to the source
    let stem = Path::new(path)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("out");
    let dir = Path::new(path).parent().unwrap_or(Path::new("."));
    let html_path = dir.join(format!("{stem}.html"));

    if let Err(e) = std::fs::write(&html_path, &output) {
        eprintln!("Error writing {}: {e}", html_path.display());
        std::process::exit(1);
    }

    eprintln!("Built: {}", html_path.display());
}

fn cmd_check(path: &str) {
    let source = read_source(path);

    if let Err(e) = rtml_codegen::compile(path, &source) {
        eprintln!("{path}: {e}");
        std::process::exit(1);
    }

    eprintln!("OK: {path}");
}

fn cmd_expr(source: &str, reactive: bool) {
    match rtml_codegen::expr_to_script(source, reactive) {
        Ok(output) => println!("{output}"),
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    }
}

fn cmd_script(source: &str, reactive: bool) {
    match rtml_codegen::script_to_script(source, reactive) {
        Ok(output) => print!("{output}"),
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    }
}
