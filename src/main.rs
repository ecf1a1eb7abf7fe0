//! Command-line host for the pseudocode interpreter
//!
//! Reads a source file, runs the pipeline, and streams OUTPUT lines to
//! stdout. The first diagnostic from any stage goes to stderr and the
//! process exits non-zero.

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use anyhow::Context;
use clap::Parser as ClapParser;
use tracing::{info, Level};
use tracing_subscriber::EnvFilter;

use pseudocode_rs::pseudo::{dump_program, Interpreter, Lexer, OutputSink, Parser};

#[derive(ClapParser)]
#[command(name = "pseudorun", about = "Run a pseudocode source file", version)]
struct Cli {
    /// Source file to execute
    file: PathBuf,

    /// Print the parsed program tree before running
    #[arg(long)]
    dump_ast: bool,
}

/// Writes each OUTPUT line straight to stdout.
struct StdoutSink;

impl OutputSink for StdoutSink {
    fn write_line(&mut self, line: &str) {
        println!("{line}");
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(Level::WARN.into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let source = fs::read_to_string(&cli.file)
        .with_context(|| format!("failed to read {}", cli.file.display()))?;

    let tokens = Lexer::new(&source).tokenize()?;
    let program = Parser::new(tokens).parse()?;

    if cli.dump_ast {
        print!("{}", dump_program(&program));
    }

    let start = Instant::now();
    let mut sink = StdoutSink;
    Interpreter::new().run(&program, &mut sink)?;
    info!(elapsed_ms = start.elapsed().as_millis() as u64, "execution completed");

    Ok(())
}
