use std::{fs, path::PathBuf};

use clap::{Parser, Subcommand};

use qbscript::{Interpreter, QbError, Repl};

#[derive(Parser)]
#[command(author, version, about = "Qb Script interpreter")]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run a Qb Script source file
    Run { script: PathBuf },
    /// Start an interactive REPL session
    Repl,
    /// Evaluate a snippet of Qb Script code
    Eval { source: String },
}

fn main() -> Result<(), QbError> {
    let args = Args::parse();
    match args.command.unwrap_or(Command::Repl) {
        Command::Run { script } => {
            let source = fs::read_to_string(&script)?;
            run_program(&source)
        }
        Command::Repl => {
            let mut repl = Repl::new();
            repl.run()
        }
        Command::Eval { source } => run_program(&source),
    }
}

/// Evaluates every top-level form, printing each result. A failed form is
/// reported and execution keeps going; the exit status reflects whether
/// anything failed.
fn run_program(source: &str) -> Result<(), QbError> {
    let mut interpreter = Interpreter::new();
    let mut failed = false;
    for outcome in interpreter.eval_program(source)? {
        match outcome {
            Ok(value) => println!("{value}"),
            Err(err) => {
                failed = true;
                eprintln!("{err}");
            }
        }
    }
    if failed {
        std::process::exit(1);
    }
    Ok(())
}
