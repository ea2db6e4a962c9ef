use rustyline::{DefaultEditor, error::ReadlineError};

use crate::{
    diagnostics::{QbError, Result},
    runtime::Interpreter,
};

pub struct Repl {
    interpreter: Interpreter,
}

impl Repl {
    pub fn new() -> Self {
        Self {
            interpreter: Interpreter::new(),
        }
    }

    pub fn run(&mut self) -> Result<()> {
        let mut editor = DefaultEditor::new()
            .map_err(|err| QbError::from(std::io::Error::new(std::io::ErrorKind::Other, err)))?;
        loop {
            match editor.readline(">> ") {
                Ok(line) => {
                    let trimmed = line.trim();
                    if trimmed == ":quit" || trimmed == ":exit" {
                        break;
                    }
                    if trimmed.is_empty() {
                        continue;
                    }
                    editor.add_history_entry(trimmed).ok();
                    match self.interpreter.eval_program(trimmed) {
                        Ok(outcomes) => {
                            for outcome in outcomes {
                                match outcome {
                                    Ok(value) => println!("{value}"),
                                    Err(QbError::Diagnostic(diag)) => eprintln!("{diag}"),
                                    Err(other) => eprintln!("error: {other}"),
                                }
                            }
                        }
                        Err(QbError::Diagnostic(diag)) => eprintln!("{diag}"),
                        Err(other) => eprintln!("error: {other}"),
                    }
                }
                Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
                Err(err) => {
                    return Err(QbError::from(std::io::Error::new(
                        std::io::ErrorKind::Other,
                        err,
                    )));
                }
            }
        }
        Ok(())
    }
}

impl Default for Repl {
    fn default() -> Self {
        Self::new()
    }
}
