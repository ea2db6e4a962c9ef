//! Core library for the Qb Script interpreter: reader, value model,
//! lexical environments, evaluator, builtin primitives, and REPL
//! utilities.

pub mod builtins;
pub mod diagnostics;
pub mod environment;
pub mod lexer;
pub mod parser;
pub mod repl;
pub mod runtime;
pub mod value;

pub use diagnostics::{Diagnostic, DiagnosticKind, QbError, SourceSpan};
pub use environment::{Environment, EnvironmentRef};
pub use parser::parse;
pub use repl::Repl;
pub use runtime::{Interpreter, eval, eval_forms};
pub use value::{Value, ValueKind};
