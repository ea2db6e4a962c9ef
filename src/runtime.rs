use std::rc::Rc;

use crate::{
    diagnostics::{Diagnostic, DiagnosticKind, QbError, Result},
    environment::{Environment, EnvironmentRef},
    parser,
    value::{Closure, Value, ValueKind},
};

/// Evaluates one expression tree against an environment chain.
///
/// Numbers, strings, and literal lists evaluate to themselves; atoms are
/// looked up innermost frame first; call forms dispatch to a special form
/// or to closure/builtin application.
pub fn eval(expr: &Value, env: &EnvironmentRef) -> Result<Value> {
    match &*expr.0 {
        ValueKind::Atom(name) => Environment::get(env, name),
        ValueKind::Int(_)
        | ValueKind::Float(_)
        | ValueKind::Str(_)
        | ValueKind::List(_)
        | ValueKind::Closure(_)
        | ValueKind::Native(_) => Ok(expr.clone()),
        ValueKind::Call(items) => eval_call(items, env),
    }
}

/// Evaluates a sequence of top-level forms, collecting one outcome per
/// form. A failed form leaves the environment as the failure found it and
/// later forms still run; the host decides whether to stop.
pub fn eval_forms(forms: &[Value], env: &EnvironmentRef) -> Vec<Result<Value>> {
    forms.iter().map(|form| eval(form, env)).collect()
}

fn eval_call(items: &[Value], env: &EnvironmentRef) -> Result<Value> {
    let (op, operands) = match items.split_first() {
        Some(split) => split,
        // The reader rejects `()`; this covers hand-built trees.
        None => {
            return Err(QbError::from(Diagnostic::new(
                DiagnosticKind::Eval,
                "call form has no operator",
            )));
        }
    };

    // Special-form names are reserved: they win before the operator is
    // ever evaluated, so operands stay unevaluated where the form demands.
    if let Some(name) = op.as_atom() {
        match name {
            "quote" => return special_quote(operands),
            "let" => return special_let(operands, env),
            "fun" => return special_fun(operands, env),
            "if" => return special_if(operands, env),
            "cond" => return special_cond(operands, env),
            _ => {}
        }
    }

    let callee = eval(op, env)?;
    let mut args = Vec::with_capacity(operands.len());
    for operand in operands {
        args.push(eval(operand, env)?);
    }
    apply(&callee, args)
}

fn apply(callee: &Value, args: Vec<Value>) -> Result<Value> {
    match &*callee.0 {
        ValueKind::Native(native) => native.call(&args),
        ValueKind::Closure(closure) => {
            if args.len() != closure.params.len() {
                return Err(QbError::from(Diagnostic::new(
                    DiagnosticKind::Arity,
                    format!(
                        "closure expected {} operands but received {}",
                        closure.params.len(),
                        args.len()
                    ),
                )));
            }
            // Parent is the captured frame, not the caller's: lexical scope.
            let frame = Environment::with_parent(Rc::clone(&closure.env));
            for (param, arg) in closure.params.iter().zip(args) {
                frame.borrow_mut().define(param.clone(), arg);
            }
            eval(&closure.body, &frame)
        }
        _ => Err(QbError::from(Diagnostic::new(
            DiagnosticKind::Type,
            format!("{} is not callable", callee.type_name()),
        ))),
    }
}

fn expect_operands<'a>(
    form: &str,
    operands: &'a [Value],
    expected: usize,
) -> Result<&'a [Value]> {
    if operands.len() != expected {
        return Err(QbError::from(Diagnostic::new(
            DiagnosticKind::Arity,
            format!(
                "`{form}` expected {expected} operands but received {}",
                operands.len()
            ),
        )));
    }
    Ok(operands)
}

/// `(quote A)` returns the operand tree untouched. The tree is already a
/// Value (literal lists double as expression trees), so no conversion step
/// is needed and re-quoting is idempotent.
fn special_quote(operands: &[Value]) -> Result<Value> {
    let operands = expect_operands("quote", operands, 1)?;
    Ok(operands[0].clone())
}

/// `(let A B)` evaluates `B` and binds it to the bare atom `A` in the
/// *current* frame, rebinding silently. The name is bound in its frame
/// before any closure body runs, so `(let f (fun [n] (... f ...)))`
/// recurses without a separate letrec.
fn special_let(operands: &[Value], env: &EnvironmentRef) -> Result<Value> {
    let operands = expect_operands("let", operands, 2)?;
    let name = operands[0].as_atom().ok_or_else(|| {
        QbError::from(Diagnostic::new(
            DiagnosticKind::Type,
            format!(
                "`let` expects a bare atom name, found {}",
                operands[0].type_name()
            ),
        ))
    })?;
    let value = eval(&operands[1], env)?;
    env.borrow_mut().define(name.to_string(), value.clone());
    Ok(value)
}

/// `(fun A B)` builds a closure from the literal parameter list `A` and
/// the unevaluated body `B`, capturing the defining frame by reference.
fn special_fun(operands: &[Value], env: &EnvironmentRef) -> Result<Value> {
    let operands = expect_operands("fun", operands, 2)?;
    let items = operands[0].as_list().ok_or_else(|| {
        QbError::from(Diagnostic::new(
            DiagnosticKind::Type,
            format!(
                "`fun` expects a literal list of parameter atoms, found {}",
                operands[0].type_name()
            ),
        ))
    })?;
    let mut params = Vec::with_capacity(items.len());
    for item in items {
        match item.as_atom() {
            Some(name) => params.push(name.to_string()),
            None => {
                return Err(QbError::from(Diagnostic::new(
                    DiagnosticKind::Type,
                    format!("parameter names must be atoms, found {}", item.type_name()),
                )));
            }
        }
    }
    Ok(Value::new(ValueKind::Closure(Closure {
        params,
        body: operands[1].clone(),
        env: Rc::clone(env),
    })))
}

/// `(if A B C)` evaluates exactly one branch: `B` when the condition's
/// shape is atomic, `C` when it is list-shaped.
fn special_if(operands: &[Value], env: &EnvironmentRef) -> Result<Value> {
    let operands = expect_operands("if", operands, 3)?;
    let condition = eval(&operands[0], env)?;
    if condition.is_atomic() {
        eval(&operands[1], env)
    } else {
        eval(&operands[2], env)
    }
}

/// `(cond [C1 E1] [C2 E2] ...)` walks clauses in order. Each clause is a
/// literal two-element list carrying unevaluated trees; the first clause
/// whose condition evaluates to an atomic shape has its expression
/// evaluated and returned. Later conditions are never touched.
fn special_cond(operands: &[Value], env: &EnvironmentRef) -> Result<Value> {
    for clause in operands {
        let pair = match clause.as_list() {
            Some(pair) if pair.len() == 2 => pair,
            _ => {
                return Err(QbError::from(Diagnostic::new(
                    DiagnosticKind::Eval,
                    "cond: clause must be a two-element literal list",
                )));
            }
        };
        if eval(&pair[0], env)?.is_atomic() {
            return eval(&pair[1], env);
        }
    }
    Err(QbError::from(Diagnostic::new(
        DiagnosticKind::Eval,
        "cond: no matching clause",
    )))
}

/// Owns the global environment and drives whole programs. REPL and CLI
/// front ends go through this.
pub struct Interpreter {
    env: EnvironmentRef,
}

impl Interpreter {
    pub fn new() -> Self {
        Self {
            env: Environment::global(),
        }
    }

    pub fn env(&self) -> &EnvironmentRef {
        &self.env
    }

    /// Parses and evaluates a program, returning the last form's value.
    /// The first failing form aborts; an empty program yields `[]`.
    pub fn eval_source(&mut self, source: &str) -> Result<Value> {
        let forms = parser::parse(source)?;
        let mut last = Value::empty();
        for form in &forms {
            last = eval(form, &self.env)?;
        }
        Ok(last)
    }

    /// Parses a program and evaluates every top-level form, returning one
    /// outcome per form even when earlier forms fail.
    pub fn eval_program(&mut self, source: &str) -> Result<Vec<Result<Value>>> {
        let forms = parser::parse(source)?;
        Ok(eval_forms(&forms, &self.env))
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}
