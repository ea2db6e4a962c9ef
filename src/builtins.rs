use crate::{
    diagnostics::{Diagnostic, DiagnosticKind, QbError, Result},
    environment::EnvironmentRef,
    value::{NativeFn, Value, ValueKind},
};

/// Registers every primitive in the given frame. Builtins live in the
/// environment as ordinary callable values, so shadowing one with `let`
/// works the same as shadowing any other binding.
pub fn install(env: &EnvironmentRef) {
    let entries: &[(&'static str, usize, fn(&[Value]) -> Result<Value>)] = &[
        ("cons", 2, list_cons),
        ("append", 2, list_append),
        ("list", usize::MAX, list_list),
        ("head", 1, list_head),
        ("tail", 1, list_tail),
        ("atom", 1, pred_atom),
        ("not", 1, pred_not),
        ("eq", 2, cmp_eq),
        ("ne", 2, cmp_ne),
        ("lt", 2, cmp_lt),
        ("gt", 2, cmp_gt),
        ("le", 2, cmp_le),
        ("ge", 2, cmp_ge),
        ("add", usize::MAX, math_add),
    ];
    let mut scope = env.borrow_mut();
    for (name, arity, callback) in entries {
        scope.define(
            (*name).to_string(),
            Value::new(ValueKind::Native(NativeFn {
                name,
                arity: *arity,
                callback: *callback,
            })),
        );
    }
}

fn expect_list<'a>(value: &'a Value, name: &str) -> Result<&'a [Value]> {
    value.as_list().ok_or_else(|| {
        QbError::from(Diagnostic::new(
            DiagnosticKind::Type,
            format!("`{name}` expected List but found {}", value.type_name()),
        ))
    })
}

fn expect_atomic<'a>(value: &'a Value, name: &str) -> Result<&'a Value> {
    if value.is_atomic() {
        Ok(value)
    } else {
        Err(QbError::from(Diagnostic::new(
            DiagnosticKind::Type,
            format!("`{name}` expected an atomic operand, found {}", value.type_name()),
        )))
    }
}

enum Num {
    Int(i64),
    Float(f64),
}

impl Num {
    fn as_f64(&self) -> f64 {
        match self {
            Num::Int(n) => *n as f64,
            Num::Float(n) => *n,
        }
    }
}

fn expect_number(value: &Value, name: &str) -> Result<Num> {
    match &*value.0 {
        ValueKind::Int(n) => Ok(Num::Int(*n)),
        ValueKind::Float(n) => Ok(Num::Float(*n)),
        _ => Err(QbError::from(Diagnostic::new(
            DiagnosticKind::Type,
            format!("`{name}` expected Number but found {}", value.type_name()),
        ))),
    }
}

/// `(cons A B)` prepends `A` to the list `B`.
fn list_cons(args: &[Value]) -> Result<Value> {
    let tail = expect_list(&args[1], "cons")?;
    let mut items = Vec::with_capacity(tail.len() + 1);
    items.push(args[0].clone());
    items.extend_from_slice(tail);
    Ok(Value::list(items))
}

/// `(append A B)` concatenates two lists.
fn list_append(args: &[Value]) -> Result<Value> {
    let left = expect_list(&args[0], "append")?;
    let right = expect_list(&args[1], "append")?;
    let mut items = Vec::with_capacity(left.len() + right.len());
    items.extend_from_slice(left);
    items.extend_from_slice(right);
    Ok(Value::list(items))
}

/// `(list A B C ...)` collects its already-evaluated operands.
fn list_list(args: &[Value]) -> Result<Value> {
    Ok(Value::list(args.to_vec()))
}

fn list_head(args: &[Value]) -> Result<Value> {
    let items = expect_list(&args[0], "head")?;
    items.first().cloned().ok_or_else(|| {
        QbError::from(Diagnostic::new(
            DiagnosticKind::EmptyList,
            "`head` applied to the empty list",
        ))
    })
}

fn list_tail(args: &[Value]) -> Result<Value> {
    let items = expect_list(&args[0], "tail")?;
    if items.is_empty() {
        return Err(QbError::from(Diagnostic::new(
            DiagnosticKind::EmptyList,
            "`tail` applied to the empty list",
        )));
    }
    Ok(Value::list(items[1..].to_vec()))
}

/// `(atom A)` is truthy for every non-list shape.
fn pred_atom(args: &[Value]) -> Result<Value> {
    Ok(Value::truth(args[0].is_atomic()))
}

/// `(not A)` is truthy only for the empty list.
fn pred_not(args: &[Value]) -> Result<Value> {
    Ok(Value::truth(args[0].is_empty_list()))
}

/// Equality over atomic operands: numeric across Int/Float, exact text
/// for Atoms and Strings, never equal across kinds. List-shaped operands
/// are a type error rather than a false result.
fn cmp_eq(args: &[Value]) -> Result<Value> {
    let left = expect_atomic(&args[0], "eq")?;
    let right = expect_atomic(&args[1], "eq")?;
    Ok(Value::truth(left == right))
}

fn cmp_ne(args: &[Value]) -> Result<Value> {
    let left = expect_atomic(&args[0], "ne")?;
    let right = expect_atomic(&args[1], "ne")?;
    Ok(Value::truth(left != right))
}

fn ordering(args: &[Value], name: &str, holds: fn(f64, f64) -> bool) -> Result<Value> {
    let left = expect_number(&args[0], name)?;
    let right = expect_number(&args[1], name)?;
    Ok(Value::truth(holds(left.as_f64(), right.as_f64())))
}

fn cmp_lt(args: &[Value]) -> Result<Value> {
    ordering(args, "lt", |a, b| a < b)
}

fn cmp_gt(args: &[Value]) -> Result<Value> {
    ordering(args, "gt", |a, b| a > b)
}

fn cmp_le(args: &[Value]) -> Result<Value> {
    ordering(args, "le", |a, b| a <= b)
}

fn cmp_ge(args: &[Value]) -> Result<Value> {
    ordering(args, "ge", |a, b| a >= b)
}

/// `(add A B C ...)` sums left to right. The result stays Int until the
/// first Float operand promotes it.
fn math_add(args: &[Value]) -> Result<Value> {
    let mut sum = Num::Int(0);
    for arg in args {
        let operand = expect_number(arg, "add")?;
        sum = match (sum, operand) {
            (Num::Int(a), Num::Int(b)) => Num::Int(a.checked_add(b).ok_or_else(|| {
                QbError::from(Diagnostic::new(
                    DiagnosticKind::Eval,
                    "integer overflow in `add`",
                ))
            })?),
            (a, b) => Num::Float(a.as_f64() + b.as_f64()),
        };
    }
    Ok(match sum {
        Num::Int(n) => Value::int(n),
        Num::Float(n) => Value::float(n),
    })
}
