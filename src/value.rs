use std::{fmt, rc::Rc};

use crate::{
    diagnostics::{Diagnostic, DiagnosticKind, QbError},
    environment::EnvironmentRef,
};

/// A Qb Script datum. The same tagged tree serves as the reader's output,
/// the evaluator's input, and the runtime value: literal lists are
/// expression trees, which is what lets `quote` and `cond` re-evaluate
/// sub-forms pulled out of them.
#[derive(Clone)]
pub struct Value(pub Rc<ValueKind>);

pub enum ValueKind {
    /// A bare name. Atom identity is its exact text.
    Atom(String),
    Int(i64),
    Float(f64),
    Str(String),
    /// Bracket-quoted aggregate; never auto-evaluated.
    List(Vec<Value>),
    /// Parenthesized call form as read from source. Only the evaluator
    /// consumes these; a quoted call survives as data in this shape.
    Call(Vec<Value>),
    Closure(Closure),
    Native(NativeFn),
}

/// A user function: parameter names, one unevaluated body expression, and
/// the frame it was defined in, held by reference for lexical scope.
#[derive(Clone)]
pub struct Closure {
    pub params: Vec<String>,
    pub body: Value,
    pub env: EnvironmentRef,
}

/// A builtin registered in the global frame. Indistinguishable from a
/// closure at call sites.
#[derive(Clone)]
pub struct NativeFn {
    pub name: &'static str,
    /// `usize::MAX` means variadic.
    pub arity: usize,
    pub callback: fn(&[Value]) -> crate::diagnostics::Result<Value>,
}

impl NativeFn {
    pub fn call(&self, args: &[Value]) -> crate::diagnostics::Result<Value> {
        if self.arity != usize::MAX && args.len() != self.arity {
            return Err(QbError::from(Diagnostic::new(
                DiagnosticKind::Arity,
                format!(
                    "`{}` expected {} operands but received {}",
                    self.name,
                    self.arity,
                    args.len()
                ),
            )));
        }
        (self.callback)(args)
    }
}

impl Value {
    pub fn new(kind: ValueKind) -> Self {
        Self(Rc::new(kind))
    }

    pub fn atom(name: impl Into<String>) -> Self {
        Self::new(ValueKind::Atom(name.into()))
    }

    pub fn int(value: i64) -> Self {
        Self::new(ValueKind::Int(value))
    }

    pub fn float(value: f64) -> Self {
        Self::new(ValueKind::Float(value))
    }

    pub fn string(value: impl Into<String>) -> Self {
        Self::new(ValueKind::Str(value.into()))
    }

    pub fn list(items: Vec<Value>) -> Self {
        Self::new(ValueKind::List(items))
    }

    pub fn call(items: Vec<Value>) -> Self {
        Self::new(ValueKind::Call(items))
    }

    /// The canonical truthy atom `t`.
    pub fn t() -> Self {
        Self::atom("t")
    }

    /// The empty list, the language's only false-like shape.
    pub fn empty() -> Self {
        Self::list(Vec::new())
    }

    /// Truthy sentinel for predicate builtins.
    pub fn truth(condition: bool) -> Self {
        if condition { Self::t() } else { Self::empty() }
    }

    /// Structural truthiness: every shape except List/Call is true-like.
    pub fn is_atomic(&self) -> bool {
        !matches!(&*self.0, ValueKind::List(_) | ValueKind::Call(_))
    }

    pub fn is_empty_list(&self) -> bool {
        matches!(&*self.0, ValueKind::List(items) if items.is_empty())
    }

    pub fn as_atom(&self) -> Option<&str> {
        match &*self.0 {
            ValueKind::Atom(name) => Some(name),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match &*self.0 {
            ValueKind::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match &*self.0 {
            ValueKind::Atom(_) => "Atom",
            ValueKind::Int(_) | ValueKind::Float(_) => "Number",
            ValueKind::Str(_) => "String",
            ValueKind::List(_) => "List",
            ValueKind::Call(_) => "Call",
            ValueKind::Closure(_) => "Closure",
            ValueKind::Native(_) => "Closure",
        }
    }
}

/// Structural equality: element-wise on lists, numeric across Int/Float,
/// exact text on atoms and strings. Closures compare by identity.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (&*self.0, &*other.0) {
            (ValueKind::Atom(a), ValueKind::Atom(b)) => a == b,
            (ValueKind::Str(a), ValueKind::Str(b)) => a == b,
            (ValueKind::Int(a), ValueKind::Int(b)) => a == b,
            (ValueKind::Float(a), ValueKind::Float(b)) => a == b,
            (ValueKind::Int(a), ValueKind::Float(b))
            | (ValueKind::Float(b), ValueKind::Int(a)) => *a as f64 == *b,
            (ValueKind::List(a), ValueKind::List(b))
            | (ValueKind::Call(a), ValueKind::Call(b)) => a == b,
            _ => Rc::ptr_eq(&self.0, &other.0),
        }
    }
}

fn write_seq(f: &mut fmt::Formatter<'_>, items: &[Value], open: char, close: char) -> fmt::Result {
    write!(f, "{open}")?;
    for (idx, item) in items.iter().enumerate() {
        if idx > 0 {
            write!(f, " ")?;
        }
        write!(f, "{item}")?;
    }
    write!(f, "{close}")
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &*self.0 {
            ValueKind::Atom(name) => write!(f, "{name}"),
            ValueKind::Int(n) => write!(f, "{n}"),
            ValueKind::Float(n) => write!(f, "{n}"),
            ValueKind::Str(s) => write!(f, "\"{s}\""),
            ValueKind::List(items) => write_seq(f, items, '[', ']'),
            ValueKind::Call(items) => write_seq(f, items, '(', ')'),
            ValueKind::Closure(closure) => {
                write!(f, "<fun [{}]>", closure.params.join(" "))
            }
            ValueKind::Native(native) => write!(f, "<builtin {}>", native.name),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}
