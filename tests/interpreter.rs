use qbscript::{
    diagnostics::{DiagnosticKind, QbError},
    runtime::Interpreter,
    value::{Value, ValueKind},
};

fn eval(source: &str) -> Value {
    let mut interpreter = Interpreter::new();
    interpreter
        .eval_source(source)
        .expect("evaluation should succeed")
}

fn eval_error(source: &str) -> QbError {
    let mut interpreter = Interpreter::new();
    match interpreter.eval_source(source) {
        Ok(value) => panic!("expected error, received value {value}"),
        Err(err) => err,
    }
}

fn expect_kind(source: &str, kind: DiagnosticKind) {
    let err = eval_error(source);
    assert_eq!(err.kind(), Some(kind), "source: {source}");
}

fn expect_int(value: &Value) -> i64 {
    match &*value.0 {
        ValueKind::Int(n) => *n,
        _ => panic!("expected Int, found {}", value.type_name()),
    }
}

fn expect_float(value: &Value) -> f64 {
    match &*value.0 {
        ValueKind::Float(n) => *n,
        _ => panic!("expected Float, found {}", value.type_name()),
    }
}

fn expect_atom(value: &Value) -> &str {
    match &*value.0 {
        ValueKind::Atom(name) => name,
        _ => panic!("expected Atom, found {}", value.type_name()),
    }
}

fn truthy(value: &Value) -> bool {
    value.is_atomic()
}

#[test]
fn let_binds_in_the_current_frame() {
    let value = eval("(let x 7) x");
    assert_eq!(expect_int(&value), 7);
}

#[test]
fn let_returns_the_bound_value_and_rebinds_silently() {
    assert_eq!(expect_int(&eval("(let x 7)")), 7);
    assert_eq!(expect_int(&eval("(let x 1) (let x 2) x")), 2);
}

#[test]
fn closure_application_evaluates_the_body() {
    let value = eval("(let double (fun [n] (add n n))) (double 2453)");
    assert_eq!(expect_int(&value), 4906);
}

#[test]
fn atom_predicate_follows_the_shape() {
    assert!(truthy(&eval("(atom #A)")));
    assert!(truthy(&eval("(atom 1)")));
    assert!(truthy(&eval("(atom \"s\")")));
    assert!(eval("(atom [])").is_empty_list());
    assert!(eval("(atom [1 2])").is_empty_list());
}

#[test]
fn not_is_truthy_only_for_the_empty_list() {
    assert!(truthy(&eval("(not [])")));
    assert!(eval("(not (list 1))").is_empty_list());
    assert!(eval("(not 1)").is_empty_list());
}

#[test]
fn cons_head_tail_round_trip() {
    assert_eq!(expect_int(&eval("(head (cons 1 [2 3]))")), 1);
    assert_eq!(
        eval("(tail (cons 1 [2 3]))"),
        Value::list(vec![Value::int(2), Value::int(3)])
    );
    assert!(eval("(tail [1])").is_empty_list());
}

#[test]
fn append_concatenates_lists() {
    assert_eq!(
        eval("(append [1 2] [3])"),
        Value::list(vec![Value::int(1), Value::int(2), Value::int(3)])
    );
}

#[test]
fn head_and_tail_of_empty_list_are_refined_type_errors() {
    expect_kind("(head [])", DiagnosticKind::EmptyList);
    expect_kind("(tail [])", DiagnosticKind::EmptyList);
    expect_kind("(head 1)", DiagnosticKind::Type);
}

#[test]
fn eq_compares_atomic_values_only() {
    assert!(truthy(&eval("(eq 1 1)")));
    assert!(eval("(eq 1 2)").is_empty_list());
    assert!(truthy(&eval("(eq #a #a)")));
    assert!(truthy(&eval("(eq \"a\" \"a\")")));
    assert!(truthy(&eval("(eq 1 1.0)")));
    expect_kind("(eq [1] [1])", DiagnosticKind::Type);
    expect_kind("(ne [] 1)", DiagnosticKind::Type);
}

#[test]
fn eq_across_atomic_kinds_is_unequal_not_an_error() {
    assert!(eval("(eq #a \"a\")").is_empty_list());
    assert!(truthy(&eval("(ne #a \"a\")")));
}

#[test]
fn orderings_require_numbers() {
    assert!(truthy(&eval("(lt 1 2)")));
    assert!(eval("(gt 1 2)").is_empty_list());
    assert!(truthy(&eval("(le 2 2)")));
    assert!(truthy(&eval("(ge 2.5 2)")));
    expect_kind("(lt #a 1)", DiagnosticKind::Type);
    expect_kind("(ge 1 \"x\")", DiagnosticKind::Type);
}

#[test]
fn add_sums_left_to_right_with_float_promotion() {
    assert_eq!(expect_int(&eval("(add 1 2 3)")), 6);
    assert_eq!(expect_float(&eval("(add 1 2.5)")), 3.5);
    expect_kind("(add 1 #a)", DiagnosticKind::Type);
}

#[test]
fn cond_returns_the_first_matching_clause() {
    let value = eval("(cond [(eq 1 2) #a] [(eq 1 1) #b] [#t #c])");
    assert_eq!(expect_atom(&value), "b");
}

#[test]
fn cond_never_evaluates_later_clauses() {
    // `boom` is unbound; reaching the second clause would error.
    let value = eval("(cond [(eq 1 1) #b] [boom #c])");
    assert_eq!(expect_atom(&value), "b");
}

#[test]
fn cond_without_a_matching_clause_is_an_eval_error() {
    expect_kind("(cond [(eq 1 2) #a] [[] #b])", DiagnosticKind::Eval);
}

#[test]
fn cond_clause_must_be_a_two_element_list() {
    expect_kind("(cond #a)", DiagnosticKind::Eval);
    expect_kind("(cond [1 2 3])", DiagnosticKind::Eval);
}

#[test]
fn if_branches_on_shape_and_evaluates_one_arm() {
    assert_eq!(expect_atom(&eval("(if [] #yes #no)")), "no");
    assert_eq!(expect_atom(&eval("(if #t #yes #no)")), "yes");
    assert_eq!(expect_atom(&eval("(if 0 #yes #no)")), "yes");
    // The untaken arm is never evaluated: `boom` is unbound.
    assert_eq!(expect_atom(&eval("(if #t #yes boom)")), "yes");
}

#[test]
fn closures_capture_their_defining_environment() {
    let value = eval("(((fun [x] (fun [y] (add x y))) 3) 4)");
    assert_eq!(expect_int(&value), 7);
}

#[test]
fn scoping_is_lexical_not_dynamic() {
    let value = eval(
        "(let x 10)\n         (let getx (fun [p] x))\n         (let shadow (fun [x] (getx 0)))\n         (shadow 99)",
    );
    assert_eq!(expect_int(&value), 10);
}

#[test]
fn let_plus_fun_supports_recursion_without_letrec() {
    let value = eval("(let tri (fun [n] (if (gt n 0) (add n (tri (add n -1))) 0))) (tri 5)");
    assert_eq!(expect_int(&value), 15);

    let value = eval(
        "(let reverse (fun [l] (if (not l) [] (append (reverse (tail l)) (list (head l))))))\n         (reverse [A B C])",
    );
    assert_eq!(
        value,
        Value::list(vec![Value::atom("C"), Value::atom("B"), Value::atom("A")])
    );
}

#[test]
fn unbound_names_and_wrong_arity_are_structured_errors() {
    expect_kind("nope", DiagnosticKind::UnboundName);
    expect_kind("(let f (fun [a b] a)) (f 1)", DiagnosticKind::Arity);
    expect_kind("(cons 1 [2] [3])", DiagnosticKind::Arity);
    expect_kind("(if #t 1)", DiagnosticKind::Arity);
    expect_kind("(quote a b)", DiagnosticKind::Arity);
}

#[test]
fn calling_a_non_callable_value_is_a_type_error() {
    expect_kind("(let x 1) (x 2)", DiagnosticKind::Type);
}

#[test]
fn let_and_fun_validate_their_operand_shapes() {
    expect_kind("(let [a] 1)", DiagnosticKind::Type);
    expect_kind("(fun x x)", DiagnosticKind::Type);
    expect_kind("(fun [1] 1)", DiagnosticKind::Type);
}

#[test]
fn quote_returns_the_operand_unevaluated() {
    assert_eq!(expect_atom(&eval("#A")), "A");
    assert_eq!(expect_atom(&eval("(quote A)")), "A");
    // A quoted call survives as data and `atom` sees a non-atomic shape.
    assert!(eval("(atom #(add 1 2))").is_empty_list());
}

#[test]
fn literal_lists_evaluate_to_themselves_idempotently() {
    let mut interpreter = Interpreter::new();
    let first = interpreter.eval_source("[1 [2 3] A]").expect("first eval");
    let second = interpreter.eval_source("[1 [2 3] A]").expect("second eval");
    assert_eq!(first, second);
    assert_eq!(
        interpreter.eval_source("7").expect("number eval"),
        Value::int(7)
    );
}

#[test]
fn string_literals_evaluate_to_themselves() {
    assert_eq!(eval("\"hello world\""), Value::string("hello world"));
}

#[test]
fn empty_call_is_a_syntax_error() {
    expect_kind("()", DiagnosticKind::Syntax);
    expect_kind("(let r ())", DiagnosticKind::Syntax);
}

#[test]
fn eval_program_reports_one_outcome_per_form_and_keeps_going() {
    let mut interpreter = Interpreter::new();
    let outcomes = interpreter
        .eval_program("(let x 1) nope (add x 1)")
        .expect("program should parse");
    assert_eq!(outcomes.len(), 3);
    assert!(outcomes[0].is_ok());
    assert_eq!(
        outcomes[1].as_ref().err().and_then(QbError::kind),
        Some(DiagnosticKind::UnboundName)
    );
    // The failed form left earlier bindings untouched.
    assert_eq!(expect_int(outcomes[2].as_ref().expect("third form")), 2);
}

#[test]
fn environment_persists_across_interactive_evaluations() {
    let mut interpreter = Interpreter::new();
    interpreter.eval_source("(let x 41)").expect("bind x");
    let value = interpreter.eval_source("(add x 1)").expect("use x");
    assert_eq!(expect_int(&value), 42);
}
