//! Integration tests for the Mica interpreter.
//!
//! These tests verify end-to-end execution of Mica programs,
//! from parsing through evaluation.

use std::cell::RefCell;
use std::rc::Rc;

use mica_interpreter::{eval_module, Environment, Value};
use mica_parser::parse;
use mica_types::{check, TypeEnv};

/// Helper to run Mica code and return the value of its last statement.
fn run(source: &str) -> Value {
    let (module, errors) = parse(source);
    assert!(errors.is_empty(), "parse errors: {errors:?}");
    let env = Rc::new(RefCell::new(Environment::new()));
    eval_module(&module, &env)
}

/// Helper asserting the program ends in an error value whose message
/// contains `needle`.
fn run_expect_error(source: &str, needle: &str) {
    match run(source) {
        Value::Error(e) => assert!(
            e.message.contains(needle),
            "expected error mentioning {needle:?}, got {:?}",
            e.message
        ),
        other => panic!("expected an error value, got {other:?}"),
    }
}

// ============================================================================
// Arithmetic and Promotion
// ============================================================================

mod arithmetic {
    use super::*;

    #[test]
    fn test_integer_arithmetic_stays_integer() {
        assert_eq!(run("5 + 5 - 10"), Value::Int(0));
        assert_eq!(run("2 * 3 + 4 / 2"), Value::Int(8));
    }

    #[test]
    fn test_mixed_arithmetic_promotes_to_float() {
        assert_eq!(run("5.1 + 5"), Value::Float(10.1));
        assert_eq!(run("1 / 2.0"), Value::Float(0.5));
    }

    #[test]
    fn test_unary_operators() {
        assert_eq!(run("-3 + 5"), Value::Int(2));
        assert_eq!(run("!false"), Value::Bool(true));
    }

    #[test]
    fn test_string_concatenation() {
        assert_eq!(run(r#""foo" + "bar""#), Value::Str("foobar".into()));
    }

    #[test]
    fn test_operand_type_confusion_yields_error_value() {
        run_expect_error("1 + true", "Bool");
        run_expect_error(r#""a" - "b""#, "String");
    }

    #[test]
    fn test_division_by_zero() {
        run_expect_error("1 / 0", "division by zero");
        run_expect_error("10 / (5 - 5)", "division by zero");
    }

    #[test]
    fn test_integer_overflow_is_an_error_value() {
        run_expect_error("9223372036854775807 + 1", "integer overflow");
        run_expect_error("9223372036854775807 * 2", "integer overflow");
        run_expect_error("0 - 9223372036854775807 - 2", "integer overflow");
        // i64::MIN / -1 does not fit in an i64
        run_expect_error("(0 - 9223372036854775807 - 1) / -1", "integer overflow");
        run_expect_error("-(0 - 9223372036854775807 - 1)", "integer overflow");
    }

    #[test]
    fn test_errors_short_circuit_through_composites() {
        // the error from the inner division surfaces unchanged
        run_expect_error("[1, 2 / 0, 3]", "division by zero");
        run_expect_error("{ x: 1 / 0 }", "division by zero");
        run_expect_error("(1 / 0) + 5", "division by zero");
    }
}

// ============================================================================
// Bindings and Scoping
// ============================================================================

mod scoping {
    use super::*;

    #[test]
    fn test_let_and_lookup() {
        assert_eq!(run("let x = 42; x"), Value::Int(42));
    }

    #[test]
    fn test_duplicate_binding_is_an_error_value() {
        run_expect_error("let x = 1; let x = 2;", "duplicate binding");
        // ...but shadowing in an inner scope is fine
        assert_eq!(run("let x = 1; { let x = 2; x }"), Value::Int(2));
    }

    #[test]
    fn test_inner_scope_sees_outer() {
        assert_eq!(run("let x = 10; { x + 1 }"), Value::Int(11));
    }

    #[test]
    fn test_block_bindings_are_discarded() {
        run_expect_error("{ let y = 1; y }; y", "unknown identifier");
    }

    #[test]
    fn test_var_assignment() {
        assert_eq!(run("var x = 1; x = x + 1; x"), Value::Int(2));
    }

    #[test]
    fn test_assignment_to_let_fails() {
        run_expect_error("let x = 1; x = 2;", "immutable");
    }

    #[test]
    fn test_assignment_to_undefined_fails() {
        run_expect_error("y = 2;", "undefined");
    }

    #[test]
    fn test_assignment_reaches_outer_scope() {
        assert_eq!(run("var x = 1; { x = 5; }; x"), Value::Int(5));
    }
}

// ============================================================================
// Functions and Closures
// ============================================================================

mod functions {
    use super::*;

    #[test]
    fn test_call_with_arguments() {
        assert_eq!(
            run("let add = func (a: Int, b: Int) => a + b; add(2, 3)"),
            Value::Int(5)
        );
    }

    #[test]
    fn test_defaults_fill_omitted_trailing_arguments() {
        let source = "let add = func (a: Int, b = 10) => a + b;";
        assert_eq!(run(&format!("{source} add(1)")), Value::Int(11));
        assert_eq!(run(&format!("{source} add(1, 2)")), Value::Int(3));
    }

    #[test]
    fn test_missing_required_argument() {
        run_expect_error(
            "let add = func (a: Int, b: Int) => a + b; add(1)",
            "missing argument",
        );
    }

    #[test]
    fn test_too_many_arguments() {
        run_expect_error("let id = func (a: Int) => a; id(1, 2)", "too many");
    }

    #[test]
    fn test_duplicate_parameter_names_are_an_error_value() {
        run_expect_error(
            "let f = func (a: Int, a: Int) => a; f(1, 2)",
            "duplicate parameter",
        );
    }

    #[test]
    fn test_calling_a_non_function() {
        run_expect_error("let x = 3; x(1)", "cannot call");
    }

    #[test]
    fn test_closure_captures_defining_environment() {
        let source = "
            let make = func (n: Int) => func (m: Int) => n + m;
            let addTwo = make(2);
            addTwo(40)
        ";
        assert_eq!(run(source), Value::Int(42));
    }

    #[test]
    fn test_closure_observes_later_updates() {
        // capture is by shared environment, not by copy
        let source = "
            var count = 0;
            let read = func () => count;
            count = 7;
            read()
        ";
        assert_eq!(run(source), Value::Int(7));
    }

    #[test]
    fn test_two_closures_share_one_environment() {
        let source = "
            var total = 0;
            let bump = func (n: Int) => total = total + n;
            let get = func () => total;
            bump(3);
            bump(4);
            get()
        ";
        assert_eq!(run(source), Value::Int(7));
    }

    #[test]
    fn test_call_scope_is_parented_at_the_closure_not_the_caller() {
        let source = "
            let n = 1;
            let f = func () => n;
            {
                let n = 99;
                f()
            }
        ";
        assert_eq!(run(source), Value::Int(1));
    }

    #[test]
    fn test_parameters_are_discarded_after_return() {
        run_expect_error(
            "let f = func (a: Int) => a; f(1); a",
            "unknown identifier",
        );
    }
}

// ============================================================================
// Control Flow
// ============================================================================

mod control_flow {
    use super::*;

    #[test]
    fn test_if_is_an_expression() {
        assert_eq!(run("if 1 < 2 { 10 } else { 20 }"), Value::Int(10));
        assert_eq!(run("if 1 > 2 { 10 } else { 20 }"), Value::Int(20));
        assert_eq!(run("if false { 10 }"), Value::Unit);
    }

    #[test]
    fn test_untaken_branch_is_never_evaluated() {
        assert_eq!(run("if true { 1 } else { 1 / 0 }"), Value::Int(1));
    }

    #[test]
    fn test_else_if_chain() {
        let source = "
            let grade = func (n: Int) =>
                if n >= 90 { \"A\" } else if n >= 80 { \"B\" } else { \"C\" };
            grade(85)
        ";
        assert_eq!(run(source), Value::Str("B".into()));
    }

    #[test]
    fn test_non_bool_condition_is_an_error_value() {
        run_expect_error("if 1 { 2 }", "Bool");
    }

    #[test]
    fn test_for_over_range() {
        // 0 + 1 + 2 + 3 + 4, half-open upper bound
        assert_eq!(run("var sum = 0; for i in 0..5 { sum = sum + i }; sum"), Value::Int(10));
    }

    #[test]
    fn test_for_over_array() {
        assert_eq!(
            run("var sum = 0; for n in [1, 2, 3] { sum = sum + n }; sum"),
            Value::Int(6)
        );
    }

    #[test]
    fn test_empty_range_never_runs() {
        assert_eq!(run("var hits = 0; for i in 3..3 { hits = hits + 1 }; hits"), Value::Int(0));
    }

    #[test]
    fn test_loop_variable_is_scoped_to_the_body() {
        run_expect_error("for i in 0..3 { i }; i", "unknown identifier");
    }

    #[test]
    fn test_huge_range_is_not_materialized() {
        // iterating lazily, the first pass errors out immediately; a loop
        // that collected the range up front would exhaust memory first
        run_expect_error("for i in 0..3000000000 { 1 / 0 }", "division by zero");
    }

    #[test]
    fn test_error_in_loop_body_stops_the_loop() {
        run_expect_error(
            "var n = 0; for i in 0..10 { n = 1 / (5 - i) }; n",
            "division by zero",
        );
    }
}

// ============================================================================
// Data Values
// ============================================================================

mod data {
    use super::*;

    #[test]
    fn test_array_literals_and_indexing() {
        assert_eq!(run("[1, 2, 3][1]"), Value::Int(2));
        run_expect_error("[1, 2, 3][3]", "out of bounds");
        run_expect_error("[1][-1]", "out of bounds");
    }

    #[test]
    fn test_struct_literals_and_field_access() {
        assert_eq!(run("let p = { x: 1, y: 2 }; p.x + p.y"), Value::Int(3));
        run_expect_error("{ x: 1 }.z", "no field");
    }

    #[test]
    fn test_structural_equality() {
        assert_eq!(run("[1, 2] == [1, 2]"), Value::Bool(true));
        assert_eq!(run("{ x: 1 } == { x: 1 }"), Value::Bool(true));
        assert_eq!(run("{ x: 1 } == { x: 2 }"), Value::Bool(false));
        assert_eq!(run("1 == 1.0"), Value::Bool(true));
        assert_eq!(run("1 != 2"), Value::Bool(true));
    }

    #[test]
    fn test_type_alias_has_no_runtime_effect() {
        assert_eq!(run("type Point = { x: Int, y: Int }; 1"), Value::Int(1));
    }
}

// ============================================================================
// Whole Pipeline
// ============================================================================

mod pipeline {
    use super::*;

    /// Type diagnostics do not stop evaluation: the checker reports,
    /// the evaluator still runs the module.
    #[test]
    fn test_evaluation_proceeds_despite_type_diagnostics() {
        let source = "let x: Int = 1; x + 2.5";
        let (module, parse_errors) = parse(source);
        assert!(parse_errors.is_empty());

        let mut tenv = TypeEnv::prelude();
        let (_, type_errors) = check(&module, &mut tenv);
        assert!(type_errors.is_empty());

        let env = Rc::new(RefCell::new(Environment::new()));
        assert_eq!(eval_module(&module, &env), Value::Float(3.5));
    }

    #[test]
    fn test_checked_and_evaluated_program() {
        let source = "
            export let fahrenheit = func (celsius: Float): Float =>
                celsius * 9.0 / 5.0 + 32.0;
            fahrenheit(100.0)
        ";
        let (module, parse_errors) = parse(source);
        assert!(parse_errors.is_empty(), "{parse_errors:?}");

        let mut tenv = TypeEnv::prelude();
        let (_, type_errors) = check(&module, &mut tenv);
        assert!(type_errors.is_empty(), "{type_errors:?}");

        assert_eq!(module.exports.len(), 1);
        assert!(module.exports.contains_key("fahrenheit"));

        let env = Rc::new(RefCell::new(Environment::new()));
        assert_eq!(eval_module(&module, &env), Value::Float(212.0));
    }

    #[test]
    fn test_module_stops_at_first_error_value() {
        let source = "let a = 1; let b = a / 0; let c = b + 1; c";
        match run(source) {
            Value::Error(e) => assert!(e.message.contains("division by zero")),
            other => panic!("expected an error value, got {other:?}"),
        }
    }
}
