//! End-to-end tests through the public API: compile a source program,
//! execute it, check the output lines.

use bhasha::{
    compile, example_for, list_languages, run, run_with_config, translate, BufferedInput,
    DiagnosticKind, RuntimeErrorKind, VmConfig,
};

fn output_in(source: &str, lang: &str) -> Vec<String> {
    let program = compile(source, lang).expect("program should compile");
    let execution = run(&program, &mut BufferedInput::empty()).expect("program should run");
    execution.output_lines
}

fn output(source: &str) -> Vec<String> {
    output_in(source, "en")
}

#[test]
fn arithmetic_on_variables() {
    assert_eq!(output("var x = 10; var y = 20; print(x + y);"), vec!["30"]);
}

#[test]
fn string_biased_addition() {
    assert_eq!(output("var s = \"hi\"; print(s + \" \" + 3);"), vec!["hi 3"]);
}

#[test]
fn while_loop_factorial() {
    assert_eq!(
        output("var n = 5; var f = 1; while (n > 1) { f = f * n; n = n - 1; } print(f);"),
        vec!["120"]
    );
}

#[test]
fn recursive_factorial() {
    assert_eq!(
        output(
            "function fact(n) { if (n <= 1) { return 1; } else { return n * fact(n - 1); } } \
             print(fact(5));"
        ),
        vec!["120"]
    );
}

#[test]
fn if_else_takes_one_branch() {
    assert_eq!(
        output("if (1 < 2) { print(\"a\"); } else { print(\"b\"); } print(\"c\");"),
        vec!["a", "c"]
    );
}

#[test]
fn redeclaration_aliases_the_same_slot() {
    assert_eq!(output("var x = 1; var x = x + 1; print(x);"), vec!["2"]);
}

#[test]
fn for_loop_counts() {
    assert_eq!(
        output("for (var i = 0; i < 3; i = i + 1) { print(i); }"),
        vec!["0", "1", "2"]
    );
}

#[test]
fn division_by_zero_at_runtime() {
    let program = compile("print(1 / 0);", "en").unwrap();
    let err = run(&program, &mut BufferedInput::empty()).unwrap_err();
    assert_eq!(err.kind, RuntimeErrorKind::DivisionByZero);
}

#[test]
fn undefined_name_at_compile_time() {
    let err = compile("print(y);", "en").unwrap_err();
    assert_eq!(err.kind, DiagnosticKind::UndefinedName);
}

#[test]
fn missing_identifier_is_a_syntax_error_at_the_assign() {
    let err = compile("var = 1;", "en").unwrap_err();
    assert_eq!(err.kind, DiagnosticKind::SyntaxError);
    assert_eq!((err.line, err.column), (1, 5));
}

#[test]
fn unknown_character_is_a_lexical_error() {
    let err = compile("var x = @;", "en").unwrap_err();
    assert_eq!(err.kind, DiagnosticKind::LexicalError);
}

#[test]
fn unknown_language_code() {
    let err = compile("print(1);", "xx").unwrap_err();
    assert_eq!(err.kind, DiagnosticKind::UnknownLanguage);
}

#[test]
fn hindi_keywords_and_builtins() {
    assert_eq!(
        output_in("agar (1 < 2) { dikhaao(\"ok\"); }", "hi"),
        vec!["ok"]
    );
}

#[test]
fn tamil_factorial() {
    let source = "maari n = 5; maari f = 1; varaikum (n > 1) { f = f * n; n = n - 1; } veliyidu(f);";
    assert_eq!(output_in(source, "ta"), vec!["120"]);
}

#[test]
fn input_builtin_reads_provided_lines() {
    let program = compile("var name = input(); print(\"hello \" + name);", "en").unwrap();
    let mut input = BufferedInput::new(["asha"]);
    let execution = run(&program, &mut input).unwrap();
    assert_eq!(execution.output_lines, vec!["hello asha"]);
}

#[test]
fn exhausted_input_reads_empty_strings() {
    let program = compile("print(input() + \".\");", "en").unwrap();
    let execution = run(&program, &mut BufferedInput::empty()).unwrap();
    assert_eq!(execution.output_lines, vec!["."]);
}

#[test]
fn step_budget_stops_infinite_loops() {
    let program = compile("while (true) { }", "en").unwrap();
    let config = VmConfig {
        max_steps: Some(10_000),
    };
    let err = run_with_config(&program, &mut BufferedInput::empty(), config).unwrap_err();
    assert_eq!(err.kind, RuntimeErrorKind::ExecutionLimitExceeded);
}

#[test]
fn malformed_number_fails_only_at_runtime() {
    // Multi-dot lexemes are fine at lex and compile time.
    let program = compile("print(1.2.3);", "en").unwrap();
    let err = run(&program, &mut BufferedInput::empty()).unwrap_err();
    assert_eq!(err.kind, RuntimeErrorKind::BadInstruction);
}

#[test]
fn logical_operators_select_operands() {
    assert_eq!(output("print(0 && 5);"), vec!["0"]);
    assert_eq!(output("print(0 || 5);"), vec!["5"]);
    assert_eq!(output("print(2 && 5);"), vec!["5"]);
    assert_eq!(output("print(\"\" || \"x\");"), vec!["x"]);
    assert_eq!(output("print(!1);"), vec!["false"]);
}

#[test]
fn null_literal_prints_as_null() {
    assert_eq!(output("var x; print(x); print(null);"), vec!["null", "null"]);
}

#[test]
fn nested_function_calls() {
    assert_eq!(
        output(
            "function double(x) { return x * 2; } \
             function quad(x) { return double(double(x)); } \
             print(quad(3));"
        ),
        vec!["12"]
    );
}

#[test]
fn functions_as_values() {
    assert_eq!(
        output("function inc(x) { return x + 1; } var f = inc; print(f(41));"),
        vec!["42"]
    );
}

#[test]
fn caller_variables_survive_calls() {
    assert_eq!(
        output("var a = 1; function f(x) { return x; } print(f(2)); print(a);"),
        vec!["2", "1"]
    );
}

#[test]
fn bytecode_programs_can_be_rerun() {
    let program = compile("var x = 3; print(x * x);", "en").unwrap();
    let first = run(&program, &mut BufferedInput::empty()).unwrap();
    let second = run(&program, &mut BufferedInput::empty()).unwrap();
    assert_eq!(first.output_lines, vec!["9"]);
    assert_eq!(first, second);
}

#[test]
fn every_language_has_a_runnable_example() {
    for entry in list_languages() {
        let example = example_for(entry.code).expect("example should exist");
        let program = compile(&example, entry.code)
            .unwrap_or_else(|e| panic!("{} example should compile: {}", entry.code, e));
        let execution = run(&program, &mut BufferedInput::empty())
            .unwrap_or_else(|e| panic!("{} example should run: {}", entry.code, e));
        assert_eq!(execution.output_lines, vec!["hello, world", "5! = 120"]);
    }
}

#[test]
fn translation_round_trip_preserves_behavior() {
    let source = "var n = 4; var f = 1; while (n > 1) { f = f * n; n = n - 1; } print(f);";
    let hindi = translate(source, "en", "hi").unwrap();
    assert_eq!(output_in(&hindi, "hi"), output(source));
    let back = translate(&hindi, "hi", "en").unwrap();
    assert_eq!(back, source);
}
