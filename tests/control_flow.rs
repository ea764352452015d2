mod common;

use common::{Session, run, runtime_err};
use pseudo::interpreter::host::MemoryFileStore;
use pseudo::interpreter::{InterpreterOptions, RuntimeError};

// ============================================================================
// if / elseif / else
// ============================================================================

#[test]
fn test_if_else_chain() {
    let source = r#"
procedure grade(score)
    if score >= 70 then
        print("A")
    elseif score >= 50 then
        print("B")
    else
        print("C")
    endif
endprocedure
grade(85)
grade(60)
grade(10)
"#;
    assert_eq!(run(source), vec!["A", "B", "C"]);
}

#[test]
fn test_if_condition_uses_truthiness() {
    let source = r#"
if "" then
    print("empty")
else
    print("falsy")
endif
if 0 then
    print("zero is truthy")
endif
"#;
    assert_eq!(run(source), vec!["falsy", "zero is truthy"]);
}

#[test]
fn test_block_declarations_shadow_outer_binding() {
    let source = r#"
let x = 1
if true then
    let x = 2
    print(x)
endif
print(x)
"#;
    assert_eq!(run(source), vec!["2", "1"]);
}

#[test]
fn test_assignment_in_block_updates_outer_binding() {
    let source = r#"
let count = 0
if true then
    count = count + 1
endif
print(count)
"#;
    assert_eq!(run(source), vec!["1"]);
}

#[test]
fn test_redeclaration_in_same_scope_fails() {
    assert!(matches!(
        runtime_err("let x = 1\nlet x = 2"),
        RuntimeError::Redeclaration { .. }
    ));
}

// ============================================================================
// switch
// ============================================================================

#[test]
fn test_switch_runs_first_match_only() {
    let source = r#"
procedure describe(day)
    switch day:
    case "sat":
        print("weekend")
    case "sun":
        print("weekend")
    case "sat":
        print("never reached")
    default:
        print("weekday")
    endswitch
endprocedure
describe("sat")
describe("mon")
"#;
    assert_eq!(run(source), vec!["weekend", "weekday"]);
}

#[test]
fn test_switch_without_match_does_nothing() {
    let source = "switch 3:\ncase 1:\n print(\"one\")\nendswitch\nprint(\"done\")";
    assert_eq!(run(source), vec!["done"]);
}

// ============================================================================
// for
// ============================================================================

#[test]
fn test_for_is_inclusive_of_end() {
    assert_eq!(run("for i = 0 to 3\n print(i)\nnext i"), vec!["0", "1", "2", "3"]);
}

#[test]
fn test_for_with_empty_range_never_runs() {
    assert!(run("for i = 5 to 1\n print(i)\nnext i").is_empty());
}

#[test]
fn test_for_bounds_are_expressions() {
    let source = "let n = 3\nfor i = n - 1 to n + 1\n print(i)\nnext i";
    assert_eq!(run(source), vec!["2", "3", "4"]);
}

#[test]
fn test_nested_for_fills_grid() {
    let source = r#"
array grid[2, 3]
for r = 0 to 1
    for c = 0 to 2
        grid[r, c] = (r * 3) + c
    next c
next r
print(grid)
"#;
    assert_eq!(run(source), vec!["[[0, 1, 2], [3, 4, 5]]"]);
}

#[test]
fn test_for_variable_is_loop_local() {
    let error = runtime_err("for i = 0 to 1\nnext i\nprint(i)");
    assert!(matches!(error, RuntimeError::UndefinedVariable { .. }));
}

#[test]
fn test_for_requires_integer_bounds() {
    let error = runtime_err("for i = 0 to 2.5\nnext i");
    assert!(error.to_string().contains("integer"));
}

#[test]
fn test_body_declarations_are_fresh_each_iteration() {
    let source = "for i = 1 to 3\n let square = i * i\n print(square)\nnext i";
    assert_eq!(run(source), vec!["1", "4", "9"]);
}

// ============================================================================
// while / do-until
// ============================================================================

#[test]
fn test_while_loop() {
    let source = "let n = 1\nwhile n < 100\n n = n * 2\nendwhile\nprint(n)";
    assert_eq!(run(source), vec!["128"]);
}

#[test]
fn test_while_condition_must_be_boolean() {
    let error = runtime_err("let n = 3\nwhile n\n n = n - 1\nendwhile");
    assert!(matches!(error, RuntimeError::TypeError { .. }));
}

#[test]
fn test_while_stops_after_exactly_the_limit() {
    let mut session = Session::new(&[], MemoryFileStore::new());
    let result = session.run("let runs = 0\nwhile true\n runs = runs + 1\n print(runs)\nendwhile");
    assert!(result.is_err());
    let lines = session.lines();
    assert_eq!(lines.len(), 200);
    assert_eq!(lines.last().map(String::as_str), Some("200"));
    assert!(matches!(
        result,
        Err(pseudo::interpreter::Error::Runtime(RuntimeError::LoopLimit { limit: 200, .. }))
    ));
}

#[test]
fn test_while_limit_is_configurable() {
    let options = InterpreterOptions { max_while_iterations: 5, ..InterpreterOptions::default() };
    let mut session = Session::with_options(&[], MemoryFileStore::new(), options);
    assert!(session.run("while true\n print(\"x\")\nendwhile").is_err());
    assert_eq!(session.lines().len(), 5);

    assert!(session.run("let i = 0\nwhile i < 5\n i = i + 1\nendwhile").is_ok());
}

#[test]
fn test_do_until_runs_body_first() {
    let source = "let n = 10\ndo\n print(n)\n n = n + 1\nuntil n > 5";
    assert_eq!(run(source), vec!["10"]);
}

#[test]
fn test_do_until_loops_while_condition_false() {
    let source = "let n = 0\ndo\n n = n + 1\nuntil n == 3\nprint(n)";
    assert_eq!(run(source), vec!["3"]);
}

#[test]
fn test_do_until_has_no_iteration_cap() {
    let source = "let n = 0\ndo\n n = n + 1\nuntil n == 500\nprint(n)";
    assert_eq!(run(source), vec!["500"]);
}
