use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Output, Stdio};

fn pseudo() -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_pseudo"));
    command.arg("--color").arg("never");
    command
}

fn eval(code: &str) -> Output {
    pseudo().arg("--eval").arg(code).output().expect("Failed to execute pseudo")
}

fn with_stdin(mut command: Command, input: &str) -> Output {
    let mut child = command
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to spawn pseudo");
    child
        .stdin
        .take()
        .expect("stdin is piped")
        .write_all(input.as_bytes())
        .expect("Failed to write to stdin");
    child.wait_with_output().expect("Failed to read output")
}

fn stdout(output: &Output) -> String {
    String::from_utf8(output.stdout.clone()).unwrap()
}

fn stderr(output: &Output) -> String {
    String::from_utf8(output.stderr.clone()).unwrap()
}

/// Fresh scratch directory per test.
fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("pseudo-cli-{}-{}", name, std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();
    dir
}

#[test]
fn test_version_flag() {
    let output = pseudo().arg("--version").output().expect("Failed to execute pseudo");
    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.contains("pseudo"));
    assert!(text.contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_eval_prints_output() {
    let output = eval("let total = 0\nfor i = 1 to 4\n    total = total + i\nnext i\nprint(\"total:\", total)");
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(stdout(&output), "total: 10\n");
}

#[test]
fn test_run_file() {
    let dir = scratch_dir("file");
    let path = dir.join("greet.pseudo");
    fs::write(&path, "procedure greet(name)\n    print(\"Hello, \" + name)\nendprocedure\ngreet(\"Ada\")\n").unwrap();

    let output = pseudo().arg(&path).output().expect("Failed to execute pseudo");
    let _ = fs::remove_dir_all(&dir);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(stdout(&output), "Hello, Ada\n");
}

#[test]
fn test_missing_file_fails() {
    let output = pseudo().arg("does-not-exist.pseudo").output().expect("Failed to execute pseudo");
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("Failed to read"));
}

#[test]
fn test_syntax_error_exit_code_and_diagnostic() {
    let output = eval("if true\n    print(1)\nendif");
    assert_eq!(output.status.code(), Some(1));
    let text = stderr(&output);
    assert!(text.contains("<eval>:2:5"), "{}", text);
    assert!(text.contains("Syntax Error:"), "{}", text);
    assert!(stdout(&output).is_empty());
}

#[test]
fn test_runtime_error_keeps_earlier_output() {
    let output = eval("print(\"start\")\nprint(10 DIV 0)");
    assert_eq!(output.status.code(), Some(1));
    assert_eq!(stdout(&output), "start\n");
    assert!(stderr(&output).contains("Runtime Error: Division by zero"));
}

#[test]
fn test_eval_and_file_conflict() {
    let output = pseudo()
        .arg("program.pseudo")
        .arg("--eval")
        .arg("print(1)")
        .output()
        .expect("Failed to execute pseudo");
    assert!(!output.status.success());
}

#[test]
fn test_dump_ast() {
    let output = pseudo()
        .arg("--dump-ast")
        .arg("--eval")
        .arg("let x = 1 + 2")
        .output()
        .expect("Failed to execute pseudo");
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let tree: serde_json::Value = serde_json::from_str(&stdout(&output)).expect("valid JSON");
    assert_eq!(tree["kind"], "Program");
    assert_eq!(tree["body"][0]["kind"], "VariableDeclaration");
    assert_eq!(tree["body"][0]["value"]["kind"], "BinaryExpression");
}

#[test]
fn test_loop_limit_flag() {
    let output = pseudo()
        .arg("--loop-limit")
        .arg("3")
        .arg("--eval")
        .arg("while true\n    print(\"tick\")\nendwhile")
        .output()
        .expect("Failed to execute pseudo");
    assert_eq!(output.status.code(), Some(1));
    assert_eq!(stdout(&output).lines().count(), 3);
    assert!(stderr(&output).contains("3 iterations"));
}

#[test]
fn test_seed_makes_random_reproducible() {
    let run = || {
        pseudo()
            .arg("--seed")
            .arg("7")
            .arg("--eval")
            .arg("for i = 1 to 5\n    print(random(1, 100))\nnext i")
            .output()
            .expect("Failed to execute pseudo")
    };
    let first = run();
    let second = run();
    assert!(first.status.success());
    assert_eq!(stdout(&first).lines().count(), 5);
    assert_eq!(stdout(&first), stdout(&second));
}

#[test]
fn test_files_root() {
    let dir = scratch_dir("files");
    fs::write(dir.join("names.txt"), "Ada\nGrace\n").unwrap();

    let output = pseudo()
        .arg("--files")
        .arg(&dir)
        .arg("--eval")
        .arg("let r = openRead(\"names.txt\")\nprint(r.readLine())\nr.close()\nnewFile(\"out.txt\")\nlet w = openWrite(\"out.txt\")\nw.writeLine(\"done\")\nw.close()")
        .output()
        .expect("Failed to execute pseudo");
    let written = fs::read_to_string(dir.join("out.txt"));
    let _ = fs::remove_dir_all(&dir);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(stdout(&output), "Ada\n");
    assert_eq!(written.unwrap(), "done");
}

#[test]
fn test_input_reads_stdin() {
    let mut command = pseudo();
    command.arg("--eval").arg("let n = input(\"n? \")\nprint(int(n) * 2)");
    let output = with_stdin(command, "21\n");
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(stdout(&output), "n? 42\n");
}

#[test]
fn test_interactive_session() {
    let session = "let x = 2\nprint(x * 21)\nif x > 1 then\n    print(\"big\")\nendif\nx + 1\nexit\n";
    let output = with_stdin(pseudo(), session);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let text = stdout(&output);
    assert!(text.contains("42"), "{}", text);
    assert!(text.contains("big"), "{}", text);
    assert!(text.contains('3'), "{}", text);
}

#[test]
fn test_interactive_errors_do_not_end_session() {
    let output = with_stdin(pseudo(), "print(missing)\nprint(\"still here\")\n");
    assert!(output.status.success());
    assert!(stderr(&output).contains("Undefined variable: missing"));
    assert!(stdout(&output).contains("still here"));
}

#[test]
fn test_shell_completion_bash() {
    let output = pseudo().arg("complete").arg("bash").output().expect("Failed to execute pseudo");
    assert!(output.status.success());
    assert!(stdout(&output).contains("pseudo"));
}

#[test]
fn test_shell_completion_zsh() {
    let output = pseudo().arg("complete").arg("zsh").output().expect("Failed to execute pseudo");
    assert!(output.status.success());
    assert!(!stdout(&output).is_empty());
}

#[test]
fn test_verbose_logs_to_stderr() {
    let output = pseudo().arg("-v").arg("--eval").arg("print(1)").output().expect("Failed to execute pseudo");
    assert!(output.status.success());
    assert_eq!(stdout(&output), "1\n");
    assert!(stderr(&output).contains("[pseudo:debug]"));
}
