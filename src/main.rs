use owo_colors::OwoColorize;
use pseudo::cli::{self, Args, Commands};
use pseudo::config::AppConfig;
use pseudo::diagnostic::render_diagnostics;
use pseudo::format::raw_value;
use pseudo::interpreter::{self, Error, Host, Interpreter};
use pseudo::json::program_to_json;
use pseudo::value::Value;

use clap::Parser;
use std::io::{self, Write};
use std::path::Path;

fn main() {
    let args = Args::parse();

    if let Some(Commands::Complete { shell }) = args.command {
        cli::generate_completions(shell);
        return;
    }

    let config = AppConfig::from_args(&args);
    verbose_log(&config, "Starting pseudo");

    let (source, name) = if let Some(file) = &args.file {
        verbose_log(&config, &format!("Reading program from file: {}", file.display()));
        match read_file(file) {
            Ok(source) => (source, file.display().to_string()),
            Err(e) => {
                error_message(&config, &e);
                std::process::exit(1);
            }
        }
    } else if let Some(code) = &args.eval {
        verbose_log(&config, "Using program from command-line argument");
        (code.clone(), "<eval>".to_string())
    } else {
        run_interactive_mode(&config);
        return;
    };

    if config.dump_ast {
        if let Err(e) = dump_ast(&source, &name, &config) {
            report(&config, &source, &name, &e);
            std::process::exit(1);
        }
        return;
    }

    let mut interpreter = new_interpreter(&config);
    if let Err(e) = run_program(&mut interpreter, &source, &config) {
        report(&config, &source, &name, &e);
        std::process::exit(1);
    }
    verbose_log(&config, "Program finished");
}

fn new_interpreter(config: &AppConfig) -> Interpreter {
    verbose_log(
        config,
        &format!(
            "File store rooted at {} (while limit {}, call depth {})",
            config.files_root.display(),
            config.options.max_while_iterations,
            config.options.max_call_depth
        ),
    );
    Interpreter::new(Host::console(&config.files_root), config.options.clone())
}

fn run_program(interpreter: &mut Interpreter, source: &str, config: &AppConfig) -> Result<Value, Error> {
    verbose_log(config, "Parsing program");
    let program = interpreter::parse(source)?;
    verbose_log(config, &format!("Running {} top-level statements", program.body.len()));
    interpreter.run(&program)
}

fn dump_ast(source: &str, name: &str, config: &AppConfig) -> Result<(), Error> {
    verbose_log(config, &format!("Dumping syntax tree of {}", name));
    let program = interpreter::parse(source)?;
    match serde_json::to_string_pretty(&program_to_json(&program)) {
        Ok(document) => println!("{}", document),
        Err(e) => error_message(config, &format!("Failed to serialize syntax tree: {}", e)),
    }
    Ok(())
}

/// Reads programs line by line. A block left open at the end of a line keeps
/// the session reading until it is closed or an empty line is entered.
fn run_interactive_mode(config: &AppConfig) {
    if !config.verbose {
        println!("pseudo {}", env!("CARGO_PKG_VERSION"));
        println!("Enter statements to run them. Exit with Ctrl+D (Ctrl+Z on Windows) or type 'exit'.");
        println!();
    } else {
        verbose_log(config, "Entering interactive mode");
    }

    let mut interpreter = new_interpreter(config);
    let mut buffer = String::new();

    loop {
        print!("{}", if buffer.is_empty() { "pseudo> " } else { "...> " });
        if let Err(e) = io::stdout().flush() {
            error_message(config, &format!("Error writing prompt: {}", e));
            break;
        }

        let mut line = String::new();
        match io::stdin().read_line(&mut line) {
            Ok(0) => break,
            Ok(_) => {
                let trimmed = line.trim();
                if buffer.is_empty() && (trimmed == "exit" || trimmed == "quit") {
                    break;
                }
                if buffer.is_empty() && trimmed.is_empty() {
                    continue;
                }
                let submit = trimmed.is_empty();
                buffer.push_str(&line);

                if !submit && is_incomplete(&buffer) {
                    continue;
                }

                let source = std::mem::take(&mut buffer);
                match run_program(&mut interpreter, &source, config) {
                    Ok(Value::Null) => {}
                    Ok(value) => println!("{}", raw_value(&value)),
                    Err(e) => report(config, &source, "<repl>", &e),
                }
            }
            Err(e) => {
                error_message(config, &format!("Error reading input: {}", e));
                break;
            }
        }
    }
}

/// True when the only problem with `source` is that it ends too early.
fn is_incomplete(source: &str) -> bool {
    match interpreter::parse(source) {
        Err(e) => e.span.start >= source.trim_end().len(),
        Ok(_) => false,
    }
}

fn report(config: &AppConfig, source: &str, name: &str, error: &Error) {
    verbose_log(config, &format!("{} at bytes {:?}", error, error.span()));
    let rendered = render_diagnostics(source, name, &[error.to_diagnostic()], config.color_enabled);
    eprint!("{}", rendered);
    error_message(config, &error.to_string());
}

fn read_file(path: &Path) -> Result<String, String> {
    std::fs::read_to_string(path).map_err(|e| format!("Failed to read {}: {}", path.display(), e))
}

fn verbose_log(config: &AppConfig, message: &str) {
    if config.verbose {
        eprintln!("[pseudo:debug] {}", message);
    }
}

fn error_message(config: &AppConfig, message: &str) {
    if config.color_enabled {
        eprintln!("{}", message.red().bold());
    } else {
        eprintln!("{}", message);
    }
}
