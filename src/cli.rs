use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{Shell, generate};
use std::io;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "pseudo")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Interpreter for an exam-style pseudocode language", long_about = None)]
pub struct Args {
    /// Program to run. Without a file or --eval an interactive session starts.
    #[arg(value_name = "FILE")]
    pub file: Option<PathBuf>,

    #[arg(short, long, value_name = "CODE", conflicts_with = "file")]
    pub eval: Option<String>,

    /// Directory that openRead/openWrite/newFile paths are relative to.
    #[arg(long = "files", value_name = "DIR")]
    pub files: Option<PathBuf>,

    #[arg(long = "color", value_name = "WHEN", default_value = "auto")]
    pub color: ColorChoice,

    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,

    /// Iterations a while loop may run before it is stopped.
    #[arg(long = "loop-limit", value_name = "N")]
    pub loop_limit: Option<usize>,

    #[arg(long = "max-call-depth", value_name = "N")]
    pub max_call_depth: Option<usize>,

    /// Seed for `random`, for reproducible runs.
    #[arg(long = "seed", value_name = "N")]
    pub seed: Option<u64>,

    /// Print the parsed program as JSON instead of running it.
    #[arg(long = "dump-ast")]
    pub dump_ast: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print shell completions.
    Complete {
        #[arg(value_name = "SHELL")]
        shell: Shell,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorChoice {
    Auto,
    Always,
    Never,
}

impl std::str::FromStr for ColorChoice {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "auto" => Ok(ColorChoice::Auto),
            "always" => Ok(ColorChoice::Always),
            "never" => Ok(ColorChoice::Never),
            _ => Err(format!(
                "Invalid color choice: {}. Must be 'auto', 'always', or 'never'",
                s
            )),
        }
    }
}

pub fn generate_completions(shell: Shell) {
    let mut cmd = Args::command();
    let bin_name = cmd.get_name().to_string();
    generate(shell, &mut cmd, &bin_name, &mut io::stdout());
}
