use std::path::PathBuf;

use crate::cli::{Args, ColorChoice};
use crate::interpreter::InterpreterOptions;

pub struct AppConfig {
    pub color_enabled: bool,
    pub verbose: bool,
    pub dump_ast: bool,
    pub files_root: PathBuf,
    pub options: InterpreterOptions,
}

impl AppConfig {
    pub fn from_args(args: &Args) -> Self {
        let color_enabled = match args.color {
            ColorChoice::Always => true,
            ColorChoice::Never => false,
            ColorChoice::Auto => atty::is(atty::Stream::Stderr) && atty::is(atty::Stream::Stdout),
        };

        let defaults = InterpreterOptions::default();
        let options = InterpreterOptions {
            max_while_iterations: args.loop_limit.unwrap_or(defaults.max_while_iterations),
            max_call_depth: args.max_call_depth.unwrap_or(defaults.max_call_depth),
            seed: args.seed,
        };

        AppConfig {
            color_enabled,
            verbose: args.verbose,
            dump_ast: args.dump_ast,
            files_root: args.files.clone().unwrap_or_else(|| PathBuf::from(".")),
            options,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(["pseudo", "--color", "never"]).unwrap();
        let config = AppConfig::from_args(&args);
        assert!(!config.color_enabled);
        assert_eq!(config.options, InterpreterOptions::default());
        assert_eq!(config.files_root, PathBuf::from("."));
    }

    #[test]
    fn test_overrides_reach_interpreter_options() {
        let args = Args::try_parse_from(["pseudo", "--loop-limit", "5", "--seed", "3", "--files", "data"]).unwrap();
        let config = AppConfig::from_args(&args);
        assert_eq!(config.options.max_while_iterations, 5);
        assert_eq!(config.options.seed, Some(3));
        assert_eq!(config.files_root, PathBuf::from("data"));
    }
}
