//! Command-line argument parsing for BioBuddy
//!
//! Provides clap-based CLI with subcommands and verbosity control.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// BioBuddy - Ask grounded questions about one person's biography
#[derive(Parser, Debug)]
#[command(name = "biobuddy")]
#[command(author = "Jerome (Kubashen) Naidoo")]
#[command(version)]
#[command(about = "Answer questions about a biography from retrieved passages and a local Ollama model", long_about = None)]
pub struct Args {
    /// Configuration file path (~/.biobuddy/config.toml by default)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbosity level: -q (quiet), default (normal), -v (verbose), -vv (very verbose)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (only errors are logged)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Subcommand
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Answer a single question and exit
    Ask {
        /// The question to answer
        #[arg(value_name = "QUESTION")]
        question: String,

        /// Also print the prompt sent to the model
        #[arg(long)]
        show_prompt: bool,
    },

    /// Serve the HTTP question-answering API
    Serve {
        /// Bind address (overrides server.host)
        #[arg(long)]
        host: Option<String>,

        /// Bind port (overrides server.port)
        #[arg(long)]
        port: Option<u16>,
    },

    /// Start interactive question mode
    Repl,

    /// Run system diagnostics and health checks
    Doctor,

    /// Display current configuration
    Config,
}

/// Verbosity level enum
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    Quiet,
    Normal,
    Verbose,
    VeryVerbose,
}

impl Args {
    /// Get verbosity level based on flags
    pub fn verbosity(&self) -> Verbosity {
        if self.quiet {
            Verbosity::Quiet
        } else {
            match self.verbose {
                0 => Verbosity::Normal,
                1 => Verbosity::Verbose,
                _ => Verbosity::VeryVerbose,
            }
        }
    }
}

impl Verbosity {
    /// Convert to string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Verbosity::Quiet => "quiet",
            Verbosity::Normal => "normal",
            Verbosity::Verbose => "verbose",
            Verbosity::VeryVerbose => "very_verbose",
        }
    }

    /// Default log directive when RUST_LOG is unset
    pub fn log_directive(&self) -> &'static str {
        match self {
            Verbosity::Quiet => "error",
            Verbosity::Normal => "warn,biobuddy=info",
            Verbosity::Verbose => "info,biobuddy=debug",
            Verbosity::VeryVerbose => "debug,biobuddy=trace",
        }
    }

    /// Check if should show progress spinners
    pub fn show_progress(&self) -> bool {
        !matches!(self, Verbosity::Quiet)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(argv: &[&str]) -> Args {
        Args::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_verbosity_quiet() {
        let args = parse(&["biobuddy", "-q", "doctor"]);
        assert_eq!(args.verbosity(), Verbosity::Quiet);
        assert!(!args.verbosity().show_progress());
    }

    #[test]
    fn test_verbosity_normal() {
        let args = parse(&["biobuddy", "doctor"]);
        assert_eq!(args.verbosity(), Verbosity::Normal);
    }

    #[test]
    fn test_verbosity_verbose() {
        let args = parse(&["biobuddy", "-v", "repl"]);
        assert_eq!(args.verbosity(), Verbosity::Verbose);
    }

    #[test]
    fn test_verbosity_very_verbose() {
        let args = parse(&["biobuddy", "repl", "-vv"]);
        assert_eq!(args.verbosity(), Verbosity::VeryVerbose);
        assert_eq!(args.verbosity().as_str(), "very_verbose");
    }

    #[test]
    fn test_ask_command() {
        let args = parse(&["biobuddy", "ask", "When was she born?", "--show-prompt"]);
        assert_eq!(
            args.command,
            Commands::Ask {
                question: "When was she born?".to_string(),
                show_prompt: true,
            }
        );
    }

    #[test]
    fn test_ask_accepts_empty_question() {
        let args = parse(&["biobuddy", "ask", ""]);
        assert!(matches!(args.command, Commands::Ask { ref question, .. } if question.is_empty()));
    }

    #[test]
    fn test_serve_overrides() {
        let args = parse(&["biobuddy", "--config", "/tmp/bio.toml", "serve", "--port", "8080"]);
        assert_eq!(args.config, Some(PathBuf::from("/tmp/bio.toml")));
        assert_eq!(
            args.command,
            Commands::Serve {
                host: None,
                port: Some(8080),
            }
        );
    }

    #[test]
    fn test_subcommand_required() {
        assert!(Args::try_parse_from(["biobuddy"]).is_err());
    }
}
