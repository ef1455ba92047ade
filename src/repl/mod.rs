//! Interactive question loop
//!
//! Reads questions with rustyline, answers each one through the shared
//! [`AnswerPipeline`] and keeps history in `~/.biobuddy/history`. Questions
//! reach the pipeline as typed; blank lines are skipped. Pipeline failures are
//! printed and the loop continues.

pub mod commands;
pub mod input;

use anyhow::Result;
use colored::*;
use std::path::PathBuf;
use std::sync::Arc;

use crate::cli::spinner;
use crate::rag::{AnswerPipeline, AnswerTrace};
use crate::repl::commands::Command;
use crate::repl::input::InputHandler;

/// REPL session coordinator
pub struct ReplSession {
    input_handler: InputHandler,
    pipeline: Arc<AnswerPipeline>,
    show_prompt: bool,
    show_sources: bool,
    show_progress: bool,
    asked: usize,
}

impl ReplSession {
    /// Create a REPL session without persistent history
    pub fn new(pipeline: Arc<AnswerPipeline>) -> Result<Self> {
        Ok(Self::from_parts(InputHandler::new()?, pipeline))
    }

    /// Create a REPL session with persistent history
    pub fn with_history(pipeline: Arc<AnswerPipeline>, history_path: PathBuf) -> Result<Self> {
        Ok(Self::from_parts(InputHandler::with_history(history_path)?, pipeline))
    }

    fn from_parts(input_handler: InputHandler, pipeline: Arc<AnswerPipeline>) -> Self {
        Self {
            input_handler,
            pipeline,
            show_prompt: false,
            show_sources: false,
            show_progress: true,
            asked: 0,
        }
    }

    /// Enable or disable the thinking spinner
    pub fn set_show_progress(&mut self, enable: bool) {
        self.show_progress = enable;
    }

    /// Show welcome banner
    pub fn show_welcome(&self, version: &str) {
        println!("{} {}", "BioBuddy".bold().cyan(), version.dimmed());
        println!(
            "Asking about {} with {}. Type /help for commands.\n",
            self.pipeline.prompt_builder().subject().bold(),
            self.pipeline.model_name()
        );
    }

    /// Run until the user exits, then save history
    pub async fn run(&mut self) -> Result<()> {
        while let Some(line) = self.input_handler.read_line()? {
            if !self.handle_input(&line).await? {
                break;
            }
        }

        self.input_handler.save_history()
    }

    /// Handle one line of input
    ///
    /// Returns true if the session should continue, false to exit
    pub async fn handle_input(&mut self, input: &str) -> Result<bool> {
        if input.trim().is_empty() {
            return Ok(true);
        }

        match commands::parse(input) {
            Command::Help => commands::print_help(),
            Command::Exit => return Ok(false),
            Command::Prompt { enable } => {
                self.show_prompt = enable;
                println!("prompt display {}", if enable { "on" } else { "off" });
            }
            Command::Sources { enable } => {
                self.show_sources = enable;
                println!("source display {}", if enable { "on" } else { "off" });
            }
            Command::Unknown { input } => {
                println!("{} {} (try /help)", "Unknown command:".yellow(), input);
            }
            Command::Question(question) => self.ask(&question).await,
        }

        Ok(true)
    }

    async fn ask(&mut self, question: &str) {
        self.asked += 1;

        let pb = spinner("Thinking...", self.show_progress);
        let result = self.pipeline.run(question).await;
        pb.finish_and_clear();

        match result {
            Ok(trace) => self.print_trace(&trace),
            Err(e) => println!("{} {}\n", "Error:".red().bold(), e),
        }
    }

    fn print_trace(&self, trace: &AnswerTrace) {
        if self.show_sources {
            println!("{}", format!("{} passage(s) retrieved", trace.passages.len()).dimmed());
            for (i, passage) in trace.passages.iter().enumerate() {
                println!("{}", format!("  [{}] {}", i + 1, passage.content).dimmed());
            }
        }
        if self.show_prompt {
            println!("{}\n{}\n", "Prompt:".dimmed(), trace.prompt.dimmed());
        }
        println!("{}\n", trace.answer);
    }

    /// Number of questions asked this session
    pub fn asked(&self) -> usize {
        self.asked
    }

    /// Whether the prompt is printed with each answer
    pub fn shows_prompt(&self) -> bool {
        self.show_prompt
    }
}
