//! CLI module for BioBuddy
//!
//! Handles command-line argument parsing and terminal progress output.

pub mod args;
pub mod progress;

pub use args::{Args, Commands, Verbosity};
pub use progress::spinner;
