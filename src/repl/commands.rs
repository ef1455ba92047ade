//! Built-in REPL commands
//!
//! Anything that is not a slash command (or a bare `exit`/`quit`) is a question,
//! kept exactly as typed.

use colored::*;

/// REPL input classification
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    Exit,
    /// Toggle printing of the prompt sent to the model
    Prompt { enable: bool },
    /// Toggle printing of retrieved passages
    Sources { enable: bool },
    Unknown { input: String },
    Question(String),
}

/// Parse a line of REPL input
pub fn parse(input: &str) -> Command {
    let trimmed = input.trim();

    if matches!(trimmed, "exit" | "quit") {
        return Command::Exit;
    }

    let Some(rest) = trimmed.strip_prefix('/') else {
        return Command::Question(input.to_string());
    };

    let parts: Vec<&str> = rest.split_whitespace().collect();
    let toggle = |arg: Option<&&str>| !matches!(arg.copied(), Some("off") | Some("false"));

    match parts.first().map(|p| p.to_lowercase()).as_deref() {
        Some("help") | Some("h") => Command::Help,
        Some("exit") | Some("quit") | Some("q") => Command::Exit,
        Some("prompt") => Command::Prompt {
            enable: toggle(parts.get(1)),
        },
        Some("sources") => Command::Sources {
            enable: toggle(parts.get(1)),
        },
        _ => Command::Unknown {
            input: trimmed.to_string(),
        },
    }
}

/// Print the command reference
pub fn print_help() {
    println!("\n{}", "Commands".bold());
    println!("  {}              Show this help", "/help".cyan());
    println!("  {}   Show the prompt sent to the model", "/prompt [on|off]".cyan());
    println!("  {}  Show retrieved passages", "/sources [on|off]".cyan());
    println!("  {}              Leave (also: exit, quit, Ctrl-D)", "/exit".cyan());
    println!("\nAnything else is asked as a question.\n");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_question() {
        assert_eq!(
            parse("  When was she born? "),
            Command::Question("  When was she born? ".to_string())
        );
    }

    #[test]
    fn test_parse_exit_words() {
        assert_eq!(parse("exit"), Command::Exit);
        assert_eq!(parse("quit"), Command::Exit);
        assert_eq!(parse("/q"), Command::Exit);
    }

    #[test]
    fn test_parse_toggles() {
        assert_eq!(parse("/prompt"), Command::Prompt { enable: true });
        assert_eq!(parse("/prompt off"), Command::Prompt { enable: false });
        assert_eq!(parse("/SOURCES on"), Command::Sources { enable: true });
    }

    #[test]
    fn test_parse_unknown() {
        assert_eq!(
            parse("/bogus"),
            Command::Unknown {
                input: "/bogus".to_string()
            }
        );
        assert!(matches!(parse("/"), Command::Unknown { .. }));
    }
}
