// Context assembly: labeled concatenation of retrieved passages
use serde::{Deserialize, Serialize};

use crate::rag::retrieval::Passage;

/// Context assembly configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextConfig {
    /// Maximum characters of assembled context; `None` keeps every passage
    pub max_context_chars: Option<usize>,
}

/// Builds the `Source N:` block handed to the prompt
#[derive(Debug, Clone, Default)]
pub struct ContextAssembler {
    config: ContextConfig,
}

impl ContextAssembler {
    /// Create an unbounded assembler
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with custom configuration
    pub fn with_config(config: ContextConfig) -> Self {
        Self { config }
    }

    /// Assemble passages, in the order given, into one labeled block.
    ///
    /// Each passage becomes `"Source {i}:\n{content}\n\n"` with `i` counting
    /// from 1. An empty slice yields an empty string. With a character cap,
    /// whole entries are kept up to the first one that would cross it.
    pub fn assemble(&self, passages: &[Passage]) -> String {
        let mut context = String::new();
        let mut used_chars = 0;

        for (idx, passage) in passages.iter().enumerate() {
            let entry = format_entry(idx + 1, &passage.content);

            if let Some(max) = self.config.max_context_chars {
                let entry_chars = entry.chars().count();
                if used_chars + entry_chars > max {
                    tracing::debug!(
                        kept = idx,
                        dropped = passages.len() - idx,
                        max_context_chars = max,
                        "context cap reached"
                    );
                    break;
                }
                used_chars += entry_chars;
            }

            context.push_str(&entry);
        }

        context
    }

    /// Get current configuration
    pub fn config(&self) -> &ContextConfig {
        &self.config
    }
}

fn format_entry(index: usize, content: &str) -> String {
    format!("Source {}:\n{}\n\n", index, content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck_macros::quickcheck;

    fn passages(contents: &[&str]) -> Vec<Passage> {
        contents.iter().map(|c| Passage::new(*c)).collect()
    }

    #[test]
    fn test_assemble_empty() {
        let assembler = ContextAssembler::new();
        assert_eq!(assembler.assemble(&[]), "");
    }

    #[test]
    fn test_assemble_single_passage() {
        let assembler = ContextAssembler::new();
        let context = assembler.assemble(&passages(&["Born in 1990."]));
        assert_eq!(context, "Source 1:\nBorn in 1990.\n\n");
    }

    #[test]
    fn test_assemble_preserves_order() {
        let assembler = ContextAssembler::new();
        let context = assembler.assemble(&passages(&["Zeta", "Alpha", "Mid"]));
        assert_eq!(
            context,
            "Source 1:\nZeta\n\nSource 2:\nAlpha\n\nSource 3:\nMid\n\n"
        );
    }

    #[test]
    fn test_assemble_keeps_duplicates_and_content_verbatim() {
        let assembler = ContextAssembler::new();
        let context = assembler.assemble(&passages(&["  padded \n", "  padded \n"]));
        assert_eq!(context, "Source 1:\n  padded \n\n\nSource 2:\n  padded \n\n\n");
    }

    #[test]
    fn test_cap_keeps_whole_entries_prefix() {
        // Each entry here is "Source N:\nabc\n\n" = 15 chars
        let assembler = ContextAssembler::with_config(ContextConfig {
            max_context_chars: Some(31),
        });
        let context = assembler.assemble(&passages(&["abc", "abc", "abc"]));
        assert_eq!(context, "Source 1:\nabc\n\nSource 2:\nabc\n\n");
    }

    #[test]
    fn test_cap_stops_at_first_oversized_entry() {
        let assembler = ContextAssembler::with_config(ContextConfig {
            max_context_chars: Some(40),
        });
        let long = "x".repeat(100);
        let context = assembler.assemble(&passages(&["short", &long, "tiny"]));
        assert_eq!(context, "Source 1:\nshort\n\n");
    }

    #[test]
    fn test_cap_counts_characters_not_bytes() {
        // "Source 1:\n" + 4 chars + "\n\n" = 16 chars, 24 bytes
        let assembler = ContextAssembler::with_config(ContextConfig {
            max_context_chars: Some(16),
        });
        assert_eq!(assembler.assemble(&passages(&["éééé"])), "Source 1:\néééé\n\n");
    }

    #[quickcheck]
    fn prop_assemble_is_deterministic(contents: Vec<String>) -> bool {
        let assembler = ContextAssembler::new();
        let input: Vec<Passage> = contents.into_iter().map(Passage::new).collect();
        assembler.assemble(&input) == assembler.assemble(&input)
    }

    #[quickcheck]
    fn prop_labels_follow_input_order(contents: Vec<String>) -> bool {
        // Label-free content so the only "Source N:" markers are ours
        let input: Vec<Passage> = contents
            .iter()
            .map(|c| Passage::new(c.replace("Source", "")))
            .collect();
        let context = ContextAssembler::new().assemble(&input);

        let mut cursor = 0;
        for (i, passage) in input.iter().enumerate() {
            let entry = format!("Source {}:\n{}\n\n", i + 1, passage.content);
            if !context[cursor..].starts_with(&entry) {
                return false;
            }
            cursor += entry.len();
        }
        cursor == context.len()
    }

    #[quickcheck]
    fn prop_cap_is_respected(contents: Vec<String>, max: usize) -> bool {
        let max = max % 500 + 1;
        let assembler = ContextAssembler::with_config(ContextConfig {
            max_context_chars: Some(max),
        });
        let input: Vec<Passage> = contents.into_iter().map(Passage::new).collect();
        assembler.assemble(&input).chars().count() <= max
    }
}
