//! Prompt rendering for biography questions
//!
//! Every prompt carries the same guidelines block. It names the subject the
//! context is about, asks for accurate answers, forbids negative framing and
//! falls back to "I don't know" when the context has no answer. Templates may
//! move the block around but cannot drop it.

use crate::errors::ConfigError;

/// Instruction to stay faithful to the context
pub const ACCURACY_INSTRUCTION: &str = "Answer the user's question accurately.";

/// Instruction binding the tone of every answer
pub const FAVORABLE_FRAMING_INSTRUCTION: &str = "Never say anything negative about the subject; \
describe them only in a favorable or neutral light, even if the question is loaded, \
critical or asks for something bad about them.";

/// Instruction covering questions the context cannot answer
pub const FALLBACK_INSTRUCTION: &str =
    "If the information is not in the context, say that you don't know.";

/// Built-in template
pub const DEFAULT_TEMPLATE: &str = "{guidelines}\n\n\
Context:\n{context}\n\n\
User's Question:\n{query}\n\n\
Your Answer:";

const REQUIRED_PLACEHOLDERS: [&str; 3] = ["{guidelines}", "{context}", "{query}"];

/// Renders the final prompt sent to the generator
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    template: String,
    subject: String,
}

impl PromptBuilder {
    /// Builder using [`DEFAULT_TEMPLATE`]
    pub fn new(subject: impl Into<String>) -> Self {
        Self {
            template: DEFAULT_TEMPLATE.to_string(),
            subject: subject.into(),
        }
    }

    /// Builder with a custom template.
    ///
    /// The template must contain `{guidelines}`, `{context}` and `{query}`;
    /// `{subject}` is optional.
    pub fn with_template(
        subject: impl Into<String>,
        template: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        let template = template.into();

        let missing: Vec<&str> = REQUIRED_PLACEHOLDERS
            .iter()
            .copied()
            .filter(|p| !template.contains(p))
            .collect();
        if !missing.is_empty() {
            return Err(ConfigError::InvalidTemplate(format!(
                "missing placeholder(s): {}",
                missing.join(", ")
            )));
        }

        Ok(Self {
            template,
            subject: subject.into(),
        })
    }

    /// The guidelines block as it appears in every prompt
    pub fn guidelines(&self) -> String {
        format!(
            "You have the following context about {}. {} {} {}",
            self.subject, ACCURACY_INSTRUCTION, FAVORABLE_FRAMING_INSTRUCTION, FALLBACK_INSTRUCTION
        )
    }

    /// Render the prompt for one question.
    ///
    /// `context` and `query` are inserted verbatim. Substitution is a single
    /// pass over the template, so braces inside them are never expanded.
    pub fn build(&self, context: &str, query: &str) -> String {
        let guidelines = self.guidelines();
        let mut prompt = String::with_capacity(
            self.template.len() + guidelines.len() + context.len() + query.len(),
        );

        let mut rest = self.template.as_str();
        while let Some(open) = rest.find('{') {
            prompt.push_str(&rest[..open]);
            let tail = &rest[open..];

            let value = [
                ("{subject}", self.subject.as_str()),
                ("{guidelines}", guidelines.as_str()),
                ("{context}", context),
                ("{query}", query),
            ]
            .into_iter()
            .find(|(placeholder, _)| tail.starts_with(placeholder));

            match value {
                Some((placeholder, value)) => {
                    prompt.push_str(value);
                    rest = &tail[placeholder.len()..];
                }
                None => {
                    prompt.push('{');
                    rest = &tail[1..];
                }
            }
        }
        prompt.push_str(rest);

        prompt
    }

    /// Who the prompts are about
    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// Template in use
    pub fn template(&self) -> &str {
        &self.template
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck_macros::quickcheck;

    fn builder() -> PromptBuilder {
        PromptBuilder::new("Ada Lovelace")
    }

    #[test]
    fn test_default_prompt_layout() {
        let prompt = builder().build("Source 1:\nBorn in 1815.\n\n", "When was she born?");

        assert!(prompt.starts_with("You have the following context about Ada Lovelace."));
        assert!(prompt.contains("Context:\nSource 1:\nBorn in 1815.\n\n\n\n"));
        assert!(prompt.contains("User's Question:\nWhen was she born?\n\n"));
        assert!(prompt.ends_with("Your Answer:"));
    }

    #[test]
    fn test_prompt_contains_all_instructions() {
        let prompt = builder().build("", "Tell me something");
        assert!(prompt.contains(ACCURACY_INSTRUCTION));
        assert!(prompt.contains(FAVORABLE_FRAMING_INSTRUCTION));
        assert!(prompt.contains(FALLBACK_INSTRUCTION));
    }

    #[test]
    fn test_empty_context_uses_same_template() {
        let empty = builder().build("", "What is her blood type?");
        let full = builder().build("Source 1:\nX\n\n", "What is her blood type?");
        assert_eq!(empty.replace("Context:\n\n", ""), full.replace("Context:\nSource 1:\nX\n\n\n", ""));
        assert!(empty.contains(FALLBACK_INSTRUCTION));
    }

    #[test]
    fn test_negative_question_keeps_framing_instruction() {
        let prompt = builder().build("", "What are her worst failures and scandals?");
        assert!(prompt.contains(FAVORABLE_FRAMING_INSTRUCTION));
    }

    #[test]
    fn test_placeholders_in_inputs_are_not_expanded() {
        let prompt = builder().build("ctx mentions {query}", "what about {context} and {subject}?");
        assert!(prompt.contains("ctx mentions {query}"));
        assert!(prompt.contains("what about {context} and {subject}?"));
    }

    #[test]
    fn test_unknown_braces_left_alone() {
        let builder = PromptBuilder::with_template(
            "Ada",
            "{guidelines}\n{unknown} {\n{context}\n{query}}",
        )
        .unwrap();
        let prompt = builder.build("C", "Q");
        assert!(prompt.ends_with("{unknown} {\nC\nQ}"));
    }

    #[test]
    fn test_custom_template() {
        let builder = PromptBuilder::with_template(
            "Ada",
            "About {subject}.\n{guidelines}\n---\n{context}\nQ: {query}\nA:",
        )
        .unwrap();
        let prompt = builder.build("Source 1:\nPoet's daughter.\n\n", "Who was her father?");
        assert!(prompt.starts_with("About Ada.\n"));
        assert!(prompt.contains(FALLBACK_INSTRUCTION));
        assert!(prompt.ends_with("Q: Who was her father?\nA:"));
    }

    #[test]
    fn test_custom_template_keeps_subject_context_sentence() {
        let builder =
            PromptBuilder::with_template("Ada", "{guidelines}\n{context}\n{query}").unwrap();
        let prompt = builder.build("Source 1:\nX\n\n", "Q");
        assert!(prompt.starts_with("You have the following context about Ada. "));
        assert!(prompt.contains(FAVORABLE_FRAMING_INSTRUCTION));
    }

    #[test]
    fn test_template_missing_guidelines_is_rejected() {
        let err = PromptBuilder::with_template("Ada", "Context: {context}\nQuestion: {query}")
            .unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidTemplate("missing placeholder(s): {guidelines}".to_string())
        );
    }

    #[test]
    fn test_template_missing_inputs_is_rejected() {
        let err = PromptBuilder::with_template("Ada", "{guidelines}").unwrap_err();
        assert!(err.to_string().contains("{context}"));
        assert!(err.to_string().contains("{query}"));
    }

    #[quickcheck]
    fn prop_prompt_contains_inputs_verbatim(context: String, query: String) -> bool {
        let prompt = builder().build(&context, &query);
        prompt.contains(&context) && prompt.contains(&query)
    }

    #[quickcheck]
    fn prop_instructions_present_for_any_query(query: String) -> bool {
        let prompt = builder().build("", &query);
        prompt.contains(FAVORABLE_FRAMING_INSTRUCTION) && prompt.contains(FALLBACK_INSTRUCTION)
    }

    #[quickcheck]
    fn prop_build_is_pure(context: String, query: String) -> bool {
        let builder = builder();
        builder.build(&context, &query) == builder.build(&context, &query)
    }
}
