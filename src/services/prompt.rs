// src/services/prompt.rs
use crate::error::{RelayError, TemplateError};

pub const CONTEXT_SLOT: &str = "{background_context}";
pub const MESSAGE_SLOT: &str = "{user_message}";

pub const DEFAULT_TEMPLATE: &str =
    "You are a helpful AI assistant. {background_context}\n\nUser inquiry: {user_message}";

/// A template split once at its two slots: `head {ctx} separator {msg} tail`.
///
/// Rendering concatenates the literal segments with the inputs, so text that
/// happens to contain `{user_message}` is passed through untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    head: String,
    separator: String,
    tail: String,
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self {
            head: "You are a helpful AI assistant. ".to_string(),
            separator: "\n\nUser inquiry: ".to_string(),
            tail: String::new(),
        }
    }
}

impl PromptTemplate {
    pub fn parse(text: &str) -> Result<Self, TemplateError> {
        let ctx_at = find_once(text, CONTEXT_SLOT)?;
        let msg_at = find_once(text, MESSAGE_SLOT)?;
        if ctx_at > msg_at {
            return Err(TemplateError::SlotOrder);
        }

        Ok(Self {
            head: text[..ctx_at].to_string(),
            separator: text[ctx_at + CONTEXT_SLOT.len()..msg_at].to_string(),
            tail: text[msg_at + MESSAGE_SLOT.len()..].to_string(),
        })
    }

    /// Builds the prompt sent to the backend. Empty context leaves its slot empty.
    pub fn compose(&self, message: &str, background_context: &str) -> Result<String, RelayError> {
        if message.trim().is_empty() {
            return Err(RelayError::InvalidInput("Message cannot be empty".to_string()));
        }

        let context = if background_context.is_empty() {
            String::new()
        } else {
            format!("Context: {background_context}")
        };

        let mut prompt = String::with_capacity(
            self.head.len() + context.len() + self.separator.len() + message.len() + self.tail.len(),
        );
        prompt.push_str(&self.head);
        prompt.push_str(&context);
        prompt.push_str(&self.separator);
        prompt.push_str(message);
        prompt.push_str(&self.tail);
        Ok(prompt)
    }
}

fn find_once(text: &str, slot: &'static str) -> Result<usize, TemplateError> {
    let first = text.find(slot).ok_or(TemplateError::MissingSlot(slot))?;
    if text[first + slot.len()..].contains(slot) {
        return Err(TemplateError::DuplicateSlot(slot));
    }
    Ok(first)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matches_parsed_default_text() {
        assert_eq!(PromptTemplate::parse(DEFAULT_TEMPLATE).unwrap(), PromptTemplate::default());
    }

    #[test]
    fn compose_without_context() {
        let prompt = PromptTemplate::default().compose("What is AI?", "").unwrap();
        assert_eq!(
            prompt,
            "You are a helpful AI assistant. \n\nUser inquiry: What is AI?"
        );
    }

    #[test]
    fn compose_puts_context_before_message() {
        let prompt = PromptTemplate::default()
            .compose("And the capital?", "We are talking about France")
            .unwrap();
        assert_eq!(
            prompt,
            "You are a helpful AI assistant. Context: We are talking about France\n\nUser inquiry: And the capital?"
        );
    }

    #[test]
    fn compose_is_deterministic_and_contains_message() {
        let template = PromptTemplate::default();
        for message in ["hello", "  padded  ", "multi\nline", "ünïcødé 🚀"] {
            let a = template.compose(message, "").unwrap();
            let b = template.compose(message, "").unwrap();
            assert_eq!(a, b);
            assert!(a.contains(message));
        }
    }

    #[test]
    fn compose_rejects_blank_message() {
        let template = PromptTemplate::default();
        for message in ["", "   ", "\n\t"] {
            let err = template.compose(message, "ctx").unwrap_err();
            assert_eq!(err.kind(), "InvalidInput");
        }
    }

    #[test]
    fn slot_text_inside_input_is_not_substituted() {
        let prompt = PromptTemplate::default()
            .compose("say {user_message}", "{background_context}")
            .unwrap();
        assert!(prompt.contains("Context: {background_context}"));
        assert!(prompt.ends_with("say {user_message}"));
    }

    #[test]
    fn custom_template_keeps_tail() {
        let template = PromptTemplate::parse("[{background_context}] Q: {user_message} A:").unwrap();
        assert_eq!(template.compose("2+2?", "").unwrap(), "[] Q: 2+2? A:");
    }

    #[test]
    fn parse_rejects_malformed_templates() {
        assert_eq!(
            PromptTemplate::parse("no slots").unwrap_err(),
            TemplateError::MissingSlot(CONTEXT_SLOT)
        );
        assert_eq!(
            PromptTemplate::parse("{background_context} only").unwrap_err(),
            TemplateError::MissingSlot(MESSAGE_SLOT)
        );
        assert_eq!(
            PromptTemplate::parse("{user_message} {background_context}").unwrap_err(),
            TemplateError::SlotOrder
        );
        assert_eq!(
            PromptTemplate::parse("{background_context}{user_message}{user_message}").unwrap_err(),
            TemplateError::DuplicateSlot(MESSAGE_SLOT)
        );
    }
}
