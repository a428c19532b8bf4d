use serde::{Deserialize, Serialize};

/// A prefilled message asking a human expert to follow up on the last answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EscalationMessage {
    pub recipient: String,
    pub subject: String,
    pub body: String,
}

impl EscalationMessage {
    /// Composes the message from the last query and answer.
    ///
    /// An empty query is shown as an image-only question.
    pub fn compose(
        recipient: impl Into<String>,
        subject: impl Into<String>,
        last_query: &str,
        last_answer: &str,
    ) -> Self {
        let query = if last_query.trim().is_empty() {
            "(image only)"
        } else {
            last_query
        };

        let body = format!(
            "Hello,\n\nI asked the assistant:\n{query}\n\nIt answered:\n{last_answer}\n\n\
             Could an expert please review this and get back to me?\n"
        );

        Self {
            recipient: recipient.into(),
            subject: subject.into(),
            body,
        }
    }
}
