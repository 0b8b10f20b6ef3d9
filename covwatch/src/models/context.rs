use std::fmt;

use serde::{Deserialize, Serialize};

use super::analysis::VerificationResult;

/// One item of accumulated conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ContextEntry {
    /// Free-form guidance or background.
    Note { text: String },
    /// A question and the answer it received.
    Exchange { question: String, answer: String },
    /// A clarifying question, its answer and the verdict on that answer.
    Verification {
        question: String,
        answer: String,
        result: VerificationResult,
    },
}

impl fmt::Display for ContextEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Note { text } => write!(f, "{text}"),
            Self::Exchange { question, answer } => write!(f, "Q: {question}\nA: {answer}"),
            Self::Verification {
                question,
                answer,
                result,
            } => write!(f, "Q: {question}\nA: {answer}\nV: {result}"),
        }
    }
}

/// Everything learned so far while analysing one post.
///
/// Append-only. There is no shared or default instance: each
/// analysis builds its own and hands it to the verification chain by `&mut`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConversationContext {
    entries: Vec<ContextEntry>,
}

impl ConversationContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// A context seeded with guidance notes.
    pub fn with_notes<I, S>(notes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut context = Self::new();
        for note in notes {
            context.push_note(note);
        }
        context
    }

    pub fn push_note(&mut self, text: impl Into<String>) {
        self.entries.push(ContextEntry::Note { text: text.into() });
    }

    pub fn push_exchange(&mut self, question: impl Into<String>, answer: impl Into<String>) {
        self.entries.push(ContextEntry::Exchange {
            question: question.into(),
            answer: answer.into(),
        });
    }

    pub fn push_verification(
        &mut self,
        question: impl Into<String>,
        answer: impl Into<String>,
        result: VerificationResult,
    ) {
        self.entries.push(ContextEntry::Verification {
            question: question.into(),
            answer: answer.into(),
            result,
        });
    }

    pub fn entries(&self) -> &[ContextEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The prompt form: one entry per line, empty when nothing was learned.
    pub fn serialize(&self) -> String {
        self.entries
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n")
    }
}
