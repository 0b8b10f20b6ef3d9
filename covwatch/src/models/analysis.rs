use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Post;

/// Verdict on one clarifying answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationResult {
    pub is_consistent: bool,
    pub is_inferred_from_context: bool,
}

impl fmt::Display for VerificationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Consistent {}, Inferred from Context {}",
            self.is_consistent, self.is_inferred_from_context
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CompiledAnswer {
    Text(String),
    Handles(Vec<String>),
}

impl CompiledAnswer {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Handles(_) => None,
        }
    }
}

impl fmt::Display for CompiledAnswer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => write!(f, "{text}"),
            Self::Handles(handles) => write!(f, "{}", handles.join(" ")),
        }
    }
}

/// One labelled step of the compiler's transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompilationEntry {
    pub question: String,
    pub answer: CompiledAnswer,
}

impl fmt::Display for CompilationEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Q: {}\nA: {}", self.question, self.answer)
    }
}

/// Final structured analysis of a relevant post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRecord {
    pub id: Uuid,
    pub post: Post,
    pub analysis: String,
    pub relevance: bool,
    pub needs_context: bool,
    pub sentiment: String,
    pub related_people: Vec<String>,
    pub extra: String,
    /// Ordered as asked: relevance, sentiment, needs context, related people,
    /// analysis, extra.
    pub transcript: Vec<CompilationEntry>,
    pub analyzed_at: DateTime<Utc>,
}
