//! Prompt schemas and the fixed question battery used by the analysis compiler.
//!
//! Each schema function returns a fresh [`StructuredSchema`]; the placeholder
//! names listed in its doc comment must be present in the values passed to
//! [`StructuredSchema::render`](crate::llm::schema::StructuredSchema::render).

use crate::llm::schema::{FieldKind, FieldSpec, StructuredSchema};

/// Schema for the analyst role.
///
/// Placeholders: `subject`, `post`, `context`, `instruction`.
///
/// # Example
/// ```
/// use covwatch::llm::prompts::post_analysis_schema;
/// use covwatch::llm::schema::FieldValues;
///
/// let values = FieldValues::from([
///     ("subject", "AI safety".to_string()),
///     ("post", "{\"content\":\"hello\"}".to_string()),
///     ("context", String::new()),
///     ("instruction", "Is this about AI safety?".to_string()),
/// ]);
/// let prompt = post_analysis_schema().render(&values).unwrap();
/// assert!(prompt.system.contains("AI safety"));
/// assert_eq!(prompt.user, "Is this about AI safety?");
/// ```
pub fn post_analysis_schema() -> StructuredSchema {
    StructuredSchema {
        name: "PostAnalysis",
        system_template: r#"You are a helpful twitter social media analyst specialized in "{subject}". You never lie and are always very cautious.
Here is a tweet (in json form) you have to analyze: {post}
Previous context of the conversation: {context}"#
            .to_string(),
        user_template: "{instruction}".to_string(),
        fields: vec![FieldSpec::new(
            "answer",
            FieldKind::Text,
            "your answer to the request",
        )],
    }
}

/// Schema for generating clarifying questions about a claim.
///
/// Placeholders: `question`, `claim`.
pub fn doubter_schema() -> StructuredSchema {
    StructuredSchema {
        name: "ClarifyingQuestions",
        system_template: r#"You are a careful fact checker. You doubt every claim you are shown.
Given a question and the answer someone gave to it, write the clarifying questions that would help validate the answer.
Write at most 3 short, independent questions. Write no questions if the answer needs no validation."#
            .to_string(),
        user_template: "Question: {question}\nAnswer: {claim}".to_string(),
        fields: vec![FieldSpec::new(
            "questions",
            FieldKind::TextList,
            "the clarifying questions",
        )],
    }
}

/// Schema for checking an answer against its source.
///
/// Placeholders: `question`, `context`, `answer`.
pub fn consistency_schema() -> StructuredSchema {
    StructuredSchema {
        name: "ConsistencyCheck",
        system_template: r#"You are a consistency verifier. You check answers against the context they are supposed to come from.
Decide whether the answer is consistent, and whether it can actually be inferred from the context rather than made up.
Context: {context}"#
            .to_string(),
        user_template: "Question: {question}\nAnswer: {answer}".to_string(),
        fields: vec![
            FieldSpec::new(
                "is_consistent",
                FieldKind::Bool,
                "is the answer consistent with itself and the question",
            ),
            FieldSpec::new(
                "is_inferred_from_context",
                FieldKind::Bool,
                "can the answer be inferred from the context",
            ),
        ],
    }
}

/// Placeholder: `text`.
pub fn phrase_to_bool_schema() -> StructuredSchema {
    StructuredSchema {
        name: "PhraseToBool",
        system_template: "You are a helpful assistant that converts phrases to booleans.".to_string(),
        user_template: "Convert this phrase to a boolean: {text}".to_string(),
        fields: vec![
            FieldSpec::new("value", FieldKind::Bool, "the boolean the phrase expresses"),
            FieldSpec::new("comments", FieldKind::Text, "any remark"),
        ],
    }
}

/// Placeholder: `text`.
pub fn username_extraction_schema() -> StructuredSchema {
    StructuredSchema {
        name: "UsernameExtractor",
        system_template:
            "You are a helpful assistant that extracts twitter usernames from messages (without the @)."
                .to_string(),
        user_template: "Extract all twitter usernames from this message (without the @): {text}"
            .to_string(),
        fields: vec![
            FieldSpec::new("usernames", FieldKind::TextList, "the usernames found"),
            FieldSpec::new("comments", FieldKind::Text, "any remark"),
        ],
    }
}

/// Placeholder: `text`.
pub fn search_query_schema() -> StructuredSchema {
    StructuredSchema {
        name: "SearchTermComposer",
        system_template: "You are a helpful assistant that composes search queries from keywords."
            .to_string(),
        user_template: "Formulate questions for googling based on the following keywords: {text}"
            .to_string(),
        fields: vec![
            FieldSpec::new("search_queries", FieldKind::TextList, "the search queries"),
            FieldSpec::new("comments", FieldKind::Text, "any remark"),
        ],
    }
}

pub const ANSWER_QUESTION_PREFIX: &str = "Answer the following question: ";
pub const DRAFT_CONTEXT_PREFIX: &str = "Your analysis of the tweet was ";
pub const REVISE_INSTRUCTION: &str =
    "Rewrite your answer taking into consideration the questions you answered.";

pub fn relevance_question(subject: &str) -> String {
    format!("Would you say this tweet is about {subject} ? Explain why.")
}

pub const SENTIMENT_QUESTION: &str = "What is the overall sentiment of this tweet ?";
pub const SENTIMENT_HINT: &str = "I want the answer to be one single adjective";

pub const NEEDS_CONTEXT_QUESTION: &str =
    "Could this tweet use more context to be analyzed ? Explain why.";

pub fn search_terms_question(subject: &str) -> String {
    format!(
        "What questions would you google to find out more ? These must be related to {subject} And they must not be too generic or you will find false information."
    )
}

pub fn search_terms_hint(max_queries: usize) -> String {
    format!(
        "I want the answer to be a list of up to {max_queries} multiword search queries separated by commas and none must be generic or out of scope"
    )
}

pub const SEARCH_SUMMARY_QUESTION: &str = "Summarize the results of this search.";
pub const SEARCH_SUMMARY_HINT: &str =
    "I want the answer to be a short summary of the results of the search";

pub const RELATED_PEOPLE_QUESTION: &str = "Does the tweet mention, retweet or interact with people directly ? If so, who ? (list them by their @username separated by spaces)";
pub const RELATED_PEOPLE_HINT: &str =
    "I want the answer to be a list of twitter handles separated by spaces";

pub fn analysis_question(subject: &str) -> String {
    format!("Analyse this tweet, with your knowledge of {subject}")
}

pub const ANALYSIS_HINT: &str = "I want the answer to be a short analysis of the tweet.";
pub const GUIDING_QUESTIONS_PREFIX: &str = "Here are some guiding questions: ";
pub const ENRICHMENT_PREFIX: &str = "What follows is some context to understand the tweet better: ";

pub const EXTRA_QUESTION: &str = "Do you have any extra insight or remarks to add ?";
