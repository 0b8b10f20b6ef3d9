use crate::error::Result;
use crate::llm::prompts;
use crate::llm::schema::FieldValues;
use crate::llm::StructuredCaller;

use super::role::StructuredRole;

/// Turns free-text answers into typed values with one small LLM call each.
#[derive(Clone)]
pub struct PhraseConverter {
    to_bool: StructuredRole,
    usernames: StructuredRole,
    search_queries: StructuredRole,
}

impl PhraseConverter {
    pub fn new(caller: StructuredCaller) -> Self {
        Self {
            to_bool: StructuredRole::new(caller.clone(), prompts::phrase_to_bool_schema()),
            usernames: StructuredRole::new(caller.clone(), prompts::username_extraction_schema()),
            search_queries: StructuredRole::new(caller, prompts::search_query_schema()),
        }
    }

    pub async fn phrase_to_bool(&self, text: &str) -> Result<bool> {
        let output = self.to_bool.invoke(&text_values(text)).await?;
        output.boolean("value")
    }

    /// Handles mentioned in `text`, without their leading `@`.
    pub async fn extract_usernames(&self, text: &str) -> Result<Vec<String>> {
        let output = self.usernames.invoke(&text_values(text)).await?;
        Ok(normalize_handles(output.list("usernames")?))
    }

    pub async fn compose_search_queries(&self, text: &str) -> Result<Vec<String>> {
        let output = self.search_queries.invoke(&text_values(text)).await?;
        output.list("search_queries")
    }
}

fn text_values(text: &str) -> FieldValues {
    FieldValues::from([("text", text.to_string())])
}

/// Splits space-separated entries, strips leading `@` markers and drops
/// entries left empty.
pub fn normalize_handles(handles: Vec<String>) -> Vec<String> {
    handles
        .iter()
        .flat_map(|entry| entry.split_whitespace())
        .map(|handle| handle.trim_start_matches('@'))
        .filter(|handle| !handle.is_empty())
        .map(str::to_string)
        .collect()
}
