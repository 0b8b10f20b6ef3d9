use crate::error::Result;
use crate::llm::prompts;
use crate::llm::schema::FieldValues;
use crate::llm::StructuredCaller;

use super::role::StructuredRole;

/// Produces clarifying questions that would help validate a claim.
#[derive(Clone)]
pub struct Doubter {
    role: StructuredRole,
}

impl Doubter {
    pub fn new(caller: StructuredCaller) -> Self {
        Self {
            role: StructuredRole::new(caller, prompts::doubter_schema()),
        }
    }

    /// Questions are returned exactly as generated, possibly none.
    pub async fn verify(&self, original_question: &str, claim: &str) -> Result<Vec<String>> {
        let values = FieldValues::from([
            ("question", original_question.to_string()),
            ("claim", claim.to_string()),
        ]);

        let output = self.role.invoke(&values).await?;
        output.list("questions")
    }
}
