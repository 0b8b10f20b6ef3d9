use crate::error::Result;
use crate::llm::prompts;
use crate::llm::schema::FieldValues;
use crate::llm::StructuredCaller;
use crate::models::VerificationResult;

use super::role::StructuredRole;

/// Checks that an answer holds together and is grounded in its source text.
#[derive(Clone)]
pub struct ConsistencyVerifier {
    role: StructuredRole,
}

impl ConsistencyVerifier {
    pub fn new(caller: StructuredCaller) -> Self {
        Self {
            role: StructuredRole::new(caller, prompts::consistency_schema()),
        }
    }

    pub async fn verify(
        &self,
        question: &str,
        context: &str,
        answer: &str,
    ) -> Result<VerificationResult> {
        let values = FieldValues::from([
            ("question", question.to_string()),
            ("context", context.to_string()),
            ("answer", answer.to_string()),
        ]);

        let output = self.role.invoke(&values).await?;
        Ok(VerificationResult {
            is_consistent: output.boolean("is_consistent")?,
            is_inferred_from_context: output.boolean("is_inferred_from_context")?,
        })
    }
}
