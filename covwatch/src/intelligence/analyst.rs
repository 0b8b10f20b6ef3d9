use crate::error::Result;
use crate::llm::prompts;
use crate::llm::schema::FieldValues;
use crate::llm::StructuredCaller;

use super::role::StructuredRole;

/// Answers questions about a post on behalf of a subject-matter specialist.
#[derive(Clone)]
pub struct Analyst {
    role: StructuredRole,
}

impl Analyst {
    pub fn new(caller: StructuredCaller) -> Self {
        Self {
            role: StructuredRole::new(caller, prompts::post_analysis_schema()),
        }
    }

    /// Samples `shots` independent answers, one call after the other.
    pub async fn process(
        &self,
        subject: &str,
        post: &str,
        instruction: &str,
        context: &str,
        shots: usize,
    ) -> Result<Vec<String>> {
        let values = FieldValues::from([
            ("subject", subject.to_string()),
            ("post", post.to_string()),
            ("context", context.to_string()),
            ("instruction", instruction.to_string()),
        ]);

        let mut answers = Vec::with_capacity(shots);
        for shot in 0..shots {
            let output = self.role.invoke(&values).await?;
            let answer = output.text("answer")?;
            tracing::debug!(shot, instruction, answer = %answer, "Analyst answered");
            answers.push(answer);
        }
        Ok(answers)
    }

    /// Used for clarifying questions: the question itself takes the
    /// specialty slot of the prompt.
    pub async fn ask(
        &self,
        question: &str,
        post: &str,
        instruction: &str,
        context: &str,
        shots: usize,
    ) -> Result<Vec<String>> {
        self.process(question, post, instruction, context, shots).await
    }
}
