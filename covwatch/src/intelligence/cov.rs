use tracing::{debug, info};

use crate::error::{CovwatchError, Result};
use crate::llm::prompts::{ANSWER_QUESTION_PREFIX, DRAFT_CONTEXT_PREFIX, REVISE_INSTRUCTION};
use crate::llm::StructuredCaller;
use crate::models::ConversationContext;

use super::analyst::Analyst;
use super::doubter::Doubter;
use super::verifier::ConsistencyVerifier;

/// Chain-of-Verification: draft, doubt, answer, cross-examine, revise.
///
/// The caller's [`ConversationContext`] is extended with one verification
/// entry per clarifying question, which is how the revision step (and any
/// later question sharing the same context) sees what was checked.
#[derive(Clone)]
pub struct ChainOfVerification {
    analyst: Analyst,
    doubter: Doubter,
    verifier: ConsistencyVerifier,
}

impl ChainOfVerification {
    pub fn new(caller: StructuredCaller) -> Self {
        Self {
            analyst: Analyst::new(caller.clone()),
            doubter: Doubter::new(caller.clone()),
            verifier: ConsistencyVerifier::new(caller),
        }
    }

    pub async fn run(
        &self,
        post: &str,
        subject: &str,
        question: &str,
        context: &mut ConversationContext,
    ) -> Result<String> {
        info!(question, "Verification chain started");

        let draft = first_answer(
            self.analyst
                .process(subject, post, question, &context.serialize(), 1)
                .await?,
        )?;
        debug!(draft = %draft, "Draft answer");

        let clarifying = self.doubter.verify(question, &draft).await?;
        debug!(count = clarifying.len(), "Clarifying questions generated");

        let draft_context = format!("{DRAFT_CONTEXT_PREFIX}{draft}");
        let mut answers = Vec::with_capacity(clarifying.len());
        for clarifying_question in &clarifying {
            let instruction = format!("{ANSWER_QUESTION_PREFIX}{clarifying_question}");
            let answer = first_answer(
                self.analyst
                    .ask(clarifying_question, post, &instruction, &draft_context, 1)
                    .await?,
            )?;
            answers.push(answer);
        }

        for (clarifying_question, answer) in clarifying.iter().zip(answers) {
            let result = self
                .verifier
                .verify(clarifying_question, post, &answer)
                .await?;
            debug!(
                question = %clarifying_question,
                answer = %answer,
                consistent = result.is_consistent,
                inferred = result.is_inferred_from_context,
                "Cross-examined"
            );
            context.push_verification(clarifying_question.clone(), answer, result);
        }

        let revised = first_answer(
            self.analyst
                .process(subject, post, REVISE_INSTRUCTION, &context.serialize(), 1)
                .await?,
        )?;
        info!(question, answer = %revised, "Verification chain finished");

        Ok(revised)
    }
}

fn first_answer(answers: Vec<String>) -> Result<String> {
    answers
        .into_iter()
        .next()
        .ok_or_else(|| CovwatchError::SchemaParse("Analyst returned no answer".to_string()))
}
