use std::sync::Arc;

use crate::error::Result;
use crate::llm::provider::LlmCapability;
use crate::llm::schema::{FieldValues, StructuredOutput, StructuredSchema};

/// Renders a schema, sends it to the model and validates the answer.
///
/// No retry happens here: a transport failure or a response that does not fit
/// the schema is returned to the caller as is.
#[derive(Clone)]
pub struct StructuredCaller {
    llm: Arc<dyn LlmCapability>,
}

impl StructuredCaller {
    pub fn new(llm: Arc<dyn LlmCapability>) -> Self {
        Self { llm }
    }

    pub async fn invoke(
        &self,
        schema: &StructuredSchema,
        values: &FieldValues,
    ) -> Result<StructuredOutput> {
        let prompt = schema.render(values)?;
        tracing::trace!(
            schema = schema.name,
            system = %prompt.system,
            user = %prompt.user,
            "Structured LLM request"
        );

        let raw = self.llm.complete(&prompt.system, &prompt.user).await?;

        schema.parse(&raw).inspect_err(|error| {
            tracing::warn!(
                schema = schema.name,
                error = %error,
                response_preview = %raw.chars().take(100).collect::<String>(),
                "LLM response did not match schema"
            );
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::error::CovwatchError;
    use crate::llm::schema::{FieldKind, FieldSpec};

    struct FixedLlm {
        response: String,
        seen: Mutex<Vec<(String, String)>>,
    }

    #[async_trait]
    impl LlmCapability for FixedLlm {
        async fn complete(&self, system_prompt: &str, user_prompt: &str) -> Result<String> {
            self.seen
                .lock()
                .unwrap()
                .push((system_prompt.to_string(), user_prompt.to_string()));
            Ok(self.response.clone())
        }
    }

    fn schema() -> StructuredSchema {
        StructuredSchema {
            name: "Echo",
            system_template: "System about {subject}".to_string(),
            user_template: "User says {text}".to_string(),
            fields: vec![FieldSpec::new("answer", FieldKind::Text, "the answer")],
        }
    }

    fn values() -> FieldValues {
        FieldValues::from([("subject", "rust".to_string()), ("text", "hi".to_string())])
    }

    #[tokio::test]
    async fn test_invoke_sends_rendered_prompts() {
        let llm = Arc::new(FixedLlm {
            response: r#"{"answer": "hello"}"#.to_string(),
            seen: Mutex::new(Vec::new()),
        });
        let caller = StructuredCaller::new(llm.clone());

        let output = caller.invoke(&schema(), &values()).await.unwrap();

        assert_eq!(output.text("answer").unwrap(), "hello");
        let seen = llm.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert!(seen[0].0.starts_with("System about rust"));
        assert_eq!(seen[0].1, "User says hi");
    }

    #[tokio::test]
    async fn test_invoke_surfaces_schema_errors() {
        let llm = Arc::new(FixedLlm {
            response: "no json here".to_string(),
            seen: Mutex::new(Vec::new()),
        });
        let caller = StructuredCaller::new(llm);

        let result = caller.invoke(&schema(), &values()).await;

        assert!(matches!(result, Err(CovwatchError::SchemaParse(_))));
    }
}
