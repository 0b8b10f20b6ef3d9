use crate::error::Result;
use crate::llm::schema::{FieldValues, StructuredOutput, StructuredSchema};
use crate::llm::StructuredCaller;

/// A structured LLM call bound to one schema.
///
/// The analyst, doubter, verifier and phrase converters are all typed
/// façades over this.
#[derive(Clone)]
pub struct StructuredRole {
    caller: StructuredCaller,
    schema: StructuredSchema,
}

impl StructuredRole {
    pub fn new(caller: StructuredCaller, schema: StructuredSchema) -> Self {
        Self { caller, schema }
    }

    pub async fn invoke(&self, values: &FieldValues) -> Result<StructuredOutput> {
        self.caller.invoke(&self.schema, values).await
    }
}
