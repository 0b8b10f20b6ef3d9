//! Explicit schema descriptions for structured LLM calls.
//!
//! A [`StructuredSchema`] names its output fields and carries the two prompt
//! templates. Templates use `{name}` placeholders that are filled from a
//! [`FieldValues`] map; `{{` and `}}` produce literal braces. Responses are
//! parsed into a [`StructuredOutput`] with every declared field coerced to its
//! declared [`FieldKind`].

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::sync::OnceLock;

use regex::Regex;
use serde_json::{Map, Value};

use crate::error::{CovwatchError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Bool,
    TextList,
}

impl FieldKind {
    fn describe(&self) -> &'static str {
        match self {
            FieldKind::Text => "string",
            FieldKind::Bool => "boolean (true or false)",
            FieldKind::TextList => "array of strings",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
    pub description: &'static str,
}

impl FieldSpec {
    pub const fn new(name: &'static str, kind: FieldKind, description: &'static str) -> Self {
        Self {
            name,
            kind,
            description,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructuredSchema {
    pub name: &'static str,
    pub system_template: String,
    pub user_template: String,
    pub fields: Vec<FieldSpec>,
}

/// Values substituted into a schema's templates.
pub type FieldValues = BTreeMap<&'static str, String>;

/// Both prompts of one structured request, ready to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedPrompt {
    pub system: String,
    pub user: String,
}

impl StructuredSchema {
    pub fn render(&self, values: &FieldValues) -> Result<RenderedPrompt> {
        let mut system = render_template(&self.system_template, values)?;
        system.push_str(&self.response_instructions());

        Ok(RenderedPrompt {
            system,
            user: render_template(&self.user_template, values)?,
        })
    }

    /// Describes the expected JSON object so any chat model can answer in shape.
    fn response_instructions(&self) -> String {
        let mut text = String::from(
            "\n\nAnswer in JSON format with exactly the following fields, in english:\n",
        );
        for field in &self.fields {
            let _ = writeln!(
                text,
                "- {}: {} {}",
                field.name,
                field.kind.describe(),
                field.description
            );
        }
        text.push_str("Respond with valid JSON only.");
        text
    }

    pub fn parse(&self, raw: &str) -> Result<StructuredOutput> {
        let object = extract_json_object(raw).ok_or_else(|| {
            CovwatchError::SchemaParse(format!(
                "{}: response contains no JSON object: {}",
                self.name,
                preview(raw)
            ))
        })?;

        let mut fields = BTreeMap::new();
        for spec in &self.fields {
            let value = object.get(spec.name).ok_or_else(|| {
                CovwatchError::SchemaParse(format!("{}: missing field `{}`", self.name, spec.name))
            })?;
            let coerced = coerce(spec.kind, value).ok_or_else(|| {
                CovwatchError::SchemaParse(format!(
                    "{}: field `{}` is not a {}: {}",
                    self.name,
                    spec.name,
                    spec.kind.describe(),
                    value
                ))
            })?;
            fields.insert(spec.name, coerced);
        }

        Ok(StructuredOutput {
            schema: self.name,
            fields,
        })
    }
}

fn render_template(template: &str, values: &FieldValues) -> Result<String> {
    let mut rendered = String::with_capacity(template.len());
    let mut chars = template.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '{' if chars.peek() == Some(&'{') => {
                chars.next();
                rendered.push('{');
            }
            '}' if chars.peek() == Some(&'}') => {
                chars.next();
                rendered.push('}');
            }
            '{' => {
                let mut name = String::new();
                let mut closed = false;
                for next in chars.by_ref() {
                    if next == '}' {
                        closed = true;
                        break;
                    }
                    name.push(next);
                }
                if !closed {
                    return Err(CovwatchError::Validation(format!(
                        "Unterminated placeholder `{{{name}` in template"
                    )));
                }
                let value = values.get(name.as_str()).ok_or_else(|| {
                    CovwatchError::Validation(format!("No value supplied for placeholder `{name}`"))
                })?;
                rendered.push_str(value);
            }
            other => rendered.push(other),
        }
    }

    Ok(rendered)
}

fn extract_json_object(raw: &str) -> Option<Map<String, Value>> {
    static FENCE: OnceLock<Regex> = OnceLock::new();
    let fence = FENCE.get_or_init(|| {
        Regex::new(r"(?s)```(?:json)?\s*(.*?)```").expect("fence pattern is valid")
    });

    let body = fence
        .captures(raw)
        .and_then(|captures| captures.get(1))
        .map(|m| m.as_str())
        .unwrap_or(raw);

    let start = body.find('{')?;
    let end = body.rfind('}')?;
    if end < start {
        return None;
    }

    match serde_json::from_str::<Value>(&body[start..=end]) {
        Ok(Value::Object(map)) => Some(map),
        _ => None,
    }
}

fn coerce(kind: FieldKind, value: &Value) -> Option<FieldValue> {
    match kind {
        FieldKind::Text => match value {
            Value::String(s) => Some(FieldValue::Text(s.clone())),
            Value::Number(n) => Some(FieldValue::Text(n.to_string())),
            Value::Bool(b) => Some(FieldValue::Text(b.to_string())),
            Value::Array(items) => Some(FieldValue::Text(
                items.iter().map(value_to_text).collect::<Vec<_>>().join(", "),
            )),
            _ => None,
        },
        FieldKind::Bool => match value {
            Value::Bool(b) => Some(FieldValue::Bool(*b)),
            Value::String(s) => match s.trim().to_lowercase().as_str() {
                "true" | "yes" => Some(FieldValue::Bool(true)),
                "false" | "no" => Some(FieldValue::Bool(false)),
                _ => None,
            },
            _ => None,
        },
        FieldKind::TextList => match value {
            Value::Array(items) => Some(FieldValue::TextList(
                items.iter().map(value_to_text).collect(),
            )),
            Value::String(s) => Some(FieldValue::TextList(
                s.split([',', '\n'])
                    .map(str::trim)
                    .filter(|part| !part.is_empty())
                    .map(str::to_string)
                    .collect(),
            )),
            Value::Null => Some(FieldValue::TextList(Vec::new())),
            _ => None,
        },
    }
}

fn value_to_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn preview(raw: &str) -> String {
    raw.chars().take(100).collect()
}

#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Bool(bool),
    TextList(Vec<String>),
}

/// A response that passed schema validation.
#[derive(Debug, Clone, PartialEq)]
pub struct StructuredOutput {
    schema: &'static str,
    fields: BTreeMap<&'static str, FieldValue>,
}

impl StructuredOutput {
    pub fn text(&self, name: &str) -> Result<String> {
        match self.fields.get(name) {
            Some(FieldValue::Text(value)) => Ok(value.clone()),
            _ => Err(self.wrong_field(name, FieldKind::Text)),
        }
    }

    pub fn boolean(&self, name: &str) -> Result<bool> {
        match self.fields.get(name) {
            Some(FieldValue::Bool(value)) => Ok(*value),
            _ => Err(self.wrong_field(name, FieldKind::Bool)),
        }
    }

    pub fn list(&self, name: &str) -> Result<Vec<String>> {
        match self.fields.get(name) {
            Some(FieldValue::TextList(values)) => Ok(values.clone()),
            _ => Err(self.wrong_field(name, FieldKind::TextList)),
        }
    }

    fn wrong_field(&self, name: &str, kind: FieldKind) -> CovwatchError {
        CovwatchError::SchemaParse(format!(
            "{}: no {} field named `{name}`",
            self.schema,
            kind.describe()
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn schema() -> StructuredSchema {
        StructuredSchema {
            name: "Sample",
            system_template: "You analyse {subject}. Reply like {{\"value\": true}}.".to_string(),
            user_template: "{text}".to_string(),
            fields: vec![
                FieldSpec::new("value", FieldKind::Bool, "the verdict"),
                FieldSpec::new("names", FieldKind::TextList, "people involved"),
                FieldSpec::new("comments", FieldKind::Text, "anything else"),
            ],
        }
    }

    fn values(pairs: &[(&'static str, &str)]) -> FieldValues {
        pairs.iter().map(|(k, v)| (*k, v.to_string())).collect()
    }

    #[test]
    fn test_render_substitutes_placeholders_and_escapes() {
        let prompt = schema()
            .render(&values(&[("subject", "AI safety"), ("text", "hello")]))
            .unwrap();

        assert!(prompt
            .system
            .starts_with("You analyse AI safety. Reply like {\"value\": true}."));
        assert!(prompt.system.contains("- names: array of strings people involved"));
        assert_eq!(prompt.user, "hello");
    }

    #[test]
    fn test_render_rejects_missing_value() {
        let result = schema().render(&values(&[("subject", "AI safety")]));
        assert!(matches!(result, Err(CovwatchError::Validation(_))));
    }

    #[test]
    fn test_parse_coerces_declared_fields() {
        let output = schema()
            .parse(r#"{"value": "Yes", "names": "alice, bob", "comments": 3}"#)
            .unwrap();

        assert!(output.boolean("value").unwrap());
        assert_eq!(output.list("names").unwrap(), vec!["alice", "bob"]);
        assert_eq!(output.text("comments").unwrap(), "3");
    }

    #[test]
    fn test_parse_string_list_keeps_multiword_items() {
        let output = crate::llm::prompts::search_query_schema()
            .parse(r#"{"search_queries": "a b c, d e\nf g", "comments": ""}"#)
            .unwrap();

        assert_eq!(
            output.list("search_queries").unwrap(),
            vec!["a b c", "d e", "f g"]
        );
    }

    #[test]
    fn test_parse_accepts_fenced_and_chatty_responses() {
        let raw = "Sure! Here you go:\n```json\n{\"value\": false, \"names\": [], \"comments\": \"\"}\n```\nAnything else?";
        let output = schema().parse(raw).unwrap();

        assert!(!output.boolean("value").unwrap());
        assert!(output.list("names").unwrap().is_empty());
    }

    #[test]
    fn test_parse_missing_field_is_schema_error() {
        let result = schema().parse(r#"{"value": true, "comments": ""}"#);
        assert!(matches!(result, Err(CovwatchError::SchemaParse(msg)) if msg.contains("names")));
    }

    #[test]
    fn test_parse_uncoercible_bool_is_schema_error() {
        let result = schema().parse(r#"{"value": "perhaps", "names": [], "comments": ""}"#);
        assert!(matches!(result, Err(CovwatchError::SchemaParse(_))));
    }

    #[test]
    fn test_parse_without_json_is_schema_error() {
        let result = schema().parse("I think it is true.");
        assert!(matches!(result, Err(CovwatchError::SchemaParse(_))));
    }

    #[test]
    fn test_accessor_with_wrong_kind_fails() {
        let output = schema()
            .parse(r#"{"value": true, "names": [], "comments": ""}"#)
            .unwrap();
        assert!(output.text("value").is_err());
    }
}
