use covwatch::error::CovwatchError;
use covwatch::llm::prompts::{
    consistency_schema, doubter_schema, phrase_to_bool_schema, post_analysis_schema,
    search_query_schema, search_terms_hint, username_extraction_schema,
};
use covwatch::llm::schema::FieldValues;

#[test]
fn test_post_analysis_prompt_substitution() {
    let values = FieldValues::from([
        ("subject", "AI safety".to_string()),
        ("post", r#"{"content":"New eval suite"}"#.to_string()),
        ("context", "I want the answer to be one single adjective".to_string()),
        ("instruction", "What is the overall sentiment of this tweet ?".to_string()),
    ]);

    let prompt = post_analysis_schema().render(&values).unwrap();

    assert!(prompt.system.contains(r#"specialized in "AI safety""#));
    assert!(prompt.system.contains(r#"{"content":"New eval suite"}"#));
    assert!(prompt
        .system
        .contains("Previous context of the conversation: I want the answer to be one single adjective"));
    assert!(prompt.system.contains("- answer: string"));
    assert_eq!(prompt.user, "What is the overall sentiment of this tweet ?");
}

#[test]
fn test_missing_placeholder_value_is_rejected() {
    let values = FieldValues::from([("subject", "AI safety".to_string())]);

    let result = post_analysis_schema().render(&values);

    assert!(matches!(result, Err(CovwatchError::Validation(_))));
}

#[test]
fn test_consistency_prompt_lists_both_flags() {
    let values = FieldValues::from([
        ("question", "Who posted it?".to_string()),
        ("context", "the post".to_string()),
        ("answer", "OpenAI".to_string()),
    ]);

    let prompt = consistency_schema().render(&values).unwrap();

    assert!(prompt.system.contains("Context: the post"));
    assert!(prompt.system.contains("- is_consistent: boolean"));
    assert!(prompt.system.contains("- is_inferred_from_context: boolean"));
    assert_eq!(prompt.user, "Question: Who posted it?\nAnswer: OpenAI");
}

#[test]
fn test_doubter_parses_question_list() {
    let output = doubter_schema()
        .parse(r#"{"questions": ["Who wrote it?", "When?"]}"#)
        .unwrap();

    assert_eq!(output.list("questions").unwrap(), vec!["Who wrote it?", "When?"]);
}

#[test]
fn test_converter_schemas_take_text() {
    let values = FieldValues::from([("text", "@sama @gdb".to_string())]);

    for schema in [
        phrase_to_bool_schema(),
        username_extraction_schema(),
        search_query_schema(),
    ] {
        let prompt = schema.render(&values).unwrap();
        assert!(prompt.user.ends_with("@sama @gdb"), "{}", schema.name);
        assert!(prompt.system.contains("- comments: string"), "{}", schema.name);
    }
}

#[test]
fn test_search_terms_hint_names_limit() {
    assert!(search_terms_hint(4).contains("up to 4 multiword search queries"));
}
