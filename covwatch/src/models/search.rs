use serde::{Deserialize, Serialize};

/// One web search result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    pub title: String,
    pub href: String,
    pub body: String,
}

/// JSON form of a result set, used as the "post" when summarizing searches.
pub fn hits_to_prompt_text(hits: &[SearchHit]) -> String {
    serde_json::to_string(hits).unwrap_or_else(|_| "[]".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hits_to_prompt_text() {
        let hits = vec![SearchHit {
            title: "Alignment".to_string(),
            href: "https://example.com".to_string(),
            body: "An overview".to_string(),
        }];

        let text = hits_to_prompt_text(&hits);
        assert!(text.starts_with('['));
        assert!(text.contains("\"href\":\"https://example.com\""));
        assert_eq!(hits_to_prompt_text(&[]), "[]");
    }
}
