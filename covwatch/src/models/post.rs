use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single scraped post and its engagement metadata.
///
/// Engagement counts are kept as the strings the mirror displays ("1.2K",
/// "NaN" when the stats block is missing) since they are only ever shown to
/// the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub author_fullname: Option<String>,
    pub author_username: Option<String>,
    pub content: Option<String>,
    pub comments: String,
    pub retweets: String,
    pub likes: String,
    pub is_quote_tweet: bool,
    pub quote_tweet_author: Option<String>,
    #[serde(default)]
    pub article_links: Vec<String>,
    #[serde(default)]
    pub image_links: Vec<String>,
    pub scraped_at: DateTime<Utc>,
}

impl Post {
    /// A text-only post, mostly useful for tests and ad-hoc analysis.
    pub fn from_text(author_username: &str, content: &str) -> Self {
        Self {
            author_fullname: None,
            author_username: Some(author_username.to_string()),
            content: Some(content.to_string()),
            comments: "0".to_string(),
            retweets: "0".to_string(),
            likes: "0".to_string(),
            is_quote_tweet: false,
            quote_tweet_author: None,
            article_links: Vec::new(),
            image_links: Vec::new(),
            scraped_at: Utc::now(),
        }
    }

    /// The JSON form embedded into prompts. The scrape timestamp is left out.
    pub fn to_prompt_text(&self) -> String {
        let mut value = serde_json::to_value(self).unwrap_or_default();
        if let Some(object) = value.as_object_mut() {
            object.remove("scraped_at");
        }
        value.to_string()
    }
}
