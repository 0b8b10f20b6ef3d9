mod duckduckgo;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::SearchHit;

pub use duckduckgo::DuckDuckGoSearch;

/// Keyword web search.
#[async_trait]
pub trait SearchCapability: Send + Sync {
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchHit>>;
}
