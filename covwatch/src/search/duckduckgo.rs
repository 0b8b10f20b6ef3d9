use std::time::Duration;

use async_trait::async_trait;
use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::config::SearchConfig;
use crate::error::{CovwatchError, Result};
use crate::models::SearchHit;

use super::SearchCapability;

/// Searches through DuckDuckGo's HTML-only endpoint.
pub struct DuckDuckGoSearch {
    http_client: reqwest::Client,
    endpoint: Url,
}

impl DuckDuckGoSearch {
    pub fn new(config: &SearchConfig, user_agent: &str) -> Result<Self> {
        let endpoint = Url::parse(&config.base_url)?;
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(user_agent)
            .build()
            .map_err(|error| {
                CovwatchError::Transport(format!("Failed to create search HTTP client: {error}"))
            })?;

        Ok(Self {
            http_client,
            endpoint,
        })
    }

    pub fn parse_results(html: &str, max_results: usize) -> Vec<SearchHit> {
        let document = Html::parse_document(html);
        let result_selector = Selector::parse("div.result").unwrap();
        let title_selector = Selector::parse("a.result__a").unwrap();
        let snippet_selector = Selector::parse(".result__snippet").unwrap();

        document
            .select(&result_selector)
            .filter(|result| {
                !result
                    .value()
                    .classes()
                    .any(|class| class == "result--ad")
            })
            .filter_map(|result| {
                let title = result.select(&title_selector).next()?;
                let href = title.value().attr("href")?;
                Some(SearchHit {
                    title: element_text(&title),
                    href: resolve_redirect(href),
                    body: result
                        .select(&snippet_selector)
                        .next()
                        .map(|snippet| element_text(&snippet))
                        .unwrap_or_default(),
                })
            })
            .take(max_results)
            .collect()
    }
}

#[async_trait]
impl SearchCapability for DuckDuckGoSearch {
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchHit>> {
        let response = self
            .http_client
            .post(self.endpoint.clone())
            .form(&[("q", query)])
            .send()
            .await
            .map_err(|error| CovwatchError::Transport(format!("Search request failed: {error}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(CovwatchError::Transport(format!(
                "Search endpoint returned {status}"
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|error| CovwatchError::Transport(format!("Search body unreadable: {error}")))?;

        let hits = Self::parse_results(&body, max_results);
        tracing::debug!(query, hits = hits.len(), "Search completed");
        Ok(hits)
    }
}

fn element_text(element: &ElementRef<'_>) -> String {
    element
        .text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Result links are wrapped as `//duckduckgo.com/l/?uddg=<target>`.
fn resolve_redirect(href: &str) -> String {
    let absolute = if href.starts_with("//") {
        format!("https:{href}")
    } else {
        href.to_string()
    };

    Url::parse(&absolute)
        .ok()
        .and_then(|url| {
            url.query_pairs()
                .find(|(key, _)| key == "uddg")
                .map(|(_, target)| target.into_owned())
        })
        .unwrap_or(absolute)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const RESULTS_PAGE: &str = r#"
        <html><body>
          <div class="result results_links result--ad">
            <a class="result__a" href="https://ads.example.com">Sponsored</a>
          </div>
          <div class="result results_links">
            <h2><a class="result__a" href="//duckduckgo.com/l/?uddg=https%3A%2F%2Fexample.com%2Falignment&amp;rut=x">AI   alignment</a></h2>
            <a class="result__snippet">What alignment <b>means</b></a>
          </div>
          <div class="result results_links">
            <a class="result__a" href="https://example.org/safety">Safety</a>
          </div>
          <div class="result results_links">
            <a class="result__a" href="https://example.net">Third</a>
          </div>
        </body></html>
    "#;

    #[test]
    fn test_parse_results_skips_ads_and_limits() {
        let hits = DuckDuckGoSearch::parse_results(RESULTS_PAGE, 2);

        assert_eq!(
            hits,
            vec![
                SearchHit {
                    title: "AI alignment".to_string(),
                    href: "https://example.com/alignment".to_string(),
                    body: "What alignment means".to_string(),
                },
                SearchHit {
                    title: "Safety".to_string(),
                    href: "https://example.org/safety".to_string(),
                    body: String::new(),
                },
            ]
        );
    }

    #[test]
    fn test_resolve_redirect_keeps_direct_links() {
        assert_eq!(
            resolve_redirect("https://example.org/a"),
            "https://example.org/a"
        );
    }
}
