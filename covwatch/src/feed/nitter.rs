use std::collections::VecDeque;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::config::FeedConfig;
use crate::error::{CovwatchError, Result};
use crate::models::Post;

use super::{FeedSource, PostStream};

/// Reads account timelines from a Nitter instance.
#[derive(Clone)]
pub struct NitterFeed {
    http_client: reqwest::Client,
    base_url: Url,
    page_delay: Duration,
}

impl NitterFeed {
    pub fn new(config: &FeedConfig) -> Result<Self> {
        let base_url = Url::parse(&config.base_url)?;
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|error| {
                CovwatchError::Transport(format!("Failed to create feed HTTP client: {error}"))
            })?;

        Ok(Self {
            http_client,
            base_url,
            page_delay: config.page_delay(),
        })
    }

    pub fn timeline(&self, handle: &str) -> NitterTimeline {
        NitterTimeline {
            feed: self.clone(),
            handle: handle.trim_start_matches('@').to_string(),
            buffer: VecDeque::new(),
            cursor: None,
            started: false,
            exhausted: false,
        }
    }
}

impl FeedSource for NitterFeed {
    fn subscribe(&self, handle: &str) -> Box<dyn PostStream> {
        Box::new(self.timeline(handle))
    }
}

/// A parsed timeline page.
#[derive(Debug, Clone, PartialEq)]
pub struct TimelinePage {
    pub posts: Vec<Post>,
    /// Query string of the next page (`?cursor=...`), if there is one.
    pub next_cursor: Option<String>,
}

/// One account's timeline, fetched a page at a time as posts are consumed.
pub struct NitterTimeline {
    feed: NitterFeed,
    handle: String,
    buffer: VecDeque<Post>,
    cursor: Option<String>,
    started: bool,
    exhausted: bool,
}

impl NitterTimeline {
    pub fn handle(&self) -> &str {
        &self.handle
    }

    fn page_url(&self) -> Result<Url> {
        let mut url = self.feed.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| CovwatchError::Validation("Feed base URL cannot take a path".into()))?
            .pop_if_empty()
            .push(&self.handle);
        if let Some(cursor) = &self.cursor {
            url.set_query(Some(cursor.trim_start_matches('?')));
        }
        Ok(url)
    }

    async fn fetch_page(&mut self) -> Result<()> {
        if self.started {
            tokio::time::sleep(self.feed.page_delay).await;
        }

        let url = self.page_url()?;
        tracing::debug!(handle = %self.handle, url = %url, "Fetching timeline page");

        let response = self
            .feed
            .http_client
            .get(url.clone())
            .send()
            .await
            .map_err(|error| CovwatchError::Transport(format!("Feed request failed: {error}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(CovwatchError::Transport(format!(
                "Feed returned {status} for {url}"
            )));
        }

        let html = response
            .text()
            .await
            .map_err(|error| CovwatchError::Transport(format!("Feed body unreadable: {error}")))?;

        let page = parse_timeline(&html, &self.feed.base_url);
        self.started = true;
        if page.posts.is_empty() || page.next_cursor.is_none() {
            self.exhausted = true;
        }
        self.cursor = page.next_cursor;
        self.buffer.extend(page.posts);
        Ok(())
    }
}

#[async_trait]
impl PostStream for NitterTimeline {
    async fn next_post(&mut self) -> Option<Post> {
        if self.buffer.is_empty() && !self.exhausted {
            if let Err(error) = self.fetch_page().await {
                tracing::warn!(handle = %self.handle, error = %error, "Could not fetch timeline");
                return None;
            }
        }
        self.buffer.pop_front()
    }
}

pub fn parse_timeline(html: &str, base_url: &Url) -> TimelinePage {
    let document = Html::parse_document(html);
    let item_selector = Selector::parse("div.timeline-item").unwrap();
    let show_more_selector = Selector::parse("div.show-more a[href]").unwrap();

    let posts = document
        .select(&item_selector)
        .filter(|item| !item.value().classes().any(|class| class == "show-more"))
        .map(|item| parse_item(&item, base_url))
        .filter(|post| post.content.is_some() || post.author_username.is_some())
        .collect();

    // The first "show more" link on later pages points back to the newest posts.
    let next_cursor = document
        .select(&show_more_selector)
        .filter_map(|link| link.value().attr("href"))
        .filter(|href| href.contains("cursor="))
        .last()
        .map(str::to_string);

    TimelinePage { posts, next_cursor }
}

fn parse_item(item: &ElementRef<'_>, base_url: &Url) -> Post {
    let fullname = Selector::parse("a.fullname").unwrap();
    let username = Selector::parse("a.username").unwrap();
    let content = Selector::parse("div.tweet-content").unwrap();
    let stats = Selector::parse("div.tweet-stats").unwrap();
    let stat = Selector::parse("span.tweet-stat").unwrap();
    let quote = Selector::parse("div.quote").unwrap();
    let link = Selector::parse("a[href]").unwrap();
    let image = Selector::parse("img[src]").unwrap();

    let first_text = |selector: &Selector| item.select(selector).next().map(|el| element_text(&el));

    let (comments, retweets, likes) = match item.select(&stats).next() {
        Some(block) => {
            let values: Vec<String> = block.select(&stat).map(|el| element_text(&el)).collect();
            if values.len() >= 3 {
                (values[0].clone(), values[1].clone(), values[2].clone())
            } else {
                ("0".to_string(), "0".to_string(), "0".to_string())
            }
        }
        None => ("NaN".to_string(), "NaN".to_string(), "NaN".to_string()),
    };

    let quote_block = item.select(&quote).next();
    let quote_tweet_author = quote_block
        .and_then(|block| block.select(&fullname).next())
        .map(|el| element_text(&el));

    let article_links = item
        .select(&link)
        .filter_map(|el| el.value().attr("href"))
        .filter(|href| href.contains("http"))
        .map(str::to_string)
        .collect();

    let image_links = item
        .select(&image)
        .filter_map(|el| el.value().attr("src"))
        .filter_map(|src| base_url.join(src).ok())
        .map(|url| url.to_string())
        .collect();

    Post {
        author_fullname: first_text(&fullname),
        author_username: first_text(&username),
        content: first_text(&content),
        comments,
        retweets,
        likes,
        is_quote_tweet: quote_block.is_some(),
        quote_tweet_author,
        article_links,
        image_links,
        scraped_at: Utc::now(),
    }
}

fn element_text(element: &ElementRef<'_>) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
