mod nitter;

use async_trait::async_trait;

use crate::models::Post;

pub use nitter::{NitterFeed, NitterTimeline};

/// A lazily produced sequence of posts from one account.
#[async_trait]
pub trait PostStream: Send {
    /// `None` when the account has nothing more to offer right now, either
    /// because its timeline is exhausted or because it could not be reached.
    async fn next_post(&mut self) -> Option<Post>;
}

/// Opens post streams for account handles.
pub trait FeedSource: Send + Sync {
    fn subscribe(&self, handle: &str) -> Box<dyn PostStream>;
}
