use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::feed::FeedSource;
use crate::intelligence::AnalysisCompiler;
use crate::models::AnalysisRecord;

use super::frontier::AccountFrontier;

/// What one walk over the frontier produced.
#[derive(Debug, Default)]
pub struct PassReport {
    /// Posts pulled from feeds during the pass.
    pub posts_seen: usize,
    pub records: Vec<AnalysisRecord>,
    /// Handles subscribed because a record named them. A non-empty list ends
    /// the pass early so the next one starts from the first account.
    pub added: Vec<String>,
    pub cancelled: bool,
}

/// The outer loop: pull a post per account, analyse it, follow new people.
pub struct FrontierDriver {
    compiler: AnalysisCompiler,
    feeds: Arc<dyn FeedSource>,
    frontier: AccountFrontier,
    expand_people: bool,
    idle_delay: Duration,
}

impl FrontierDriver {
    pub fn new<I, S>(
        compiler: AnalysisCompiler,
        feeds: Arc<dyn FeedSource>,
        seeds: I,
        expand_people: bool,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut frontier = AccountFrontier::new();
        for seed in seeds {
            let handle = seed.as_ref().trim_start_matches('@');
            frontier.insert(handle, feeds.subscribe(handle));
        }

        Self {
            compiler,
            feeds,
            frontier,
            expand_people,
            idle_delay: Duration::from_secs(1),
        }
    }

    /// Pause taken after a pass in which no feed produced anything.
    pub fn with_idle_delay(mut self, idle_delay: Duration) -> Self {
        self.idle_delay = idle_delay;
        self
    }

    pub fn frontier(&self) -> &AccountFrontier {
        &self.frontier
    }

    /// Runs passes until `cancel` fires. There is no other way out.
    pub async fn run(&mut self, cancel: CancellationToken) {
        info!(
            subject = self.compiler.subject(),
            accounts = ?self.frontier.handles(),
            "Monitoring started"
        );

        loop {
            let report = tokio::select! {
                _ = cancel.cancelled() => break,
                report = self.run_pass(&cancel) => report,
            };

            if report.cancelled {
                break;
            }

            for record in &report.records {
                match serde_json::to_string(record) {
                    Ok(json) => info!(record = %json, "Analysis record"),
                    Err(e) => error!(error = %e, "Failed to serialize analysis record"),
                }
            }

            if !report.added.is_empty() {
                info!(added = ?report.added, accounts = ?self.frontier.handles(), "Expanded search");
            }

            if report.posts_seen == 0 {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = tokio::time::sleep(self.idle_delay) => {}
                }
            }
        }

        info!("Monitoring stopped");
    }

    /// Visits each account once, in frontier order, unless new accounts are
    /// discovered first.
    pub async fn run_pass(&mut self, cancel: &CancellationToken) -> PassReport {
        let mut report = PassReport::default();
        let mut index = 0;

        while index < self.frontier.len() {
            if cancel.is_cancelled() {
                report.cancelled = true;
                return report;
            }

            let Some((handle, stream)) = self.frontier.get_mut(index) else {
                break;
            };
            let handle = handle.to_string();
            index += 1;

            info!(
                subject = self.compiler.subject(),
                account = %handle,
                "Searching for posts"
            );
            let Some(post) = stream.next_post().await else {
                debug!(account = %handle, "No post available");
                continue;
            };
            report.posts_seen += 1;

            let record = match self.compiler.compile(&post).await {
                Ok(Some(record)) => record,
                Ok(None) => continue,
                Err(e) if e.is_transport() => {
                    warn!(account = %handle, error = %e, "Collaborator unreachable, moving on");
                    continue;
                }
                Err(e) if e.is_schema_parse() => {
                    warn!(account = %handle, error = %e, "Unusable model response, moving on");
                    continue;
                }
                Err(e) => {
                    warn!(account = %handle, error = %e, "Analysis failed, moving on");
                    continue;
                }
            };

            let added = if self.expand_people {
                self.expand(&record.related_people)
            } else {
                Vec::new()
            };
            report.records.push(record);

            if !added.is_empty() {
                report.added = added;
                return report;
            }
        }

        report
    }

    fn expand(&mut self, related_people: &[String]) -> Vec<String> {
        let mut added = Vec::new();
        for handle in related_people {
            if self.frontier.contains(handle) {
                continue;
            }
            let stream = self.feeds.subscribe(handle);
            if self.frontier.insert(handle.clone(), stream) {
                added.push(handle.clone());
            }
        }
        added
    }
}
