// Common test utilities for integration tests
#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, Once};
use std::time::Instant;

use async_trait::async_trait;
use serde_json::json;

use covwatch::config::SearchConfig;
use covwatch::error::{CovwatchError, Result};
use covwatch::feed::{FeedSource, PostStream};
use covwatch::intelligence::AnalysisCompiler;
use covwatch::llm::prompts::{ANSWER_QUESTION_PREFIX, REVISE_INSTRUCTION};
use covwatch::llm::{LlmCapability, StructuredCaller};
use covwatch::models::{Post, SearchHit};
use covwatch::search::SearchCapability;

static INIT: Once = Once::new();

/// Initialize tracing subscriber once for tests
pub fn init_test_logger() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .try_init();
    });
}

// Re-export commonly used crates for convenience
pub use serial_test::serial;
pub use wiremock;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Analyst,
    Doubter,
    Verifier,
    PhraseToBool,
    Usernames,
    SearchQueries,
}

impl Role {
    fn from_system_prompt(system: &str) -> Self {
        if system.contains("converts phrases to booleans") {
            Role::PhraseToBool
        } else if system.contains("extracts twitter usernames") {
            Role::Usernames
        } else if system.contains("composes search queries") {
            Role::SearchQueries
        } else if system.contains("fact checker") {
            Role::Doubter
        } else if system.contains("consistency verifier") {
            Role::Verifier
        } else {
            Role::Analyst
        }
    }
}

#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub role: Role,
    pub system: String,
    pub user: String,
}

/// How the scripted model behaves for one test.
#[derive(Debug, Clone)]
pub struct Script {
    pub relevant: bool,
    pub needs_context: bool,
    pub clarifying: Vec<String>,
    /// Returned verbatim by the username extractor.
    pub usernames: Vec<String>,
    pub search_queries: Vec<String>,
    /// Any call whose prompts contain this text fails as unreachable.
    pub fail_on: Option<String>,
}

impl Default for Script {
    fn default() -> Self {
        Self {
            relevant: true,
            needs_context: false,
            clarifying: Vec::new(),
            usernames: Vec::new(),
            search_queries: Vec::new(),
            fail_on: None,
        }
    }
}

/// A fake model that answers every role of the pipeline deterministically.
///
/// Analyst answers to yes/no questions start with "Yes" or "No"; the phrase
/// converter maps that prefix back to a boolean.
pub struct ScriptedLlm {
    script: Script,
    calls: Mutex<Vec<RecordedCall>>,
    current_question: Mutex<String>,
}

impl ScriptedLlm {
    pub fn new(script: Script) -> Arc<Self> {
        Arc::new(Self {
            script,
            calls: Mutex::new(Vec::new()),
            current_question: Mutex::new(String::new()),
        })
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, role: Role) -> usize {
        self.calls().iter().filter(|call| call.role == role).count()
    }

    pub fn roles(&self) -> Vec<Role> {
        self.calls().iter().map(|call| call.role).collect()
    }

    fn analyst_answer(&self, question: &str) -> String {
        if question.starts_with("Would you say this tweet is about") {
            if self.script.relevant {
                "Yes, the tweet is squarely about the subject.".to_string()
            } else {
                "No, the tweet is about something else.".to_string()
            }
        } else if question.starts_with("Could this tweet use more context") {
            if self.script.needs_context {
                "Yes, the announcement refers to events it does not explain.".to_string()
            } else {
                "No, the tweet is self-explanatory.".to_string()
            }
        } else if question.starts_with("What is the overall sentiment") {
            "cautious".to_string()
        } else if question.starts_with("Does the tweet mention") {
            self.script
                .usernames
                .iter()
                .map(|handle| format!("@{}", handle.trim_start_matches('@')))
                .collect::<Vec<_>>()
                .join(" ")
        } else if question.starts_with("What questions would you google") {
            self.script.search_queries.join(", ")
        } else if question.starts_with("Summarize the results") {
            "The results describe a new safety framework.".to_string()
        } else if question.starts_with("Analyse this tweet") {
            "A measured announcement of new safety commitments.".to_string()
        } else if question.starts_with("Do you have any extra insight") {
            "Nothing to add.".to_string()
        } else {
            format!("An answer to: {question}")
        }
    }

    fn respond(&self, role: Role, user: &str) -> serde_json::Value {
        match role {
            Role::PhraseToBool => {
                let phrase = user
                    .strip_prefix("Convert this phrase to a boolean: ")
                    .unwrap_or(user);
                json!({ "value": phrase.starts_with("Yes"), "comments": "" })
            }
            Role::Usernames => json!({ "usernames": self.script.usernames, "comments": "" }),
            Role::SearchQueries => {
                json!({ "search_queries": self.script.search_queries, "comments": "" })
            }
            Role::Doubter => json!({ "questions": self.script.clarifying }),
            Role::Verifier => json!({ "is_consistent": true, "is_inferred_from_context": true }),
            Role::Analyst => {
                let answer = if user == REVISE_INSTRUCTION {
                    let question = self.current_question.lock().unwrap().clone();
                    self.analyst_answer(&question)
                } else if let Some(clarifying) = user.strip_prefix(ANSWER_QUESTION_PREFIX) {
                    format!("Checked: {clarifying}")
                } else {
                    *self.current_question.lock().unwrap() = user.to_string();
                    self.analyst_answer(user)
                };
                json!({ "answer": answer })
            }
        }
    }
}

#[async_trait]
impl LlmCapability for ScriptedLlm {
    async fn complete(&self, system_prompt: &str, user_prompt: &str) -> Result<String> {
        let role = Role::from_system_prompt(system_prompt);
        self.calls.lock().unwrap().push(RecordedCall {
            role,
            system: system_prompt.to_string(),
            user: user_prompt.to_string(),
        });
        if let Some(marker) = &self.script.fail_on {
            if system_prompt.contains(marker.as_str()) || user_prompt.contains(marker.as_str()) {
                return Err(CovwatchError::Transport("model endpoint unreachable".to_string()));
            }
        }
        Ok(self.respond(role, user_prompt).to_string())
    }
}

#[derive(Debug, Clone)]
pub struct SearchCall {
    pub query: String,
    pub max_results: usize,
    pub at: Instant,
}

/// Returns `max_results` synthetic hits per query and remembers every call.
#[derive(Default)]
pub struct RecordingSearch {
    calls: Mutex<Vec<SearchCall>>,
}

impl RecordingSearch {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn calls(&self) -> Vec<SearchCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl SearchCapability for RecordingSearch {
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchHit>> {
        self.calls.lock().unwrap().push(SearchCall {
            query: query.to_string(),
            max_results,
            at: Instant::now(),
        });
        Ok((0..max_results)
            .map(|i| SearchHit {
                title: format!("{query} #{i}"),
                href: format!("https://example.com/{i}"),
                body: format!("Result {i} for {query}"),
            })
            .collect())
    }
}

/// Posts served from memory, per handle. Unknown handles get an empty stream.
#[derive(Default)]
pub struct VecFeed {
    posts: Mutex<HashMap<String, Vec<Post>>>,
    subscriptions: Mutex<Vec<String>>,
}

impl VecFeed {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_posts(self: Arc<Self>, handle: &str, posts: Vec<Post>) -> Arc<Self> {
        self.posts.lock().unwrap().insert(handle.to_string(), posts);
        self
    }

    pub fn subscriptions(&self) -> Vec<String> {
        self.subscriptions.lock().unwrap().clone()
    }
}

impl FeedSource for VecFeed {
    fn subscribe(&self, handle: &str) -> Box<dyn PostStream> {
        self.subscriptions.lock().unwrap().push(handle.to_string());
        let posts = self
            .posts
            .lock()
            .unwrap()
            .remove(handle)
            .unwrap_or_default();
        Box::new(VecStream {
            posts: posts.into(),
        })
    }
}

pub struct VecStream {
    posts: VecDeque<Post>,
}

#[async_trait]
impl PostStream for VecStream {
    async fn next_post(&mut self) -> Option<Post> {
        self.posts.pop_front()
    }
}

pub fn fast_search_config() -> SearchConfig {
    SearchConfig {
        pacing_ms: 20,
        ..SearchConfig::default()
    }
}

pub fn compiler(
    subject: &str,
    llm: Arc<ScriptedLlm>,
    search: Arc<RecordingSearch>,
    search_config: SearchConfig,
) -> AnalysisCompiler {
    AnalysisCompiler::new(subject, StructuredCaller::new(llm), search, search_config)
}
