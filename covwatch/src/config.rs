use serde::Deserialize;
use std::env;
use std::time::Duration;

fn parse_env_or<T: std::str::FromStr>(var: &str, default: T) -> T
where
    T::Err: std::fmt::Display,
{
    match env::var(var) {
        Ok(val) => match val.parse() {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!("Invalid value '{}' for {}: {}. Using default.", val, var, e);
                default
            }
        },
        Err(_) => default,
    }
}

fn parse_env_opt<T: std::str::FromStr>(var: &str) -> Option<T>
where
    T::Err: std::fmt::Display,
{
    match env::var(var) {
        Ok(val) => match val.parse() {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                tracing::warn!("Invalid value '{}' for {}: {}. Ignoring.", val, var, e);
                None
            }
        },
        Err(_) => None,
    }
}

fn parse_env_flag(var: &str, default: bool) -> bool {
    match env::var(var) {
        Ok(val) => match val.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => true,
            "false" | "0" | "no" | "off" => false,
            _ => {
                tracing::warn!("Invalid value '{}' for {}. Using default.", val, var);
                default
            }
        },
        Err(_) => default,
    }
}

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/119.0.0.0 Safari/537.36";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub llm: Option<LlmConfig>,
    pub feed: FeedConfig,
    pub search: SearchConfig,
    pub analysis: AnalysisConfig,
    pub logging: LoggingConfig,
}

/// LLM configuration for chat/completion models
#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
    pub model: String,
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub timeout_secs: u64,
    pub temperature: Option<f32>,
}

/// Where posts are scraped from and how politely.
#[derive(Debug, Clone, Deserialize)]
pub struct FeedConfig {
    pub base_url: String,
    pub user_agent: String,
    pub timeout_secs: u64,
    pub page_delay_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchConfig {
    pub base_url: String,
    pub max_results: usize,
    pub max_queries: usize,
    pub pacing_ms: u64,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AnalysisConfig {
    /// Follow accounts named in relevant posts.
    pub expand_people: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum LogFormat {
    Text,
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_lowercase().as_str() {
            "text" | "pretty" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            other => Err(format!("unknown log format '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub format: LogFormat,
}

impl FeedConfig {
    pub fn page_delay(&self) -> Duration {
        Duration::from_millis(self.page_delay_ms)
    }
}

impl SearchConfig {
    pub fn pacing(&self) -> Duration {
        Duration::from_millis(self.pacing_ms)
    }
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            base_url: "https://nitter.net".to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout_secs: 30,
            page_delay_ms: 1000,
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            base_url: "https://html.duckduckgo.com/html/".to_string(),
            max_results: 2,
            max_queries: 4,
            pacing_ms: 1000,
            timeout_secs: 30,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        let feed_defaults = FeedConfig::default();
        let search_defaults = SearchConfig::default();

        Self {
            llm: env::var("LLM_MODEL").ok().map(|model| LlmConfig {
                model,
                api_key: env::var("LLM_API_KEY").ok(),
                base_url: env::var("LLM_BASE_URL").ok(),
                timeout_secs: parse_env_or("LLM_TIMEOUT", 120),
                temperature: parse_env_opt("LLM_TEMPERATURE"),
            }),
            feed: FeedConfig {
                base_url: env::var("FEED_BASE_URL").unwrap_or(feed_defaults.base_url),
                user_agent: env::var("FEED_USER_AGENT").unwrap_or(feed_defaults.user_agent),
                timeout_secs: parse_env_or("FEED_TIMEOUT", feed_defaults.timeout_secs),
                page_delay_ms: parse_env_or("FEED_PAGE_DELAY_MS", feed_defaults.page_delay_ms),
            },
            search: SearchConfig {
                base_url: env::var("SEARCH_BASE_URL").unwrap_or(search_defaults.base_url),
                max_results: parse_env_or("SEARCH_MAX_RESULTS", search_defaults.max_results),
                max_queries: parse_env_or("SEARCH_MAX_QUERIES", search_defaults.max_queries),
                pacing_ms: parse_env_or("SEARCH_PACING_MS", search_defaults.pacing_ms),
                timeout_secs: parse_env_or("SEARCH_TIMEOUT", search_defaults.timeout_secs),
            },
            analysis: AnalysisConfig {
                expand_people: parse_env_flag("EXPAND_PEOPLE", true),
            },
            logging: LoggingConfig {
                format: parse_env_or("LOG_FORMAT", LogFormat::Text),
            },
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::default()
    }
}

/// Known LLM providers that use OpenAI-compatible APIs
pub const KNOWN_LLM_PROVIDERS: &[&str] = &["openai", "openrouter", "ollama", "lmstudio"];

/// Parse an LLM model name into (provider, model) tuple.
pub fn parse_llm_provider_model(model: &str) -> (&str, &str) {
    if let Some((prefix, rest)) = model.split_once('/') {
        let prefix_lower = prefix.to_lowercase();
        if KNOWN_LLM_PROVIDERS.contains(&prefix_lower.as_str()) {
            return (prefix, rest);
        }
    }
    // Default to treating the whole string as a local model
    ("local", model)
}
