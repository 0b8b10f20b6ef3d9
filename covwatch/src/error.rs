use thiserror::Error;

#[derive(Error, Debug)]
pub enum CovwatchError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Schema parse error: {0}")]
    SchemaParse(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("LLM unavailable: {0}")]
    LlmUnavailable(String),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),
}

impl CovwatchError {
    /// True when a collaborator (LLM, search, feed) could not be reached or failed to answer.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            CovwatchError::Transport(_) | CovwatchError::LlmUnavailable(_)
        )
    }

    pub fn is_schema_parse(&self) -> bool {
        matches!(self, CovwatchError::SchemaParse(_))
    }
}

pub type Result<T> = std::result::Result<T, CovwatchError>;
