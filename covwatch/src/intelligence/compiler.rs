use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::SearchConfig;
use crate::error::{CovwatchError, Result};
use crate::llm::prompts;
use crate::llm::StructuredCaller;
use crate::models::{
    hits_to_prompt_text, AnalysisRecord, CompilationEntry, CompiledAnswer, ConversationContext,
    Post,
};
use crate::search::SearchCapability;

use super::converter::PhraseConverter;
use super::cov::ChainOfVerification;

const RELEVANCE: usize = 0;
const SENTIMENT: usize = 1;
const NEEDS_CONTEXT: usize = 2;
const RELATED_PEOPLE: usize = 3;
const ANALYSIS: usize = 4;
const EXTRA: usize = 5;

/// Builds an [`AnalysisRecord`] for a post by running the verification chain
/// over a fixed battery of questions.
///
/// Every question gets its own fresh [`ConversationContext`]; nothing learned
/// about one post leaks into the next.
pub struct AnalysisCompiler {
    subject: String,
    cov: ChainOfVerification,
    converter: PhraseConverter,
    search: Arc<dyn SearchCapability>,
    search_config: SearchConfig,
}

impl AnalysisCompiler {
    pub fn new(
        subject: impl Into<String>,
        caller: StructuredCaller,
        search: Arc<dyn SearchCapability>,
        search_config: SearchConfig,
    ) -> Self {
        Self {
            subject: subject.into(),
            cov: ChainOfVerification::new(caller.clone()),
            converter: PhraseConverter::new(caller),
            search,
            search_config,
        }
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn converter(&self) -> &PhraseConverter {
        &self.converter
    }

    /// `Ok(None)` when the post is not about the subject.
    pub async fn compile(&self, post: &Post) -> Result<Option<AnalysisRecord>> {
        let post_text = post.to_prompt_text();
        let subject = self.subject.as_str();
        let mut compilation: Vec<CompilationEntry> = Vec::with_capacity(6);

        let question = prompts::relevance_question(subject);
        let answer = self
            .ask(&post_text, &question, ConversationContext::new())
            .await?;
        compilation.push(text_entry(question, answer.clone()));

        if !self.converter.phrase_to_bool(&answer).await? {
            info!(subject, "Post is not about the subject, skipping analysis");
            return Ok(None);
        }

        let answer = self
            .ask(
                &post_text,
                prompts::SENTIMENT_QUESTION,
                ConversationContext::with_notes([prompts::SENTIMENT_HINT]),
            )
            .await?;
        compilation.push(text_entry(prompts::SENTIMENT_QUESTION, answer));

        let answer = self
            .ask(
                &post_text,
                prompts::NEEDS_CONTEXT_QUESTION,
                ConversationContext::new(),
            )
            .await?;
        compilation.push(text_entry(prompts::NEEDS_CONTEXT_QUESTION, answer.clone()));

        let enrichment = if self.converter.phrase_to_bool(&answer).await? {
            info!("Post needs more context, searching the web");
            Some(self.search_enrichment(&post_text).await?)
        } else {
            None
        };

        let answer = self
            .ask(
                &post_text,
                prompts::RELATED_PEOPLE_QUESTION,
                ConversationContext::with_notes([prompts::RELATED_PEOPLE_HINT]),
            )
            .await?;
        let handles = self.converter.extract_usernames(&answer).await?;
        compilation.push(CompilationEntry {
            question: prompts::RELATED_PEOPLE_QUESTION.to_string(),
            answer: CompiledAnswer::Handles(handles),
        });

        let question = prompts::analysis_question(subject);
        let mut notes = vec![
            prompts::ANALYSIS_HINT.to_string(),
            format!(
                "{}{}",
                prompts::GUIDING_QUESTIONS_PREFIX,
                render_compilation(&compilation)
            ),
        ];
        if let Some(summary) = &enrichment {
            notes.push(format!("{}{summary}", prompts::ENRICHMENT_PREFIX));
        }
        let answer = self
            .ask(&post_text, &question, ConversationContext::with_notes(notes))
            .await?;
        compilation.push(text_entry(question, answer));

        let mut transcript = ConversationContext::new();
        for entry in &compilation {
            transcript.push_exchange(entry.question.clone(), entry.answer.to_string());
        }
        let answer = self
            .ask(&post_text, prompts::EXTRA_QUESTION, transcript)
            .await?;
        compilation.push(text_entry(prompts::EXTRA_QUESTION, answer));

        self.assemble(post, compilation).await.map(Some)
    }

    async fn ask(
        &self,
        post_text: &str,
        question: &str,
        mut context: ConversationContext,
    ) -> Result<String> {
        self.cov
            .run(post_text, &self.subject, question, &mut context)
            .await
    }

    /// Composes search queries, runs them with a fixed pause in between and
    /// returns a verified summary of everything found.
    async fn search_enrichment(&self, post_text: &str) -> Result<String> {
        let answer = self
            .ask(
                post_text,
                &prompts::search_terms_question(&self.subject),
                ConversationContext::with_notes([prompts::search_terms_hint(
                    self.search_config.max_queries,
                )]),
            )
            .await?;

        let mut queries = self.converter.compose_search_queries(&answer).await?;
        queries.truncate(self.search_config.max_queries);

        let mut hits = Vec::new();
        for (index, query) in queries.iter().enumerate() {
            if index > 0 {
                tokio::time::sleep(self.search_config.pacing()).await;
            }
            debug!(query = %query, "Searching the web");
            hits.extend(
                self.search
                    .search(query, self.search_config.max_results)
                    .await?,
            );
        }
        info!(queries = queries.len(), hits = hits.len(), "Web search finished");

        self.ask(
            &hits_to_prompt_text(&hits),
            prompts::SEARCH_SUMMARY_QUESTION,
            ConversationContext::with_notes([prompts::SEARCH_SUMMARY_HINT]),
        )
        .await
    }

    /// Relevance and context needs are converted again from the stored
    /// answers rather than reusing the booleans computed along the way.
    async fn assemble(
        &self,
        post: &Post,
        compilation: Vec<CompilationEntry>,
    ) -> Result<AnalysisRecord> {
        let relevance = self
            .converter
            .phrase_to_bool(entry_text(&compilation, RELEVANCE)?)
            .await?;
        let needs_context = self
            .converter
            .phrase_to_bool(entry_text(&compilation, NEEDS_CONTEXT)?)
            .await?;

        let related_people = match compilation.get(RELATED_PEOPLE).map(|entry| &entry.answer) {
            Some(CompiledAnswer::Handles(handles)) => handles.clone(),
            _ => Vec::new(),
        };

        let record = AnalysisRecord {
            id: Uuid::new_v4(),
            post: post.clone(),
            analysis: entry_text(&compilation, ANALYSIS)?.to_string(),
            relevance,
            needs_context,
            sentiment: entry_text(&compilation, SENTIMENT)?.to_string(),
            related_people,
            extra: entry_text(&compilation, EXTRA)?.to_string(),
            transcript: compilation,
            analyzed_at: Utc::now(),
        };

        info!(
            record_id = %record.id,
            sentiment = %record.sentiment,
            needs_context = record.needs_context,
            related_people = ?record.related_people,
            "Analysis compiled"
        );
        Ok(record)
    }
}

fn text_entry(question: impl Into<String>, answer: String) -> CompilationEntry {
    CompilationEntry {
        question: question.into(),
        answer: CompiledAnswer::Text(answer),
    }
}

fn entry_text(compilation: &[CompilationEntry], index: usize) -> Result<&str> {
    compilation
        .get(index)
        .and_then(|entry| entry.answer.as_text())
        .ok_or_else(|| CovwatchError::Validation(format!("Compilation entry {index} is missing")))
}

fn render_compilation(compilation: &[CompilationEntry]) -> String {
    compilation
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}
