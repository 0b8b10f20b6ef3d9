use std::sync::Arc;

use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer};

use covwatch::config::{Config, LogFormat};
use covwatch::feed::NitterFeed;
use covwatch::intelligence::AnalysisCompiler;
use covwatch::llm::{LlmProvider, StructuredCaller};
use covwatch::search::DuckDuckGoSearch;
use covwatch::services::FrontierDriver;

#[derive(Parser)]
#[command(name = "covwatch")]
#[command(about = "Watch accounts for posts about a subject and analyse them with verified LLM answers")]
struct Args {
    /// Subject the posts are analysed against, e.g. "AI safety"
    subject: String,

    /// Accounts to start from, with or without the leading '@'
    #[arg(required = true)]
    handles: Vec<String>,

    /// Do not follow accounts mentioned in relevant posts
    #[arg(long)]
    no_expand: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    dotenvy::dotenv().ok();

    let config = Config::from_env();

    let fmt_layer = match config.logging.format {
        LogFormat::Text => tracing_subscriber::fmt::layer().boxed(),
        LogFormat::Json => tracing_subscriber::fmt::layer().json().boxed(),
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "covwatch=info".into()),
        )
        .with(fmt_layer)
        .init();

    if let Some(llm_config) = &config.llm {
        tracing::info!("Initializing LLM provider: {}...", llm_config.model);
    }
    let llm = LlmProvider::new(config.llm.as_ref());
    if !llm.is_available() {
        anyhow::bail!("LLM unavailable - set LLM_MODEL (and LLM_API_KEY for hosted providers)");
    }

    let caller = StructuredCaller::new(Arc::new(llm));
    let search = DuckDuckGoSearch::new(&config.search, &config.feed.user_agent)?;
    let feeds = NitterFeed::new(&config.feed)?;

    let compiler = AnalysisCompiler::new(
        args.subject,
        caller,
        Arc::new(search),
        config.search.clone(),
    );
    let expand_people = config.analysis.expand_people && !args.no_expand;
    let mut driver = FrontierDriver::new(compiler, Arc::new(feeds), &args.handles, expand_people)
        .with_idle_delay(config.feed.page_delay());

    let cancel_token = CancellationToken::new();
    tokio::spawn(shutdown_signal(cancel_token.clone()));

    driver.run(cancel_token).await;

    tracing::info!(
        accounts = ?driver.frontier().handles(),
        "Covwatch finished"
    );
    Ok(())
}

async fn shutdown_signal(cancel_token: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, stopping monitoring...");
    cancel_token.cancel();
}
