//! Stock news sentinel — binary entrypoint.
//! Loads configuration, wires the adapters into the scheduler and polls until Ctrl+C.

use std::sync::Arc;

use anyhow::Context;
use stock_news_sentinel::config::AppConfig;
use stock_news_sentinel::ingest::providers::dart::{CorpCodeMap, DartAdapter};
use stock_news_sentinel::ingest::providers::google_news::GoogleNewsAdapter;
use stock_news_sentinel::notify::TelegramNotifier;
use stock_news_sentinel::scheduler::{Scheduler, SchedulerSettings};
use stock_news_sentinel::sentiment::SentimentClassifier;
use stock_news_sentinel::state::StateStore;
use stock_news_sentinel::summarize::OpenAiSummarizer;
use stock_news_sentinel::telemetry;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env in local/dev; no-op when the file is absent.
    let _ = dotenvy::dotenv();
    telemetry::init_tracing();

    let cfg = match AppConfig::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::error!(error = %e, "invalid configuration");
            eprintln!("configuration error: {e}");
            std::process::exit(2);
        }
    };
    tracing::info!(?cfg, "configuration loaded");

    let http = reqwest::Client::builder()
        .user_agent(concat!("stock-news-sentinel/", env!("CARGO_PKG_VERSION")))
        .timeout(cfg.http_timeout)
        .build()
        .context("building http client")?;

    let corp_codes = match CorpCodeMap::load_or_download(
        &http,
        &cfg.credentials.dart_api_key,
        &cfg.corp_map_path,
    )
    .await
    {
        Ok(map) => {
            tracing::info!(companies = map.len(), "dart corp codes ready");
            map
        }
        Err(e) => {
            // Every registry fetch then fails with UnknownEntity and is counted per cycle.
            tracing::error!(error = %e, "dart corp code map unavailable");
            CorpCodeMap::default()
        }
    };

    let notifier = TelegramNotifier::new(
        http.clone(),
        cfg.credentials.telegram_token.clone(),
        cfg.credentials.chat_id.clone(),
    )
    .with_timeout(cfg.http_timeout.as_secs().max(1));
    let summarizer = OpenAiSummarizer::new(
        cfg.credentials.openai_api_key.clone(),
        cfg.openai_model.clone(),
        cfg.http_timeout,
    )
    .context("building summarizer")?
    .with_window(cfg.digest_interval);

    let mut scheduler = Scheduler::new(
        SchedulerSettings::from(&cfg),
        cfg.watch_list.clone(),
        SentimentClassifier::new(&cfg.keywords),
        Arc::new(notifier),
        Arc::new(summarizer),
        StateStore::new(cfg.state_path.clone()),
    )
    .with_source(Box::new(GoogleNewsAdapter::new(
        http.clone(),
        cfg.max_article_age,
    )))
    .with_source(Box::new(DartAdapter::new(
        http,
        cfg.credentials.dart_api_key.clone(),
        corp_codes,
        cfg.max_article_age,
    )));
    scheduler.load_state().await;

    scheduler
        .run(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::warn!(error = %e, "ctrl-c handler unavailable");
                std::future::pending::<()>().await;
            }
        })
        .await;

    tracing::info!("stopped");
    Ok(())
}
