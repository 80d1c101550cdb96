use std::time::Duration;

use chrono::Utc;

mod ai;
mod config;
mod db;
mod error;
mod models;
mod news;
mod pipeline;

use ai::relevance::GeminiClient;
use config::Config;
use db::Repository;
use error::Result;
use news::client::GNewsClient;

#[tokio::main]
async fn main() -> Result<()> {
    // Log to stderr so stdout carries only the JSON run report
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = Config::load()?;

    let gnews_api_key = config.gnews_api_key.clone().ok_or_else(|| {
        anyhow::anyhow!("gnews_api_key is not set (config file or GNEWS_API_KEY env var)")
    })?;

    let timeout = Duration::from_secs(config.request_timeout_secs);
    let repo = Repository::new(&config.db_path).await?;
    let search = GNewsClient::new(
        gnews_api_key,
        config.language.clone(),
        config.country.clone(),
        config.max_per_query,
        timeout,
    );
    let validator = GeminiClient::new(config.gemini_api_key.clone(), timeout);

    let today = Utc::now().date_naive();
    let report = pipeline::run_ingestion(&config, &repo, &search, &validator, today).await;

    println!("{}", serde_json::to_string_pretty(&report)?);

    if !report.success {
        std::process::exit(1);
    }

    Ok(())
}
