use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;

use crate::error::{AppError, Result};
use crate::models::{Category, RawArticle};

const GNEWS_SEARCH_URL: &str = "https://gnews.io/api/v4/search";

/// The curated searches run every cycle. The category is only a hint for
/// ordering; articles are classified from their actual text later.
pub const SEARCH_QUERIES: &[(&str, Category)] = &[
    ("Formula 1 OR F1 OR Grand Prix", Category::Formula1),
    (
        "supercar OR hypercar OR Ferrari OR Lamborghini OR Porsche",
        Category::PremiumMarket,
    ),
    ("carro luxo OR mercado automotivo premium", Category::PremiumMarket),
];

/// External news-search service.
#[async_trait]
pub trait NewsSearch: Send + Sync {
    async fn search(&self, query: &str) -> Result<Vec<RawArticle>>;
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[allow(dead_code)]
    #[serde(rename = "totalArticles", default)]
    total_articles: u32,
    #[serde(default)]
    articles: Vec<ApiArticle>,
}

#[derive(Debug, Deserialize)]
struct ApiArticle {
    title: String,
    #[serde(default)]
    description: String,
    url: String,
    image: Option<String>,
    #[serde(rename = "publishedAt")]
    published_at: DateTime<Utc>,
    source: ApiSource,
}

#[derive(Debug, Deserialize)]
struct ApiSource {
    name: String,
}

pub struct GNewsClient {
    client: Client,
    api_key: String,
    language: String,
    country: String,
    max_results: u32,
}

impl GNewsClient {
    pub fn new(
        api_key: String,
        language: String,
        country: String,
        max_results: u32,
        timeout: Duration,
    ) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(5))
            .user_agent("attra-news/1.0")
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            api_key,
            language,
            country,
            max_results,
        }
    }
}

#[async_trait]
impl NewsSearch for GNewsClient {
    async fn search(&self, query: &str) -> Result<Vec<RawArticle>> {
        let max = self.max_results.to_string();
        let response = self
            .client
            .get(GNEWS_SEARCH_URL)
            .query(&[
                ("q", query),
                ("lang", self.language.as_str()),
                ("country", self.country.as_str()),
                ("max", max.as_str()),
                ("apikey", self.api_key.as_str()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(AppError::NewsApi(format!(
                "HTTP {} for query \"{}\"",
                response.status(),
                query
            )));
        }

        let body: SearchResponse = response.json().await?;

        let articles = body
            .articles
            .into_iter()
            .map(|a| RawArticle {
                title: a.title,
                description: a.description,
                url: a.url,
                image_url: a.image,
                source_name: a.source.name,
                published_at: a.published_at,
            })
            .collect();

        Ok(articles)
    }
}

/// Run every curated query in order, tolerating per-query failure. A failed
/// query contributes zero articles and one warning string; later queries
/// still run.
pub async fn fetch_candidates<S>(search: &S) -> (Vec<RawArticle>, Vec<String>)
where
    S: NewsSearch + ?Sized,
{
    let mut articles = Vec::new();
    let mut warnings = Vec::new();

    for (query, _hint) in SEARCH_QUERIES.iter().copied() {
        match search.search(query).await {
            Ok(batch) => {
                tracing::debug!(query, count = batch.len(), "Fetched search results");
                articles.extend(batch);
            }
            Err(e) => {
                tracing::warn!(query, error = %e, "Search query failed");
                warnings.push(format!("Failed to fetch \"{}\": {}", query, e));
            }
        }
    }

    (articles, warnings)
}
