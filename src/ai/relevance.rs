use std::sync::OnceLock;
use std::time::Duration;

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use regex::Regex;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::models::RawArticle;

const GEMINI_API_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";
const GEMINI_MODEL: &str = "gemini-2.0-flash";

// How many validation calls may be in flight at once. Keeps the provider's
// rate limit honored while avoiding a fully serial run.
const MAX_IN_FLIGHT: usize = 4;

static JSON_OBJECT_RE: OnceLock<Regex> = OnceLock::new();

/// External AI relevance service.
#[async_trait]
pub trait RelevanceCheck: Send + Sync {
    async fn validate(&self, title: &str, description: &str, source: &str) -> Result<Validation>;
}

/// Verdict for one article. Confidence is on a 0-100 scale.
#[derive(Debug, Clone, Deserialize)]
pub struct Validation {
    #[serde(alias = "isAutomotive", alias = "isRelevant")]
    pub is_relevant: bool,
    pub confidence: f64,
    #[serde(default)]
    pub reason: String,
}

#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct Part {
    text: String,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f64,
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<ResponseCandidate>,
}

#[derive(Debug, Deserialize)]
struct ResponseCandidate {
    content: ResponseContent,
}

#[derive(Debug, Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: String,
}

pub struct GeminiClient {
    client: Client,
    api_key: Option<String>,
}

impl GeminiClient {
    pub fn new(api_key: Option<String>, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to create HTTP client");
        Self { client, api_key }
    }

    fn build_prompt(title: &str, description: &str, source: &str) -> String {
        format!(
            r#"Você é o Editor Chefe de uma concessionária de supercarros e veículos premium.

O feed de notícias é EXCLUSIVAMENTE sobre o MUNDO AUTOMOTIVO PREMIUM e FORMULA 1.

Analise a seguinte notícia:
Título: "{title}"
Descrição: "{description}"
Fonte: "{source}"

APROVAR (isRelevant = true) SOMENTE SE:
- Notícia sobre supercarros, hypercars ou veículos de luxo — lançamentos, testes, recordes, leilões de carros.
- Notícia sobre Fórmula 1 — pilotos, corridas, equipes, tecnologia, bastidores, calendário.
- Notícia sobre o mercado automotivo premium — vendas, tendências, novos modelos, fábricas, recalls de marcas premium.
- Notícia sobre eventos automotivos — salões, exposições de carros, track days, encontros de supercarros.

REJEITAR (isRelevant = false) SE:
- Colunas sociais, notas de inauguração de lojas, eventos de celebridades.
- Artigos que apenas MENCIONAM marcas de luxo como exemplo mas NÃO são sobre os produtos em si.
- Relógios, joias, moda, gastronomia — mesmo sendo "luxo".
- Carros populares, trânsito, IPVA, multas, Uber.
- Crime, polícia, roubos, mortes, tragédias.
- Política, escândalos, fofoca.
- Notícias puramente negativas ou deprimentes.

Retorne APENAS um JSON neste formato, sem markdown:
{{
  "isRelevant": boolean,
  "confidence": number (de 0 a 100),
  "reason": "string curta explicando a decisão"
}}"#
        )
    }
}

/// Extract and parse the first JSON object embedded in the model's reply.
/// Confidence returned on a 0-1 scale is normalized to 0-100.
pub(crate) fn parse_validation(text: &str) -> Result<Validation> {
    let re = JSON_OBJECT_RE.get_or_init(|| Regex::new(r"(?s)\{.*\}").expect("valid regex"));

    let json = re
        .find(text)
        .map(|m| m.as_str())
        .ok_or_else(|| AppError::RelevanceApi(format!("No JSON object in response: {}", text)))?;

    let mut validation: Validation = serde_json::from_str(json)?;

    if validation.confidence > 0.0 && validation.confidence <= 1.0 {
        validation.confidence = (validation.confidence * 100.0).round();
    }

    Ok(validation)
}

#[async_trait]
impl RelevanceCheck for GeminiClient {
    async fn validate(&self, title: &str, description: &str, source: &str) -> Result<Validation> {
        let api_key = match &self.api_key {
            Some(key) => key,
            None => {
                // Operator chose to run without AI validation
                tracing::warn!("No Gemini API key, skipping AI validation");
                return Ok(Validation {
                    is_relevant: true,
                    confidence: 100.0,
                    reason: "AI validation disabled - no API key".to_string(),
                });
            }
        };

        let description = if description.is_empty() {
            "Sem descrição"
        } else {
            description
        };

        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: Self::build_prompt(title, description, source),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: 0.1,
                max_output_tokens: 200,
            },
        };

        let response = self
            .client
            .post(format!(
                "{}/{}:generateContent?key={}",
                GEMINI_API_URL, GEMINI_MODEL, api_key
            ))
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(AppError::RelevanceApi(format!(
                "HTTP {}",
                response.status()
            )));
        }

        let body: GenerateResponse = response.json().await?;

        let text = body
            .candidates
            .into_iter()
            .next()
            .map(|c| {
                c.content
                    .parts
                    .into_iter()
                    .map(|p| p.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        parse_validation(&text)
    }
}

/// Validate candidates against the relevance service with bounded
/// concurrency, keeping input order. Accepts only confident approvals;
/// a failed call rejects that candidate (fail-closed) without stopping
/// the rest of the batch.
pub async fn filter_relevant<V>(
    validator: &V,
    articles: Vec<RawArticle>,
    min_confidence: u32,
) -> Vec<RawArticle>
where
    V: RelevanceCheck + ?Sized,
{
    let results: Vec<(RawArticle, Result<Validation>)> = stream::iter(articles)
        .map(|article| async move {
            let verdict = validator
                .validate(&article.title, &article.description, &article.source_name)
                .await;
            (article, verdict)
        })
        .buffered(MAX_IN_FLIGHT)
        .collect()
        .await;

    let mut accepted = Vec::new();
    for (article, verdict) in results {
        match verdict {
            Ok(v) if v.is_relevant && v.confidence >= min_confidence as f64 => {
                accepted.push(article);
            }
            Ok(v) => {
                tracing::info!(
                    title = %title_prefix(&article.title),
                    confidence = v.confidence,
                    reason = %v.reason,
                    "AI rejected article"
                );
            }
            Err(e) => {
                tracing::warn!(
                    title = %title_prefix(&article.title),
                    error = %e,
                    "Relevance check failed, rejecting article"
                );
            }
        }
    }

    accepted
}

fn title_prefix(title: &str) -> &str {
    title
        .char_indices()
        .nth(60)
        .map(|(i, _)| &title[..i])
        .unwrap_or(title)
}
