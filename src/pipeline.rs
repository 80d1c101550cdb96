use chrono::{Datelike, Days, NaiveDate};
use uuid::Uuid;

use crate::ai::relevance::{filter_relevant, RelevanceCheck};
use crate::config::Config;
use crate::db::{InsertOutcome, Repository};
use crate::error::Result;
use crate::models::{Candidate, Category, NewArticle, RunReport};
use crate::news::classify::classify;
use crate::news::client::{fetch_candidates, NewsSearch};
use crate::news::dedup::{dedup_by_similarity, dedup_by_url, fold_diacritics};
use crate::news::featured::select_featured;
use crate::news::filter::should_exclude;

/// Calendar boundaries of the cycle containing `today`: Sunday through
/// Saturday, date-only.
pub fn week_range(today: NaiveDate) -> (NaiveDate, NaiveDate) {
    let days_from_sunday = today.weekday().num_days_from_sunday() as u64;
    let week_start = today - Days::new(days_from_sunday);
    (week_start, week_start + Days::new(6))
}

/// URL-friendly slug: lowercased, accents folded, non-alphanumerics
/// collapsed to hyphens, capped at 80 chars, suffixed with the first 8
/// chars of the article id for uniqueness.
pub fn generate_slug(title: &str, id: &str) -> String {
    let mut base = String::new();
    for c in title.to_lowercase().chars().map(fold_diacritics) {
        if c.is_ascii_alphanumeric() {
            base.push(c);
        } else if !base.is_empty() && !base.ends_with('-') {
            base.push('-');
        }
    }
    let base: String = base.trim_end_matches('-').chars().take(80).collect();
    let base = base.trim_end_matches('-');

    let short_id = &id[..id.len().min(8)];
    format!("{}-{}", base, short_id)
}

/// Run one full ingestion: fetch, dedup, filter, validate, classify, pick
/// featured, persist, promote. Never returns an error; any residual failure
/// becomes a `success: false` report.
pub async fn run_ingestion<S, V>(
    config: &Config,
    repo: &Repository,
    search: &S,
    validator: &V,
    today: NaiveDate,
) -> RunReport
where
    S: NewsSearch + ?Sized,
    V: RelevanceCheck + ?Sized,
{
    match run_inner(config, repo, search, validator, today).await {
        Ok(report) => report,
        Err(e) => {
            tracing::error!(error = %e, "Ingestion run failed");
            RunReport::failed(vec![e.to_string()])
        }
    }
}

async fn run_inner<S, V>(
    config: &Config,
    repo: &Repository,
    search: &S,
    validator: &V,
    today: NaiveDate,
) -> Result<RunReport>
where
    S: NewsSearch + ?Sized,
    V: RelevanceCheck + ?Sized,
{
    let (week_start, week_end) = week_range(today);
    tracing::info!(%week_start, %week_end, "Starting ingestion");

    // Structural failure: without a cycle record there is nothing to commit
    // into, so this error aborts the run.
    let cycle = repo.get_or_create_cycle(week_start, week_end).await?;

    let (fetched, mut errors) = fetch_candidates(search).await;
    tracing::info!(count = fetched.len(), "Fetched candidate articles");

    let unique = dedup_by_url(fetched);
    let deduped = dedup_by_similarity(unique, config.similarity_threshold);
    tracing::info!(count = deduped.len(), "Candidates after deduplication");

    let kept: Vec<_> = deduped
        .into_iter()
        .filter(|article| {
            let exclude = should_exclude(&article.title, &article.description);
            if exclude {
                tracing::info!(title = %article.title, "Keyword pre-filter excluded article");
            }
            !exclude
        })
        .collect();
    tracing::info!(count = kept.len(), "Candidates after keyword pre-filter");

    let validated = filter_relevant(validator, kept, config.min_confidence).await;
    tracing::info!(count = validated.len(), "Candidates after AI validation");

    let candidates: Vec<Candidate> = validated
        .into_iter()
        .map(|article| {
            let category = classify(&article.title, &article.description);
            Candidate { article, category }
        })
        .collect();

    let featured_urls = select_featured(&candidates, config.featured_count);

    let mut inserted = 0u32;
    for candidate in &candidates {
        let article = &candidate.article;
        let featured_position = featured_urls.iter().position(|url| *url == article.url);
        let is_featured = featured_position.is_some();

        let id = Uuid::new_v4().to_string();
        let row = NewArticle {
            slug: generate_slug(&article.title, &id),
            id,
            cycle_id: cycle.id.clone(),
            category_id: if is_featured {
                Category::Highlight.id()
            } else {
                candidate.category.id()
            },
            title: article.title.clone(),
            description: article.description.clone(),
            image_url: article.image_url.clone(),
            source_name: article.source_name.clone(),
            original_url: article.url.clone(),
            published_at: article.published_at,
            is_featured,
            featured_order: featured_position.map(|i| i as u32 + 1),
        };

        match repo.insert_article(row).await {
            Ok(InsertOutcome::Inserted) => inserted += 1,
            Ok(InsertOutcome::AlreadyExists) => {
                tracing::debug!(url = %article.url, "Article already stored, skipping");
            }
            Err(e) => {
                errors.push(format!("Failed to insert \"{}\": {}", article.title, e));
            }
        }
    }
    tracing::info!(inserted, "Inserted articles");

    if let Err(e) = repo.activate_cycle(&cycle.id).await {
        errors.push(format!("Failed to activate cycle {}: {}", cycle.id, e));
        return Ok(RunReport {
            success: false,
            cycle_id: Some(cycle.id),
            articles_inserted: inserted,
            errors,
        });
    }
    tracing::info!(cycle_id = %cycle.id, "Activated cycle");

    Ok(RunReport {
        success: true,
        cycle_id: Some(cycle.id),
        articles_inserted: inserted,
        errors,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::relevance::Validation;
    use crate::error::{AppError, Result};
    use crate::models::RawArticle;
    use crate::news::client::SEARCH_QUERIES;
    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};
    use std::collections::HashMap;

    #[test]
    fn week_runs_sunday_through_saturday() {
        // 2025-03-05 is a Wednesday
        let (start, end) = week_range(NaiveDate::from_ymd_opt(2025, 3, 5).unwrap());
        assert_eq!(start, NaiveDate::from_ymd_opt(2025, 3, 2).unwrap());
        assert_eq!(end, NaiveDate::from_ymd_opt(2025, 3, 8).unwrap());
    }

    #[test]
    fn sunday_starts_its_own_week() {
        let sunday = NaiveDate::from_ymd_opt(2025, 3, 2).unwrap();
        let (start, end) = week_range(sunday);
        assert_eq!(start, sunday);
        assert_eq!(end, NaiveDate::from_ymd_opt(2025, 3, 8).unwrap());
    }

    #[test]
    fn slug_folds_accents_and_appends_short_id() {
        let slug = generate_slug(
            "Leilão milionário: Ferrari é vendida!",
            "123e4567-e89b-12d3-a456-426614174000",
        );
        assert_eq!(slug, "leilao-milionario-ferrari-e-vendida-123e4567");
    }

    #[test]
    fn slug_is_length_capped() {
        let slug = generate_slug(&"palavra ".repeat(30), "abcdef0123456789");
        let base = slug.rsplit_once('-').unwrap().0;
        assert!(base.len() <= 80);
        assert!(slug.ends_with("-abcdef01"));
    }

    // Scripted stand-ins for the two external services

    struct ScriptedSearch {
        responses: HashMap<String, Vec<RawArticle>>,
        failing: Vec<String>,
    }

    #[async_trait]
    impl NewsSearch for ScriptedSearch {
        async fn search(&self, query: &str) -> Result<Vec<RawArticle>> {
            if self.failing.iter().any(|q| q == query) {
                return Err(AppError::NewsApi("simulated network error".to_string()));
            }
            Ok(self.responses.get(query).cloned().unwrap_or_default())
        }
    }

    /// Accepts everything at the given confidence unless the title has a
    /// scripted override.
    struct ScriptedValidator {
        default_confidence: f64,
        overrides: HashMap<String, Validation>,
    }

    impl ScriptedValidator {
        fn accepting() -> Self {
            Self {
                default_confidence: 95.0,
                overrides: HashMap::new(),
            }
        }
    }

    #[async_trait]
    impl RelevanceCheck for ScriptedValidator {
        async fn validate(
            &self,
            title: &str,
            _description: &str,
            _source: &str,
        ) -> Result<Validation> {
            if let Some(v) = self.overrides.get(title) {
                return Ok(v.clone());
            }
            Ok(Validation {
                is_relevant: true,
                confidence: self.default_confidence,
                reason: "ok".to_string(),
            })
        }
    }

    fn article(title: &str, url: &str, day: u32) -> RawArticle {
        RawArticle {
            title: title.to_string(),
            description: "novo modelo esportivo em destaque".to_string(),
            url: url.to_string(),
            image_url: None,
            source_name: "AutoTest".to_string(),
            published_at: Utc.with_ymd_and_hms(2025, 3, day, 12, 0, 0).unwrap(),
        }
    }

    fn premium_batch() -> Vec<RawArticle> {
        vec![
            article("Lamborghini apresenta Revuelto", "https://a.com/1", 3),
            article("Porsche amplia linha Taycan", "https://a.com/2", 5),
            article("Bentley celebra marco de produção", "https://a.com/3", 1),
            article("Pagani abre boutique em São Paulo", "https://a.com/4", 7),
            article("Koenigsegg bate recorde de velocidade", "https://a.com/5", 2),
        ]
    }

    fn search_with(premium: Vec<RawArticle>, f1: Vec<RawArticle>) -> ScriptedSearch {
        let mut responses = HashMap::new();
        responses.insert(SEARCH_QUERIES[0].0.to_string(), f1);
        responses.insert(SEARCH_QUERIES[1].0.to_string(), premium);
        ScriptedSearch {
            responses,
            failing: Vec::new(),
        }
    }

    fn test_config() -> Config {
        Config {
            db_path: ":memory:".to_string(),
            ..Config::default()
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 5).unwrap()
    }

    #[tokio::test]
    async fn happy_path_commits_and_activates_one_cycle() {
        let config = test_config();
        let repo = Repository::new(":memory:").await.unwrap();
        let search = search_with(
            premium_batch(),
            vec![article("Verstappen vence o Grand Prix", "https://f1.com/1", 4)],
        );
        let validator = ScriptedValidator::accepting();

        let report = run_ingestion(&config, &repo, &search, &validator, today()).await;

        assert!(report.success);
        assert!(report.errors.is_empty());
        assert_eq!(report.articles_inserted, 6);

        let active = repo.active_cycle().await.unwrap().unwrap();
        assert_eq!(Some(active.id.clone()), report.cycle_id);

        // The three most recent premium articles are featured 1..=3 and
        // carry the highlight category.
        let articles = repo.articles_for_cycle(&active.id).await.unwrap();
        let mut featured: Vec<_> = articles.iter().filter(|a| a.is_featured).collect();
        featured.sort_by_key(|a| a.featured_order);
        let orders: Vec<_> = featured.iter().map(|a| a.featured_order).collect();
        assert_eq!(orders, vec![Some(1), Some(2), Some(3)]);
        assert_eq!(featured[0].original_url, "https://a.com/4");
        assert_eq!(featured[1].original_url, "https://a.com/2");
        assert_eq!(featured[2].original_url, "https://a.com/1");
        assert!(featured.iter().all(|a| a.category_id == 1));

        // Non-featured articles keep their topical category untouched
        let f1_article = articles
            .iter()
            .find(|a| a.original_url == "https://f1.com/1")
            .unwrap();
        assert_eq!(f1_article.category_id, 2);
        assert!(!f1_article.is_featured);
        assert_eq!(f1_article.featured_order, None);
    }

    #[tokio::test]
    async fn rerun_within_the_week_is_idempotent() {
        let config = test_config();
        let repo = Repository::new(":memory:").await.unwrap();
        let search = search_with(premium_batch(), Vec::new());
        let validator = ScriptedValidator::accepting();

        let first = run_ingestion(&config, &repo, &search, &validator, today()).await;
        let second = run_ingestion(&config, &repo, &search, &validator, today()).await;

        assert!(first.success && second.success);
        assert_eq!(first.cycle_id, second.cycle_id);
        assert_eq!(second.articles_inserted, 0);

        assert_eq!(repo.all_cycles().await.unwrap().len(), 1);
        assert_eq!(
            repo.count_articles(first.cycle_id.as_deref().unwrap())
                .await
                .unwrap(),
            5
        );
    }

    #[tokio::test]
    async fn failed_queries_degrade_to_warnings() {
        let config = test_config();
        let repo = Repository::new(":memory:").await.unwrap();
        let mut search = search_with(premium_batch(), Vec::new());
        search.failing = vec![
            SEARCH_QUERIES[0].0.to_string(),
            SEARCH_QUERIES[2].0.to_string(),
        ];
        let validator = ScriptedValidator::accepting();

        let report = run_ingestion(&config, &repo, &search, &validator, today()).await;

        assert!(report.success);
        assert_eq!(report.errors.len(), 2);
        assert_eq!(report.articles_inserted, 5);
    }

    #[tokio::test]
    async fn confidence_threshold_is_inclusive() {
        let config = test_config();
        let repo = Repository::new(":memory:").await.unwrap();
        let at_threshold = article("Bugatti entrega último Chiron", "https://a.com/1", 3);
        let below_threshold = article("McLaren confirma novo híbrido", "https://a.com/2", 4);
        let search = search_with(vec![at_threshold.clone(), below_threshold.clone()], Vec::new());

        let mut overrides = HashMap::new();
        overrides.insert(
            at_threshold.title.clone(),
            Validation {
                is_relevant: true,
                confidence: 75.0,
                reason: "ok".to_string(),
            },
        );
        overrides.insert(
            below_threshold.title.clone(),
            Validation {
                is_relevant: true,
                confidence: 74.0,
                reason: "quase".to_string(),
            },
        );
        let validator = ScriptedValidator {
            default_confidence: 95.0,
            overrides,
        };

        let report = run_ingestion(&config, &repo, &search, &validator, today()).await;

        assert!(report.success);
        assert_eq!(report.articles_inserted, 1);
        let stored = repo
            .find_article_by_url("https://a.com/1")
            .await
            .unwrap();
        assert!(stored.is_some());
        assert!(repo
            .find_article_by_url("https://a.com/2")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn later_week_takes_over_the_active_pointer() {
        let config = test_config();
        let repo = Repository::new(":memory:").await.unwrap();
        let search = search_with(premium_batch(), Vec::new());
        let validator = ScriptedValidator::accepting();

        let first = run_ingestion(&config, &repo, &search, &validator, today()).await;
        let next_week = today() + Days::new(7);
        let second = run_ingestion(&config, &repo, &search, &validator, next_week).await;

        assert!(first.success && second.success);
        assert_ne!(first.cycle_id, second.cycle_id);

        let cycles = repo.all_cycles().await.unwrap();
        assert_eq!(cycles.len(), 2);
        let active: Vec<_> = cycles.iter().filter(|c| c.is_active).collect();
        assert_eq!(active.len(), 1);
        assert_eq!(Some(active[0].id.clone()), second.cycle_id);
    }

    #[tokio::test]
    async fn all_queries_failing_still_activates_the_cycle() {
        let config = test_config();
        let repo = Repository::new(":memory:").await.unwrap();
        let search = ScriptedSearch {
            responses: HashMap::new(),
            failing: SEARCH_QUERIES.iter().map(|(q, _)| q.to_string()).collect(),
        };
        let validator = ScriptedValidator::accepting();

        let report = run_ingestion(&config, &repo, &search, &validator, today()).await;

        assert!(report.success);
        assert_eq!(report.articles_inserted, 0);
        assert_eq!(report.errors.len(), SEARCH_QUERIES.len());
        assert!(repo.active_cycle().await.unwrap().is_some());
    }

    #[tokio::test]
    async fn broken_store_fails_the_run_structurally() {
        let config = test_config();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("news.db");
        let repo = Repository::new(path.to_str().unwrap()).await.unwrap();

        // Break the store out from under the repository: without a cycle
        // record there is nothing to commit into, so the run must abort.
        let raw = rusqlite::Connection::open(&path).unwrap();
        raw.execute_batch("DROP TABLE news_articles; DROP TABLE news_cycles;")
            .unwrap();

        let search = search_with(premium_batch(), Vec::new());
        let validator = ScriptedValidator::accepting();
        let report = run_ingestion(&config, &repo, &search, &validator, today()).await;

        assert!(!report.success);
        assert_eq!(report.cycle_id, None);
        assert_eq!(report.articles_inserted, 0);
        assert_eq!(report.errors.len(), 1);
    }
}
