use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, OptionalExtension, Row};
use tokio_rusqlite::Connection;
use uuid::Uuid;

use crate::error::Result;
use crate::models::{NewArticle, NewsCycle, StoredArticle};

use super::schema::SCHEMA;

/// Outcome of an article insert. A uniqueness conflict (same original_url
/// already stored, e.g. from a rerun) is reported as `AlreadyExists`, not
/// as an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted,
    AlreadyExists,
}

pub struct Repository {
    conn: Connection,
}

impl Repository {
    pub async fn new(db_path: &str) -> Result<Self> {
        let conn = Connection::open(db_path).await?;

        conn.call(|conn| {
            conn.execute_batch(SCHEMA)?;
            Ok(())
        })
        .await?;

        Ok(Self { conn })
    }

    // Cycle operations

    pub async fn find_cycle(
        &self,
        week_start: NaiveDate,
        week_end: NaiveDate,
    ) -> Result<Option<NewsCycle>> {
        let cycle = self
            .conn
            .call(move |conn| {
                let mut stmt = conn.prepare(
                    "SELECT id, week_start, week_end, is_active FROM news_cycles
                     WHERE week_start = ?1 AND week_end = ?2",
                )?;
                let cycle = stmt
                    .query_row(
                        params![week_start.to_string(), week_end.to_string()],
                        |row| Ok(cycle_from_row(row)),
                    )
                    .optional()?;
                Ok(cycle)
            })
            .await?;
        Ok(cycle)
    }

    /// Resolve the cycle for a week, creating it inactive when missing.
    /// Reruns within the same week reuse the existing row.
    pub async fn get_or_create_cycle(
        &self,
        week_start: NaiveDate,
        week_end: NaiveDate,
    ) -> Result<NewsCycle> {
        if let Some(cycle) = self.find_cycle(week_start, week_end).await? {
            tracing::info!(cycle_id = %cycle.id, "Using existing cycle");
            return Ok(cycle);
        }

        let id = Uuid::new_v4().to_string();
        let cycle = NewsCycle {
            id: id.clone(),
            week_start,
            week_end,
            is_active: false,
        };

        self.conn
            .call(move |conn| {
                conn.execute(
                    "INSERT INTO news_cycles (id, week_start, week_end, is_active)
                     VALUES (?1, ?2, ?3, 0)",
                    params![id, week_start.to_string(), week_end.to_string()],
                )?;
                Ok(())
            })
            .await?;

        tracing::info!(cycle_id = %cycle.id, "Created cycle");
        Ok(cycle)
    }

    /// Promote one cycle to active. A single conditional update flips every
    /// row at once, so there is no window with zero active cycles.
    pub async fn activate_cycle(&self, cycle_id: &str) -> Result<()> {
        let cycle_id = cycle_id.to_string();
        self.conn
            .call(move |conn| {
                conn.execute(
                    "UPDATE news_cycles SET is_active = (id = ?1)",
                    params![cycle_id],
                )?;
                Ok(())
            })
            .await?;
        Ok(())
    }

    pub async fn active_cycle(&self) -> Result<Option<NewsCycle>> {
        let cycle = self
            .conn
            .call(|conn| {
                let mut stmt = conn.prepare(
                    "SELECT id, week_start, week_end, is_active FROM news_cycles
                     WHERE is_active = 1",
                )?;
                let cycle = stmt
                    .query_row([], |row| Ok(cycle_from_row(row)))
                    .optional()?;
                Ok(cycle)
            })
            .await?;
        Ok(cycle)
    }

    pub async fn all_cycles(&self) -> Result<Vec<NewsCycle>> {
        let cycles = self
            .conn
            .call(|conn| {
                let mut stmt = conn.prepare(
                    "SELECT id, week_start, week_end, is_active FROM news_cycles
                     ORDER BY week_start",
                )?;
                let cycles = stmt
                    .query_map([], |row| Ok(cycle_from_row(row)))?
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                Ok(cycles)
            })
            .await?;
        Ok(cycles)
    }

    // Article operations

    pub async fn insert_article(&self, article: NewArticle) -> Result<InsertOutcome> {
        let outcome = self
            .conn
            .call(move |conn| {
                let result = conn.execute(
                    r#"INSERT INTO news_articles
                       (id, slug, cycle_id, category_id, title, description, image_url,
                        source_name, original_url, published_at, is_featured, featured_order)
                       VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)"#,
                    params![
                        article.id,
                        article.slug,
                        article.cycle_id,
                        article.category_id,
                        article.title,
                        article.description,
                        article.image_url,
                        article.source_name,
                        article.original_url,
                        article.published_at.to_rfc3339(),
                        article.is_featured,
                        article.featured_order,
                    ],
                );

                match result {
                    Ok(_) => Ok(InsertOutcome::Inserted),
                    // Only uniqueness conflicts mean "already stored"; other
                    // constraint failures surface as errors.
                    Err(rusqlite::Error::SqliteFailure(e, _))
                        if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
                            || e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY =>
                    {
                        Ok(InsertOutcome::AlreadyExists)
                    }
                    Err(e) => Err(e.into()),
                }
            })
            .await?;
        Ok(outcome)
    }

    pub async fn find_article_by_url(&self, original_url: &str) -> Result<Option<StoredArticle>> {
        let original_url = original_url.to_string();
        let article = self
            .conn
            .call(move |conn| {
                let mut stmt = conn.prepare(&format!(
                    "{} WHERE original_url = ?1",
                    SELECT_ARTICLE
                ))?;
                let article = stmt
                    .query_row(params![original_url], |row| Ok(article_from_row(row)))
                    .optional()?;
                Ok(article)
            })
            .await?;
        Ok(article)
    }

    pub async fn articles_for_cycle(&self, cycle_id: &str) -> Result<Vec<StoredArticle>> {
        let cycle_id = cycle_id.to_string();
        let articles = self
            .conn
            .call(move |conn| {
                let mut stmt = conn.prepare(&format!(
                    "{} WHERE cycle_id = ?1 ORDER BY published_at DESC",
                    SELECT_ARTICLE
                ))?;
                let articles = stmt
                    .query_map(params![cycle_id], |row| Ok(article_from_row(row)))?
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                Ok(articles)
            })
            .await?;
        Ok(articles)
    }

    pub async fn count_articles(&self, cycle_id: &str) -> Result<i64> {
        let cycle_id = cycle_id.to_string();
        let count = self
            .conn
            .call(move |conn| {
                let count: i64 = conn.query_row(
                    "SELECT COUNT(*) FROM news_articles WHERE cycle_id = ?1",
                    params![cycle_id],
                    |row| row.get(0),
                )?;
                Ok(count)
            })
            .await?;
        Ok(count)
    }
}

const SELECT_ARTICLE: &str =
    "SELECT id, slug, cycle_id, category_id, title, description, image_url, source_name,
            original_url, published_at, is_featured, featured_order, created_at
     FROM news_articles";

fn parse_datetime(s: &str) -> Option<DateTime<Utc>> {
    // RFC3339 first (e.g. "2026-01-11T12:34:56+00:00")
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    // SQLite datetime format (e.g. "2026-01-11 12:34:56")
    if let Ok(naive) = chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Some(naive.and_utc());
    }
    None
}

fn parse_date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn cycle_from_row(row: &Row) -> NewsCycle {
    NewsCycle {
        id: row.get(0).unwrap(),
        week_start: parse_date(&row.get::<_, String>(1).unwrap()),
        week_end: parse_date(&row.get::<_, String>(2).unwrap()),
        is_active: row.get::<_, i64>(3).unwrap() != 0,
    }
}

fn article_from_row(row: &Row) -> StoredArticle {
    StoredArticle {
        id: row.get(0).unwrap(),
        slug: row.get(1).unwrap(),
        cycle_id: row.get(2).unwrap(),
        category_id: row.get(3).unwrap(),
        title: row.get(4).unwrap(),
        description: row.get(5).unwrap(),
        image_url: row.get(6).unwrap(),
        source_name: row.get(7).unwrap(),
        original_url: row.get(8).unwrap(),
        published_at: row
            .get::<_, String>(9)
            .ok()
            .and_then(|s| parse_datetime(&s))
            .unwrap_or_else(Utc::now),
        is_featured: row.get::<_, i64>(10).unwrap() != 0,
        featured_order: row.get(11).unwrap(),
        created_at: row
            .get::<_, String>(12)
            .ok()
            .and_then(|s| parse_datetime(&s))
            .unwrap_or_else(Utc::now),
    }
}
