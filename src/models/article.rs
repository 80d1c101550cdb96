use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Topical bucket for a stored article. The ids are stable and shared with
/// the website's category table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    /// Featured/highlight section, independent of topic.
    Highlight,
    Formula1,
    PremiumMarket,
}

impl Category {
    pub fn id(self) -> i64 {
        match self {
            Category::Highlight => 1,
            Category::Formula1 => 2,
            Category::PremiumMarket => 3,
        }
    }
}

/// An article as returned by the news-search API, before any decision
/// has been made about it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawArticle {
    pub title: String,
    pub description: String,
    pub url: String,
    pub image_url: Option<String>,
    pub source_name: String,
    pub published_at: DateTime<Utc>,
}

/// A raw article paired with its classified category as it moves through
/// the pipeline stages.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub article: RawArticle,
    pub category: Category,
}

/// Row ready for insertion into news_articles.
#[derive(Debug, Clone)]
pub struct NewArticle {
    pub id: String,
    pub slug: String,
    pub cycle_id: String,
    pub category_id: i64,
    pub title: String,
    pub description: String,
    pub image_url: Option<String>,
    pub source_name: String,
    pub original_url: String,
    pub published_at: DateTime<Utc>,
    pub is_featured: bool,
    pub featured_order: Option<u32>,
}

/// Row as read back from news_articles.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredArticle {
    pub id: String,
    pub slug: String,
    pub cycle_id: String,
    pub category_id: i64,
    pub title: String,
    pub description: String,
    pub image_url: Option<String>,
    pub source_name: String,
    pub original_url: String,
    pub published_at: DateTime<Utc>,
    pub is_featured: bool,
    pub featured_order: Option<u32>,
    pub created_at: DateTime<Utc>,
}
