pub const SCHEMA: &str = r#"
PRAGMA foreign_keys = ON;

-- weekly publication cycles
CREATE TABLE IF NOT EXISTS news_cycles (
    id TEXT PRIMARY KEY,
    week_start TEXT NOT NULL,
    week_end TEXT NOT NULL,
    is_active INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    UNIQUE(week_start, week_end)
);

CREATE INDEX IF NOT EXISTS idx_news_cycles_is_active ON news_cycles(is_active);

-- articles committed into a cycle
CREATE TABLE IF NOT EXISTS news_articles (
    id TEXT PRIMARY KEY,
    slug TEXT NOT NULL UNIQUE,
    cycle_id TEXT NOT NULL REFERENCES news_cycles(id) ON DELETE CASCADE,
    category_id INTEGER NOT NULL,
    title TEXT NOT NULL,
    description TEXT NOT NULL,
    image_url TEXT,
    source_name TEXT NOT NULL,
    original_url TEXT NOT NULL UNIQUE,
    published_at TEXT NOT NULL,
    is_featured INTEGER NOT NULL DEFAULT 0,
    featured_order INTEGER,
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_news_articles_cycle_id ON news_articles(cycle_id);
CREATE INDEX IF NOT EXISTS idx_news_articles_published_at ON news_articles(published_at DESC);
"#;
