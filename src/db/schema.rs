use rusqlite::{params, Connection};

use crate::error::Result;

pub const TABLES: [&str; 4] = ["websites", "feeds", "articles", "parsed_articles"];

pub const SCHEMA: &str = r#"
-- websites table
CREATE TABLE IF NOT EXISTS websites (
    url TEXT PRIMARY KEY NOT NULL,
    name TEXT NOT NULL,
    language CHAR(2) NOT NULL CHECK (length(language) = 2),
    country CHAR(2) NOT NULL CHECK (length(country) = 2)
);

-- feeds table
CREATE TABLE IF NOT EXISTS feeds (
    url TEXT PRIMARY KEY NOT NULL,
    name TEXT NOT NULL,
    website TEXT NOT NULL,
    FOREIGN KEY(website) REFERENCES websites(url)
);

CREATE INDEX IF NOT EXISTS idx_feeds_website ON feeds(website);

-- articles table (feed is NULL when the article was found without one)
CREATE TABLE IF NOT EXISTS articles (
    url TEXT PRIMARY KEY NOT NULL,
    time TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
    content TEXT NOT NULL,
    feed TEXT,
    website TEXT NOT NULL,
    FOREIGN KEY(feed) REFERENCES feeds(url),
    FOREIGN KEY(website) REFERENCES websites(url)
);

CREATE INDEX IF NOT EXISTS idx_articles_feed ON articles(feed);
CREATE INDEX IF NOT EXISTS idx_articles_website ON articles(website);

-- parsed_articles table, one row per (article, parser)
CREATE TABLE IF NOT EXISTS parsed_articles (
    article TEXT NOT NULL,
    parser TEXT NOT NULL,
    content TEXT NOT NULL,
    PRIMARY KEY(article, parser),
    FOREIGN KEY(article) REFERENCES articles(url)
);
"#;

fn table_exists(conn: &Connection, name: &str) -> Result<bool> {
    let exists = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1)",
        params![name],
        |row| row.get(0),
    )?;
    Ok(exists)
}

/// Creates the catalog tables unless all of them are already present.
/// Returns whether anything had to be created.
pub fn ensure_schema(conn: &mut Connection) -> Result<bool> {
    let mut missing = Vec::new();
    for table in TABLES {
        if !table_exists(conn, table)? {
            missing.push(table);
        }
    }

    if missing.is_empty() {
        tracing::debug!("catalog schema already present");
        return Ok(false);
    }

    tracing::info!("creating catalog schema (missing: {})", missing.join(", "));
    let tx = conn.transaction()?;
    tx.execute_batch(SCHEMA)?;
    tx.commit()?;
    Ok(true)
}
