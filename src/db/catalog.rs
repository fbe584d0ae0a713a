use std::path::Path;

use tokio_rusqlite::Connection;

use crate::error::Result;
use crate::models::{Article, Feed, NewArticle, Outcome, ParsedArticle, Table, Website};

use super::lookup::{self, UrlMatch};
use super::{engine, schema};

/// The catalog of websites, feeds, articles and parsed articles.
///
/// Owns one connection for its whole lifetime; every operation runs on the
/// connection's thread, one at a time. Call [`Catalog::close`] when done.
pub struct Catalog {
    conn: Connection,
}

impl Catalog {
    pub async fn open(db_path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(db_path.as_ref()).await?;
        Self::init(conn).await
    }

    pub async fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().await?;
        Self::init(conn).await
    }

    async fn init(conn: Connection) -> Result<Self> {
        let catalog = Self { conn };
        let created = catalog
            .with_conn(|conn| {
                conn.execute_batch("PRAGMA foreign_keys = ON")?;
                schema::ensure_schema(conn)
            })
            .await?;
        if created {
            tracing::info!("initialised new catalog");
        }
        Ok(catalog)
    }

    /// Flushes and releases the connection.
    pub async fn close(self) -> Result<()> {
        self.conn.close().await?;
        Ok(())
    }

    async fn with_conn<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut rusqlite::Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        self.conn.call(move |conn| Ok(f(conn))).await?
    }

    // Lookups

    pub async fn exists(&self, table: Table, url: &str, how: UrlMatch) -> Result<bool> {
        let url = url.to_string();
        self.with_conn(move |conn| lookup::exists(conn, table, &url, how))
            .await
    }

    pub async fn find_by_logical_identity(&self, table: Table, url: &str) -> Result<Option<String>> {
        let url = url.to_string();
        self.with_conn(move |conn| lookup::find_by_logical_identity(conn, table, &url))
            .await
    }

    pub async fn list_keys(&self, table: Table) -> Result<Vec<String>> {
        self.with_conn(move |conn| lookup::list_keys(conn, table)).await
    }

    pub async fn feed_website(&self, feed_url: &str) -> Result<String> {
        let feed_url = feed_url.to_string();
        self.with_conn(move |conn| lookup::feed_website(conn, &feed_url))
            .await
    }

    pub async fn parsed_article_exists(&self, article_url: &str, parser: &str) -> Result<bool> {
        let (article_url, parser) = (article_url.to_string(), parser.to_string());
        self.with_conn(move |conn| lookup::parsed_article_exists(conn, &article_url, &parser))
            .await
    }

    pub async fn website(&self, url: &str) -> Result<Option<Website>> {
        let url = url.to_string();
        self.with_conn(move |conn| lookup::website(conn, &url)).await
    }

    pub async fn feed(&self, url: &str) -> Result<Option<Feed>> {
        let url = url.to_string();
        self.with_conn(move |conn| lookup::feed(conn, &url)).await
    }

    pub async fn article(&self, url: &str) -> Result<Option<Article>> {
        let url = url.to_string();
        self.with_conn(move |conn| lookup::article(conn, &url)).await
    }

    pub async fn parsed_article(&self, article_url: &str, parser: &str) -> Result<Option<ParsedArticle>> {
        let (article_url, parser) = (article_url.to_string(), parser.to_string());
        self.with_conn(move |conn| lookup::parsed_article(conn, &article_url, &parser))
            .await
    }

    // Upserts

    pub async fn update_website(&self, website: Website) -> Result<Outcome> {
        self.with_conn(move |conn| engine::upsert(conn, &website)).await
    }

    pub async fn update_feed(&self, feed: Feed) -> Result<Outcome> {
        self.with_conn(move |conn| engine::upsert(conn, &feed)).await
    }

    pub async fn update_article(&self, article: NewArticle) -> Result<Outcome> {
        self.with_conn(move |conn| engine::upsert(conn, &article)).await
    }

    pub async fn update_parsed_article(&self, parsed: ParsedArticle) -> Result<Outcome> {
        self.with_conn(move |conn| engine::upsert_parsed_article(conn, &parsed))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn reopening_keeps_data_and_schema() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("articles.db");

        let catalog = Catalog::open(&path).await.unwrap();
        catalog
            .update_website(Website::new("http://a.com", "A", "en", "us"))
            .await
            .unwrap();
        catalog.close().await.unwrap();

        let catalog = Catalog::open(&path).await.unwrap();
        assert_eq!(catalog.list_keys(Table::Websites).await.unwrap(), vec!["http://a.com"]);
        catalog.close().await.unwrap();
    }

    #[tokio::test]
    async fn article_round_trip() {
        let catalog = Catalog::open_in_memory().await.unwrap();
        catalog
            .update_website(Website::new("http://a.com", "A", "en", "us"))
            .await
            .unwrap();
        catalog
            .update_feed(Feed::new("http://a.com/feed", "http://a.com", "Feed A"))
            .await
            .unwrap();
        let body = "<p>héllo wörld</p>\n\t<br/>";
        catalog
            .update_article(NewArticle::new(
                "http://a.com/1",
                Some("http://a.com/feed".to_string()),
                "http://a.com",
                body,
            ))
            .await
            .unwrap();

        let article = catalog.article("http://a.com/1").await.unwrap().unwrap();
        assert_eq!(article.content, body);
        assert_eq!(article.feed.as_deref(), Some("http://a.com/feed"));
        assert_eq!(article.website, "http://a.com");
        assert!(article.time <= chrono::Utc::now());
    }

    #[tokio::test]
    async fn foreign_keys_are_enforced_on_open() {
        let catalog = Catalog::open_in_memory().await.unwrap();
        let err = catalog
            .update_article(NewArticle::new("http://a.com/1", None, "http://a.com", "x"))
            .await
            .unwrap_err();
        assert!(err.is_recoverable());
    }
}
