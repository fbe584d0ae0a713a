use chrono::{DateTime, Utc};
use rusqlite::{params, types::Type, Connection, OptionalExtension, Row};

use crate::error::{AppError, Result};
use crate::models::{Article, Feed, ParsedArticle, Table, Website};

use super::url_key::UrlKey;

/// How a URL is compared against stored keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UrlMatch {
    /// The stored key equals the URL byte for byte.
    Exact,
    /// The stored key has the same remainder after `://`, any scheme.
    IgnoreScheme,
}

pub fn exists(conn: &Connection, table: Table, url: &str, how: UrlMatch) -> Result<bool> {
    let found = match how {
        UrlMatch::Exact => conn.query_row(
            &format!("SELECT EXISTS(SELECT 1 FROM {table} WHERE url = ?1)"),
            params![url],
            |row| row.get(0),
        )?,
        UrlMatch::IgnoreScheme => {
            let key = UrlKey::parse(url)?;
            conn.query_row(
                &format!(
                    "SELECT EXISTS(SELECT 1 FROM {table}
                     WHERE instr(url, '://') > 0 AND substr(url, instr(url, '://')) = ?1)"
                ),
                params![key.suffix()],
                |row| row.get(0),
            )?
        }
    };
    Ok(found)
}

/// Finds the stored key that names the same entity as `url`, under any scheme.
pub fn find_by_logical_identity(conn: &Connection, table: Table, url: &str) -> Result<Option<String>> {
    let key = UrlKey::parse(url)?;
    let mut stmt = conn.prepare(&format!(
        "SELECT url FROM {table}
         WHERE instr(url, '://') > 0 AND substr(url, instr(url, '://')) = ?1"
    ))?;
    let mut keys = stmt
        .query_map(params![key.suffix()], |row| row.get::<_, String>(0))?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    match keys.len() {
        0 => Ok(None),
        1 => Ok(keys.pop()),
        n => Err(AppError::InvariantViolation(format!(
            "{n} rows in {table} share the identity {}: {}",
            key.suffix(),
            keys.join(", ")
        ))),
    }
}

pub fn list_keys(conn: &Connection, table: Table) -> Result<Vec<String>> {
    let mut stmt = conn.prepare(&format!("SELECT url FROM {table}"))?;
    let keys = stmt
        .query_map([], |row| row.get(0))?
        .collect::<rusqlite::Result<Vec<String>>>()?;
    Ok(keys)
}

pub fn feed_website(conn: &Connection, feed_url: &str) -> Result<String> {
    conn.query_row(
        "SELECT website FROM feeds WHERE url = ?1",
        params![feed_url],
        |row| row.get(0),
    )
    .optional()?
    .ok_or_else(|| AppError::NotFound(format!("feed {feed_url}")))
}

pub fn parsed_article_exists(conn: &Connection, article_url: &str, parser: &str) -> Result<bool> {
    let found = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM parsed_articles WHERE article = ?1 AND parser = ?2)",
        params![article_url, parser],
        |row| row.get(0),
    )?;
    Ok(found)
}

// Read-back

pub fn website(conn: &Connection, url: &str) -> Result<Option<Website>> {
    let website = conn
        .query_row(
            "SELECT url, name, language, country FROM websites WHERE url = ?1",
            params![url],
            website_from_row,
        )
        .optional()?;
    Ok(website)
}

pub fn feed(conn: &Connection, url: &str) -> Result<Option<Feed>> {
    let feed = conn
        .query_row(
            "SELECT url, name, website FROM feeds WHERE url = ?1",
            params![url],
            feed_from_row,
        )
        .optional()?;
    Ok(feed)
}

pub fn article(conn: &Connection, url: &str) -> Result<Option<Article>> {
    let article = conn
        .query_row(
            "SELECT url, time, content, feed, website FROM articles WHERE url = ?1",
            params![url],
            article_from_row,
        )
        .optional()?;
    Ok(article)
}

pub fn parsed_article(conn: &Connection, article_url: &str, parser: &str) -> Result<Option<ParsedArticle>> {
    let parsed = conn
        .query_row(
            "SELECT article, parser, content FROM parsed_articles WHERE article = ?1 AND parser = ?2",
            params![article_url, parser],
            |row| {
                Ok(ParsedArticle {
                    article: row.get(0)?,
                    parser: row.get(1)?,
                    content: row.get(2)?,
                })
            },
        )
        .optional()?;
    Ok(parsed)
}

fn parse_datetime(s: &str) -> Option<DateTime<Utc>> {
    // CURRENT_TIMESTAMP, e.g. "2026-01-11 12:34:56"
    if let Ok(naive) = chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Some(naive.and_utc());
    }
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

fn website_from_row(row: &Row) -> rusqlite::Result<Website> {
    Ok(Website {
        url: row.get(0)?,
        name: row.get(1)?,
        language: row.get(2)?,
        country: row.get(3)?,
    })
}

fn feed_from_row(row: &Row) -> rusqlite::Result<Feed> {
    Ok(Feed {
        url: row.get(0)?,
        name: row.get(1)?,
        website: row.get(2)?,
    })
}

fn article_from_row(row: &Row) -> rusqlite::Result<Article> {
    let raw_time: String = row.get(1)?;
    let time = parse_datetime(&raw_time).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            1,
            Type::Text,
            format!("unrecognised timestamp {raw_time:?}").into(),
        )
    })?;

    Ok(Article {
        url: row.get(0)?,
        time,
        content: row.get(2)?,
        feed: row.get(3)?,
        website: row.get(4)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::schema::ensure_schema;

    fn seeded() -> Connection {
        let mut conn = Connection::open_in_memory().unwrap();
        ensure_schema(&mut conn).unwrap();
        conn.execute_batch(
            r#"
            INSERT INTO websites (url, name, language, country) VALUES ('http://a.com', 'A', 'en', 'us');
            INSERT INTO websites (url, name, language, country) VALUES ('https://b.com', 'B', 'de', 'de');
            INSERT INTO feeds (url, name, website) VALUES ('http://a.com/feed', 'Feed A', 'http://a.com');
            "#,
        )
        .unwrap();
        conn
    }

    #[test]
    fn exact_match_requires_identical_scheme() {
        let conn = seeded();
        assert!(exists(&conn, Table::Websites, "http://a.com", UrlMatch::Exact).unwrap());
        assert!(!exists(&conn, Table::Websites, "https://a.com", UrlMatch::Exact).unwrap());
    }

    #[test]
    fn scheme_agnostic_match_ignores_scheme_only() {
        let conn = seeded();
        assert!(exists(&conn, Table::Websites, "https://a.com", UrlMatch::IgnoreScheme).unwrap());
        assert!(exists(&conn, Table::Websites, "http://b.com", UrlMatch::IgnoreScheme).unwrap());
        assert!(!exists(&conn, Table::Websites, "http://c.com", UrlMatch::IgnoreScheme).unwrap());
        // a suffix of a longer key is not the same entity
        assert!(!exists(&conn, Table::Websites, "http://.com", UrlMatch::IgnoreScheme).unwrap());
    }

    #[test]
    fn like_wildcards_are_literal() {
        let conn = seeded();
        assert!(!exists(&conn, Table::Websites, "http://_.com", UrlMatch::IgnoreScheme).unwrap());
        assert!(!exists(&conn, Table::Websites, "http://%", UrlMatch::IgnoreScheme).unwrap());
    }

    #[test]
    fn recovers_old_key() {
        let conn = seeded();
        let old = find_by_logical_identity(&conn, Table::Feeds, "https://a.com/feed").unwrap();
        assert_eq!(old.as_deref(), Some("http://a.com/feed"));
        assert_eq!(
            find_by_logical_identity(&conn, Table::Feeds, "https://z.com/feed").unwrap(),
            None
        );
    }

    #[test]
    fn ambiguous_identity_is_an_invariant_violation() {
        let conn = seeded();
        conn.execute(
            "INSERT INTO websites (url, name, language, country) VALUES ('https://a.com', 'A2', 'en', 'us')",
            [],
        )
        .unwrap();
        let err = find_by_logical_identity(&conn, Table::Websites, "ftp://a.com").unwrap_err();
        assert!(matches!(err, AppError::InvariantViolation(_)));
    }

    #[test]
    fn feed_website_reports_missing_feed() {
        let conn = seeded();
        assert_eq!(feed_website(&conn, "http://a.com/feed").unwrap(), "http://a.com");
        assert!(matches!(
            feed_website(&conn, "http://nope.com/feed"),
            Err(AppError::NotFound(_))
        ));
    }

    #[test]
    fn lists_every_key() {
        let conn = seeded();
        let mut keys = list_keys(&conn, Table::Websites).unwrap();
        keys.sort();
        assert_eq!(keys, vec!["http://a.com", "https://b.com"]);
        assert!(list_keys(&conn, Table::Articles).unwrap().is_empty());
    }

    #[test]
    fn malformed_url_fails_scheme_agnostic_lookup() {
        let conn = seeded();
        assert!(matches!(
            exists(&conn, Table::Websites, "a.com", UrlMatch::IgnoreScheme),
            Err(AppError::MalformedUrl { .. })
        ));
    }
}
