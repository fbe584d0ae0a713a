//! Insert/update/migrate for catalog entities.
//!
//! Every call runs in a single IMMEDIATE transaction with foreign keys
//! deferred to commit, so a key rewrite and its cascade either land
//! together or not at all.

use rusqlite::{params, Connection, Transaction, TransactionBehavior};

use crate::error::{AppError, Result};
use crate::models::{Feed, NewArticle, Outcome, ParsedArticle, Table, Website};

use super::lookup::{self, UrlMatch};
use super::url_key::UrlKey;

/// An entity stored under a single URL key.
pub trait Keyed {
    const TABLE: Table;
    /// `(table, column)` pairs holding foreign keys into `TABLE`.
    const DEPENDENTS: &'static [(&'static str, &'static str)];

    fn url(&self) -> &str;

    fn insert(&self, tx: &Transaction) -> rusqlite::Result<usize>;

    /// Overwrites the row currently stored under `key` with this entity,
    /// key included.
    fn update(&self, tx: &Transaction, key: &str) -> rusqlite::Result<usize>;
}

impl Keyed for Website {
    const TABLE: Table = Table::Websites;
    const DEPENDENTS: &'static [(&'static str, &'static str)] =
        &[("feeds", "website"), ("articles", "website")];

    fn url(&self) -> &str {
        &self.url
    }

    fn insert(&self, tx: &Transaction) -> rusqlite::Result<usize> {
        tx.execute(
            "INSERT INTO websites (url, name, language, country) VALUES (?1, ?2, ?3, ?4)",
            params![self.url, self.name, self.language, self.country],
        )
    }

    fn update(&self, tx: &Transaction, key: &str) -> rusqlite::Result<usize> {
        tx.execute(
            "UPDATE websites SET url = ?1, name = ?2, language = ?3, country = ?4 WHERE url = ?5",
            params![self.url, self.name, self.language, self.country, key],
        )
    }
}

impl Keyed for Feed {
    const TABLE: Table = Table::Feeds;
    const DEPENDENTS: &'static [(&'static str, &'static str)] = &[("articles", "feed")];

    fn url(&self) -> &str {
        &self.url
    }

    fn insert(&self, tx: &Transaction) -> rusqlite::Result<usize> {
        tx.execute(
            "INSERT INTO feeds (url, name, website) VALUES (?1, ?2, ?3)",
            params![self.url, self.name, self.website],
        )
    }

    fn update(&self, tx: &Transaction, key: &str) -> rusqlite::Result<usize> {
        tx.execute(
            "UPDATE feeds SET url = ?1, name = ?2, website = ?3 WHERE url = ?4",
            params![self.url, self.name, self.website, key],
        )
    }
}

impl Keyed for NewArticle {
    const TABLE: Table = Table::Articles;
    const DEPENDENTS: &'static [(&'static str, &'static str)] = &[("parsed_articles", "article")];

    fn url(&self) -> &str {
        &self.url
    }

    fn insert(&self, tx: &Transaction) -> rusqlite::Result<usize> {
        tx.execute(
            "INSERT INTO articles (url, feed, website, content) VALUES (?1, ?2, ?3, ?4)",
            params![self.url, self.feed, self.website, self.content],
        )
    }

    fn update(&self, tx: &Transaction, key: &str) -> rusqlite::Result<usize> {
        tx.execute(
            "UPDATE articles SET url = ?1, feed = ?2, website = ?3, content = ?4 WHERE url = ?5",
            params![self.url, self.feed, self.website, self.content, key],
        )
    }
}

fn begin(conn: &mut Connection) -> Result<Transaction<'_>> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    // resets itself at COMMIT/ROLLBACK
    tx.execute_batch("PRAGMA defer_foreign_keys = ON")?;
    Ok(tx)
}

fn expect_one(changed: usize, what: impl FnOnce() -> String) -> Result<()> {
    if changed == 1 {
        Ok(())
    } else {
        Err(AppError::InvariantViolation(format!(
            "{}: expected 1 row changed, got {changed}",
            what()
        )))
    }
}

/// Inserts `entity`, updates it in place, or migrates it from another
/// scheme, rewriting every foreign key that pointed at the old key.
pub fn upsert<E: Keyed>(conn: &mut Connection, entity: &E) -> Result<Outcome> {
    let url = entity.url();
    UrlKey::parse(url)?;
    let table = E::TABLE;

    let tx = begin(conn)?;

    let outcome = if !lookup::exists(&tx, table, url, UrlMatch::IgnoreScheme)? {
        expect_one(entity.insert(&tx)?, || format!("insert into {table} {url}"))?;
        Outcome::Inserted
    } else if lookup::exists(&tx, table, url, UrlMatch::Exact)? {
        expect_one(entity.update(&tx, url)?, || format!("update {table} {url}"))?;
        Outcome::Updated
    } else {
        let old = lookup::find_by_logical_identity(&tx, table, url)?
            .ok_or_else(|| AppError::NotFound(format!("{table} row for {url}")))?;
        migrate(&tx, entity, &old)?
    };

    tx.commit()?;
    tracing::debug!("{table} {url}: {outcome}");
    Ok(outcome)
}

fn migrate<E: Keyed>(tx: &Transaction, entity: &E, old: &str) -> Result<Outcome> {
    let new = entity.url();
    expect_one(entity.update(tx, old)?, || {
        format!("rewrite {} key {old} -> {new}", E::TABLE)
    })?;

    let mut touched = 1;
    for (table, column) in E::DEPENDENTS {
        let n = tx.execute(
            &format!("UPDATE {table} SET {column} = ?1 WHERE {column} = ?2"),
            params![new, old],
        )?;
        tracing::debug!("{table}.{column}: {n} rows {old} -> {new}");
        touched += n;
    }

    tracing::info!("migrated {} {old} -> {new} ({touched} rows)", E::TABLE);
    Ok(Outcome::Migrated(touched))
}

/// Parsed articles are keyed by `(article, parser)` and never migrate.
pub fn upsert_parsed_article(conn: &mut Connection, parsed: &ParsedArticle) -> Result<Outcome> {
    let tx = begin(conn)?;

    let outcome = if lookup::parsed_article_exists(&tx, &parsed.article, &parsed.parser)? {
        let changed = tx.execute(
            "UPDATE parsed_articles SET content = ?1 WHERE article = ?2 AND parser = ?3",
            params![parsed.content, parsed.article, parsed.parser],
        )?;
        expect_one(changed, || {
            format!("update parsed_articles ({}, {})", parsed.article, parsed.parser)
        })?;
        Outcome::Updated
    } else {
        let changed = tx.execute(
            "INSERT INTO parsed_articles (article, parser, content) VALUES (?1, ?2, ?3)",
            params![parsed.article, parsed.parser, parsed.content],
        )?;
        expect_one(changed, || {
            format!("insert into parsed_articles ({}, {})", parsed.article, parsed.parser)
        })?;
        Outcome::Inserted
    };

    tx.commit()?;
    tracing::debug!(
        "parsed_articles ({}, {}): {outcome}",
        parsed.article,
        parsed.parser
    );
    Ok(outcome)
}
