use futures::stream::{self, StreamExt};

use crate::db::{Catalog, UrlMatch};
use crate::error::Result;
use crate::models::{NewArticle, Outcome, ParsedArticle, Table};
use crate::services::{ContentExtractor, HttpClient};

use super::fetcher::{FeedEntry, FeedFetcher};

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CrawlReport {
    pub feeds: usize,
    pub articles_added: usize,
    pub parsed_added: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl CrawlReport {
    fn merge(&mut self, other: CrawlReport) {
        self.feeds += other.feeds;
        self.articles_added += other.articles_added;
        self.parsed_added += other.parsed_added;
        self.skipped += other.skipped;
        self.failed += other.failed;
    }
}

/// Walks feeds, storing new articles and their extracted content.
pub struct Crawler<'a> {
    catalog: &'a Catalog,
    http: HttpClient,
    fetcher: FeedFetcher,
    extractor: &'a dyn ContentExtractor,
}

impl<'a> Crawler<'a> {
    pub fn new(catalog: &'a Catalog, http: HttpClient, extractor: &'a dyn ContentExtractor) -> Self {
        Self {
            catalog,
            fetcher: FeedFetcher::new(http.clone()),
            http,
            extractor,
        }
    }

    /// Crawls every known feed, `concurrency` feeds at a time.
    pub async fn crawl_all(&self, concurrency: usize) -> Result<CrawlReport> {
        let feeds = self.catalog.list_keys(Table::Feeds).await?;
        tracing::info!("crawling {} feeds", feeds.len());

        let results: Vec<Result<CrawlReport>> = stream::iter(feeds)
            .map(|feed_url| async move { self.crawl_feed(&feed_url).await })
            .buffer_unordered(concurrency.max(1))
            .collect()
            .await;

        let mut report = CrawlReport::default();
        for result in results {
            report.merge(result?);
        }
        Ok(report)
    }

    /// Recoverable catalog errors are counted against the feed; anything
    /// else aborts the crawl.
    pub async fn crawl_feed(&self, feed_url: &str) -> Result<CrawlReport> {
        tracing::info!("Parsing {}", feed_url);
        let mut report = CrawlReport {
            feeds: 1,
            ..CrawlReport::default()
        };

        let website = match self.catalog.feed_website(feed_url).await {
            Ok(website) => website,
            Err(e) if e.is_recoverable() => {
                tracing::warn!("Skipping feed {}: {}", feed_url, e);
                report.failed += 1;
                return Ok(report);
            }
            Err(e) => return Err(e),
        };

        let entries = match self.fetcher.fetch_entries(feed_url).await {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!("Could not parse feed {}: {}", feed_url, e);
                report.failed += 1;
                return Ok(report);
            }
        };

        for entry in entries {
            match self.store_entry(feed_url, &website, &entry).await {
                Ok(EntryResult::AlreadyKnown) | Ok(EntryResult::Unavailable) => report.skipped += 1,
                Ok(EntryResult::Stored { parsed }) => {
                    report.articles_added += 1;
                    if parsed {
                        report.parsed_added += 1;
                    }
                }
                Err(e) if e.is_recoverable() => {
                    tracing::warn!("Skipping {}: {}", entry.url, e);
                    report.failed += 1;
                }
                Err(e) => return Err(e),
            }
        }

        tracing::info!(
            "{}: {} new articles, {} skipped, {} failed",
            feed_url,
            report.articles_added,
            report.skipped,
            report.failed
        );
        Ok(report)
    }

    async fn store_entry(&self, feed_url: &str, website: &str, entry: &FeedEntry) -> Result<EntryResult> {
        if self
            .catalog
            .exists(Table::Articles, &entry.url, UrlMatch::Exact)
            .await?
        {
            return Ok(EntryResult::AlreadyKnown);
        }

        tracing::debug!("\t{}", entry.url);
        let page = self.http.get(&entry.url).await;
        if !page.is_ok() {
            tracing::warn!("Failed to fetch {}: HTTP {}", entry.url, page.status);
            return Ok(EntryResult::Unavailable);
        }

        let article = NewArticle::new(&entry.url, Some(feed_url.to_string()), website, page.body);
        let outcome = self.catalog.update_article(article).await?;
        if let Outcome::Migrated(n) = outcome {
            tracing::info!("{} changed scheme, rewrote {} rows", entry.url, n);
        }

        let extracted = self.extractor.extract(&entry.url).await;
        if !extracted.is_ok() {
            tracing::warn!(
                "{} could not extract {}: HTTP {}",
                self.extractor.name(),
                entry.url,
                extracted.status
            );
            return Ok(EntryResult::Stored { parsed: false });
        }

        let parsed = ParsedArticle::new(&entry.url, self.extractor.name(), extracted.body);
        self.catalog.update_parsed_article(parsed).await?;
        Ok(EntryResult::Stored { parsed: true })
    }
}

enum EntryResult {
    AlreadyKnown,
    Unavailable,
    Stored { parsed: bool },
}
