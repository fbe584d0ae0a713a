use chrono::{DateTime, Utc};
use feed_rs::parser;

use crate::error::Result;
use crate::services::HttpClient;

/// One feed item that links to an article.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedEntry {
    pub url: String,
    pub title: Option<String>,
    pub published: Option<DateTime<Utc>>,
}

pub struct FeedFetcher {
    http: HttpClient,
}

impl FeedFetcher {
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }

    /// Fetches and parses a feed. A non-200 response is logged and yields
    /// no entries.
    pub async fn fetch_entries(&self, feed_url: &str) -> Result<Vec<FeedEntry>> {
        let response = self.http.get(feed_url).await;

        if !response.is_ok() {
            tracing::warn!(
                "Failed to fetch feed {}: HTTP {}\n\t{}",
                feed_url,
                response.status,
                response.body.replace('\n', "\n\t")
            );
            return Ok(Vec::new());
        }

        parse_entries(response.body.as_bytes())
    }
}

pub fn parse_entries(body: &[u8]) -> Result<Vec<FeedEntry>> {
    let feed = parser::parse(body)?;

    let entries = feed
        .entries
        .into_iter()
        .filter_map(|entry| {
            let url = entry.links.first().map(|l| l.href.clone())?;
            Some(FeedEntry {
                url,
                title: entry.title.map(|t| t.content),
                published: entry.published.or(entry.updated),
            })
        })
        .collect();

    Ok(entries)
}
