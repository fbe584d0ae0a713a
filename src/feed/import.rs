use std::path::Path;

use serde::Deserialize;

use crate::db::Catalog;
use crate::error::Result;
use crate::models::{Feed, Outcome, Website};

/// A website and its feeds as listed in an import file.
#[derive(Debug, Clone, Deserialize)]
pub struct WebsiteSeed {
    pub url: String,
    pub name: String,
    #[serde(alias = "language")]
    pub lang: String,
    pub country: String,
    #[serde(default)]
    pub feeds: Vec<FeedSeed>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FeedSeed {
    pub url: String,
    pub name: String,
}

pub fn parse_seed_file(path: &Path) -> Result<Vec<WebsiteSeed>> {
    let content = std::fs::read_to_string(path)?;
    let seeds = serde_json::from_str(&content)?;
    Ok(seeds)
}

/// Upserts every website, then its feeds. Returns the outcome per URL.
pub async fn import_seeds(catalog: &Catalog, seeds: Vec<WebsiteSeed>) -> Result<Vec<(String, Outcome)>> {
    let mut outcomes = Vec::new();

    for seed in seeds {
        tracing::info!("Updating {}", seed.url);
        let website = Website::new(&seed.url, seed.name, seed.lang, seed.country);
        let outcome = catalog.update_website(website).await?;
        outcomes.push((seed.url.clone(), outcome));

        for feed in seed.feeds {
            let outcome = catalog
                .update_feed(Feed::new(&feed.url, &seed.url, feed.name))
                .await?;
            outcomes.push((feed.url, outcome));
        }
    }

    Ok(outcomes)
}
