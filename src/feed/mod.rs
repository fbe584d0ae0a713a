mod crawler;
mod fetcher;
mod import;

pub use crawler::{CrawlReport, Crawler};
pub use fetcher::{parse_entries, FeedEntry, FeedFetcher};
pub use import::{import_seeds, parse_seed_file, FeedSeed, WebsiteSeed};
