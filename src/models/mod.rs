mod article;
mod feed;
mod outcome;
mod website;

pub use article::{Article, NewArticle, ParsedArticle};
pub use feed::Feed;
pub use outcome::Outcome;
pub use website::Website;

/// Catalog tables whose rows are keyed by a single URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Websites,
    Feeds,
    Articles,
}

impl Table {
    pub fn name(self) -> &'static str {
        match self {
            Table::Websites => "websites",
            Table::Feeds => "feeds",
            Table::Articles => "articles",
        }
    }
}

impl std::fmt::Display for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
