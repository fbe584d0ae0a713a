use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An article as stored, including its creation time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    pub url: String,
    pub time: DateTime<Utc>,
    pub content: String,
    pub feed: Option<String>,
    pub website: String,
}

/// An article to be written; `time` is assigned by the store on insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewArticle {
    pub url: String,
    pub feed: Option<String>,
    pub website: String,
    pub content: String,
}

impl NewArticle {
    pub fn new(
        url: impl Into<String>,
        feed: Option<String>,
        website: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            url: url.into(),
            feed,
            website: website.into(),
            content: content.into(),
        }
    }
}

/// Article content as produced by one extraction backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedArticle {
    pub article: String,
    pub parser: String,
    pub content: String,
}

impl ParsedArticle {
    pub fn new(
        article: impl Into<String>,
        parser: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            article: article.into(),
            parser: parser.into(),
            content: content.into(),
        }
    }
}
