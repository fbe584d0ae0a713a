//! A catalog of websites, their RSS feeds, fetched articles and extracted
//! article content, keyed by URL and tolerant of `http` -> `https` moves.

pub mod cli;
pub mod config;
pub mod db;
pub mod error;
pub mod feed;
pub mod models;
pub mod services;

pub use db::{Catalog, UrlMatch};
pub use error::{AppError, Result};
pub use models::{Article, Feed, NewArticle, Outcome, ParsedArticle, Table, Website};
