use async_trait::async_trait;

use crate::config::{Config, ParserKind};
use crate::error::Result;

use super::http::{HttpClient, Response};
use super::mercury::MercuryExtractor;
use super::readability::ReadabilityServer;

/// Turns an article URL into extracted content. Backends differ only in
/// where the extraction happens.
#[async_trait]
pub trait ContentExtractor: Send + Sync {
    /// Stored as the `parser` half of the parsed article key.
    fn name(&self) -> &str;

    async fn extract(&self, url: &str) -> Response;

    /// Releases whatever the backend holds (e.g. a child process).
    async fn shutdown(&mut self) -> Result<()> {
        Ok(())
    }
}

pub async fn build_extractor(config: &Config, http: HttpClient) -> Result<Box<dyn ContentExtractor>> {
    let extractor: Box<dyn ContentExtractor> = match config.parser {
        ParserKind::Mercury => Box::new(MercuryExtractor::new(&config.mercury, http)?),
        ParserKind::Readability => Box::new(ReadabilityServer::start(&config.readability, http).await?),
    };
    tracing::info!("using {} content extractor", extractor.name());
    Ok(extractor)
}
