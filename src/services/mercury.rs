use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use url::Url;

use crate::config::MercuryConfig;
use crate::error::{AppError, Result};

use super::extractor::ContentExtractor;
use super::http::{HttpClient, Response};

pub const MERCURY_PARSER_NAME: &str = "mercury";

/// Extraction through the hosted Mercury Web Parser API.
pub struct MercuryExtractor {
    http: HttpClient,
    endpoint: Url,
    headers: HeaderMap,
}

impl MercuryExtractor {
    pub fn new(config: &MercuryConfig, http: HttpClient) -> Result<Self> {
        let api_key = config
            .api_key
            .as_deref()
            .ok_or_else(|| AppError::Config("the mercury parser needs an API key".to_string()))?;

        let endpoint = Url::parse(&config.endpoint)
            .map_err(|e| AppError::Config(format!("invalid mercury endpoint: {e}")))?;

        let mut headers = HeaderMap::new();
        let key = HeaderValue::from_str(api_key)
            .map_err(|_| AppError::Config("mercury API key is not a valid header value".to_string()))?;
        headers.insert("x-api-key", key);

        Ok(Self {
            http,
            endpoint,
            headers,
        })
    }

    fn request_url(&self, article_url: &str) -> String {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut().append_pair("url", article_url);
        url.to_string()
    }
}

#[async_trait]
impl ContentExtractor for MercuryExtractor {
    fn name(&self) -> &str {
        MERCURY_PARSER_NAME
    }

    async fn extract(&self, url: &str) -> Response {
        self.http
            .get_with_headers(&self.request_url(url), self.headers.clone())
            .await
    }
}
