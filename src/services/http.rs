use std::time::Duration;

use reqwest::header::HeaderMap;
use reqwest::Client;

use crate::config::HttpConfig;
use crate::error::Result;

/// Status reported when every attempt failed before a response arrived.
pub const CONNECTION_FAILURE_STATUS: u16 = 503;

/// A fetched body, or the synthetic 503 left after exhausting retries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub body: String,
}

impl Response {
    pub fn is_ok(&self) -> bool {
        self.status == 200
    }

    fn connection_failure() -> Self {
        Self {
            status: CONNECTION_FAILURE_STATUS,
            body: "Connection failure".to_string(),
        }
    }
}

/// GET with retries on transport failures. HTTP error statuses are not
/// retried; they come back as-is.
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    tries: u32,
    delay: Duration,
}

impl HttpClient {
    pub fn new(config: &HttpConfig, user_agent: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        Ok(Self {
            client,
            tries: config.tries.max(1),
            delay: Duration::from_millis(config.delay_ms),
        })
    }

    pub async fn get(&self, url: &str) -> Response {
        self.get_with_headers(url, HeaderMap::new()).await
    }

    pub async fn get_with_headers(&self, url: &str, headers: HeaderMap) -> Response {
        for attempt in 1..=self.tries {
            match self.try_get(url, headers.clone()).await {
                Ok(response) => return response,
                Err(e) => {
                    tracing::debug!("GET {} failed (attempt {}/{}): {}", url, attempt, self.tries, e);
                    if attempt < self.tries && !self.delay.is_zero() {
                        tokio::time::sleep(self.delay).await;
                    }
                }
            }
        }

        tracing::warn!("GET {} gave up after {} attempts", url, self.tries);
        Response::connection_failure()
    }

    async fn try_get(&self, url: &str, headers: HeaderMap) -> Result<Response> {
        let response = self.client.get(url).headers(headers).send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok(Response { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unreachable_host_yields_connection_failure() {
        let config = HttpConfig {
            tries: 2,
            delay_ms: 0,
            timeout_secs: 2,
        };
        let client = HttpClient::new(&config, "test").unwrap();

        // port 9 on localhost is closed in any sane test environment
        let response = client.get("http://127.0.0.1:9/").await;

        assert_eq!(response.status, CONNECTION_FAILURE_STATUS);
        assert_eq!(response.body, "Connection failure");
        assert!(!response.is_ok());
    }
}
