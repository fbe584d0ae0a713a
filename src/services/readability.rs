use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::{Child, Command};

use crate::config::ReadabilityConfig;
use crate::error::{AppError, Result};

use super::extractor::ContentExtractor;
use super::http::{HttpClient, Response};

pub const READABILITY_PARSER_NAME: &str = "readability";

const LAUNCH_POLL_INTERVAL: Duration = Duration::from_millis(200);
const LAUNCH_TIMEOUT: Duration = Duration::from_secs(60);

/// A local Readability.js server, spawned on start and killed on shutdown.
pub struct ReadabilityServer {
    http: HttpClient,
    port: u16,
    child: Option<Child>,
}

impl ReadabilityServer {
    pub async fn start(config: &ReadabilityConfig, http: HttpClient) -> Result<Self> {
        let log_file = config.log_file.as_ref().ok_or_else(|| {
            AppError::Config("the readability parser needs a log file".to_string())
        })?;

        install(&config.server_dir, &config.repo_url).await?;

        let child = Command::new("node")
            .arg(config.server_dir.join("main.js"))
            .env("LOGFILE", log_file)
            .env("PORT", config.port.to_string())
            .kill_on_drop(true)
            .spawn()?;

        let mut server = Self {
            http,
            port: config.port,
            child: Some(child),
        };

        if let Err(e) = wait_for_launch(log_file, config.port, LAUNCH_TIMEOUT).await {
            server.shutdown().await.ok();
            return Err(e);
        }

        tracing::info!("readability server listening on port {}", config.port);
        Ok(server)
    }

    fn request_url(&self, article_url: &str) -> String {
        article_request_url(self.port, article_url)
    }
}

fn article_request_url(port: u16, article_url: &str) -> String {
    format!(
        "http://localhost:{}/article/{}",
        port,
        urlencoding::encode(article_url)
    )
}

/// Clones the server and installs its node dependencies, once.
async fn install(server_dir: &Path, repo_url: &str) -> Result<()> {
    if server_dir.exists() {
        return Ok(());
    }

    tracing::info!("installing readability server into {}", server_dir.display());
    run(Command::new("git").arg("clone").arg(repo_url).arg(server_dir)).await?;
    run(Command::new("npm").arg("i").current_dir(server_dir)).await?;
    Ok(())
}

async fn run(command: &mut Command) -> Result<()> {
    let status = command.status().await?;
    if status.success() {
        Ok(())
    } else {
        Err(AppError::Extractor(format!("{:?} exited with {}", command, status)))
    }
}

fn launched(log: &str, port: u16) -> bool {
    log.contains(&format!("Server launched on port {port}"))
}

async fn wait_for_launch(log_file: &Path, port: u16, timeout: Duration) -> Result<()> {
    let deadline = tokio::time::Instant::now() + timeout;

    loop {
        tokio::time::sleep(LAUNCH_POLL_INTERVAL).await;

        match tokio::fs::read_to_string(log_file).await {
            Ok(log) if launched(&log, port) => return Ok(()),
            Ok(_) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }

        if tokio::time::Instant::now() >= deadline {
            return Err(AppError::Extractor(format!(
                "readability server did not report a launch on port {port} within {:?}",
                timeout
            )));
        }
    }
}

#[async_trait]
impl ContentExtractor for ReadabilityServer {
    fn name(&self) -> &str {
        READABILITY_PARSER_NAME
    }

    async fn extract(&self, url: &str) -> Response {
        self.http.get(&self.request_url(url)).await
    }

    async fn shutdown(&mut self) -> Result<()> {
        if let Some(mut child) = self.child.take() {
            child.kill().await?;
            tracing::info!("readability server stopped");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn article_url_is_path_encoded() {
        assert_eq!(
            article_request_url(25287, "https://a.com/x?y=1"),
            "http://localhost:25287/article/https%3A%2F%2Fa.com%2Fx%3Fy%3D1"
        );
    }

    #[test]
    fn detects_launch_line_for_our_port_only() {
        let log = "booting\nServer launched on port 25287\n";
        assert!(launched(log, 25287));
        assert!(!launched(log, 8080));
    }

    #[tokio::test]
    async fn missing_log_file_is_a_config_error() {
        let config = ReadabilityConfig::default();
        let http = HttpClient::new(&crate::config::HttpConfig::default(), "test").unwrap();
        assert!(matches!(
            ReadabilityServer::start(&config, http).await,
            Err(AppError::Config(_))
        ));
    }

    #[tokio::test]
    async fn launch_wait_sees_log_line() {
        let dir = tempfile::tempdir().unwrap();
        let log = dir.path().join("server.log");
        std::fs::write(&log, "Server launched on port 25287\n").unwrap();

        wait_for_launch(&log, 25287, Duration::from_secs(5)).await.unwrap();
    }

    #[tokio::test]
    async fn launch_wait_times_out_on_silent_log() {
        let dir = tempfile::tempdir().unwrap();
        let log = dir.path().join("server.log");
        std::fs::write(&log, "still booting\n").unwrap();

        let err = wait_for_launch(&log, 25287, Duration::from_millis(500))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Extractor(_)));
    }
}
