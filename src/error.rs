use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("constraint violation: {0}")]
    Conflict(String),

    #[error("storage error: {0}")]
    Storage(String),

    #[error("invariant violated: {0}")]
    InvariantViolation(String),

    #[error("malformed url {url:?}: {reason}")]
    MalformedUrl { url: String, reason: &'static str },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("feed parse error: {0}")]
    FeedParse(#[from] feed_rs::parser::ParseFeedError),

    #[error("content extractor error: {0}")]
    Extractor(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl AppError {
    /// NotFound and Conflict mean the caller picked the wrong operation or
    /// lost a race; the item can be skipped. Everything else is fatal.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, AppError::NotFound(_) | AppError::Conflict(_))
    }
}

impl From<rusqlite::Error> for AppError {
    fn from(err: rusqlite::Error) -> Self {
        match err {
            rusqlite::Error::SqliteFailure(ref code, _)
                if code.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                AppError::Conflict(err.to_string())
            }
            rusqlite::Error::QueryReturnedNoRows => AppError::NotFound(err.to_string()),
            other => AppError::Storage(other.to_string()),
        }
    }
}

impl From<tokio_rusqlite::Error> for AppError {
    fn from(err: tokio_rusqlite::Error) -> Self {
        match err {
            tokio_rusqlite::Error::Rusqlite(e) => e.into(),
            tokio_rusqlite::Error::Close((_, e)) => AppError::Storage(e.to_string()),
            other => AppError::Storage(other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constraint_failures_become_conflicts() {
        let conn = rusqlite::Connection::open_in_memory().unwrap();
        conn.execute_batch("CREATE TABLE t (k TEXT PRIMARY KEY); INSERT INTO t VALUES ('a');")
            .unwrap();
        let err: AppError = conn
            .execute("INSERT INTO t VALUES ('a')", [])
            .unwrap_err()
            .into();
        assert!(matches!(err, AppError::Conflict(_)));
        assert!(err.is_recoverable());
    }

    #[test]
    fn other_sqlite_failures_are_storage_errors() {
        let conn = rusqlite::Connection::open_in_memory().unwrap();
        let err: AppError = conn
            .execute("INSERT INTO missing VALUES (1)", [])
            .unwrap_err()
            .into();
        assert!(matches!(err, AppError::Storage(_)));
        assert!(!err.is_recoverable());
    }

    #[test]
    fn invariant_violations_are_fatal() {
        let err = AppError::InvariantViolation("2 rows changed".into());
        assert!(!err.is_recoverable());
    }
}
