use thiserror::Error;

#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl NotifyError {
    /// Connection-level failures. The directory degrades on these rather
    /// than fail the caller.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, NotifyError::Unavailable(_))
    }

    /// Map a driver error, prefixing `context` while keeping the
    /// unavailable/database distinction.
    pub fn from_sqlx(context: &str, err: sqlx::Error) -> Self {
        match NotifyError::from(err) {
            NotifyError::Unavailable(msg) => NotifyError::Unavailable(format!("{context}: {msg}")),
            NotifyError::Database(msg) => NotifyError::Database(format!("{context}: {msg}")),
            other => other,
        }
    }
}

impl From<sqlx::Error> for NotifyError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::Io(_)
            | sqlx::Error::Tls(_) => NotifyError::Unavailable(err.to_string()),
            _ => NotifyError::Database(err.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, NotifyError>;
