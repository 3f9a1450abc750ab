//! Error types for the corpus engine

use thiserror::Error;

#[derive(Error, Debug)]
pub enum KuranError {
    #[error("Malformed record: {0}")]
    MalformedRecord(String),

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, KuranError>;

impl KuranError {
    pub fn malformed<S: Into<String>>(msg: S) -> Self {
        KuranError::MalformedRecord(msg.into())
    }

    pub fn invalid_query<S: Into<String>>(msg: S) -> Self {
        KuranError::InvalidQuery(msg.into())
    }
}

impl From<rusqlite::Error> for KuranError {
    fn from(err: rusqlite::Error) -> Self {
        KuranError::Database(err.to_string())
    }
}

impl serde::Serialize for KuranError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}
