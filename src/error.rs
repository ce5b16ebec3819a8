use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("invalid argument: {reason}")]
    InvalidArgument { reason: String },

    #[error("invalid regex {pattern}: {reason}")]
    InvalidRegex { pattern: String, reason: String },

    #[error("invalid json path {path}: {reason}")]
    InvalidJsonPath { path: String, reason: String },

    #[error("invariant violation: {reason}")]
    InvariantViolation { reason: String },

    #[error("decryption failed: {reason}")]
    DecryptionFailed { reason: String },

    #[error("decode error: {reason}")]
    Decode { reason: String },

    #[error("invalid key: {reason}")]
    InvalidKey { reason: String },

    #[error("config parse error in {path}: {reason}")]
    ConfigParse { path: PathBuf, reason: String },

    #[error("config error: {reason}")]
    Config { reason: String },

    #[error("invalid url {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
}

pub type Result<T> = std::result::Result<T, GatewayError>;
