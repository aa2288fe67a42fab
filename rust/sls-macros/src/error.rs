use thiserror::Error;

pub type Result<T> = std::result::Result<T, MacroError>;

/// Failures raised around the interpolator: range parsing, configuration and
/// the CLI's I/O. Macro expansion itself never fails.
#[derive(Debug, Error)]
pub enum MacroError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("invalid time range: {0}")]
    InvalidTimeRange(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed json: {0}")]
    Json(#[from] serde_json::Error),
}
