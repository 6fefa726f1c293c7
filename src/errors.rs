/// Domain-specific error types for the verdict service.
/// Validation failures are all-or-nothing: the caller gets a distinct
/// error naming the offending field and must fix the input and retry.
/// No partial output, no default substitution at this layer.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("invalid odds")]
    InvalidOdds,

    #[error("invalid winProb")]
    InvalidWinProb,

    #[error("invalid stake")]
    InvalidStake,

    #[error("invalid decimal odds")]
    InvalidDecimalOdds,

    #[error("network error: {0}")]
    Network(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("AI API error: {status} {body}")]
    AiApi { status: u16, body: String },

    #[error("database error: {0}")]
    Database(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("channel closed: {0}")]
    ChannelClosed(String),
}

impl AppError {
    /// Stable machine-readable tag for the API surface.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidOdds => "invalid_odds",
            Self::InvalidWinProb => "invalid_win_prob",
            Self::InvalidStake => "invalid_stake",
            Self::InvalidDecimalOdds => "invalid_decimal_odds",
            Self::Network(_) => "network",
            Self::Parse(_) => "parse",
            Self::AiApi { .. } => "ai_api",
            Self::Database(_) => "database",
            Self::Config(_) => "config",
            Self::ChannelClosed(_) => "channel_closed",
        }
    }
}

impl From<reqwest::Error> for AppError {
    fn from(e: reqwest::Error) -> Self {
        AppError::Network(e.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(e: serde_json::Error) -> Self {
        AppError::Parse(e.to_string())
    }
}

impl From<rusqlite::Error> for AppError {
    fn from(e: rusqlite::Error) -> Self {
        AppError::Database(e.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(e: std::io::Error) -> Self {
        AppError::Network(e.to_string())
    }
}

pub type AppResult<T> = Result<T, AppError>;
