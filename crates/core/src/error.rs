use thiserror::Error;

pub type CampaignResult<T> = Result<T, CampaignError>;

#[derive(Error, Debug)]
pub enum CampaignError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Historical data unavailable: {0}")]
    DataUnavailable(String),

    #[error("Unknown objective: {0}")]
    UnknownObjective(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl CampaignError {
    /// Whether the error comes from the caller's request rather than from the service.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::InvalidInput(_) | Self::UnknownObjective(_))
    }
}
