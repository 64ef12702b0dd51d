use crate::infrastructure::error::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MarketplaceError {
    #[error("unauthorized: {message}")]
    Unauthorized { message: String },
    #[error("{what} not found")]
    NotFound { what: &'static str },
    #[error("conflict: {message}")]
    Conflict { message: String },
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
    #[error("store failure, please retry")]
    StoreFailure(#[from] StoreError),
}

impl MarketplaceError {
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized {
            message: message.into(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }
}
