use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::provider::ProviderError;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ServiceError {
    #[error("{0}")]
    NotFound(String),
    #[error(transparent)]
    Provider(#[from] ProviderError),
    #[error("{0}")]
    Internal(String),
}

impl ServiceError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn status_code(&self) -> u16 {
        match self {
            Self::NotFound(_) => 404,
            Self::Provider(_) => 502,
            Self::Internal(_) => 500,
        }
    }

    pub fn to_body(&self) -> ErrorBody {
        ErrorBody {
            error_code: self.status_code(),
            message: self.to_string(),
        }
    }
}

/// Wire shape of every error, both as a whole response and as a per-team marker.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorBody {
    pub error_code: u16,
    pub message: String,
}

/// Outcome for one side of a two-team request; one side failing leaves the
/// other intact.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(untagged)]
pub enum TeamOutcome<T> {
    Ok(T),
    Err(ErrorBody),
}

impl<T> From<Result<T, ServiceError>> for TeamOutcome<T> {
    fn from(result: Result<T, ServiceError>) -> Self {
        match result {
            Ok(value) => Self::Ok(value),
            Err(err) => Self::Err(err.to_body()),
        }
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;
