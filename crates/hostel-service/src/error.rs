//! Service error type.

use hostel_store::StoreError;
use thiserror::Error;

pub type ServiceResult<T> = Result<T, ServiceError>;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Core(#[from] hostel_core::Error),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A background reply task panicked or was aborted.
    #[error("Reply task failed: {0}")]
    Task(String),
}

impl ServiceError {
    /// Whether the caller must sign in again.
    pub const fn is_auth(&self) -> bool {
        match self {
            Self::Store(e) => e.is_auth(),
            _ => false,
        }
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Core(hostel_core::Error::validation(msg))
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Core(hostel_core::Error::Forbidden(msg.into()))
    }
}
