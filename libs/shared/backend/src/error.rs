use thiserror::Error;

use shared_models::error::AppError;

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("backend unreachable: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("backend returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("unexpected backend payload: {0}")]
    Decode(String),

    #[error("invalid backend request: {0}")]
    InvalidRequest(String),
}

impl BackendError {
    pub fn status(&self) -> Option<u16> {
        match self {
            BackendError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

impl From<BackendError> for AppError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::Status { status, message } => match status {
                400 => AppError::BadRequest(message),
                401 => AppError::Auth(message),
                403 => AppError::Forbidden(message),
                404 => AppError::NotFound(message),
                409 => AppError::Conflict(message),
                422 => AppError::ValidationError(message),
                _ => AppError::ExternalService(format!("Backend error ({}): {}", status, message)),
            },
            BackendError::Transport(e) => AppError::ExternalService(format!("Backend unreachable: {}", e)),
            BackendError::Decode(msg) => AppError::ExternalService(msg),
            BackendError::InvalidRequest(msg) => AppError::BadRequest(msg),
        }
    }
}
