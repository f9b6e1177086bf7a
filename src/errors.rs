use crate::codec::DecodeError;
use crate::models::EditError;
use crate::recurring::RecurringError;
use axum::http::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to build HTTP client: {0}")]
    Client(String),
    #[error("remote store returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("remote store unreachable: {0}")]
    Network(#[from] reqwest::Error),
    #[error("stored value for {key} is unreadable: {source}")]
    Decode {
        key: String,
        #[source]
        source: DecodeError,
    },
    #[error("failed to encode planner record: {0}")]
    Encode(#[from] serde_json::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl StoreError {
    pub fn is_remote(&self) -> bool {
        matches!(self, StoreError::Status { .. } | StoreError::Network(_))
    }
}

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::CONFLICT,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            message: message.into(),
        }
    }

    pub fn internal(err: impl std::error::Error) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: err.to_string(),
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        if err.is_remote() {
            Self {
                status: StatusCode::BAD_GATEWAY,
                message: err.to_string(),
            }
        } else {
            Self::internal(err)
        }
    }
}

impl From<EditError> for AppError {
    fn from(err: EditError) -> Self {
        Self::bad_request(err.to_string())
    }
}

impl From<RecurringError> for AppError {
    fn from(err: RecurringError) -> Self {
        match err {
            RecurringError::NoSpace | RecurringError::AlreadyRecurring(_) => Self::conflict(err.to_string()),
            RecurringError::EmptyText => Self::bad_request(err.to_string()),
        }
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        (self.status, self.message).into_response()
    }
}
