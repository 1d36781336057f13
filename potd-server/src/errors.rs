use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use potd_core::{ExhaustReason, PotdError, ViewError, WalkError};
use potd_model::{ErrorBody, ErrorCode};
use std::fmt;
use tracing::error;

pub type AppResult<T> = Result<T, AppError>;

/// HTTP-facing error: a status plus the JSON body the UI inspects.
#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub body: ErrorBody,
}

impl AppError {
    pub fn new(status: StatusCode, body: ErrorBody) -> Self {
        Self { status, body }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            ErrorBody::generic(message),
        )
    }

    pub fn bad_gateway(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_GATEWAY, ErrorBody::generic(message))
    }

    pub fn invalid_date(raw: &str) -> Self {
        Self::new(
            StatusCode::BAD_REQUEST,
            ErrorBody::coded(
                ErrorCode::InvalidDate,
                None,
                format!("invalid date {raw:?}, expected YYYY-MM-DD"),
            ),
        )
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.body.message)
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

impl From<PotdError> for AppError {
    fn from(err: PotdError) -> Self {
        match &err {
            PotdError::InvalidDateFormat(raw) => Self::invalid_date(raw),
            PotdError::NoDataForDate(date) => Self::new(
                StatusCode::NOT_FOUND,
                ErrorBody::coded(ErrorCode::NoData, Some(*date), err.to_string()),
            ),
            PotdError::AssetUnavailable { date, .. } => Self::new(
                StatusCode::BAD_GATEWAY,
                ErrorBody::coded(
                    ErrorCode::AssetUnavailable,
                    Some(*date),
                    err.to_string(),
                ),
            ),
            PotdError::Transport(_) | PotdError::HttpStatus { .. } => {
                Self::bad_gateway(err.to_string())
            }
            _ => {
                error!("request failed: {err}");
                Self::internal("internal error while resolving the picture")
            }
        }
    }
}

impl From<WalkError> for AppError {
    fn from(err: WalkError) -> Self {
        match err {
            WalkError::Exhausted {
                reason, last_probe, ..
            } => {
                let code = match reason {
                    ExhaustReason::MaxAttemptsReached => {
                        ErrorCode::MaxAttemptsReached
                    }
                    ExhaustReason::OldestDateReached => {
                        ErrorCode::OldestDateReached
                    }
                };
                Self::new(
                    StatusCode::NOT_FOUND,
                    ErrorBody::coded(code, Some(last_probe), reason.user_message()),
                )
            }
            WalkError::Failed(err) => err.into(),
        }
    }
}

impl From<ViewError> for AppError {
    fn from(err: ViewError) -> Self {
        match err {
            ViewError::Walk(err) => err.into(),
            ViewError::Asset(err) => err.into(),
        }
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self::internal(err.to_string())
    }
}
