// src/handlers/error.rs
use std::fmt;

use serde::Serialize;
use warp::http::StatusCode;
use warp::reject::Reject;

use crate::services::market::AnalysisError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    NotFound,
    LocationNotFound,
    PropertyNotFound,
    MarketDataNotFound,
    ValidationError,
    InternalError,
}

#[derive(Debug, Clone)]
pub struct ApiError {
    pub code: ErrorCode,
    pub message: String,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ValidationError, message)
    }

    pub fn property_not_found(id: i64) -> Self {
        Self::new(ErrorCode::PropertyNotFound, format!("Property {} not found", id))
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }

    pub fn status(&self) -> StatusCode {
        match self.code {
            ErrorCode::NotFound
            | ErrorCode::LocationNotFound
            | ErrorCode::PropertyNotFound
            | ErrorCode::MarketDataNotFound => StatusCode::NOT_FOUND,
            ErrorCode::ValidationError => StatusCode::BAD_REQUEST,
            ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ApiError {}
impl Reject for ApiError {}

impl From<AnalysisError> for ApiError {
    fn from(e: AnalysisError) -> Self {
        let code = match &e {
            AnalysisError::LocationNotFound(_) => ErrorCode::LocationNotFound,
            AnalysisError::EmptySeries(_) => ErrorCode::MarketDataNotFound,
            AnalysisError::Source(_) => ErrorCode::InternalError,
        };
        ApiError::new(code, e.to_string())
    }
}
