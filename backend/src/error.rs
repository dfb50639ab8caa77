use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

use crate::likes::fingerprint::FingerprintError;
use crate::quote::QuoteError;

pub const INTERNAL_ERROR_BODY: &str = "Internal Server error: See Server Logs";

#[derive(Error, Debug)]
pub enum AppError {
    #[error("No stock ticker provided - please include a stock query parameter")]
    MissingTicker,

    #[error(transparent)]
    Quote(#[from] QuoteError),

    #[error("fingerprint failed: {0}")]
    Fingerprint(#[from] FingerprintError),

    #[error("like store failed: {0:#}")]
    Store(anyhow::Error),

    #[error("caller address unavailable")]
    MissingClientAddr,
}

impl AppError {
    /// Validation errors are answered as `{ "error": .. }` with a 200 status.
    /// Everything else is an operational fault and only reaches the logs.
    pub fn is_user_facing(&self) -> bool {
        matches!(self, AppError::MissingTicker | AppError::Quote(_))
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        if self.is_user_facing() {
            StatusCode::OK
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }

    fn error_response(&self) -> HttpResponse {
        if self.is_user_facing() {
            HttpResponse::Ok().json(json!({ "error": self.to_string() }))
        } else {
            HttpResponse::InternalServerError().body(INTERNAL_ERROR_BODY)
        }
    }
}
