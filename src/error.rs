use actix_web::{HttpResponse, ResponseError};
use serde::Serialize;
use serde_json::{json, Value};

use crate::validate::FieldError;

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub message: String,
    pub additional_information: Value,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub status_code: u16,
    pub error: ErrorDetail,
}

#[derive(thiserror::Error, Debug)]
pub enum ApiError {
    #[error("validation failed")]
    Validation(Vec<FieldError>),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    InsertFailed(&'static str),
    #[error("{path} error {message}")]
    Internal { path: String, message: String },
}

impl ApiError {
    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn internal(path: &str, err: impl std::fmt::Display) -> Self {
        ApiError::Internal {
            path: path.to_string(),
            message: err.to_string(),
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> actix_web::http::StatusCode {
        use actix_web::http::StatusCode;
        match self {
            ApiError::Validation(_) | ApiError::InsertFailed(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if let ApiError::Internal { path, message } = self {
            log::error!("{path}: {message}");
        }
        let additional_information = match self {
            ApiError::Validation(errors) => json!(errors),
            _ => json!({}),
        };
        let status = self.status_code();
        HttpResponse::build(status).json(ErrorBody {
            status_code: status.as_u16(),
            error: ErrorDetail {
                message: self.to_string(),
                additional_information,
            },
        })
    }
}
