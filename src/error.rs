//!
//! # Custom Error Handling
//!
//! This module defines the custom error type `AppError` used throughout the application.
//! It is a closed set of error kinds: every layer (ports, usecases, access gate) reports
//! failures through one of these variants, and callers branch on the variant rather than
//! on message text.
//!
//! `AppError` implements `actix_web::error::ResponseError` to convert application errors
//! into HTTP responses with JSON bodies. It also provides `From` implementations for
//! `sqlx::Error`, `validator::ValidationErrors`, `jsonwebtoken::errors::Error` and
//! `bcrypt::BcryptError`, so the `?` operator can be used at the boundaries.

use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use serde_json::json;
use std::fmt;
use validator::ValidationErrors;

/// Represents all possible errors that can occur within the application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppError {
    /// Bad input shape or content (HTTP 422). The caller must correct the request.
    Validation(String),
    /// The referenced entity does not exist (HTTP 404).
    NotFound(String),
    /// Registration conflict: the username is already in use (HTTP 409).
    UsernameTaken,
    /// Login failure (HTTP 401). Deliberately the same for an unknown username
    /// and for a wrong password.
    InvalidCredentials,
    /// Missing, malformed, invalid or expired bearer token (HTTP 401).
    Unauthenticated(String),
    /// Valid identity, insufficient role (HTTP 403).
    Forbidden(String),
    /// A deployment defect such as a missing signing secret (HTTP 500).
    Unconfigured(String),
    /// Store unreachable, timed out or returned something undecodable (HTTP 500).
    /// The message is logged but never sent to the client.
    Infrastructure(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AppError::Validation(msg) => write!(f, "Validation Error: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not Found: {}", msg),
            AppError::UsernameTaken => write!(f, "Username already exists"),
            AppError::InvalidCredentials => write!(f, "Invalid credentials"),
            AppError::Unauthenticated(msg) => write!(f, "Unauthenticated: {}", msg),
            AppError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            AppError::Unconfigured(msg) => write!(f, "Unconfigured: {}", msg),
            AppError::Infrastructure(msg) => write!(f, "Infrastructure Error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

/// Converts `AppError` variants into `HttpResponse` objects.
///
/// Infrastructure and configuration failures are reported with a generic body; their
/// detail goes to the log only.
impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::UsernameTaken => StatusCode::CONFLICT,
            AppError::InvalidCredentials | AppError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Unconfigured(_) | AppError::Infrastructure(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            AppError::Validation(msg)
            | AppError::NotFound(msg)
            | AppError::Unauthenticated(msg)
            | AppError::Forbidden(msg) => msg.clone(),
            AppError::UsernameTaken => "username already exists".to_string(),
            AppError::InvalidCredentials => "invalid credentials".to_string(),
            AppError::Unconfigured(msg) => {
                log::error!("configuration error: {}", msg);
                "internal server error".to_string()
            }
            AppError::Infrastructure(msg) => {
                log::error!("infrastructure error: {}", msg);
                "internal server error".to_string()
            }
        };
        HttpResponse::build(self.status_code()).json(json!({ "error": message }))
    }
}

/// Converts `sqlx::Error` into `AppError`.
///
/// `sqlx::Error::RowNotFound` maps to `AppError::NotFound`; everything else is an
/// infrastructure failure.
impl From<sqlx::Error> for AppError {
    fn from(error: sqlx::Error) -> AppError {
        match error {
            sqlx::Error::RowNotFound => AppError::NotFound("Record not found".into()),
            _ => AppError::Infrastructure(error.to_string()),
        }
    }
}

/// Converts `validator::ValidationErrors` into `AppError::Validation`.
///
/// The detailed validation messages are preserved.
impl From<ValidationErrors> for AppError {
    fn from(error: ValidationErrors) -> AppError {
        AppError::Validation(error.to_string())
    }
}

/// Converts `jsonwebtoken::errors::Error` into `AppError::Unauthenticated`.
impl From<jsonwebtoken::errors::Error> for AppError {
    fn from(error: jsonwebtoken::errors::Error) -> AppError {
        AppError::Unauthenticated(format!("Invalid token: {:?}", error.kind()))
    }
}

/// Converts `bcrypt::BcryptError` into `AppError::Infrastructure`.
impl From<bcrypt::BcryptError> for AppError {
    fn from(error: bcrypt::BcryptError) -> AppError {
        AppError::Infrastructure(format!("Password hashing failed: {}", error))
    }
}
