use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::store::{StoreError, UniqueField};

/// Boundary error for every handler and service. Each variant carries its
/// HTTP status; storage failures are translated before they get here.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Password is too short")]
    PasswordTooShort,
    #[error("Username is too short")]
    UsernameTooShort,
    #[error("Username must be alphanumeric, also no spaces")]
    InvalidUsername,
    #[error("Email is not valid")]
    InvalidEmail,
    #[error("Enter a valid url")]
    InvalidUrl,

    #[error("Email is taken")]
    EmailTaken,
    #[error("Username is taken")]
    UsernameTaken,
    #[error("Url already exists")]
    UrlTaken,

    #[error("Wrong credentials")]
    InvalidCredentials,
    #[error("Missing authorization header")]
    MissingToken,
    #[error("Invalid token")]
    InvalidToken,
    #[error("Token has expired")]
    ExpiredToken,
    #[error("Wrong token kind for this endpoint")]
    WrongTokenKind,
    #[error("User does not exist, or is invalid")]
    UserNotFound,

    #[error("Item not found")]
    NotFound,

    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::PasswordTooShort
            | ApiError::UsernameTooShort
            | ApiError::InvalidUsername
            | ApiError::InvalidEmail
            | ApiError::InvalidUrl => StatusCode::BAD_REQUEST,

            ApiError::EmailTaken | ApiError::UsernameTaken | ApiError::UrlTaken => {
                StatusCode::CONFLICT
            }

            ApiError::InvalidCredentials
            | ApiError::MissingToken
            | ApiError::InvalidToken
            | ApiError::ExpiredToken
            | ApiError::WrongTokenKind
            | ApiError::UserNotFound => StatusCode::UNAUTHORIZED,

            ApiError::NotFound => StatusCode::NOT_FOUND,

            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Internal(e) = &self {
            error!(error = %e, "internal error");
        }
        (self.status(), Json(json!({ "error": self.to_string() }))).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Duplicate(UniqueField::Email) => ApiError::EmailTaken,
            StoreError::Duplicate(UniqueField::Username) => ApiError::UsernameTaken,
            StoreError::Duplicate(UniqueField::Url) => ApiError::UrlTaken,
            StoreError::Duplicate(UniqueField::ShortUrl) => {
                ApiError::Internal(anyhow::anyhow!("short url collision escaped retry"))
            }
            StoreError::Database(e) => ApiError::Internal(e.into()),
        }
    }
}
