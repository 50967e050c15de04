use axum::{http::StatusCode, response::IntoResponse};
use serde::Serialize;

use crate::store;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("{0}")]
    Validation(String),
    #[error("gone")]
    Gone,
    #[error("auth_failed")]
    AuthFailed,
    #[error(transparent)]
    Store(#[from] store::Error),
    #[error("unexpected")]
    Unexpected(String),
}

impl From<serde_json::Error> for Error {
    fn from(error: serde_json::Error) -> Self {
        Self::Unexpected(error.to_string())
    }
}

#[derive(Serialize)]
#[serde(tag = "error", rename_all = "snake_case")]
pub enum ErrorResponse {
    Validation { message: String },
    Gone { message: String },
    AuthFailed { message: String },
    Unexpected { message: String },
}

impl From<Error> for ErrorResponse {
    fn from(error: Error) -> Self {
        match error {
            Error::Validation(message) => Self::Validation { message },
            Error::Gone => Self::Gone {
                message: "Note expired or already read".into(),
            },
            Error::AuthFailed => Self::AuthFailed {
                message: "Incorrect password".into(),
            },
            error => {
                tracing::error!("{:?}", error);
                Self::Unexpected {
                    message: "Unexpected error".into(),
                }
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> axum::response::Response {
        let status = match self {
            Error::Validation(_) => StatusCode::BAD_REQUEST,
            Error::Gone => StatusCode::GONE,
            Error::AuthFailed => StatusCode::FORBIDDEN,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let mut res = axum::Json(ErrorResponse::from(self)).into_response();
        *res.status_mut() = status;
        res
    }
}
