use crate::api::response::ApiResponse;
use crate::application_port::*;
use serde::Serialize;
use std::convert::Infallible;
use thiserror::Error;
use tracing::{debug, warn};
use warp::http::StatusCode;
use warp::{Rejection, reject};

pub async fn recover_error(err: Rejection) -> Result<impl warp::Reply, Infallible> {
    let code = if let Some(code) = err.find::<ApiErrorCode>() {
        *code
    } else if let Some(e) = err.find::<warp::body::BodyDeserializeError>() {
        debug!("rejected request body: {}", e);
        ApiErrorCode::BadRequest
    } else if err.find::<reject::InvalidQuery>().is_some() {
        ApiErrorCode::BadRequest
    } else if err.find::<reject::PayloadTooLarge>().is_some() {
        ApiErrorCode::PayloadTooLarge
    } else if err.find::<reject::LengthRequired>().is_some() {
        ApiErrorCode::BadRequest
    } else if err.find::<reject::UnsupportedMediaType>().is_some() {
        ApiErrorCode::BadRequest
    } else if err.find::<reject::MethodNotAllowed>().is_some() {
        ApiErrorCode::MethodNotAllowed
    } else if err.is_not_found() {
        ApiErrorCode::NotFound
    } else {
        ApiErrorCode::internal(format!("unhandled rejection: {:?}", err))
    };

    let json = warp::reply::json(&ApiResponse::err(code, code.to_string()));
    Ok(warp::reply::with_status(json, code.status()))
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub code: ApiErrorCode,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize)]
pub enum ApiErrorCode {
    #[error("Missing required field")]
    MissingField,
    #[error("Malformed request")]
    BadRequest,
    #[error("Missing or malformed authorization header")]
    Unauthorized,
    #[error("Token is not valid")]
    InvalidToken,
    #[error("Token has expired")]
    TokenExpired,
    #[error("Refresh token not found or revoked")]
    TokenRevoked,
    #[error("Resource not found")]
    NotFound,
    #[error("Method not allowed")]
    MethodNotAllowed,
    #[error("Resource already exists")]
    Conflict,
    #[error("Request body too large")]
    PayloadTooLarge,
    #[error("Identity provider error")]
    ProviderError,
    #[error("Internal error")]
    InternalError,
}

impl ApiErrorCode {
    pub fn internal<E: std::fmt::Display>(error: E) -> ApiErrorCode {
        warn!("Internal error: {}", error);
        ApiErrorCode::InternalError
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiErrorCode::MissingField | ApiErrorCode::BadRequest => StatusCode::BAD_REQUEST,
            ApiErrorCode::Unauthorized
            | ApiErrorCode::InvalidToken
            | ApiErrorCode::TokenExpired
            | ApiErrorCode::TokenRevoked => StatusCode::UNAUTHORIZED,
            ApiErrorCode::NotFound => StatusCode::NOT_FOUND,
            ApiErrorCode::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiErrorCode::Conflict => StatusCode::CONFLICT,
            ApiErrorCode::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            ApiErrorCode::ProviderError => StatusCode::BAD_GATEWAY,
            ApiErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl reject::Reject for ApiErrorCode {}

impl From<AuthError> for ApiErrorCode {
    fn from(error: AuthError) -> Self {
        match error {
            AuthError::MissingField(_) => ApiErrorCode::MissingField,
            AuthError::MissingCredentials => ApiErrorCode::Unauthorized,
            AuthError::TokenInvalid => ApiErrorCode::InvalidToken,
            AuthError::TokenExpired => ApiErrorCode::TokenExpired,
            AuthError::TokenRevoked => ApiErrorCode::TokenRevoked,
            AuthError::StateMismatch | AuthError::Provider(_) => ApiErrorCode::ProviderError,
            AuthError::Store(e) => ApiErrorCode::internal(e),
            AuthError::InternalError(e) => ApiErrorCode::internal(e),
        }
    }
}

impl From<CatalogError> for ApiErrorCode {
    fn from(error: CatalogError) -> Self {
        match error {
            CatalogError::NotFound(what) => {
                debug!("{} not found", what);
                ApiErrorCode::NotFound
            }
            CatalogError::Conflict(what) => {
                debug!("{} already exists", what);
                ApiErrorCode::Conflict
            }
            CatalogError::Store(e) => ApiErrorCode::internal(e),
        }
    }
}
