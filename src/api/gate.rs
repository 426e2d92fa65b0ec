use crate::api::error::ApiErrorCode;
use crate::application_port::{AuthError, AuthService};
use crate::domain_model::{BEARER, Identity};
use std::sync::Arc;
use warp::http::{HeaderMap, header};
use warp::{Filter, reject};

/// Resolves the caller from `Authorization: Bearer <access token>`.
///
/// Only the token's own claims are consulted; the refresh token store is never
/// touched on this path.
pub fn with_identity(
    auth_service: Arc<dyn AuthService>,
) -> impl Filter<Extract = (Identity,), Error = warp::Rejection> + Clone {
    warp::header::headers_cloned().and_then(move |headers: HeaderMap| {
        let auth_service = auth_service.clone();
        async move {
            let token = bearer_token(&headers)
                .ok_or(AuthError::MissingCredentials)
                .map_err(ApiErrorCode::from)
                .map_err(reject::custom)?;
            auth_service
                .verify_token(token)
                .await
                .map_err(ApiErrorCode::from)
                .map_err(reject::custom)
        }
    })
}

/// Non-ASCII header values count as malformed credentials.
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    parse_bearer(value)
}

pub fn parse_bearer(header: &str) -> Option<&str> {
    let token = header.strip_prefix(BEARER)?.strip_prefix(' ')?.trim();
    (!token.is_empty()).then_some(token)
}
