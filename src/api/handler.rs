use crate::api::error::ApiErrorCode;
use crate::api::frontend::{Frontend, clear_state_cookie, state_cookie};
use crate::api::response::ApiResponse;
use crate::application_port::{AuthError, AuthService};
use crate::domain_model::Identity;
use crate::logger::*;
use serde::Deserialize;
use std::sync::Arc;
use warp::http::{HeaderValue, StatusCode, header};
use warp::{Reply, reject};

#[derive(Debug, Default, Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

/// Body of `/auth/refresh` and `/auth/logout`. Parsed leniently: a missing or
/// broken body reads as "no token".
#[derive(Debug, Default, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: Option<String>,
}

impl RefreshRequest {
    fn token(body: Option<RefreshRequest>) -> Option<String> {
        body.and_then(|b| b.refresh_token).filter(|t| !t.is_empty())
    }
}

/// 302 with a verbatim `Location`. Going through `Uri` would drop the
/// fragment that carries the tokens.
fn found(target: &str) -> Result<impl Reply + use<>, warp::Rejection> {
    let location = HeaderValue::from_str(target)
        .map_err(ApiErrorCode::internal)
        .map_err(reject::custom)?;
    Ok(warp::reply::with_header(
        warp::reply::with_status(warp::reply(), StatusCode::FOUND),
        header::LOCATION,
        location,
    ))
}

pub async fn login(auth_service: Arc<dyn AuthService>) -> Result<impl Reply, warp::Rejection> {
    let redirect = auth_service
        .begin_login()
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;

    Ok(warp::reply::with_header(
        found(redirect.authorization_url.as_str())?,
        header::SET_COOKIE,
        state_cookie(&redirect.state),
    ))
}

pub async fn callback(
    query: CallbackQuery,
    state_cookie: Option<String>,
    auth_service: Arc<dyn AuthService>,
    frontend: Arc<Frontend>,
) -> Result<impl Reply, warp::Rejection> {
    let Some(code) = query.code.filter(|c| !c.is_empty()) else {
        if let Some(error) = &query.error {
            info!("provider callback without code: {}", error);
        }
        return Err(reject::custom(ApiErrorCode::MissingField));
    };

    let outcome = match (&query.state, &state_cookie) {
        (Some(sent), Some(kept)) if sent != kept => Err(AuthError::StateMismatch),
        _ => auth_service.complete_login(&code).await,
    };

    let target = match outcome {
        Ok(tokens) => frontend
            .login_succeeded(&tokens)
            .map_err(ApiErrorCode::internal)
            .map_err(reject::custom)?,
        Err(e) => {
            error!("oauth callback failed: {}", e);
            frontend.login_failed()
        }
    };

    Ok(warp::reply::with_header(
        found(&target)?,
        header::SET_COOKIE,
        clear_state_cookie(),
    ))
}

pub async fn refresh(
    body: Option<RefreshRequest>,
    auth_service: Arc<dyn AuthService>,
) -> Result<impl Reply, warp::Rejection> {
    let token = RefreshRequest::token(body)
        .ok_or(ApiErrorCode::MissingField)
        .map_err(reject::custom)?;

    let tokens = auth_service
        .refresh_token(&token)
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;

    Ok(warp::reply::json(&tokens))
}

pub async fn logout(
    body: Option<RefreshRequest>,
    auth_service: Arc<dyn AuthService>,
) -> Result<impl Reply, warp::Rejection> {
    if let Some(token) = RefreshRequest::token(body) {
        if let Err(e) = auth_service.logout(&token).await {
            warn!("logout could not revoke refresh token: {}", e);
        }
    }
    Ok(warp::reply::json(&ApiResponse::done()))
}

pub async fn me(identity: Identity) -> Result<impl Reply, warp::Rejection> {
    Ok(warp::reply::json(&identity))
}
