//! Operational HTTP endpoints.
//!
//! - `/healthz`   : liveness
//! - `/v1/whoami` : strict bearer verification for relying parties

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;

use senbridge_core::error::{BridgeError, TokenError};
use senbridge_core::token;

use crate::app_state::AppState;

pub async fn healthz() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WhoAmI {
    pub address: String,
    pub issuer: String,
    pub expires_at: u64,
}

pub async fn whoami(State(state): State<AppState>, headers: HeaderMap) -> Result<Json<WhoAmI>, ApiError> {
    let bearer = bearer_from_headers(&headers)?;
    let verified = token::verify_strict(bearer)?;

    let jst = verified.token();
    if let Some(expected) = &state.cfg().auth.issuer {
        if jst.issuer() != expected {
            return Err(ApiError::IssuerMismatch);
        }
    }

    tracing::debug!(address = %verified.address(), issuer = %jst.issuer(), "bearer accepted");
    Ok(Json(WhoAmI {
        address: verified.address(),
        issuer: jst.issuer().to_string(),
        expires_at: jst.expires_at(),
    }))
}

fn bearer_from_headers(headers: &HeaderMap) -> Result<&str, ApiError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or(ApiError::MissingBearer)?
        .to_str()
        .map_err(|_| ApiError::MissingBearer)?;
    let (scheme, bearer) = value.split_once(' ').ok_or(ApiError::MissingBearer)?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(ApiError::MissingBearer);
    }
    Some(bearer.trim())
        .filter(|b| !b.is_empty())
        .ok_or(ApiError::MissingBearer)
}

/// HTTP-facing failure of an operational endpoint.
#[derive(Debug)]
pub enum ApiError {
    MissingBearer,
    IssuerMismatch,
    Bridge(BridgeError),
}

impl From<BridgeError> for ApiError {
    fn from(e: BridgeError) -> Self {
        ApiError::Bridge(e)
    }
}

impl From<TokenError> for ApiError {
    fn from(e: TokenError) -> Self {
        ApiError::Bridge(BridgeError::Token(e))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            ApiError::MissingBearer => (
                StatusCode::UNAUTHORIZED,
                "MISSING_BEARER",
                "authorization header must carry a bearer".to_string(),
            ),
            ApiError::IssuerMismatch => (
                StatusCode::UNAUTHORIZED,
                "ISSUER_MISMATCH",
                "bearer was issued for another relying party".to_string(),
            ),
            ApiError::Bridge(BridgeError::Token(t)) => {
                (StatusCode::UNAUTHORIZED, t.as_str(), t.to_string())
            }
            ApiError::Bridge(e) => {
                let status = match e {
                    BridgeError::BadRequest(_) | BridgeError::UnsupportedVersion => {
                        StatusCode::BAD_REQUEST
                    }
                    BridgeError::Timeout => StatusCode::GATEWAY_TIMEOUT,
                    BridgeError::Channel(_) | BridgeError::Remote(_) | BridgeError::Wallet(_) => {
                        StatusCode::BAD_GATEWAY
                    }
                    BridgeError::Token(_) => StatusCode::UNAUTHORIZED,
                    BridgeError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
                };
                (status, e.code().as_str(), e.to_string())
            }
        };
        let body = Json(json!({
            "error": code,
            "message": message,
        }));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn bearer_header_needs_scheme() {
        let mut headers = HeaderMap::new();
        assert!(matches!(bearer_from_headers(&headers), Err(ApiError::MissingBearer)));

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert!(matches!(bearer_from_headers(&headers), Err(ApiError::MissingBearer)));

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer a/b/c"));
        assert_eq!(bearer_from_headers(&headers).ok(), Some("a/b/c"));

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("bearer a/b/c"));
        assert_eq!(bearer_from_headers(&headers).ok(), Some("a/b/c"));

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("BEARER  a/b/c "));
        assert_eq!(bearer_from_headers(&headers).ok(), Some("a/b/c"));

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer "));
        assert!(matches!(bearer_from_headers(&headers), Err(ApiError::MissingBearer)));
    }

    #[test]
    fn token_failures_are_unauthorized() {
        let resp = ApiError::from(TokenError::Expired).into_response();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        let resp = ApiError::from(BridgeError::Internal("x".into())).into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
