use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use tracing::warn;
use uuid::Uuid;

use crate::auth::jwt::JwtKeys;
use crate::auth::TokenKind;
use crate::error::ApiError;

/// Resolved identity of the caller; required by every protected handler, so
/// token verification always runs before any storage access.
#[derive(Debug)]
pub struct AuthUser(pub Uuid);

/// Same guard for the refresh flow: only a refresh token gets through.
#[derive(Debug)]
pub struct RefreshUser(pub Uuid);

fn bearer_token(parts: &Parts) -> Result<&str, ApiError> {
    let header = parts
        .headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(ApiError::MissingToken)?;
    header
        .strip_prefix("Bearer ")
        .or_else(|| header.strip_prefix("bearer "))
        .ok_or(ApiError::InvalidToken)
}

fn resolve<S>(parts: &Parts, state: &S, kind: TokenKind) -> Result<Uuid, ApiError>
where
    JwtKeys: FromRef<S>,
{
    let keys = JwtKeys::from_ref(state);
    let token = bearer_token(parts)?;
    let claims = keys.verify_kind(token, kind).map_err(|e| {
        warn!(error = %e, "token rejected");
        e
    })?;
    Ok(claims.sub)
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        resolve(parts, state, TokenKind::Access).map(AuthUser)
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for RefreshUser
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        resolve(parts, state, TokenKind::Refresh).map(RefreshUser)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::AppState;
    use axum::http::Request;

    fn parts_with_auth(value: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/");
        if let Some(v) = value {
            builder = builder.header(axum::http::header::AUTHORIZATION, v);
        }
        builder.body(()).expect("request builds").into_parts().0
    }

    #[tokio::test]
    async fn missing_header_is_a_missing_token() {
        let state = AppState::fake();
        let mut parts = parts_with_auth(None);
        let err = AuthUser::from_request_parts(&mut parts, &state)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::MissingToken));
    }

    #[tokio::test]
    async fn non_bearer_scheme_is_invalid() {
        let state = AppState::fake();
        let mut parts = parts_with_auth(Some("Token abc"));
        let err = AuthUser::from_request_parts(&mut parts, &state)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::InvalidToken));
    }

    #[tokio::test]
    async fn access_token_resolves_its_subject() {
        let state = AppState::fake();
        let keys = JwtKeys::from_ref(&state);
        let user_id = Uuid::new_v4();
        let token = keys.sign_access(user_id).expect("sign access");

        let mut parts = parts_with_auth(Some(&format!("Bearer {token}")));
        let AuthUser(resolved) = AuthUser::from_request_parts(&mut parts, &state)
            .await
            .expect("extractor accepts access token");
        assert_eq!(resolved, user_id);
    }

    #[tokio::test]
    async fn refresh_token_is_rejected_where_access_is_required() {
        let state = AppState::fake();
        let keys = JwtKeys::from_ref(&state);
        let token = keys.sign_refresh(Uuid::new_v4()).expect("sign refresh");

        let mut parts = parts_with_auth(Some(&format!("Bearer {token}")));
        let err = AuthUser::from_request_parts(&mut parts, &state)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::WrongTokenKind));
    }

    #[tokio::test]
    async fn access_token_is_rejected_where_refresh_is_required() {
        let state = AppState::fake();
        let keys = JwtKeys::from_ref(&state);
        let token = keys.sign_access(Uuid::new_v4()).expect("sign access");

        let mut parts = parts_with_auth(Some(&format!("Bearer {token}")));
        let err = RefreshUser::from_request_parts(&mut parts, &state)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::WrongTokenKind));
    }
}
