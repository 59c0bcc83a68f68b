use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument};

use crate::auth::dto::{
    LoginRequest, LoginResponse, MeResponse, RefreshResponse, RegisterRequest, RegisterResponse,
};
use crate::auth::extractors::{AuthUser, RefreshUser};
use crate::auth::jwt::JwtKeys;
use crate::auth::services;
use crate::error::ApiError;
use crate::state::AppState;

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
}

pub fn token_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/me", get(me))
        .route("/auth/token/refresh", post(refresh))
}

#[instrument(skip(state, payload))]
async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), ApiError> {
    let user = services::register(state.store.as_ref(), payload).await?;
    info!(user_id = %user.id, "user created");
    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "User Created".into(),
            user: user.into(),
        }),
    ))
}

#[instrument(skip(state, payload))]
async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let keys = JwtKeys::from_ref(&state);
    let resp = services::login(state.store.as_ref(), &keys, payload).await?;
    Ok(Json(resp))
}

#[instrument(skip(state))]
async fn me(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<MeResponse>, ApiError> {
    let resp = services::whoami(state.store.as_ref(), user_id).await?;
    Ok(Json(resp))
}

#[instrument(skip(state))]
async fn refresh(
    State(state): State<AppState>,
    RefreshUser(user_id): RefreshUser,
) -> Result<Json<RefreshResponse>, ApiError> {
    let keys = JwtKeys::from_ref(&state);
    let access = keys.sign_access(user_id)?;
    Ok(Json(RefreshResponse { access }))
}
