use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::auth::extractors::AuthUser;
use crate::bookmarks::dto::{
    BookmarkResponse, BookmarkStats, CreateBookmarkRequest, PageQuery, Paginated,
    UpdateBookmarkRequest,
};
use crate::bookmarks::services;
use crate::error::ApiError;
use crate::state::AppState;

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/bookmarks", get(list_bookmarks))
        .route("/bookmarks/:id", get(get_bookmark))
        .route("/bookmarks/:id/stats", get(bookmark_stats))
}

pub fn write_routes() -> Router<AppState> {
    Router::new()
        .route("/bookmarks", post(create_bookmark))
        .route(
            "/bookmarks/:id",
            put(update_bookmark)
                .patch(update_bookmark)
                .delete(delete_bookmark),
        )
}

#[instrument(skip(state))]
async fn list_bookmarks(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(query): Query<PageQuery>,
) -> Result<Json<Paginated<BookmarkResponse>>, ApiError> {
    let listing = services::list_bookmarks(state.store.as_ref(), user_id, query).await?;
    Ok(Json(listing))
}

#[instrument(skip(state, payload))]
async fn create_bookmark(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<CreateBookmarkRequest>,
) -> Result<(StatusCode, Json<BookmarkResponse>), ApiError> {
    let bookmark = services::create_bookmark(state.store.as_ref(), user_id, payload).await?;
    info!(bookmark_id = %bookmark.id, "bookmark created");
    Ok((StatusCode::CREATED, Json(bookmark.into())))
}

#[instrument(skip(state))]
async fn get_bookmark(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<BookmarkResponse>, ApiError> {
    let bookmark = services::get_bookmark(state.store.as_ref(), user_id, id).await?;
    Ok(Json(bookmark.into()))
}

#[instrument(skip(state, payload))]
async fn update_bookmark(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateBookmarkRequest>,
) -> Result<Json<BookmarkResponse>, ApiError> {
    let bookmark = services::update_bookmark(state.store.as_ref(), user_id, id, payload).await?;
    Ok(Json(bookmark.into()))
}

#[instrument(skip(state))]
async fn delete_bookmark(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    services::delete_bookmark(state.store.as_ref(), user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state))]
async fn bookmark_stats(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<BookmarkStats>, ApiError> {
    let stats = services::bookmark_stats(state.store.as_ref(), user_id, id).await?;
    Ok(Json(stats))
}
