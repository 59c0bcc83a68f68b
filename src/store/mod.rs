use async_trait::async_trait;
use sqlx::FromRow;
use thiserror::Error;
use time::OffsetDateTime;
use uuid::Uuid;

pub mod mem;
pub mod pg;

pub use mem::MemStore;
pub use pg::PgStore;

/// User record as persisted.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: OffsetDateTime,
}

/// Bookmark record as persisted. `owner_id` is fixed at creation.
#[derive(Debug, Clone, FromRow)]
pub struct Bookmark {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub url: String,
    pub short_url: String,
    pub body: String,
    pub visits: i64,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

#[derive(Debug)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
}

#[derive(Debug)]
pub struct NewBookmark {
    pub owner_id: Uuid,
    pub url: String,
    pub short_url: String,
    pub body: String,
}

/// Partial update; `None` leaves the column unchanged.
#[derive(Debug, Default)]
pub struct BookmarkPatch {
    pub url: Option<String>,
    pub body: Option<String>,
}

/// Columns covered by a unique constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniqueField {
    Username,
    Email,
    Url,
    ShortUrl,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("unique constraint violated on {0:?}")]
    Duplicate(UniqueField),
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// Query surface of the relational store. Both the Postgres implementation
/// and the in-memory fake enforce the same uniqueness rules and report them
/// as `StoreError::Duplicate`, so a check-then-insert race still comes back
/// as a conflict rather than a raw database failure.
#[async_trait]
pub trait Store: Send + Sync {
    async fn create_user(&self, new: NewUser) -> Result<User, StoreError>;
    async fn user_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;
    async fn user_by_username(&self, username: &str) -> Result<Option<User>, StoreError>;
    async fn user_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError>;

    async fn create_bookmark(&self, new: NewBookmark) -> Result<Bookmark, StoreError>;
    /// Url uniqueness is global, not per owner.
    async fn bookmark_by_url(&self, url: &str) -> Result<Option<Bookmark>, StoreError>;
    /// All reads and writes below are owner-scoped: a bookmark belonging to
    /// someone else behaves exactly like one that does not exist.
    async fn bookmark_for_owner(
        &self,
        owner_id: Uuid,
        id: Uuid,
    ) -> Result<Option<Bookmark>, StoreError>;
    async fn list_bookmarks(
        &self,
        owner_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Bookmark>, StoreError>;
    async fn count_bookmarks(&self, owner_id: Uuid) -> Result<i64, StoreError>;
    async fn update_bookmark(
        &self,
        owner_id: Uuid,
        id: Uuid,
        patch: BookmarkPatch,
    ) -> Result<Option<Bookmark>, StoreError>;
    async fn delete_bookmark(&self, owner_id: Uuid, id: Uuid) -> Result<bool, StoreError>;
}
