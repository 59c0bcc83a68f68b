use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::{Bookmark, BookmarkPatch, NewBookmark, NewUser, Store, StoreError, UniqueField, User};

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Surface unique-constraint violations (Postgres 23505) as typed
/// duplicates; constraint names are fixed by the initial migration.
fn translate(e: sqlx::Error) -> StoreError {
    if let Some(db) = e.as_database_error() {
        if db.is_unique_violation() {
            match db.constraint() {
                Some("users_username_key") => {
                    return StoreError::Duplicate(UniqueField::Username)
                }
                Some("users_email_key") => return StoreError::Duplicate(UniqueField::Email),
                Some("bookmarks_url_key") => return StoreError::Duplicate(UniqueField::Url),
                Some("bookmarks_short_url_key") => {
                    return StoreError::Duplicate(UniqueField::ShortUrl)
                }
                _ => {}
            }
        }
    }
    StoreError::Database(e)
}

#[async_trait]
impl Store for PgStore {
    async fn create_user(&self, new: NewUser) -> Result<User, StoreError> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, username, email, password_hash)
            VALUES ($1, $2, $3, $4)
            RETURNING id, username, email, password_hash, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&new.username)
        .bind(&new.email)
        .bind(&new.password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(translate)
    }

    async fn user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, password_hash, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn user_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, password_hash, created_at
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn user_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, password_hash, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn create_bookmark(&self, new: NewBookmark) -> Result<Bookmark, StoreError> {
        sqlx::query_as::<_, Bookmark>(
            r#"
            INSERT INTO bookmarks (id, owner_id, url, short_url, body)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, owner_id, url, short_url, body, visits, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(new.owner_id)
        .bind(&new.url)
        .bind(&new.short_url)
        .bind(&new.body)
        .fetch_one(&self.pool)
        .await
        .map_err(translate)
    }

    async fn bookmark_by_url(&self, url: &str) -> Result<Option<Bookmark>, StoreError> {
        let bookmark = sqlx::query_as::<_, Bookmark>(
            r#"
            SELECT id, owner_id, url, short_url, body, visits, created_at, updated_at
            FROM bookmarks
            WHERE url = $1
            "#,
        )
        .bind(url)
        .fetch_optional(&self.pool)
        .await?;
        Ok(bookmark)
    }

    async fn bookmark_for_owner(
        &self,
        owner_id: Uuid,
        id: Uuid,
    ) -> Result<Option<Bookmark>, StoreError> {
        let bookmark = sqlx::query_as::<_, Bookmark>(
            r#"
            SELECT id, owner_id, url, short_url, body, visits, created_at, updated_at
            FROM bookmarks
            WHERE id = $1 AND owner_id = $2
            "#,
        )
        .bind(id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(bookmark)
    }

    async fn list_bookmarks(
        &self,
        owner_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Bookmark>, StoreError> {
        let rows = sqlx::query_as::<_, Bookmark>(
            r#"
            SELECT id, owner_id, url, short_url, body, visits, created_at, updated_at
            FROM bookmarks
            WHERE owner_id = $1
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(owner_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn count_bookmarks(&self, owner_id: Uuid) -> Result<i64, StoreError> {
        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM bookmarks
            WHERE owner_id = $1
            "#,
        )
        .bind(owner_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    async fn update_bookmark(
        &self,
        owner_id: Uuid,
        id: Uuid,
        patch: BookmarkPatch,
    ) -> Result<Option<Bookmark>, StoreError> {
        sqlx::query_as::<_, Bookmark>(
            r#"
            UPDATE bookmarks
            SET url = COALESCE($3, url),
                body = COALESCE($4, body),
                updated_at = now()
            WHERE id = $1 AND owner_id = $2
            RETURNING id, owner_id, url, short_url, body, visits, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(owner_id)
        .bind(patch.url)
        .bind(patch.body)
        .fetch_optional(&self.pool)
        .await
        .map_err(translate)
    }

    async fn delete_bookmark(&self, owner_id: Uuid, id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r#"
            DELETE FROM bookmarks
            WHERE id = $1 AND owner_id = $2
            "#,
        )
        .bind(id)
        .bind(owner_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
