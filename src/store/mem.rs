use std::sync::Mutex;

use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use super::{Bookmark, BookmarkPatch, NewBookmark, NewUser, Store, StoreError, UniqueField, User};

/// In-memory store with the same uniqueness behavior as the Postgres
/// implementation. Backs `AppState::fake()` and the service tests.
#[derive(Default)]
pub struct MemStore {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    users: Vec<User>,
    bookmarks: Vec<Bookmark>,
}

#[async_trait]
impl Store for MemStore {
    async fn create_user(&self, new: NewUser) -> Result<User, StoreError> {
        let mut inner = self.inner.lock().expect("mem store poisoned");
        if inner.users.iter().any(|u| u.email == new.email) {
            return Err(StoreError::Duplicate(UniqueField::Email));
        }
        if inner.users.iter().any(|u| u.username == new.username) {
            return Err(StoreError::Duplicate(UniqueField::Username));
        }
        let user = User {
            id: Uuid::new_v4(),
            username: new.username,
            email: new.email,
            password_hash: new.password_hash,
            created_at: OffsetDateTime::now_utc(),
        };
        inner.users.push(user.clone());
        Ok(user)
    }

    async fn user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let inner = self.inner.lock().expect("mem store poisoned");
        Ok(inner.users.iter().find(|u| u.email == email).cloned())
    }

    async fn user_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let inner = self.inner.lock().expect("mem store poisoned");
        Ok(inner.users.iter().find(|u| u.username == username).cloned())
    }

    async fn user_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let inner = self.inner.lock().expect("mem store poisoned");
        Ok(inner.users.iter().find(|u| u.id == id).cloned())
    }

    async fn create_bookmark(&self, new: NewBookmark) -> Result<Bookmark, StoreError> {
        let mut inner = self.inner.lock().expect("mem store poisoned");
        if inner.bookmarks.iter().any(|b| b.url == new.url) {
            return Err(StoreError::Duplicate(UniqueField::Url));
        }
        if inner.bookmarks.iter().any(|b| b.short_url == new.short_url) {
            return Err(StoreError::Duplicate(UniqueField::ShortUrl));
        }
        let now = OffsetDateTime::now_utc();
        let bookmark = Bookmark {
            id: Uuid::new_v4(),
            owner_id: new.owner_id,
            url: new.url,
            short_url: new.short_url,
            body: new.body,
            visits: 0,
            created_at: now,
            updated_at: now,
        };
        inner.bookmarks.push(bookmark.clone());
        Ok(bookmark)
    }

    async fn bookmark_by_url(&self, url: &str) -> Result<Option<Bookmark>, StoreError> {
        let inner = self.inner.lock().expect("mem store poisoned");
        Ok(inner.bookmarks.iter().find(|b| b.url == url).cloned())
    }

    async fn bookmark_for_owner(
        &self,
        owner_id: Uuid,
        id: Uuid,
    ) -> Result<Option<Bookmark>, StoreError> {
        let inner = self.inner.lock().expect("mem store poisoned");
        Ok(inner
            .bookmarks
            .iter()
            .find(|b| b.id == id && b.owner_id == owner_id)
            .cloned())
    }

    async fn list_bookmarks(
        &self,
        owner_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Bookmark>, StoreError> {
        let inner = self.inner.lock().expect("mem store poisoned");
        // Newest first, matching the Postgres ORDER BY.
        Ok(inner
            .bookmarks
            .iter()
            .rev()
            .filter(|b| b.owner_id == owner_id)
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .cloned()
            .collect())
    }

    async fn count_bookmarks(&self, owner_id: Uuid) -> Result<i64, StoreError> {
        let inner = self.inner.lock().expect("mem store poisoned");
        Ok(inner
            .bookmarks
            .iter()
            .filter(|b| b.owner_id == owner_id)
            .count() as i64)
    }

    async fn update_bookmark(
        &self,
        owner_id: Uuid,
        id: Uuid,
        patch: BookmarkPatch,
    ) -> Result<Option<Bookmark>, StoreError> {
        let mut inner = self.inner.lock().expect("mem store poisoned");
        // Resolve the row first: like Postgres, the url constraint can only
        // trip on a row the caller owns.
        let Some(index) = inner
            .bookmarks
            .iter()
            .position(|b| b.id == id && b.owner_id == owner_id)
        else {
            return Ok(None);
        };
        if let Some(url) = &patch.url {
            if inner.bookmarks.iter().any(|b| b.url == *url && b.id != id) {
                return Err(StoreError::Duplicate(UniqueField::Url));
            }
        }
        let bookmark = &mut inner.bookmarks[index];
        if let Some(url) = patch.url {
            bookmark.url = url;
        }
        if let Some(body) = patch.body {
            bookmark.body = body;
        }
        bookmark.updated_at = OffsetDateTime::now_utc();
        Ok(Some(bookmark.clone()))
    }

    async fn delete_bookmark(&self, owner_id: Uuid, id: Uuid) -> Result<bool, StoreError> {
        let mut inner = self.inner.lock().expect("mem store poisoned");
        let before = inner.bookmarks.len();
        inner
            .bookmarks
            .retain(|b| !(b.id == id && b.owner_id == owner_id));
        Ok(inner.bookmarks.len() < before)
    }
}
