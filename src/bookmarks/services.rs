pub(crate) use crate::bookmarks::dto::{
    BookmarkResponse, BookmarkStats, CreateBookmarkRequest, PageMeta, PageQuery, Paginated,
    UpdateBookmarkRequest,
};

use rand::distributions::Alphanumeric;
use rand::{thread_rng, Rng};
use tracing::debug;
use uuid::Uuid;

use crate::error::ApiError;
use crate::store::{Bookmark, BookmarkPatch, NewBookmark, Store, StoreError, UniqueField};
use crate::validate::is_valid_url;

const SHORT_CODE_LEN: usize = 6;
const SHORT_CODE_ATTEMPTS: usize = 4;
const MAX_PER_PAGE: i64 = 100;

fn short_code() -> String {
    thread_rng()
        .sample_iter(&Alphanumeric)
        .take(SHORT_CODE_LEN)
        .map(char::from)
        .collect()
}

/// Validates the url, rejects duplicates, and inserts with a fresh short
/// code. A short-code collision is retried with a new code; the url unique
/// constraint also backstops a concurrent create racing the duplicate check.
pub async fn create_bookmark(
    store: &dyn Store,
    owner_id: Uuid,
    req: CreateBookmarkRequest,
) -> Result<Bookmark, ApiError> {
    if !is_valid_url(&req.url) {
        return Err(ApiError::InvalidUrl);
    }
    if store.bookmark_by_url(&req.url).await?.is_some() {
        return Err(ApiError::UrlTaken);
    }

    for _ in 0..SHORT_CODE_ATTEMPTS {
        let attempt = store
            .create_bookmark(NewBookmark {
                owner_id,
                url: req.url.clone(),
                short_url: short_code(),
                body: req.body.clone(),
            })
            .await;
        match attempt {
            Ok(bookmark) => {
                debug!(bookmark_id = %bookmark.id, short_url = %bookmark.short_url, "bookmark created");
                return Ok(bookmark);
            }
            Err(StoreError::Duplicate(UniqueField::ShortUrl)) => continue,
            Err(e) => return Err(e.into()),
        }
    }
    Err(ApiError::Internal(anyhow::anyhow!(
        "could not allocate a unique short url after {SHORT_CODE_ATTEMPTS} attempts"
    )))
}

/// Lists the caller's bookmarks, newest first. Out-of-range params are
/// clamped rather than rejected.
pub async fn list_bookmarks(
    store: &dyn Store,
    owner_id: Uuid,
    query: PageQuery,
) -> Result<Paginated<BookmarkResponse>, ApiError> {
    let page = query.page.max(1);
    let per_page = query.per_page.clamp(1, MAX_PER_PAGE);

    let total_count = store.count_bookmarks(owner_id).await?;
    let offset = (page - 1).saturating_mul(per_page);
    let items = store.list_bookmarks(owner_id, per_page, offset).await?;

    Ok(Paginated {
        data: items.into_iter().map(Into::into).collect(),
        meta: PageMeta::new(page, per_page, total_count),
    })
}

pub async fn get_bookmark(
    store: &dyn Store,
    owner_id: Uuid,
    id: Uuid,
) -> Result<Bookmark, ApiError> {
    store
        .bookmark_for_owner(owner_id, id)
        .await?
        .ok_or(ApiError::NotFound)
}

/// Partial update: only the supplied fields change. A url change revalidates
/// syntax and re-runs the uniqueness check.
pub async fn update_bookmark(
    store: &dyn Store,
    owner_id: Uuid,
    id: Uuid,
    req: UpdateBookmarkRequest,
) -> Result<Bookmark, ApiError> {
    if let Some(url) = &req.url {
        if !is_valid_url(url) {
            return Err(ApiError::InvalidUrl);
        }
    }
    store
        .update_bookmark(
            owner_id,
            id,
            BookmarkPatch {
                url: req.url,
                body: req.body,
            },
        )
        .await?
        .ok_or(ApiError::NotFound)
}

pub async fn delete_bookmark(store: &dyn Store, owner_id: Uuid, id: Uuid) -> Result<(), ApiError> {
    if store.delete_bookmark(owner_id, id).await? {
        debug!(bookmark_id = %id, "bookmark deleted");
        Ok(())
    } else {
        Err(ApiError::NotFound)
    }
}

pub async fn bookmark_stats(
    store: &dyn Store,
    owner_id: Uuid,
    id: Uuid,
) -> Result<BookmarkStats, ApiError> {
    get_bookmark(store, owner_id, id).await.map(Into::into)
}
