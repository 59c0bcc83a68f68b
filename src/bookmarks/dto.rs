use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::store::Bookmark;

fn default_page() -> i64 {
    1
}

fn default_per_page() -> i64 {
    5
}

/// Query params for the list endpoint; both default when absent.
#[derive(Debug, Deserialize)]
pub struct PageQuery {
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_per_page")]
    pub per_page: i64,
}

#[derive(Debug, Deserialize)]
pub struct CreateBookmarkRequest {
    pub url: String,
    #[serde(default)]
    pub body: String,
}

/// Partial update: absent fields keep their stored value.
#[derive(Debug, Deserialize)]
pub struct UpdateBookmarkRequest {
    pub url: Option<String>,
    pub body: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct BookmarkResponse {
    pub id: Uuid,
    pub url: String,
    pub short_url: String,
    pub visits: i64,
    pub body: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl From<Bookmark> for BookmarkResponse {
    fn from(b: Bookmark) -> Self {
        Self {
            id: b.id,
            url: b.url,
            short_url: b.short_url,
            visits: b.visits,
            body: b.body,
            created_at: b.created_at,
            updated_at: b.updated_at,
        }
    }
}

/// Redirect-tracking summary, without the note body.
#[derive(Debug, Serialize)]
pub struct BookmarkStats {
    pub id: Uuid,
    pub visits: i64,
    pub url: String,
    pub short_url: String,
}

impl From<Bookmark> for BookmarkStats {
    fn from(b: Bookmark) -> Self {
        Self {
            id: b.id,
            visits: b.visits,
            url: b.url,
            short_url: b.short_url,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PageMeta {
    pub page: i64,
    pub pages: i64,
    pub total_count: i64,
    pub prev_page: Option<i64>,
    pub next_page: Option<i64>,
    pub has_next: bool,
    pub has_prev: bool,
}

impl PageMeta {
    pub fn new(page: i64, per_page: i64, total_count: i64) -> Self {
        let pages = if total_count == 0 {
            0
        } else {
            (total_count + per_page - 1) / per_page
        };
        let has_prev = page > 1;
        let has_next = page < pages;
        Self {
            page,
            pages,
            total_count,
            prev_page: has_prev.then(|| page - 1),
            next_page: has_next.then(|| page + 1),
            has_next,
            has_prev,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct Paginated<T> {
    pub data: Vec<T>,
    pub meta: PageMeta,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn meta_for_a_middle_page() {
        let meta = PageMeta::new(2, 5, 12);
        assert_eq!(meta.pages, 3);
        assert_eq!(meta.total_count, 12);
        assert_eq!(meta.prev_page, Some(1));
        assert_eq!(meta.next_page, Some(3));
        assert!(meta.has_prev);
        assert!(meta.has_next);
    }

    #[test]
    fn meta_for_an_empty_listing() {
        let meta = PageMeta::new(1, 5, 0);
        assert_eq!(meta.pages, 0);
        assert_eq!(meta.prev_page, None);
        assert_eq!(meta.next_page, None);
        assert!(!meta.has_prev);
        assert!(!meta.has_next);
    }

    #[test]
    fn meta_at_the_boundaries() {
        let first = PageMeta::new(1, 5, 12);
        assert_eq!(first.prev_page, None);
        assert_eq!(first.next_page, Some(2));

        let last = PageMeta::new(3, 5, 12);
        assert_eq!(last.prev_page, Some(2));
        assert_eq!(last.next_page, None);
        assert!(!last.has_next);
    }

    #[test]
    fn meta_for_an_exact_multiple() {
        let meta = PageMeta::new(2, 5, 10);
        assert_eq!(meta.pages, 2);
        assert!(!meta.has_next);
        assert_eq!(meta.next_page, None);
    }
}
