//! Content registry interface.

use super::StoreError;
use crate::content::{ContentItem, ContentKind};
use crate::document::ContentDocument;
use crate::identifiers::ContentId;
use crate::time::PhysicalTime;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::sync::Arc;

/// Position in a recency-ordered timeline.
///
/// Timelines are ordered by `created_at` descending, ties broken by id
/// descending. A cursor selects everything strictly after it in that order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedCursor {
    /// Creation time of the last examined candidate
    pub created_at: PhysicalTime,
    /// Id of the last examined candidate
    pub id: ContentId,
}

impl FeedCursor {
    /// Cursor positioned on a stored document.
    pub fn of_document(doc: &ContentDocument) -> Self {
        Self {
            created_at: doc.created_at,
            id: doc.id,
        }
    }

    /// Cursor positioned on a decoded item.
    pub fn of_item(item: &ContentItem) -> Self {
        Self {
            created_at: item.created_at,
            id: item.id,
        }
    }

    /// True when `doc` comes strictly after this cursor in recency order.
    pub fn precedes(&self, doc: &ContentDocument) -> bool {
        (doc.created_at, doc.id) < (self.created_at, self.id)
    }
}

/// Recency order used by every registry: newest first, ties by id descending.
pub fn recency_order(a: &ContentDocument, b: &ContentDocument) -> Ordering {
    (b.created_at, b.id).cmp(&(a.created_at, a.id))
}

/// One candidate window request.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CandidateQuery {
    /// Restrict to these kinds; `None` means all kinds
    pub kinds: Option<BTreeSet<ContentKind>>,
    /// Only items strictly after this cursor
    pub after: Option<FeedCursor>,
    /// Items to skip after the cursor filter
    pub offset: usize,
    /// Maximum number of items to return
    pub limit: usize,
}

impl CandidateQuery {
    /// Query for the newest `limit` items.
    pub fn newest(limit: usize) -> Self {
        Self {
            limit,
            ..Self::default()
        }
    }

    /// Check if a document passes the kind and cursor filters
    pub fn matches(&self, doc: &ContentDocument) -> bool {
        let kind_ok = self
            .kinds
            .as_ref()
            .map_or(true, |kinds| kinds.contains(&doc.kind));
        let cursor_ok = self.after.map_or(true, |cursor| cursor.precedes(doc));
        kind_ok && cursor_ok
    }
}

/// Read access to stored posts, reels and stories.
///
/// Documents are returned in their stored shape; decoding and every
/// visibility decision happen in the core.
#[async_trait]
pub trait ContentRegistryEffects: Send + Sync {
    /// Candidates matching `query`, in recency order, at most `query.limit`.
    async fn recent_items(
        &self,
        query: &CandidateQuery,
    ) -> Result<Vec<ContentDocument>, StoreError>;

    /// Lookup by id.
    async fn item_by_id(&self, id: &ContentId) -> Result<Option<ContentDocument>, StoreError>;
}

/// Blanket implementation for Arc<T> where T: ContentRegistryEffects
#[async_trait]
impl<T: ContentRegistryEffects + ?Sized> ContentRegistryEffects for Arc<T> {
    async fn recent_items(
        &self,
        query: &CandidateQuery,
    ) -> Result<Vec<ContentDocument>, StoreError> {
        (**self).recent_items(query).await
    }

    async fn item_by_id(&self, id: &ContentId) -> Result<Option<ContentDocument>, StoreError> {
        (**self).item_by_id(id).await
    }
}
