//! In-memory content registry and story store
//!
//! One map of stored documents backs both interfaces. Story mutations take
//! the write lock for the whole read-modify-write, so concurrent
//! `add_viewer` calls for distinct viewers never lose an increment and the
//! same viewer is never counted twice.

use agora_core::effects::{
    recency_order, CandidateQuery, ContentRegistryEffects, StoreError, StoryStoreEffects,
    ViewerInsert,
};
use agora_core::{ContentDocument, ContentId, ContentKind, StoryReaction, UserId};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Stored posts, reels and stories held in memory.
///
/// Clones share the same state.
#[derive(Debug, Clone, Default)]
pub struct MemoryContentStore {
    documents: Arc<RwLock<HashMap<ContentId, ContentDocument>>>,
}

impl MemoryContentStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a document.
    pub async fn upsert(&self, document: ContentDocument) {
        let mut documents = self.documents.write().await;
        documents.insert(document.id, document);
    }

    /// Insert or replace many documents.
    pub async fn upsert_all(&self, batch: impl IntoIterator<Item = ContentDocument>) {
        let mut documents = self.documents.write().await;
        for document in batch {
            documents.insert(document.id, document);
        }
    }

    /// All documents in recency order.
    pub async fn snapshot(&self) -> Vec<ContentDocument> {
        let documents = self.documents.read().await;
        let mut all: Vec<ContentDocument> = documents.values().cloned().collect();
        all.sort_by(recency_order);
        all
    }

    /// Apply `update` to a stored story under the write lock.
    ///
    /// Returns `None` when `id` is missing or is not a story.
    async fn with_story<T>(
        &self,
        id: &ContentId,
        update: impl FnOnce(&mut ContentDocument) -> T,
    ) -> Option<T> {
        let mut documents = self.documents.write().await;
        documents
            .get_mut(id)
            .filter(|doc| doc.kind == ContentKind::Story)
            .map(update)
    }
}

#[async_trait]
impl ContentRegistryEffects for MemoryContentStore {
    async fn recent_items(
        &self,
        query: &CandidateQuery,
    ) -> Result<Vec<ContentDocument>, StoreError> {
        let documents = self.documents.read().await;
        let mut matching: Vec<&ContentDocument> =
            documents.values().filter(|doc| query.matches(doc)).collect();
        matching.sort_by(|a, b| recency_order(a, b));
        Ok(matching
            .into_iter()
            .skip(query.offset)
            .take(query.limit)
            .cloned()
            .collect())
    }

    async fn item_by_id(&self, id: &ContentId) -> Result<Option<ContentDocument>, StoreError> {
        Ok(self.documents.read().await.get(id).cloned())
    }
}

#[async_trait]
impl StoryStoreEffects for MemoryContentStore {
    async fn add_viewer(
        &self,
        story_id: &ContentId,
        viewer: &UserId,
    ) -> Result<ViewerInsert, StoreError> {
        let outcome = self.with_story(story_id, |doc| {
            // A stored counter may lag the viewer set; never report below it.
            doc.view_count = doc.view_count.max(doc.viewers.len() as u64);
            if doc.viewers.contains(viewer) {
                ViewerInsert::AlreadyPresent {
                    view_count: doc.view_count,
                }
            } else {
                doc.viewers.push(*viewer);
                doc.view_count += 1;
                ViewerInsert::Inserted {
                    view_count: doc.view_count,
                }
            }
        });
        Ok(outcome.await.unwrap_or(ViewerInsert::Missing))
    }

    async fn append_reaction(
        &self,
        story_id: &ContentId,
        reaction: StoryReaction,
    ) -> Result<bool, StoreError> {
        Ok(self
            .with_story(story_id, |doc| doc.reactions.push(reaction))
            .await
            .is_some())
    }

    async fn set_archived(&self, story_id: &ContentId, archived: bool) -> Result<bool, StoreError> {
        Ok(self
            .with_story(story_id, |doc| doc.archived = archived)
            .await
            .is_some())
    }

    async fn set_highlighted(
        &self,
        story_id: &ContentId,
        highlighted: bool,
    ) -> Result<bool, StoreError> {
        Ok(self
            .with_story(story_id, |doc| doc.highlighted = highlighted)
            .await
            .is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agora_core::PhysicalTime;

    fn document(seed: u8, kind: ContentKind, created_ms: u64) -> ContentDocument {
        ContentDocument {
            id: ContentId::from_bytes([seed; 32]),
            kind,
            author_id: UserId::new_from_entropy([0u8; 32]),
            created_at: PhysicalTime::from_millis(created_ms),
            visibility: Some("public".to_string()),
            allow_list: Vec::new(),
            exclude_list: Vec::new(),
            audience_ids: Vec::new(),
            expires_at: (kind == ContentKind::Story)
                .then(|| PhysicalTime::from_millis(created_ms + 1_000)),
            viewers: Vec::new(),
            view_count: 0,
            reactions: Vec::new(),
            archived: false,
            highlighted: false,
        }
    }

    #[tokio::test]
    async fn test_recent_items_newest_first_with_offset() {
        let store = MemoryContentStore::new();
        store
            .upsert_all((1..=5).map(|i| document(i, ContentKind::Post, u64::from(i) * 10)))
            .await;

        let query = CandidateQuery {
            offset: 1,
            limit: 2,
            ..CandidateQuery::default()
        };
        let items = store.recent_items(&query).await.unwrap();
        let times: Vec<u64> = items.iter().map(|d| d.created_at.ts_ms).collect();
        assert_eq!(times, vec![40, 30]);
    }

    #[tokio::test]
    async fn test_recent_items_filters_kind() {
        let store = MemoryContentStore::new();
        store.upsert(document(1, ContentKind::Post, 10)).await;
        store.upsert(document(2, ContentKind::Reel, 20)).await;

        let query = CandidateQuery {
            kinds: Some([ContentKind::Post].into_iter().collect()),
            ..CandidateQuery::newest(10)
        };
        let items = store.recent_items(&query).await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].kind, ContentKind::Post);
    }

    #[tokio::test]
    async fn test_add_viewer_counts_once() {
        let store = MemoryContentStore::new();
        let story = document(1, ContentKind::Story, 10);
        let id = story.id;
        store.upsert(story).await;
        let viewer = UserId::new_from_entropy([9u8; 32]);

        assert_eq!(
            store.add_viewer(&id, &viewer).await.unwrap(),
            ViewerInsert::Inserted { view_count: 1 }
        );
        assert_eq!(
            store.add_viewer(&id, &viewer).await.unwrap(),
            ViewerInsert::AlreadyPresent { view_count: 1 }
        );
    }

    #[tokio::test]
    async fn test_add_viewer_repairs_lagging_counter() {
        let store = MemoryContentStore::new();
        let mut story = document(1, ContentKind::Story, 10);
        let seen = UserId::new_from_entropy([7u8; 32]);
        story.viewers = vec![seen, UserId::new_from_entropy([8u8; 32])];
        let id = story.id;
        store.upsert(story).await;

        assert_eq!(
            store.add_viewer(&id, &seen).await.unwrap(),
            ViewerInsert::AlreadyPresent { view_count: 2 }
        );
        assert_eq!(
            store
                .add_viewer(&id, &UserId::new_from_entropy([9u8; 32]))
                .await
                .unwrap(),
            ViewerInsert::Inserted { view_count: 3 }
        );
    }

    #[tokio::test]
    async fn test_story_mutations_ignore_posts() {
        let store = MemoryContentStore::new();
        let post = document(1, ContentKind::Post, 10);
        let id = post.id;
        store.upsert(post).await;

        let viewer = UserId::new_from_entropy([9u8; 32]);
        assert_eq!(
            store.add_viewer(&id, &viewer).await.unwrap(),
            ViewerInsert::Missing
        );
        assert!(!store.set_archived(&id, true).await.unwrap());
    }
}
