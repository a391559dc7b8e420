//! Composite effect system
//!
//! Bundles the graph, content, clock and randomness handlers behind one
//! value that satisfies every collaborator interface the core needs.

use crate::content::MemoryContentStore;
use crate::dataset::{Dataset, UserRecord};
use crate::graph::MemorySocialGraph;
use crate::random::OsRandom;
use crate::time::SystemClock;
use agora_core::effects::{
    CandidateQuery, ContentRegistryEffects, PhysicalTimeEffects, RandomEffects,
    SocialGraphEffects, StoreError, StoryStoreEffects, ViewerInsert,
};
use agora_core::{ContentDocument, ContentId, PhysicalTime, StoryReaction, UserId};
use async_trait::async_trait;
use std::collections::BTreeSet;
use std::sync::Arc;

/// In-memory stores plus pluggable clock and randomness.
#[derive(Clone)]
pub struct AgoraEffectSystem {
    graph: MemorySocialGraph,
    content: MemoryContentStore,
    clock: Arc<dyn PhysicalTimeEffects>,
    random: Arc<dyn RandomEffects>,
}

impl std::fmt::Debug for AgoraEffectSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgoraEffectSystem")
            .field("graph", &self.graph)
            .field("content", &self.content)
            .finish_non_exhaustive()
    }
}

impl Default for AgoraEffectSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl AgoraEffectSystem {
    /// Empty stores, system clock, OS randomness
    pub fn new() -> Self {
        Self {
            graph: MemorySocialGraph::new(),
            content: MemoryContentStore::new(),
            clock: Arc::new(SystemClock::new()),
            random: Arc::new(OsRandom::new()),
        }
    }

    /// Replace the clock.
    pub fn with_clock(mut self, clock: impl PhysicalTimeEffects + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    /// Social graph handler
    pub fn graph(&self) -> &MemorySocialGraph {
        &self.graph
    }

    /// Content handler
    pub fn content(&self) -> &MemoryContentStore {
        &self.content
    }

    /// Populate the stores from a dataset.
    pub async fn import(&self, dataset: Dataset) {
        for user in &dataset.users {
            for followee in &user.following {
                self.graph.follow(user.id, *followee).await;
            }
            if !user.close_friends.is_empty() {
                self.graph
                    .set_close_friends(user.id, user.close_friends.iter().copied())
                    .await;
            }
        }
        let imported = dataset.items.len();
        self.content.upsert_all(dataset.items).await;
        tracing::info!(users = dataset.users.len(), items = imported, "imported dataset");
    }

    /// Export the current state of the stores.
    pub async fn export(&self) -> Result<Dataset, StoreError> {
        let mut users = Vec::new();
        for id in self.graph.users().await {
            let following = self.graph.following_of(&id).await?;
            let close_friends = self.graph.close_friends_of(&id).await?;
            users.push(UserRecord {
                id,
                following: following.into_iter().collect(),
                close_friends: close_friends.into_iter().collect(),
            });
        }
        Ok(Dataset {
            users,
            items: self.content.snapshot().await,
            unreadable: Vec::new(),
        })
    }
}

#[async_trait]
impl SocialGraphEffects for AgoraEffectSystem {
    async fn following_of(&self, user: &UserId) -> Result<BTreeSet<UserId>, StoreError> {
        self.graph.following_of(user).await
    }

    async fn followers_of(&self, user: &UserId) -> Result<BTreeSet<UserId>, StoreError> {
        self.graph.followers_of(user).await
    }

    async fn close_friends_of(&self, user: &UserId) -> Result<BTreeSet<UserId>, StoreError> {
        self.graph.close_friends_of(user).await
    }
}

#[async_trait]
impl ContentRegistryEffects for AgoraEffectSystem {
    async fn recent_items(
        &self,
        query: &CandidateQuery,
    ) -> Result<Vec<ContentDocument>, StoreError> {
        self.content.recent_items(query).await
    }

    async fn item_by_id(&self, id: &ContentId) -> Result<Option<ContentDocument>, StoreError> {
        self.content.item_by_id(id).await
    }
}

#[async_trait]
impl StoryStoreEffects for AgoraEffectSystem {
    async fn add_viewer(
        &self,
        story_id: &ContentId,
        viewer: &UserId,
    ) -> Result<ViewerInsert, StoreError> {
        self.content.add_viewer(story_id, viewer).await
    }

    async fn append_reaction(
        &self,
        story_id: &ContentId,
        reaction: StoryReaction,
    ) -> Result<bool, StoreError> {
        self.content.append_reaction(story_id, reaction).await
    }

    async fn set_archived(&self, story_id: &ContentId, archived: bool) -> Result<bool, StoreError> {
        self.content.set_archived(story_id, archived).await
    }

    async fn set_highlighted(
        &self,
        story_id: &ContentId,
        highlighted: bool,
    ) -> Result<bool, StoreError> {
        self.content.set_highlighted(story_id, highlighted).await
    }
}

#[async_trait]
impl PhysicalTimeEffects for AgoraEffectSystem {
    async fn physical_time(&self) -> Result<PhysicalTime, StoreError> {
        self.clock.physical_time().await
    }
}

#[async_trait]
impl RandomEffects for AgoraEffectSystem {
    async fn random_u64(&self) -> u64 {
        self.random.random_u64().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::FixedClock;

    #[tokio::test]
    async fn test_import_export_preserves_edges() {
        let a = UserId::new_from_entropy([1u8; 32]);
        let b = UserId::new_from_entropy([2u8; 32]);
        let dataset = Dataset {
            users: vec![UserRecord {
                id: a,
                following: vec![b],
                close_friends: vec![b],
            }],
            ..Dataset::default()
        };

        let system = AgoraEffectSystem::new();
        system.import(dataset).await;

        assert!(system.followers_of(&b).await.unwrap().contains(&a));
        let exported = system.export().await.unwrap();
        let record = exported.users.iter().find(|u| u.id == a).unwrap();
        assert_eq!(record.following, vec![b]);
        assert_eq!(record.close_friends, vec![b]);
    }

    #[tokio::test]
    async fn test_clock_override() {
        let system =
            AgoraEffectSystem::new().with_clock(FixedClock::new(PhysicalTime::from_millis(7)));
        assert_eq!(system.physical_time().await.unwrap().ts_ms, 7);
    }
}
