//! In-memory social graph handler

use agora_core::effects::{SocialGraphEffects, StoreError};
use agora_core::UserId;
use async_trait::async_trait;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Debug, Default)]
struct GraphState {
    following: BTreeMap<UserId, BTreeSet<UserId>>,
    followers: BTreeMap<UserId, BTreeSet<UserId>>,
    close_friends: BTreeMap<UserId, BTreeSet<UserId>>,
}

/// Follow edges and close-friends lists held in memory.
///
/// Clones share the same state.
#[derive(Debug, Clone, Default)]
pub struct MemorySocialGraph {
    state: Arc<RwLock<GraphState>>,
}

impl MemorySocialGraph {
    /// Create an empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `follower` follows `followee`.
    pub async fn follow(&self, follower: UserId, followee: UserId) {
        let mut state = self.state.write().await;
        state.following.entry(follower).or_default().insert(followee);
        state.followers.entry(followee).or_default().insert(follower);
    }

    /// Replace `author`'s close-friends list.
    pub async fn set_close_friends(
        &self,
        author: UserId,
        close_friends: impl IntoIterator<Item = UserId>,
    ) {
        let mut state = self.state.write().await;
        state
            .close_friends
            .insert(author, close_friends.into_iter().collect());
    }

    /// Every user that appears anywhere in the graph.
    pub async fn users(&self) -> BTreeSet<UserId> {
        let state = self.state.read().await;
        state
            .following
            .iter()
            .chain(state.followers.iter())
            .chain(state.close_friends.iter())
            .flat_map(|(user, others)| std::iter::once(*user).chain(others.iter().copied()))
            .collect()
    }
}

#[async_trait]
impl SocialGraphEffects for MemorySocialGraph {
    async fn following_of(&self, user: &UserId) -> Result<BTreeSet<UserId>, StoreError> {
        let state = self.state.read().await;
        Ok(state.following.get(user).cloned().unwrap_or_default())
    }

    async fn followers_of(&self, user: &UserId) -> Result<BTreeSet<UserId>, StoreError> {
        let state = self.state.read().await;
        Ok(state.followers.get(user).cloned().unwrap_or_default())
    }

    async fn close_friends_of(&self, user: &UserId) -> Result<BTreeSet<UserId>, StoreError> {
        let state = self.state.read().await;
        Ok(state.close_friends.get(user).cloned().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(seed: u8) -> UserId {
        UserId::new_from_entropy([seed; 32])
    }

    #[tokio::test]
    async fn test_follow_is_directed() {
        let graph = MemorySocialGraph::new();
        graph.follow(user(1), user(2)).await;

        assert!(graph.following_of(&user(1)).await.unwrap().contains(&user(2)));
        assert!(graph.followers_of(&user(2)).await.unwrap().contains(&user(1)));
        assert!(graph.following_of(&user(2)).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_close_friends_replace() {
        let graph = MemorySocialGraph::new();
        graph.set_close_friends(user(1), [user(2), user(3)]).await;
        graph.set_close_friends(user(1), [user(4)]).await;

        let list = graph.close_friends_of(&user(1)).await.unwrap();
        assert_eq!(list, [user(4)].into_iter().collect());
        assert_eq!(graph.users().await.len(), 2);
    }
}
