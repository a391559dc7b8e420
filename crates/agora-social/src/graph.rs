//! Per-viewer social graph facts
//!
//! Facts are derived fresh for every call and never cached. A call reads the
//! viewer's following and followers sets once and, when close-friends content
//! is involved, the close-friends list of each distinct author once.

use agora_core::effects::{dependency, SocialGraphEffects};
use agora_core::{Audience, AgoraError, ContentItem, Result, UserId};
use futures::future::try_join_all;
use std::collections::BTreeSet;

/// Relationship facts for a single viewer, valid for one call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SocialGraphFacts {
    viewer: UserId,
    following: BTreeSet<UserId>,
    mutuals: BTreeSet<UserId>,
    close_friend_of: BTreeSet<UserId>,
    consulted_close_friends: BTreeSet<UserId>,
}

impl SocialGraphFacts {
    /// Build facts from the viewer's following and followers sets.
    pub fn new(viewer: UserId, following: BTreeSet<UserId>, followers: BTreeSet<UserId>) -> Self {
        let mutuals = following.intersection(&followers).copied().collect();
        Self {
            viewer,
            following,
            mutuals,
            close_friend_of: BTreeSet::new(),
            consulted_close_friends: BTreeSet::new(),
        }
    }

    /// Facts for a viewer with no relationships at all.
    pub fn empty(viewer: UserId) -> Self {
        Self::new(viewer, BTreeSet::new(), BTreeSet::new())
    }

    /// Viewer these facts belong to.
    pub fn viewer(&self) -> UserId {
        self.viewer
    }

    /// Check if the viewer follows `author`
    pub fn follows(&self, author: &UserId) -> bool {
        self.following.contains(author)
    }

    /// Check if the viewer and `author` follow each other
    pub fn is_mutual(&self, author: &UserId) -> bool {
        self.mutuals.contains(author)
    }

    /// Check if `author` lists the viewer as a close friend.
    ///
    /// Authors whose list was never consulted count as "not listed".
    pub fn is_close_friend_of(&self, author: &UserId) -> bool {
        self.close_friend_of.contains(author)
    }

    /// Whether `author`'s close-friends list was already read in this call.
    pub fn has_consulted(&self, author: &UserId) -> bool {
        self.consulted_close_friends.contains(author)
    }

    /// Record `author`'s close-friends list.
    pub fn record_close_friends(&mut self, author: UserId, close_friends: &BTreeSet<UserId>) {
        self.consulted_close_friends.insert(author);
        if close_friends.contains(&self.viewer) {
            self.close_friend_of.insert(author);
        }
    }
}

/// Read following and followers for `viewer` concurrently.
///
/// # Errors
/// * `AgoraError::Dependency` if the graph store fails; never falls back to
///   an empty relationship set
pub async fn load_graph_facts<E>(effects: &E, viewer: &UserId) -> Result<SocialGraphFacts>
where
    E: SocialGraphEffects + ?Sized,
{
    let (following, followers) =
        tokio::try_join!(effects.following_of(viewer), effects.followers_of(viewer)).map_err(
            |e| {
                tracing::warn!(viewer = %viewer, error = %e, "social graph read failed");
                AgoraError::from_store(dependency::SOCIAL_GRAPH, e)
            },
        )?;

    tracing::debug!(
        viewer = %viewer,
        following = following.len(),
        followers = followers.len(),
        "derived graph facts"
    );
    Ok(SocialGraphFacts::new(*viewer, following, followers))
}

/// Read the close-friends lists of `authors` not yet consulted in `facts`.
///
/// Lists are read concurrently, once per distinct author per call.
pub async fn load_close_friend_lists<E, I>(
    effects: &E,
    facts: &mut SocialGraphFacts,
    authors: I,
) -> Result<()>
where
    E: SocialGraphEffects + ?Sized,
    I: IntoIterator<Item = UserId>,
{
    let pending: BTreeSet<UserId> = authors
        .into_iter()
        .filter(|author| !facts.has_consulted(author))
        .collect();
    if pending.is_empty() {
        return Ok(());
    }

    let lists = try_join_all(pending.iter().map(|author| async move {
        effects
            .close_friends_of(author)
            .await
            .map(|list| (*author, list))
    }))
    .await
    .map_err(|e| AgoraError::from_store(dependency::SOCIAL_GRAPH, e))?;

    for (author, list) in lists {
        facts.record_close_friends(author, &list);
    }
    Ok(())
}

/// Facts sufficient to decide visibility of one item for `viewer`.
///
/// Reads only what the item's audience needs: nothing for public or custom
/// items and for the author, the follow sets for followers/mutuals, the
/// author's list for close friends.
pub async fn load_facts_for_item<E>(
    effects: &E,
    viewer: &UserId,
    item: &ContentItem,
) -> Result<SocialGraphFacts>
where
    E: SocialGraphEffects + ?Sized,
{
    if item.is_authored_by(viewer) {
        return Ok(SocialGraphFacts::empty(*viewer));
    }
    match item.audience {
        Audience::Followers | Audience::Mutuals => load_graph_facts(effects, viewer).await,
        Audience::CloseFriends => {
            let mut facts = SocialGraphFacts::empty(*viewer);
            load_close_friend_lists(effects, &mut facts, [item.author_id]).await?;
            Ok(facts)
        }
        Audience::Public | Audience::Custom(_) => Ok(SocialGraphFacts::empty(*viewer)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agora_testkit::{test_user, TestEffects};

    #[test]
    fn test_mutuals_is_intersection() {
        let viewer = test_user(1);
        let facts = SocialGraphFacts::new(
            viewer,
            [test_user(2), test_user(3)].into_iter().collect(),
            [test_user(3), test_user(4)].into_iter().collect(),
        );
        assert!(facts.is_mutual(&test_user(3)));
        assert!(!facts.is_mutual(&test_user(2)));
        assert!(!facts.is_mutual(&test_user(4)));
    }

    #[test]
    fn test_close_friend_recording() {
        let viewer = test_user(1);
        let mut facts = SocialGraphFacts::empty(viewer);
        facts.record_close_friends(test_user(2), &[viewer].into_iter().collect());
        facts.record_close_friends(test_user(3), &BTreeSet::new());

        assert!(facts.is_close_friend_of(&test_user(2)));
        assert!(!facts.is_close_friend_of(&test_user(3)));
        assert!(facts.has_consulted(&test_user(3)));
        assert!(!facts.has_consulted(&test_user(4)));
    }

    #[tokio::test]
    async fn test_load_graph_facts_reads_store() {
        let effects = TestEffects::new();
        let (a, b, c) = (test_user(1), test_user(2), test_user(3));
        effects.graph().follow(a, b).await;
        effects.graph().follow(b, a).await;
        effects.graph().follow(a, c).await;

        let facts = load_graph_facts(&effects, &a).await.unwrap();
        assert!(facts.follows(&b));
        assert!(facts.follows(&c));
        assert!(facts.is_mutual(&b));
        assert!(!facts.is_mutual(&c));
    }

    #[tokio::test]
    async fn test_graph_failure_is_dependency_error() {
        let effects = TestEffects::new();
        effects.fail_graph(true);

        let err = load_graph_facts(&effects, &test_user(1)).await.unwrap_err();
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_close_friend_lists_read_once_per_author() {
        let effects = TestEffects::new();
        let viewer = test_user(1);
        effects
            .graph()
            .set_close_friends(test_user(2), [viewer])
            .await;

        let mut facts = SocialGraphFacts::empty(viewer);
        load_close_friend_lists(&effects, &mut facts, [test_user(2), test_user(2)])
            .await
            .unwrap();
        load_close_friend_lists(&effects, &mut facts, [test_user(2)])
            .await
            .unwrap();

        assert!(facts.is_close_friend_of(&test_user(2)));
        assert_eq!(effects.counters().close_friend_reads(), 1);
    }
}
