//! Ephemeral story lifecycle
//!
//! Stories move `Active → Expired` on their own when `expires_at` passes;
//! nothing is physically deleted. Authors may additionally archive or
//! highlight a story. Neither flag makes a story visible to anyone but its
//! author once it has expired, and an archived story is hidden from everyone
//! else even before expiry.
//!
//! View accounting relies on the store's atomic conditional insert, so the
//! distinct viewer counter moves exactly once per viewer even under
//! concurrent views. Reactions are appended and never deduplicated.

use crate::graph::load_facts_for_item;
use crate::visibility::VisibilityResolver;
use agora_core::effects::{
    dependency, ContentRegistryEffects, PhysicalTimeEffects, SocialGraphEffects,
    StoryStoreEffects, ViewerInsert,
};
use agora_core::{
    AgoraError, ContentId, ContentItem, PhysicalTime, Result, StoryConfig, StoryReaction,
    StoryState, UnknownVisibilityPolicy, UserId,
};
use serde::{Deserialize, Serialize};

/// Result of recording a view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewOutcome {
    /// First sighting by this viewer
    Recorded {
        /// Distinct viewers after the insert
        view_count: u64,
    },
    /// Viewer had already been recorded
    AlreadyRecorded {
        /// Unchanged distinct viewer count
        view_count: u64,
    },
    /// Authors viewing their own story are not counted
    OwnView,
}

/// Lifecycle phase of a story at a point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoryPhase {
    /// Not expired, not archived
    Active,
    /// Past `expires_at`
    Expired,
    /// Moved to the author's archive
    Archived,
    /// Expired and pinned to a highlight by the author
    Highlighted,
}

/// `expires_at <= now`.
pub fn is_expired(story: &StoryState, now: PhysicalTime) -> bool {
    story.expires_at.is_at_or_before(now)
}

/// Phase of `story` at `now`.
pub fn phase(story: &StoryState, now: PhysicalTime) -> StoryPhase {
    if story.archived {
        StoryPhase::Archived
    } else if is_expired(story, now) {
        if story.highlighted {
            StoryPhase::Highlighted
        } else {
            StoryPhase::Expired
        }
    } else {
        StoryPhase::Active
    }
}

/// Whether `item` still exists for `viewer` at `now`.
///
/// Non-stories are always live. Stories are live for their author in every
/// phase and for everyone else only while `Active`.
pub fn is_live_for(item: &ContentItem, viewer: &UserId, now: PhysicalTime) -> bool {
    match item.story() {
        None => true,
        Some(_) if item.is_authored_by(viewer) => true,
        Some(story) => phase(story, now) == StoryPhase::Active,
    }
}

/// Story lifecycle service.
///
/// Stateless apart from configuration; effects are passed per call.
#[derive(Debug, Clone, Default)]
pub struct StoryLifecycle {
    config: StoryConfig,
    unknown_visibility: UnknownVisibilityPolicy,
}

impl StoryLifecycle {
    /// Create a lifecycle service with the given configuration.
    pub fn new(config: StoryConfig) -> Self {
        Self {
            config,
            unknown_visibility: UnknownVisibilityPolicy::default(),
        }
    }

    /// Use `policy` when decoding stored stories.
    pub fn with_unknown_visibility(mut self, policy: UnknownVisibilityPolicy) -> Self {
        self.unknown_visibility = policy;
        self
    }

    /// Expiry time for a story created at `created_at`.
    pub fn expiry_for(&self, created_at: PhysicalTime) -> PhysicalTime {
        created_at.plus_secs(self.config.ttl_secs)
    }

    /// Record that `viewer` saw the story. Idempotent per viewer.
    ///
    /// # Errors
    /// * `AgoraError::NotFound` if the story does not exist or is no longer
    ///   live for the viewer
    /// * `AgoraError::Forbidden` if the viewer is outside the story's audience
    pub async fn record_view<E>(
        &self,
        effects: &E,
        story_id: &ContentId,
        viewer: &UserId,
    ) -> Result<ViewOutcome>
    where
        E: SocialGraphEffects
            + ContentRegistryEffects
            + StoryStoreEffects
            + PhysicalTimeEffects
            + ?Sized,
    {
        let story = self.load_story(effects, story_id).await?;
        if story.is_authored_by(viewer) {
            return Ok(ViewOutcome::OwnView);
        }
        self.ensure_viewable(effects, &story, viewer).await?;

        let insert = effects
            .add_viewer(story_id, viewer)
            .await
            .map_err(|e| AgoraError::from_store(dependency::STORY_STORE, e))?;

        match insert {
            ViewerInsert::Inserted { view_count } => {
                tracing::info!(
                    story_id = %story_id,
                    viewer = %viewer,
                    view_count,
                    "story view recorded"
                );
                Ok(ViewOutcome::Recorded { view_count })
            }
            ViewerInsert::AlreadyPresent { view_count } => {
                tracing::debug!(
                    story_id = %story_id,
                    viewer = %viewer,
                    "repeat story view ignored"
                );
                Ok(ViewOutcome::AlreadyRecorded { view_count })
            }
            ViewerInsert::Missing => Err(AgoraError::not_found(format!(
                "story {story_id} not found"
            ))),
        }
    }

    /// Append a reaction from `viewer`. Every call appends.
    ///
    /// # Errors
    /// * `AgoraError::Validation` if `emoji` is blank or too long
    /// * `AgoraError::NotFound` / `AgoraError::Forbidden` as for `record_view`
    pub async fn record_reaction<E>(
        &self,
        effects: &E,
        story_id: &ContentId,
        viewer: &UserId,
        emoji: &str,
    ) -> Result<StoryReaction>
    where
        E: SocialGraphEffects
            + ContentRegistryEffects
            + StoryStoreEffects
            + PhysicalTimeEffects
            + ?Sized,
    {
        let emoji = emoji.trim();
        if emoji.is_empty() {
            return Err(AgoraError::validation("reaction emoji is empty"));
        }
        if emoji.chars().count() > self.config.max_emoji_len {
            return Err(AgoraError::validation(format!(
                "reaction emoji exceeds {} characters",
                self.config.max_emoji_len
            )));
        }

        let story = self.load_story(effects, story_id).await?;
        let now = self.ensure_viewable(effects, &story, viewer).await?;

        let reaction = StoryReaction {
            user_id: *viewer,
            emoji: emoji.to_string(),
            reacted_at: now,
        };
        let found = effects
            .append_reaction(story_id, reaction.clone())
            .await
            .map_err(|e| AgoraError::from_store(dependency::STORY_STORE, e))?;
        if !found {
            return Err(AgoraError::not_found(format!("story {story_id} not found")));
        }

        tracing::info!(
            story_id = %story_id,
            viewer = %viewer,
            emoji = %reaction.emoji,
            "story reaction recorded"
        );
        Ok(reaction)
    }

    /// Viewers of a story, in order of first sighting. Author only.
    ///
    /// # Errors
    /// * `AgoraError::NotFound` if the story does not exist
    /// * `AgoraError::Forbidden` if `requester` is not the author, even when
    ///   the requester is one of the viewers
    pub async fn list_viewers<E>(
        &self,
        effects: &E,
        story_id: &ContentId,
        requester: &UserId,
    ) -> Result<Vec<UserId>>
    where
        E: ContentRegistryEffects + ?Sized,
    {
        let story = self.load_owned_story(effects, story_id, requester).await?;
        Ok(story
            .story()
            .map(|state| state.viewers.iter().copied().collect())
            .unwrap_or_default())
    }

    /// Reactions on a story, in arrival order. Author only.
    pub async fn list_reactions<E>(
        &self,
        effects: &E,
        story_id: &ContentId,
        requester: &UserId,
    ) -> Result<Vec<StoryReaction>>
    where
        E: ContentRegistryEffects + ?Sized,
    {
        let story = self.load_owned_story(effects, story_id, requester).await?;
        Ok(story
            .story()
            .map(|state| state.reactions.clone())
            .unwrap_or_default())
    }

    /// Archive or unarchive a story. Author only.
    pub async fn set_archived<E>(
        &self,
        effects: &E,
        story_id: &ContentId,
        requester: &UserId,
        archived: bool,
    ) -> Result<()>
    where
        E: ContentRegistryEffects + StoryStoreEffects + ?Sized,
    {
        self.load_owned_story(effects, story_id, requester).await?;
        let found = effects
            .set_archived(story_id, archived)
            .await
            .map_err(|e| AgoraError::from_store(dependency::STORY_STORE, e))?;
        if !found {
            return Err(AgoraError::not_found(format!("story {story_id} not found")));
        }
        tracing::info!(story_id = %story_id, archived, "story archive flag updated");
        Ok(())
    }

    /// Pin or unpin a story to the author's highlights. Author only.
    pub async fn set_highlighted<E>(
        &self,
        effects: &E,
        story_id: &ContentId,
        requester: &UserId,
        highlighted: bool,
    ) -> Result<()>
    where
        E: ContentRegistryEffects + StoryStoreEffects + ?Sized,
    {
        self.load_owned_story(effects, story_id, requester).await?;
        let found = effects
            .set_highlighted(story_id, highlighted)
            .await
            .map_err(|e| AgoraError::from_store(dependency::STORY_STORE, e))?;
        if !found {
            return Err(AgoraError::not_found(format!("story {story_id} not found")));
        }
        tracing::info!(story_id = %story_id, highlighted, "story highlight flag updated");
        Ok(())
    }

    async fn load_story<E>(&self, effects: &E, story_id: &ContentId) -> Result<ContentItem>
    where
        E: ContentRegistryEffects + ?Sized,
    {
        let doc = effects
            .item_by_id(story_id)
            .await
            .map_err(|e| AgoraError::from_store(dependency::CONTENT_REGISTRY, e))?
            .ok_or_else(|| AgoraError::not_found(format!("story {story_id} not found")))?;

        let item = doc.decode(self.unknown_visibility)?;
        if item.story().is_none() {
            return Err(AgoraError::not_found(format!("story {story_id} not found")));
        }
        Ok(item)
    }

    async fn load_owned_story<E>(
        &self,
        effects: &E,
        story_id: &ContentId,
        requester: &UserId,
    ) -> Result<ContentItem>
    where
        E: ContentRegistryEffects + ?Sized,
    {
        let story = self.load_story(effects, story_id).await?;
        if !story.is_authored_by(requester) {
            return Err(AgoraError::forbidden(format!(
                "only the author may manage story {story_id}"
            )));
        }
        Ok(story)
    }

    /// Liveness and audience check; returns the clock reading used.
    async fn ensure_viewable<E>(
        &self,
        effects: &E,
        story: &ContentItem,
        viewer: &UserId,
    ) -> Result<PhysicalTime>
    where
        E: SocialGraphEffects + PhysicalTimeEffects + ?Sized,
    {
        let now = effects
            .physical_time()
            .await
            .map_err(|e| AgoraError::from_store(dependency::CLOCK, e))?;

        if !is_live_for(story, viewer, now) {
            return Err(AgoraError::not_found(format!("story {} not found", story.id)));
        }

        let facts = load_facts_for_item(effects, viewer, story).await?;
        let decision = VisibilityResolver::decide(viewer, story, &facts);
        if !decision.is_allowed() {
            tracing::debug!(
                story_id = %story.id,
                viewer = %viewer,
                ?decision,
                "story interaction denied"
            );
            return Err(AgoraError::forbidden(format!(
                "story {} is not visible to {viewer}",
                story.id
            )));
        }
        Ok(now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agora_testkit::{test_time, test_user, StoryBuilder};

    #[test]
    fn test_expiry_boundary_is_inclusive() {
        let story = StoryState::new(test_time());
        assert!(is_expired(&story, test_time()));
        assert!(!is_expired(&story, PhysicalTime::from_millis(test_time().ts_ms - 1)));
    }

    #[test]
    fn test_phase_transitions() {
        let mut story = StoryState::new(test_time().plus_secs(60));
        assert_eq!(phase(&story, test_time()), StoryPhase::Active);
        assert_eq!(phase(&story, test_time().plus_secs(60)), StoryPhase::Expired);

        story.highlighted = true;
        assert_eq!(phase(&story, test_time()), StoryPhase::Active);
        assert_eq!(phase(&story, test_time().plus_secs(61)), StoryPhase::Highlighted);

        story.archived = true;
        assert_eq!(phase(&story, test_time()), StoryPhase::Archived);
    }

    #[test]
    fn test_expired_story_is_live_only_for_author() {
        let author = test_user(1);
        let story = StoryBuilder::new(author)
            .created_at(test_time())
            .expires_at(test_time().plus_secs(10))
            .build();
        let later = test_time().plus_secs(11);

        assert!(is_live_for(&story, &author, later));
        assert!(!is_live_for(&story, &test_user(2), later));
        assert!(is_live_for(&story, &test_user(2), test_time()));
    }

    #[test]
    fn test_archived_story_is_hidden_before_expiry() {
        let author = test_user(1);
        let story = StoryBuilder::new(author)
            .expires_at(test_time().plus_secs(3600))
            .archived(true)
            .build();
        assert!(!is_live_for(&story, &test_user(2), test_time()));
        assert!(is_live_for(&story, &author, test_time()));
    }

    #[test]
    fn test_expiry_for_uses_ttl() {
        let lifecycle = StoryLifecycle::new(StoryConfig {
            ttl_secs: 60,
            ..StoryConfig::default()
        });
        assert_eq!(lifecycle.expiry_for(test_time()), test_time().plus_secs(60));

        let default = StoryLifecycle::default();
        assert_eq!(
            default.expiry_for(test_time()),
            test_time().plus_secs(24 * 60 * 60)
        );
    }
}
