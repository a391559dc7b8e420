//! Builders for posts, reels and stories
//!
//! Every builder gets a fresh random `ContentId` unless one is set
//! explicitly, so items built in a loop never collide in a store.

use crate::fixtures::test_time;
use agora_core::{
    Audience, ContentBody, ContentDocument, ContentId, ContentItem, CustomAudience, PhysicalTime,
    StoryConfig, StoryReaction, StoryState, UserId,
};

/// Builder for posts and reels.
#[derive(Debug, Clone)]
pub struct PostBuilder {
    id: ContentId,
    author: UserId,
    created_at: PhysicalTime,
    audience: Audience,
    reel: bool,
}

impl PostBuilder {
    /// Public post by `author`, created at `test_time()`.
    pub fn new(author: UserId) -> Self {
        Self {
            id: ContentId::new(),
            author,
            created_at: test_time(),
            audience: Audience::Public,
            reel: false,
        }
    }

    /// Build a reel instead of a post.
    pub fn reel(mut self) -> Self {
        self.reel = true;
        self
    }

    /// Use a fixed identifier.
    pub fn id(mut self, id: ContentId) -> Self {
        self.id = id;
        self
    }

    /// Set the creation time.
    pub fn created_at(mut self, created_at: PhysicalTime) -> Self {
        self.created_at = created_at;
        self
    }

    /// Set the audience.
    pub fn audience(mut self, audience: Audience) -> Self {
        self.audience = audience;
        self
    }

    /// Custom audience from allow and exclude lists.
    pub fn custom(
        self,
        allow: impl IntoIterator<Item = UserId>,
        exclude: impl IntoIterator<Item = UserId>,
    ) -> Self {
        self.audience(Audience::Custom(CustomAudience::new(allow, exclude)))
    }

    /// Build the decoded item.
    pub fn build(self) -> ContentItem {
        ContentItem {
            id: self.id,
            author_id: self.author,
            created_at: self.created_at,
            audience: self.audience,
            body: if self.reel {
                ContentBody::Reel
            } else {
                ContentBody::Post
            },
        }
    }

    /// Build the stored document.
    pub fn document(self) -> ContentDocument {
        ContentDocument::from_item(&self.build())
    }
}

/// Builder for stories.
#[derive(Debug, Clone)]
pub struct StoryBuilder {
    id: ContentId,
    author: UserId,
    created_at: PhysicalTime,
    expires_at: Option<PhysicalTime>,
    audience: Audience,
    viewers: Vec<UserId>,
    reactions: Vec<StoryReaction>,
    archived: bool,
    highlighted: bool,
}

impl StoryBuilder {
    /// Public story by `author`, created at `test_time()`, expiring after
    /// the default TTL.
    pub fn new(author: UserId) -> Self {
        Self {
            id: ContentId::new(),
            author,
            created_at: test_time(),
            expires_at: None,
            audience: Audience::Public,
            viewers: Vec::new(),
            reactions: Vec::new(),
            archived: false,
            highlighted: false,
        }
    }

    /// Use a fixed identifier.
    pub fn id(mut self, id: ContentId) -> Self {
        self.id = id;
        self
    }

    /// Set the creation time; expiry follows unless set explicitly.
    pub fn created_at(mut self, created_at: PhysicalTime) -> Self {
        self.created_at = created_at;
        self
    }

    /// Set the expiry time.
    pub fn expires_at(mut self, expires_at: PhysicalTime) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    /// Set the audience.
    pub fn audience(mut self, audience: Audience) -> Self {
        self.audience = audience;
        self
    }

    /// Custom story audience.
    pub fn custom_audience(self, audience: impl IntoIterator<Item = UserId>) -> Self {
        self.audience(Audience::Custom(CustomAudience::new(audience, [])))
    }

    /// Pre-recorded viewers.
    pub fn viewers(mut self, viewers: impl IntoIterator<Item = UserId>) -> Self {
        self.viewers = viewers.into_iter().collect();
        self
    }

    /// Append a pre-recorded reaction.
    pub fn reaction(mut self, user: UserId, emoji: &str) -> Self {
        self.reactions.push(StoryReaction {
            user_id: user,
            emoji: emoji.to_string(),
            reacted_at: self.created_at,
        });
        self
    }

    /// Mark archived.
    pub fn archived(mut self, archived: bool) -> Self {
        self.archived = archived;
        self
    }

    /// Mark highlighted.
    pub fn highlighted(mut self, highlighted: bool) -> Self {
        self.highlighted = highlighted;
        self
    }

    /// Build the decoded item.
    pub fn build(self) -> ContentItem {
        let expires_at = self
            .expires_at
            .unwrap_or_else(|| self.created_at.plus_secs(StoryConfig::DEFAULT_TTL_SECS));
        let mut story = StoryState::new(expires_at);
        story.viewers = self.viewers.into_iter().collect();
        story.view_count = story.viewers.len() as u64;
        story.reactions = self.reactions;
        story.archived = self.archived;
        story.highlighted = self.highlighted;

        ContentItem {
            id: self.id,
            author_id: self.author,
            created_at: self.created_at,
            audience: self.audience,
            body: ContentBody::Story(story),
        }
    }

    /// Build the stored document.
    pub fn document(self) -> ContentDocument {
        ContentDocument::from_item(&self.build())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::test_user;
    use agora_core::{ContentKind, UnknownVisibilityPolicy};

    #[test]
    fn test_story_default_expiry() {
        let story = StoryBuilder::new(test_user(1)).build();
        let state = story.story().unwrap();
        assert_eq!(state.expires_at, test_time().plus_secs(24 * 60 * 60));
    }

    #[test]
    fn test_builders_produce_distinct_ids() {
        let a = PostBuilder::new(test_user(1)).build();
        let b = PostBuilder::new(test_user(1)).build();
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_document_decodes_back() {
        let reel = PostBuilder::new(test_user(1))
            .reel()
            .custom([test_user(2)], [test_user(3)])
            .build();
        let doc = ContentDocument::from_item(&reel);
        assert_eq!(doc.kind, ContentKind::Reel);
        assert_eq!(doc.decode(UnknownVisibilityPolicy::Reject).unwrap(), reel);
    }
}
