//! Decoded content model
//!
//! Posts, reels and stories share one `ContentItem` shape. The visibility
//! declaration is a closed tagged variant (`Audience`): data that could not be
//! decoded into one of its variants never reaches the resolver.

use crate::identifiers::{ContentId, UserId};
use crate::time::PhysicalTime;
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Kind of content item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentKind {
    /// Long-lived feed post
    Post,
    /// Short video
    Reel,
    /// Ephemeral story
    Story,
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Post => "post",
            Self::Reel => "reel",
            Self::Story => "story",
        };
        f.write_str(s)
    }
}

impl FromStr for ContentKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "post" => Ok(Self::Post),
            "reel" => Ok(Self::Reel),
            "story" => Ok(Self::Story),
            other => Err(format!("unknown content kind `{other}`")),
        }
    }
}

/// Declared visibility mode, without the audience payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VisibilityMode {
    /// Everyone; stories spell this `all`
    #[serde(alias = "all")]
    Public,
    /// Viewers who follow the author
    Followers,
    /// Viewers who follow the author and are followed back
    Mutuals,
    /// Viewers on the author's close-friends list
    CloseFriends,
    /// Explicit per-item allow/exclude lists
    Custom,
}

impl VisibilityMode {
    /// Stored spelling of the mode.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Followers => "followers",
            Self::Mutuals => "mutuals",
            Self::CloseFriends => "close_friends",
            Self::Custom => "custom",
        }
    }
}

impl fmt::Display for VisibilityMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VisibilityMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "public" | "all" => Ok(Self::Public),
            "followers" => Ok(Self::Followers),
            "mutuals" => Ok(Self::Mutuals),
            "close_friends" => Ok(Self::CloseFriends),
            "custom" => Ok(Self::Custom),
            other => Err(format!("unrecognized visibility mode `{other}`")),
        }
    }
}

/// Explicit audience for `custom` visibility.
///
/// Stories only ever populate `allow` (their `audienceIds`); `exclude` stays
/// empty for them.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CustomAudience {
    /// Identities allowed to see the item
    pub allow: BTreeSet<UserId>,
    /// Identities denied even when allowed
    pub exclude: BTreeSet<UserId>,
}

impl CustomAudience {
    /// Build an audience from allow and exclude lists.
    pub fn new(
        allow: impl IntoIterator<Item = UserId>,
        exclude: impl IntoIterator<Item = UserId>,
    ) -> Self {
        Self {
            allow: allow.into_iter().collect(),
            exclude: exclude.into_iter().collect(),
        }
    }

    /// Exclusion dominates inclusion.
    pub fn admits(&self, viewer: &UserId) -> bool {
        self.allow.contains(viewer) && !self.excludes(viewer)
    }

    /// Check if `viewer` is on the exclude list
    pub fn excludes(&self, viewer: &UserId) -> bool {
        self.exclude.contains(viewer)
    }
}

/// Visibility declaration with its payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Audience {
    /// Everyone
    Public,
    /// Followers of the author
    Followers,
    /// Mutual follows of the author
    Mutuals,
    /// The author's close friends
    CloseFriends,
    /// Explicit lists
    Custom(CustomAudience),
}

impl Audience {
    /// Mode tag of this audience.
    pub fn mode(&self) -> VisibilityMode {
        match self {
            Self::Public => VisibilityMode::Public,
            Self::Followers => VisibilityMode::Followers,
            Self::Mutuals => VisibilityMode::Mutuals,
            Self::CloseFriends => VisibilityMode::CloseFriends,
            Self::Custom(_) => VisibilityMode::Custom,
        }
    }
}

/// A single story reaction. Reactions are never deduplicated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryReaction {
    /// Reacting user
    pub user_id: UserId,
    /// Emoji as sent by the client
    pub emoji: String,
    /// When the reaction was recorded
    pub reacted_at: PhysicalTime,
}

/// Story-only lifecycle and engagement state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoryState {
    /// Logical deletion time
    pub expires_at: PhysicalTime,
    /// Distinct viewers in order of first sighting
    pub viewers: IndexSet<UserId>,
    /// Denormalized distinct viewer count
    pub view_count: u64,
    /// Reactions in arrival order
    pub reactions: Vec<StoryReaction>,
    /// Author moved the story to their archive
    pub archived: bool,
    /// Author pinned the story to a highlight
    pub highlighted: bool,
}

impl StoryState {
    /// Fresh story state expiring at `expires_at`.
    pub fn new(expires_at: PhysicalTime) -> Self {
        Self {
            expires_at,
            viewers: IndexSet::new(),
            view_count: 0,
            reactions: Vec::new(),
            archived: false,
            highlighted: false,
        }
    }
}

/// Kind-specific payload of a content item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ContentBody {
    /// Post
    Post,
    /// Reel
    Reel,
    /// Story with its lifecycle state
    Story(StoryState),
}

/// A decoded post, reel or story.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentItem {
    /// Content identifier
    pub id: ContentId,
    /// Author of the item
    pub author_id: UserId,
    /// Creation time, the feed ordering key
    pub created_at: PhysicalTime,
    /// Who may see the item
    pub audience: Audience,
    /// Kind-specific payload
    pub body: ContentBody,
}

impl ContentItem {
    /// Kind of this item.
    pub fn kind(&self) -> ContentKind {
        match self.body {
            ContentBody::Post => ContentKind::Post,
            ContentBody::Reel => ContentKind::Reel,
            ContentBody::Story(_) => ContentKind::Story,
        }
    }

    /// Story state, when this item is a story.
    pub fn story(&self) -> Option<&StoryState> {
        match &self.body {
            ContentBody::Story(state) => Some(state),
            _ => None,
        }
    }

    /// Check if `user` authored this item
    pub fn is_authored_by(&self, user: &UserId) -> bool {
        &self.author_id == user
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_is_public_alias() {
        assert_eq!("all".parse::<VisibilityMode>(), Ok(VisibilityMode::Public));
        let mode: VisibilityMode = serde_json::from_str("\"all\"").unwrap();
        assert_eq!(mode, VisibilityMode::Public);
    }

    #[test]
    fn test_unknown_mode_is_rejected() {
        assert!("friends_of_friends".parse::<VisibilityMode>().is_err());
        assert!(serde_json::from_str::<VisibilityMode>("\"everyone\"").is_err());
    }

    #[test]
    fn test_custom_audience_exclude_wins() {
        let viewer = UserId::new_from_entropy([1u8; 32]);
        let audience = CustomAudience::new([viewer], [viewer]);
        assert!(!audience.admits(&viewer));
    }

    #[test]
    fn test_story_accessors() {
        let story = ContentItem {
            id: ContentId::from_bytes([1u8; 32]),
            author_id: UserId::new_from_entropy([1u8; 32]),
            created_at: PhysicalTime::from_secs(1),
            audience: Audience::Public,
            body: ContentBody::Story(StoryState::new(PhysicalTime::from_secs(100))),
        };
        assert_eq!(story.kind(), ContentKind::Story);
        assert!(story.story().is_some());
        assert_eq!(story.audience.mode(), VisibilityMode::Public);
    }
}
