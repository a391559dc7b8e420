//! Stored document shape and decoding
//!
//! The document store keeps posts, reels and stories as loosely shaped
//! camelCase documents in which most visibility fields are optional. Decoding
//! turns a document into a `ContentItem` and is the only place where missing
//! or unrecognized visibility data is detected.

use crate::config::UnknownVisibilityPolicy;
use crate::content::{
    Audience, ContentBody, ContentItem, ContentKind, CustomAudience, StoryReaction, StoryState,
    VisibilityMode,
};
use crate::errors::{AgoraError, Result};
use crate::identifiers::{ContentId, UserId};
use crate::time::PhysicalTime;
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

/// A content record as kept by the document store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentDocument {
    /// Content identifier
    pub id: ContentId,
    /// Post, reel or story
    pub kind: ContentKind,
    /// Author of the item
    pub author_id: UserId,
    /// Creation time
    pub created_at: PhysicalTime,
    /// Visibility mode as stored (`public`, `all`, `followers`, ...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visibility: Option<String>,
    /// Post/reel custom allow list
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub allow_list: Vec<UserId>,
    /// Post/reel custom exclude list
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exclude_list: Vec<UserId>,
    /// Story custom audience
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub audience_ids: Vec<UserId>,
    /// Story expiry
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<PhysicalTime>,
    /// Story viewers in order of first sighting
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub viewers: Vec<UserId>,
    /// Story distinct viewer counter
    #[serde(default)]
    pub view_count: u64,
    /// Story reactions in arrival order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub reactions: Vec<StoryReaction>,
    /// Story archived by its author
    #[serde(default)]
    pub archived: bool,
    /// Story pinned to a highlight by its author
    #[serde(default)]
    pub highlighted: bool,
}

impl ContentDocument {
    /// Decode into a `ContentItem`.
    ///
    /// # Errors
    /// * `AgoraError::Validation` if `visibility` is missing, if it is not a
    ///   recognized mode and `unknown` is `Reject`, or if a story has no
    ///   `expiresAt`
    pub fn decode(&self, unknown: UnknownVisibilityPolicy) -> Result<ContentItem> {
        let raw_mode = self.visibility.as_deref().ok_or_else(|| {
            AgoraError::validation(format!("{} {} has no visibility", self.kind, self.id))
        })?;

        let mode = match raw_mode.parse::<VisibilityMode>() {
            Ok(mode) => mode,
            Err(reason) => match unknown {
                UnknownVisibilityPolicy::Reject => {
                    return Err(AgoraError::validation(format!(
                        "{} {}: {reason}",
                        self.kind, self.id
                    )))
                }
                UnknownVisibilityPolicy::TreatAsPublic => VisibilityMode::Public,
            },
        };

        let audience = match mode {
            VisibilityMode::Public => Audience::Public,
            VisibilityMode::Followers => Audience::Followers,
            VisibilityMode::Mutuals => Audience::Mutuals,
            VisibilityMode::CloseFriends => Audience::CloseFriends,
            VisibilityMode::Custom => match self.kind {
                ContentKind::Story => Audience::Custom(CustomAudience::new(
                    self.audience_ids.iter().copied(),
                    std::iter::empty(),
                )),
                ContentKind::Post | ContentKind::Reel => Audience::Custom(CustomAudience::new(
                    self.allow_list.iter().copied(),
                    self.exclude_list.iter().copied(),
                )),
            },
        };

        let body = match self.kind {
            ContentKind::Post => ContentBody::Post,
            ContentKind::Reel => ContentBody::Reel,
            ContentKind::Story => {
                let expires_at = self.expires_at.ok_or_else(|| {
                    AgoraError::validation(format!("story {} has no expiresAt", self.id))
                })?;
                let viewers: IndexSet<UserId> = self.viewers.iter().copied().collect();
                ContentBody::Story(StoryState {
                    expires_at,
                    view_count: self.view_count.max(viewers.len() as u64),
                    viewers,
                    reactions: self.reactions.clone(),
                    archived: self.archived,
                    highlighted: self.highlighted,
                })
            }
        };

        Ok(ContentItem {
            id: self.id,
            author_id: self.author_id,
            created_at: self.created_at,
            audience,
            body,
        })
    }

    /// Encode a decoded item back into its stored shape.
    pub fn from_item(item: &ContentItem) -> Self {
        let mut doc = Self {
            id: item.id,
            kind: item.kind(),
            author_id: item.author_id,
            created_at: item.created_at,
            visibility: Some(item.audience.mode().as_str().to_string()),
            allow_list: Vec::new(),
            exclude_list: Vec::new(),
            audience_ids: Vec::new(),
            expires_at: None,
            viewers: Vec::new(),
            view_count: 0,
            reactions: Vec::new(),
            archived: false,
            highlighted: false,
        };

        if let Audience::Custom(custom) = &item.audience {
            if item.kind() == ContentKind::Story {
                doc.audience_ids = custom.allow.iter().copied().collect();
            } else {
                doc.allow_list = custom.allow.iter().copied().collect();
                doc.exclude_list = custom.exclude.iter().copied().collect();
            }
        }

        if let Some(story) = item.story() {
            doc.expires_at = Some(story.expires_at);
            doc.viewers = story.viewers.iter().copied().collect();
            doc.view_count = story.view_count;
            doc.reactions = story.reactions.clone();
            doc.archived = story.archived;
            doc.highlighted = story.highlighted;
        }

        doc
    }
}

impl TryFrom<&ContentDocument> for ContentItem {
    type Error = AgoraError;

    fn try_from(doc: &ContentDocument) -> Result<Self> {
        doc.decode(UnknownVisibilityPolicy::Reject)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(seed: u8) -> UserId {
        UserId::new_from_entropy([seed; 32])
    }

    fn post_doc(visibility: Option<&str>) -> ContentDocument {
        ContentDocument {
            id: ContentId::from_bytes([9u8; 32]),
            kind: ContentKind::Post,
            author_id: user(1),
            created_at: PhysicalTime::from_secs(1_700_000_000),
            visibility: visibility.map(str::to_string),
            allow_list: vec![user(2), user(3)],
            exclude_list: vec![user(3)],
            audience_ids: Vec::new(),
            expires_at: None,
            viewers: Vec::new(),
            view_count: 0,
            reactions: Vec::new(),
            archived: false,
            highlighted: false,
        }
    }

    #[test]
    fn test_missing_visibility_is_validation_failure() {
        let err = post_doc(None)
            .decode(UnknownVisibilityPolicy::Reject)
            .unwrap_err();
        assert!(matches!(err, AgoraError::Validation { .. }));
    }

    #[test]
    fn test_unknown_visibility_follows_policy() {
        let doc = post_doc(Some("friends_of_friends"));
        assert!(doc.decode(UnknownVisibilityPolicy::Reject).is_err());

        let item = doc.decode(UnknownVisibilityPolicy::TreatAsPublic).unwrap();
        assert_eq!(item.audience, Audience::Public);
    }

    #[test]
    fn test_custom_post_keeps_both_lists() {
        let item = ContentItem::try_from(&post_doc(Some("custom"))).unwrap();
        match item.audience {
            Audience::Custom(custom) => {
                assert!(custom.admits(&user(2)));
                assert!(!custom.admits(&user(3)));
            }
            other => panic!("unexpected audience: {other:?}"),
        }
    }

    #[test]
    fn test_story_custom_uses_audience_ids_only() {
        let mut doc = post_doc(Some("custom"));
        doc.kind = ContentKind::Story;
        doc.expires_at = Some(PhysicalTime::from_secs(1_700_086_400));
        doc.audience_ids = vec![user(4)];

        let item = doc.decode(UnknownVisibilityPolicy::Reject).unwrap();
        match item.audience {
            Audience::Custom(custom) => {
                assert!(custom.admits(&user(4)));
                assert!(!custom.admits(&user(2)));
                assert!(custom.exclude.is_empty());
            }
            other => panic!("unexpected audience: {other:?}"),
        }
    }

    #[test]
    fn test_story_without_expiry_is_rejected() {
        let mut doc = post_doc(Some("all"));
        doc.kind = ContentKind::Story;
        assert!(matches!(
            doc.decode(UnknownVisibilityPolicy::Reject),
            Err(AgoraError::Validation { .. })
        ));
    }

    #[test]
    fn test_duplicate_viewers_collapse_on_decode() {
        let mut doc = post_doc(Some("all"));
        doc.kind = ContentKind::Story;
        doc.expires_at = Some(PhysicalTime::from_secs(1_700_086_400));
        doc.viewers = vec![user(2), user(2), user(5)];
        doc.view_count = 2;

        let item = doc.decode(UnknownVisibilityPolicy::Reject).unwrap();
        let story = item.story().unwrap();
        assert_eq!(story.viewers.len(), 2);
        assert_eq!(story.view_count, 2);
    }

    #[test]
    fn test_document_shape_is_camel_case() {
        let json = r#"{
            "id": "09090909-0909-0909-0909-090909090909",
            "kind": "reel",
            "authorId": "01010101-0101-0101-0101-010101010101",
            "createdAt": 1700000000000,
            "visibility": "mutuals"
        }"#;
        let doc: ContentDocument = serde_json::from_str(json).unwrap();
        let item = ContentItem::try_from(&doc).unwrap();
        assert_eq!(item.kind(), ContentKind::Reel);
        assert_eq!(item.audience, Audience::Mutuals);
        assert_eq!(ContentDocument::from_item(&item).visibility.as_deref(), Some("mutuals"));
    }
}
