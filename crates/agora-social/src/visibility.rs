//! Visibility policy resolution
//!
//! Decides whether a viewer may see a content item. The decision is pure: it
//! reads the item's declared audience and the viewer's graph facts and nothing
//! else. Story expiry and archiving are lifecycle concerns handled in
//! `crate::story`.
//!
//! | audience | allowed when |
//! |---|---|
//! | any, viewer is the author | always |
//! | `Public` | always |
//! | `Followers` | viewer follows the author |
//! | `Mutuals` | viewer and author follow each other |
//! | `CloseFriends` | author lists the viewer as a close friend |
//! | `Custom` | viewer is allowed and not excluded |

use crate::graph::SocialGraphFacts;
use agora_core::{Audience, ContentItem, UserId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Why a viewer was allowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AllowReason {
    /// Viewer is the author
    Author,
    /// Item is public
    Public,
    /// Viewer follows the author
    Follower,
    /// Viewer and author follow each other
    Mutual,
    /// Author lists the viewer as a close friend
    CloseFriend,
    /// Viewer is on the custom allow list
    CustomAudience,
}

/// Why a viewer was denied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DenyReason {
    /// Followers-only and the viewer does not follow the author
    NotFollowing,
    /// Mutuals-only and the follow is missing in at least one direction
    NotMutual,
    /// Close-friends-only and the viewer is not listed
    NotCloseFriend,
    /// Viewer is on the custom exclude list
    Excluded,
    /// Viewer is not on the custom allow list
    NotInAudience,
}

/// Outcome of a visibility check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VisibilityDecision {
    /// Viewer may see the item
    Allow(AllowReason),
    /// Viewer may not see the item
    Deny(DenyReason),
}

impl VisibilityDecision {
    /// Check if the decision allows viewing
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow(_))
    }
}

/// Stateless visibility resolver.
#[derive(Debug, Clone, Copy, Default)]
pub struct VisibilityResolver;

impl VisibilityResolver {
    /// Decide visibility with the reason for the outcome.
    pub fn decide(
        viewer: &UserId,
        item: &ContentItem,
        facts: &SocialGraphFacts,
    ) -> VisibilityDecision {
        use VisibilityDecision::{Allow, Deny};

        if item.is_authored_by(viewer) {
            return Allow(AllowReason::Author);
        }

        let author = &item.author_id;
        match &item.audience {
            Audience::Public => Allow(AllowReason::Public),
            Audience::Followers if facts.follows(author) => Allow(AllowReason::Follower),
            Audience::Followers => Deny(DenyReason::NotFollowing),
            Audience::Mutuals if facts.is_mutual(author) => Allow(AllowReason::Mutual),
            Audience::Mutuals => Deny(DenyReason::NotMutual),
            Audience::CloseFriends if facts.is_close_friend_of(author) => {
                Allow(AllowReason::CloseFriend)
            }
            Audience::CloseFriends => Deny(DenyReason::NotCloseFriend),
            Audience::Custom(custom) if custom.admits(viewer) => Allow(AllowReason::CustomAudience),
            Audience::Custom(custom) if custom.excludes(viewer) => Deny(DenyReason::Excluded),
            Audience::Custom(_) => Deny(DenyReason::NotInAudience),
        }
    }

    /// `true` when `viewer` may see `item`.
    pub fn can_view(viewer: &UserId, item: &ContentItem, facts: &SocialGraphFacts) -> bool {
        Self::decide(viewer, item, facts).is_allowed()
    }

    /// Authors whose close-friends list is needed to decide `items` for
    /// `viewer`.
    pub fn close_friend_authors<'a, I>(viewer: &UserId, items: I) -> BTreeSet<UserId>
    where
        I: IntoIterator<Item = &'a ContentItem>,
    {
        items
            .into_iter()
            .filter(|item| matches!(item.audience, Audience::CloseFriends))
            .filter(|item| !item.is_authored_by(viewer))
            .map(|item| item.author_id)
            .collect()
    }
}
