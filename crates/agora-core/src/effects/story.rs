//! Story store interface.

use super::StoreError;
use crate::content::StoryReaction;
use crate::identifiers::{ContentId, UserId};
use async_trait::async_trait;
use std::sync::Arc;

/// Outcome of a conditional viewer insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewerInsert {
    /// Viewer was added and the counter incremented
    Inserted {
        /// Counter value after the insert
        view_count: u64,
    },
    /// Viewer was already present; nothing changed
    AlreadyPresent {
        /// Unchanged counter value
        view_count: u64,
    },
    /// No story with that id
    Missing,
}

/// Story-side mutations.
///
/// `add_viewer` must be an atomic "add to set" primitive: membership check,
/// insert and counter increment happen as one step so that concurrent views
/// from different viewers never lose an update.
#[async_trait]
pub trait StoryStoreEffects: Send + Sync {
    /// Add `viewer` to the story's viewers if absent.
    async fn add_viewer(
        &self,
        story_id: &ContentId,
        viewer: &UserId,
    ) -> Result<ViewerInsert, StoreError>;

    /// Append a reaction. Returns `false` when the story does not exist.
    async fn append_reaction(
        &self,
        story_id: &ContentId,
        reaction: StoryReaction,
    ) -> Result<bool, StoreError>;

    /// Set the archived flag. Returns `false` when the story does not exist.
    async fn set_archived(&self, story_id: &ContentId, archived: bool) -> Result<bool, StoreError>;

    /// Set the highlighted flag. Returns `false` when the story does not exist.
    async fn set_highlighted(
        &self,
        story_id: &ContentId,
        highlighted: bool,
    ) -> Result<bool, StoreError>;
}

/// Blanket implementation for Arc<T> where T: StoryStoreEffects
#[async_trait]
impl<T: StoryStoreEffects + ?Sized> StoryStoreEffects for Arc<T> {
    async fn add_viewer(
        &self,
        story_id: &ContentId,
        viewer: &UserId,
    ) -> Result<ViewerInsert, StoreError> {
        (**self).add_viewer(story_id, viewer).await
    }

    async fn append_reaction(
        &self,
        story_id: &ContentId,
        reaction: StoryReaction,
    ) -> Result<bool, StoreError> {
        (**self).append_reaction(story_id, reaction).await
    }

    async fn set_archived(&self, story_id: &ContentId, archived: bool) -> Result<bool, StoreError> {
        (**self).set_archived(story_id, archived).await
    }

    async fn set_highlighted(
        &self,
        story_id: &ContentId,
        highlighted: bool,
    ) -> Result<bool, StoreError> {
        (**self).set_highlighted(story_id, highlighted).await
    }
}
