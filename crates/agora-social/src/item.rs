//! Single-item lookup
//!
//! A denied item is reported as `Forbidden`, never returned redacted. Stories
//! that are no longer live for the viewer are reported as `NotFound`, the same
//! as ids that never existed.

use crate::graph::load_facts_for_item;
use crate::story::is_live_for;
use crate::visibility::VisibilityResolver;
use agora_core::effects::{
    dependency, ContentRegistryEffects, PhysicalTimeEffects, SocialGraphEffects,
};
use agora_core::{AgoraError, ContentId, ContentItem, Result, UnknownVisibilityPolicy, UserId};

/// Item lookup service.
#[derive(Debug, Clone, Default)]
pub struct ItemLookup {
    unknown_visibility: UnknownVisibilityPolicy,
}

impl ItemLookup {
    /// Create a lookup service using `unknown_visibility` for decoding.
    pub fn new(unknown_visibility: UnknownVisibilityPolicy) -> Self {
        Self { unknown_visibility }
    }

    /// Fetch `item_id` on behalf of `viewer`.
    ///
    /// # Errors
    /// * `AgoraError::NotFound` if the id does not resolve, or resolves to a
    ///   story that is expired or archived and `viewer` is not its author
    /// * `AgoraError::Validation` if the stored document is malformed
    /// * `AgoraError::Forbidden` if the viewer is outside the item's audience
    /// * `AgoraError::Dependency` if a collaborator fails
    pub async fn get_item<E>(
        &self,
        effects: &E,
        item_id: &ContentId,
        viewer: &UserId,
    ) -> Result<ContentItem>
    where
        E: SocialGraphEffects + ContentRegistryEffects + PhysicalTimeEffects + ?Sized,
    {
        let doc = effects
            .item_by_id(item_id)
            .await
            .map_err(|e| AgoraError::from_store(dependency::CONTENT_REGISTRY, e))?
            .ok_or_else(|| AgoraError::not_found(format!("item {item_id} not found")))?;

        let item = doc.decode(self.unknown_visibility)?;
        if item.is_authored_by(viewer) {
            return Ok(item);
        }

        if item.story().is_some() {
            let now = effects
                .physical_time()
                .await
                .map_err(|e| AgoraError::from_store(dependency::CLOCK, e))?;
            if !is_live_for(&item, viewer, now) {
                return Err(AgoraError::not_found(format!("item {item_id} not found")));
            }
        }

        let facts = load_facts_for_item(effects, viewer, &item).await?;
        let decision = VisibilityResolver::decide(viewer, &item, &facts);
        if !decision.is_allowed() {
            tracing::debug!(item_id = %item_id, viewer = %viewer, ?decision, "item lookup denied");
            return Err(AgoraError::forbidden(format!(
                "item {item_id} is not visible to {viewer}"
            )));
        }
        Ok(item)
    }
}
