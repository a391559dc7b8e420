//! `agora item`

use crate::context::CliContext;
use agora_core::{ContentId, UserId};
use agora_social::ItemLookup;
use anyhow::Result;
use serde_json::Value;

/// Fetch one item on behalf of `viewer`.
pub async fn handle_item(
    context: &CliContext,
    viewer: &UserId,
    item_id: &ContentId,
) -> Result<Value> {
    let lookup = ItemLookup::new(context.config.feed.unknown_visibility);
    let item = lookup.get_item(&context.effects, item_id, viewer).await?;
    Ok(serde_json::to_value(item)?)
}
