//! `agora story ...`

use crate::commands::StoryCommand;
use crate::context::CliContext;
use agora_social::StoryLifecycle;
use anyhow::Result;
use serde_json::{json, Value};

/// Run one story subcommand.
pub async fn handle_story(context: &CliContext, command: &StoryCommand) -> Result<Value> {
    let lifecycle = StoryLifecycle::new(context.config.stories.clone())
        .with_unknown_visibility(context.config.feed.unknown_visibility);
    let effects = &context.effects;

    let output = match command {
        StoryCommand::View { viewer, story_id } => {
            let outcome = lifecycle.record_view(effects, story_id, viewer).await?;
            serde_json::to_value(outcome)?
        }
        StoryCommand::React {
            viewer,
            story_id,
            emoji,
        } => {
            let reaction = lifecycle
                .record_reaction(effects, story_id, viewer, emoji)
                .await?;
            serde_json::to_value(reaction)?
        }
        StoryCommand::Viewers {
            requester,
            story_id,
        } => {
            let viewers = lifecycle.list_viewers(effects, story_id, requester).await?;
            json!({ "viewers": viewers, "count": viewers.len() })
        }
        StoryCommand::Reactions {
            requester,
            story_id,
        } => {
            let reactions = lifecycle
                .list_reactions(effects, story_id, requester)
                .await?;
            json!({ "reactions": reactions })
        }
        StoryCommand::Archive {
            requester,
            story_id,
            undo,
        } => {
            lifecycle
                .set_archived(effects, story_id, requester, !undo)
                .await?;
            json!({ "storyId": story_id, "archived": !undo })
        }
        StoryCommand::Highlight {
            requester,
            story_id,
            undo,
        } => {
            lifecycle
                .set_highlighted(effects, story_id, requester, !undo)
                .await?;
            json!({ "storyId": story_id, "highlighted": !undo })
        }
    };
    Ok(output)
}
