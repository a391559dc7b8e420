//! CLI command handlers
//!
//! Each handler runs one core operation against the context's effect system
//! and returns its result as JSON. Mutating commands write the dataset back.

use crate::commands::Commands;
use crate::context::CliContext;
use anyhow::Result;
use serde_json::Value;

pub mod feed;
pub mod item;
pub mod story;

/// Dispatches parsed commands.
#[derive(Debug)]
pub struct CliHandler {
    context: CliContext,
}

impl CliHandler {
    /// Create a handler over a loaded context
    pub fn new(context: CliContext) -> Self {
        Self { context }
    }

    /// Run `command` and return its JSON output.
    pub async fn handle(&self, command: &Commands) -> Result<Value> {
        let output = match command {
            Commands::Feed {
                viewer,
                page,
                after,
                page_size,
                random,
                kinds,
            } => {
                let args = feed::FeedArgs {
                    viewer: *viewer,
                    page: *page,
                    after: *after,
                    page_size: *page_size,
                    random: *random,
                    kinds: kinds.clone(),
                };
                feed::handle_feed(&self.context, &args).await?
            }
            Commands::Item { viewer, item_id } => {
                item::handle_item(&self.context, viewer, item_id).await?
            }
            Commands::Story(story) => story::handle_story(&self.context, story).await?,
        };

        if command.mutates() {
            self.context.persist().await?;
        }
        Ok(output)
    }
}
