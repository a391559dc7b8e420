//! `agora feed`

use crate::commands::format_cursor;
use crate::context::CliContext;
use agora_core::effects::FeedCursor;
use agora_core::{ContentKind, UserId};
use agora_social::{FeedAssembler, FeedOrder, FeedRequest};
use anyhow::Result;
use serde_json::{json, Value};

/// Parsed `feed` arguments.
#[derive(Debug, Clone)]
pub struct FeedArgs {
    /// Requesting user
    pub viewer: UserId,
    /// Page number; ignored when `after` is set
    pub page: Option<u32>,
    /// Cursor from a previous page
    pub after: Option<FeedCursor>,
    /// Items per page
    pub page_size: Option<usize>,
    /// Shuffle instead of newest first
    pub random: bool,
    /// Kind filter; empty means all kinds
    pub kinds: Vec<ContentKind>,
}

impl FeedArgs {
    fn request(&self) -> FeedRequest {
        let mut request = FeedRequest::new(self.viewer);
        request = match (self.after, self.page) {
            (Some(cursor), _) => request.after(cursor),
            (None, Some(page)) => request.page(page),
            (None, None) => request,
        };
        if let Some(size) = self.page_size {
            request = request.page_size(size);
        }
        if self.random {
            request = request.order(FeedOrder::Random);
        }
        if !self.kinds.is_empty() {
            request = request.kinds(self.kinds.iter().copied());
        }
        request
    }
}

/// Assemble one page and render it with a cursor token.
pub async fn handle_feed(context: &CliContext, args: &FeedArgs) -> Result<Value> {
    let assembler = FeedAssembler::new(context.config.feed.clone());
    let page = assembler.assemble(&context.effects, &args.request()).await?;

    tracing::info!(
        viewer = %args.viewer,
        items = page.items.len(),
        skipped_malformed = page.skipped_malformed,
        "feed page"
    );

    Ok(json!({
        "items": page.items,
        "next": page.next_cursor.as_ref().map(format_cursor),
        "examined": page.examined,
        "skippedMalformed": page.skipped_malformed,
    }))
}
