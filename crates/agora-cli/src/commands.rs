//! Command-line argument definitions.

use agora_core::effects::FeedCursor;
use agora_core::{ContentId, ContentKind, PhysicalTime, UserId};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Top-level arguments
#[derive(Debug, Parser)]
#[command(name = "agora")]
#[command(
    about = "Agora - audience resolution, feeds and stories over a local dataset",
    long_about = None
)]
pub struct Cli {
    /// Operation to run
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file path
    #[arg(short, long, global = true, default_value = "agora.toml")]
    pub config: PathBuf,

    /// Dataset file path
    #[arg(short, long, global = true, default_value = "dataset.json")]
    pub data: PathBuf,

    /// Evaluate expiry as of this instant (milliseconds since the epoch)
    #[arg(long, global = true)]
    pub now_ms: Option<u64>,
}

/// Top-level commands
#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// Assemble one feed page
    Feed {
        /// Requesting user
        #[arg(long)]
        viewer: UserId,

        /// Zero-based page number
        #[arg(long, conflicts_with = "after")]
        page: Option<u32>,

        /// Continue after a cursor printed by a previous page
        #[arg(long, value_parser = parse_cursor)]
        after: Option<FeedCursor>,

        /// Items per page
        #[arg(long)]
        page_size: Option<usize>,

        /// Shuffle the visible candidates instead of newest first
        #[arg(long)]
        random: bool,

        /// Restrict to these kinds (repeatable)
        #[arg(long = "kind")]
        kinds: Vec<ContentKind>,
    },

    /// Fetch a single item
    Item {
        /// Requesting user
        #[arg(long)]
        viewer: UserId,

        /// Item to fetch
        item_id: ContentId,
    },

    /// Story lifecycle operations
    #[command(subcommand)]
    Story(StoryCommand),
}

/// `story` subcommands
#[derive(Debug, Clone, Subcommand)]
pub enum StoryCommand {
    /// Record a view
    View {
        /// Requesting user
        #[arg(long)]
        viewer: UserId,
        /// Target story
        story_id: ContentId,
    },

    /// Add a reaction
    React {
        /// Requesting user
        #[arg(long)]
        viewer: UserId,
        /// Target story
        story_id: ContentId,
        /// Reaction emoji
        #[arg(long)]
        emoji: String,
    },

    /// List viewers (author only)
    Viewers {
        /// Requesting user; must be the author
        #[arg(long)]
        requester: UserId,
        /// Target story
        story_id: ContentId,
    },

    /// List reactions (author only)
    Reactions {
        /// Requesting user; must be the author
        #[arg(long)]
        requester: UserId,
        /// Target story
        story_id: ContentId,
    },

    /// Archive a story (author only)
    Archive {
        /// Requesting user; must be the author
        #[arg(long)]
        requester: UserId,
        /// Target story
        story_id: ContentId,
        /// Restore instead of archiving
        #[arg(long)]
        undo: bool,
    },

    /// Pin a story to highlights (author only)
    Highlight {
        /// Requesting user; must be the author
        #[arg(long)]
        requester: UserId,
        /// Target story
        story_id: ContentId,
        /// Unpin instead of pinning
        #[arg(long)]
        undo: bool,
    },
}

impl Commands {
    /// Whether the command changes stored state.
    pub fn mutates(&self) -> bool {
        match self {
            Self::Feed { .. } | Self::Item { .. } => false,
            Self::Story(story) => !matches!(
                story,
                StoryCommand::Viewers { .. } | StoryCommand::Reactions { .. }
            ),
        }
    }
}

/// Cursor token: `<created_at_ms>:<content id>`.
pub fn format_cursor(cursor: &FeedCursor) -> String {
    format!("{}:{}", cursor.created_at.ts_ms, cursor.id.0)
}

/// Parse a token produced by `format_cursor`.
pub fn parse_cursor(token: &str) -> Result<FeedCursor, String> {
    let (ts, id) = token
        .split_once(':')
        .ok_or_else(|| format!("cursor `{token}` is not `<ms>:<id>`"))?;
    let ts_ms = ts
        .parse::<u64>()
        .map_err(|e| format!("cursor timestamp `{ts}`: {e}"))?;
    let id = id
        .parse::<ContentId>()
        .map_err(|e| format!("cursor id `{id}`: {e}"))?;
    Ok(FeedCursor {
        created_at: PhysicalTime::from_millis(ts_ms),
        id,
    })
}
