//! Agora Social - Audience Resolution Layer
//!
//! This crate holds the decision logic of the visibility core. Everything else
//! in the product is CRUD; this is where "may this viewer see this item" is
//! answered.
//!
//! - `VisibilityResolver`: pure decision over an item's audience and the
//!   viewer's graph facts
//! - `FeedAssembler`: over-fetching, filtering feed pages
//! - `ItemLookup`: single item with `Forbidden` / `NotFound` semantics
//! - `StoryLifecycle`: expiry, idempotent views, reactions, author insights
//!
//! Services are stateless and take an effect reference per call:
//!
//! ```ignore
//! use agora_social::{FeedAssembler, FeedRequest};
//!
//! let assembler = FeedAssembler::new(config.feed.clone());
//! let page = assembler
//!     .assemble(&effects, &FeedRequest::new(viewer).page_size(10))
//!     .await?;
//! ```

pub mod feed;
pub mod graph;
pub mod item;
pub mod story;
pub mod visibility;

pub use feed::{FeedAssembler, FeedOrder, FeedPage, FeedPosition, FeedRequest};
pub use graph::{load_graph_facts, SocialGraphFacts};
pub use item::ItemLookup;
pub use story::{is_expired, is_live_for, phase, StoryLifecycle, StoryPhase, ViewOutcome};
pub use visibility::{AllowReason, DenyReason, VisibilityDecision, VisibilityResolver};
