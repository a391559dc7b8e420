//! Collaborator interfaces
//!
//! Every external collaborator of the visibility core is expressed as an
//! `async_trait` effect interface. The core never talks to a concrete store:
//! handlers live in `agora-effects` (in-memory, production clock) and
//! `agora-testkit` (controllable and fault-injecting).
//!
//! # Effect Classification
//!
//! - `SocialGraphEffects`: read-only follow graph and close-friends lists
//! - `ContentRegistryEffects`: read-only candidate and item lookups
//! - `StoryStoreEffects`: atomic story-side mutations
//! - `PhysicalTimeEffects`, `RandomEffects`: infrastructure

pub mod content;
pub mod graph;
pub mod random;
pub mod story;
pub mod time;

pub use content::{recency_order, CandidateQuery, ContentRegistryEffects, FeedCursor};
pub use graph::SocialGraphEffects;
pub use random::RandomEffects;
pub use story::{StoryStoreEffects, ViewerInsert};
pub use time::PhysicalTimeEffects;

/// Error type shared by the store-backed collaborators.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// Store could not be reached
    #[error("store unavailable: {0}")]
    Unavailable(String),
    /// Read was attempted and failed
    #[error("read failed: {0}")]
    ReadFailed(String),
    /// Write was attempted and failed
    #[error("write failed: {0}")]
    WriteFailed(String),
    /// Store did not answer in time
    #[error("timed out after {timeout_ms}ms")]
    Timeout {
        /// Elapsed budget
        timeout_ms: u64,
    },
}

/// Dependency names used when store failures are surfaced as `AgoraError`.
pub mod dependency {
    /// Follow graph and close-friends lists
    pub const SOCIAL_GRAPH: &str = "social-graph";
    /// Content registry
    pub const CONTENT_REGISTRY: &str = "content-registry";
    /// Story store
    pub const STORY_STORE: &str = "story-store";
    /// Clock
    pub const CLOCK: &str = "clock";
}
