//! Agora Core - Visibility Core Foundation
//!
//! This crate provides the foundational types and effect interfaces that the
//! rest of the workspace builds on. It contains no I/O and no decision logic.
//!
//! # Contents
//!
//! ## Types
//! - `UserId`, `ContentId`: opaque UUID-backed identifiers
//! - `PhysicalTime`: wall-clock milliseconds
//! - `ContentItem`, `Audience`, `StoryState`: the decoded content model
//! - `ContentDocument`: the loose shape kept by the document store
//!
//! ## Effect Interfaces (collaborator signatures)
//! - `SocialGraphEffects`: following / followers / close friends
//! - `ContentRegistryEffects`: recency-ordered candidates, lookup by id
//! - `StoryStoreEffects`: atomic story-side mutations
//! - `PhysicalTimeEffects`, `RandomEffects`
//!
//! ## Ambient
//! - `AgoraError`: single error type for every library crate
//! - `AgoraConfig`: TOML + environment configuration

#![forbid(unsafe_code)]

/// Layered configuration (TOML, environment, validation)
pub mod config;

/// Decoded content model
pub mod content;

/// Stored document shape and decoding
pub mod document;

/// Collaborator interfaces
pub mod effects;

/// Unified error handling
pub mod errors;

/// User and content identifiers
pub mod identifiers;

/// Wall-clock time
pub mod time;

pub use config::{AgoraConfig, FeedConfig, LoggingConfig, StoryConfig, UnknownVisibilityPolicy};
pub use content::{
    Audience, ContentBody, ContentItem, ContentKind, CustomAudience, StoryReaction, StoryState,
    VisibilityMode,
};
pub use document::ContentDocument;
pub use errors::{AgoraError, Result};
pub use identifiers::{ContentId, UserId};
pub use time::PhysicalTime;
