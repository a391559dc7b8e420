//! Agora Testing Infrastructure
//!
//! Common fixtures and handlers for tests across the workspace: seeded
//! identities, content builders, a controllable clock and `TestEffects`,
//! an in-memory effect system with fault injection and read counters.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
//!
//! # Usage
//!
//! ```toml
//! [dev-dependencies]
//! agora-testkit = { path = "../agora-testkit" }
//! ```
//!
//! ```rust,no_run
//! use agora_testkit::*;
//!
//! # async fn demo() {
//! let effects = TestEffects::new();
//! let (author, viewer) = (test_user(1), test_user(2));
//! effects.graph().follow(viewer, author).await;
//! effects.seed(&PostBuilder::new(author).build()).await;
//! # }
//! ```

pub mod builders;
pub mod effects;
pub mod fixtures;
pub mod time;

pub use builders::{PostBuilder, StoryBuilder};
pub use effects::{EffectCounters, SeededRandom, TestEffects};
pub use fixtures::{test_content_id, test_time, test_user};
pub use time::ControllableClock;
