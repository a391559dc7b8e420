//! Agora Effects - Handler Implementations
//!
//! Concrete handlers for the collaborator interfaces declared in
//! `agora_core::effects`:
//!
//! - `MemorySocialGraph`: follow edges and close-friends lists
//! - `MemoryContentStore`: content registry and story store over stored
//!   documents; story mutations are atomic under one write lock
//! - `SystemClock`, `FixedClock`: wall-clock time
//! - `OsRandom`: shuffle seeds
//! - `AgoraEffectSystem`: all of the above behind one value, plus dataset
//!   import/export
//!
//! Mock and fault-injecting handlers live in `agora-testkit`.

pub mod content;
pub mod dataset;
pub mod graph;
pub mod random;
pub mod system;
pub mod time;

pub use content::MemoryContentStore;
pub use dataset::{Dataset, UserRecord};
pub use graph::MemorySocialGraph;
pub use random::OsRandom;
pub use system::AgoraEffectSystem;
pub use time::{FixedClock, SystemClock};
