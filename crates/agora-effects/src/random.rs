//! Operating-system randomness handler

use agora_core::effects::RandomEffects;
use async_trait::async_trait;
use rand::RngCore;

/// Seeds drawn from the thread-local OS-seeded generator
#[derive(Debug, Clone, Copy, Default)]
pub struct OsRandom;

impl OsRandom {
    /// Create a new handler
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl RandomEffects for OsRandom {
    async fn random_u64(&self) -> u64 {
        rand::thread_rng().next_u64()
    }
}
