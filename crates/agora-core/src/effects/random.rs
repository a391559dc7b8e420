//! Randomness interface.

use async_trait::async_trait;
use std::sync::Arc;

/// Source of seeds for shuffled feeds.
#[async_trait]
pub trait RandomEffects: Send + Sync {
    /// A uniformly distributed `u64`.
    async fn random_u64(&self) -> u64;
}

/// Blanket implementation for Arc<T> where T: RandomEffects
#[async_trait]
impl<T: RandomEffects + ?Sized> RandomEffects for Arc<T> {
    async fn random_u64(&self) -> u64 {
        (**self).random_u64().await
    }
}
