//! Wall-clock interface.

use super::StoreError;
use crate::time::PhysicalTime;
use async_trait::async_trait;
use std::sync::Arc;

/// Wall-clock time for expiry checks and reaction timestamps.
#[async_trait]
pub trait PhysicalTimeEffects: Send + Sync {
    /// Current wall-clock time.
    async fn physical_time(&self) -> Result<PhysicalTime, StoreError>;
}

/// Blanket implementation for Arc<T> where T: PhysicalTimeEffects
#[async_trait]
impl<T: PhysicalTimeEffects + ?Sized> PhysicalTimeEffects for Arc<T> {
    async fn physical_time(&self) -> Result<PhysicalTime, StoreError> {
        (**self).physical_time().await
    }
}
