//! Wall-clock handlers

use agora_core::effects::{PhysicalTimeEffects, StoreError};
use agora_core::PhysicalTime;
use async_trait::async_trait;
use std::time::{SystemTime, UNIX_EPOCH};

/// System clock handler for production use
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl SystemClock {
    /// Create a new system clock handler
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl PhysicalTimeEffects for SystemClock {
    async fn physical_time(&self) -> Result<PhysicalTime, StoreError> {
        let elapsed = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| StoreError::ReadFailed(format!("system clock before epoch: {e}")))?;
        Ok(PhysicalTime::from_millis(elapsed.as_millis() as u64))
    }
}

/// Clock pinned to one instant.
///
/// Used to evaluate expiry "as of" a given time when replaying a dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock {
    now: PhysicalTime,
}

impl FixedClock {
    /// Clock that always reports `now`
    pub fn new(now: PhysicalTime) -> Self {
        Self { now }
    }
}

#[async_trait]
impl PhysicalTimeEffects for FixedClock {
    async fn physical_time(&self) -> Result<PhysicalTime, StoreError> {
        Ok(self.now)
    }
}
