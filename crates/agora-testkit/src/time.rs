//! Controllable clock for deterministic expiry tests

use crate::fixtures::test_time;
use agora_core::effects::{PhysicalTimeEffects, StoreError};
use agora_core::PhysicalTime;
use std::sync::{Arc, Mutex};

/// Clock that only moves when told to
#[derive(Debug, Clone)]
pub struct ControllableClock {
    current: Arc<Mutex<PhysicalTime>>,
}

impl Default for ControllableClock {
    fn default() -> Self {
        Self::new(test_time())
    }
}

impl ControllableClock {
    /// Create a clock starting at `start`
    pub fn new(start: PhysicalTime) -> Self {
        Self {
            current: Arc::new(Mutex::new(start)),
        }
    }

    /// Set absolute time
    pub fn set(&self, now: PhysicalTime) {
        *self.current.lock().unwrap() = now;
    }

    /// Advance time by given number of seconds
    pub fn advance_secs(&self, secs: u64) {
        let mut current = self.current.lock().unwrap();
        *current = current.plus_secs(secs);
    }

    /// Get current time
    pub fn now(&self) -> PhysicalTime {
        *self.current.lock().unwrap()
    }
}

#[async_trait::async_trait]
impl PhysicalTimeEffects for ControllableClock {
    async fn physical_time(&self) -> Result<PhysicalTime, StoreError> {
        Ok(self.now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_clock_moves_only_when_advanced() {
        let clock = ControllableClock::default();
        assert_eq!(clock.physical_time().await.unwrap(), test_time());

        clock.advance_secs(2);
        assert_eq!(clock.now().ts_ms, test_time().ts_ms + 2_000);

        clock.set(PhysicalTime::from_millis(1));
        assert_eq!(clock.now().ts_ms, 1);
    }
}
