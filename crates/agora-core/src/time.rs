//! Wall-clock time
//!
//! `PhysicalTime` is the only time representation the core needs: content
//! creation, story expiry and reaction timestamps are all milliseconds since
//! the Unix epoch.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Milliseconds since the Unix epoch.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct PhysicalTime {
    /// Milliseconds since the Unix epoch
    pub ts_ms: u64,
}

impl PhysicalTime {
    /// Create a time from milliseconds.
    pub const fn from_millis(ts_ms: u64) -> Self {
        Self { ts_ms }
    }

    /// Create a time from whole seconds.
    pub const fn from_secs(secs: u64) -> Self {
        Self {
            ts_ms: secs.saturating_mul(1000),
        }
    }

    /// Return a time shifted forward by `secs` seconds, saturating.
    pub fn plus_secs(self, secs: u64) -> Self {
        Self {
            ts_ms: self.ts_ms.saturating_add(secs.saturating_mul(1000)),
        }
    }

    /// True when `self` is at or before `other`.
    pub fn is_at_or_before(self, other: PhysicalTime) -> bool {
        self.ts_ms <= other.ts_ms
    }
}

impl fmt::Display for PhysicalTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ms", self.ts_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plus_secs_saturates() {
        let t = PhysicalTime::from_millis(u64::MAX - 10);
        assert_eq!(t.plus_secs(1).ts_ms, u64::MAX);
    }

    #[test]
    fn test_boundary_is_inclusive() {
        let t = PhysicalTime::from_secs(10);
        assert!(t.is_at_or_before(PhysicalTime::from_secs(10)));
        assert!(!t.is_at_or_before(PhysicalTime::from_millis(9_999)));
    }

    #[test]
    fn test_serializes_as_plain_number() {
        let json = serde_json::to_string(&PhysicalTime::from_millis(42)).unwrap();
        assert_eq!(json, "42");
    }
}
