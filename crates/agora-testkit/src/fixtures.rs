//! Seeded identifiers and timestamps

use agora_core::{ContentId, PhysicalTime, UserId};

/// Fixed "now" used by fixtures: 2023-11-14T22:13:20Z.
pub fn test_time() -> PhysicalTime {
    PhysicalTime::from_millis(1_700_000_000_000)
}

/// Create a test user ID with a given seed.
pub fn test_user(seed: u8) -> UserId {
    UserId::new_from_entropy([seed; 32])
}

/// Create a test content ID with a given seed.
pub fn test_content_id(seed: u8) -> ContentId {
    ContentId::from_bytes([seed; 32])
}
