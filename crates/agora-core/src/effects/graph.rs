//! Social graph store interface.

use super::StoreError;
use crate::identifiers::UserId;
use async_trait::async_trait;
use std::collections::BTreeSet;
use std::sync::Arc;

/// Read-only view of the follow graph and close-friends lists.
///
/// All queries are keyed by identity and return sets. Implementations must
/// report unreachable backends as errors; an empty set always means "no
/// relationships", never "unknown".
#[async_trait]
pub trait SocialGraphEffects: Send + Sync {
    /// Accounts `user` follows.
    async fn following_of(&self, user: &UserId) -> Result<BTreeSet<UserId>, StoreError>;

    /// Accounts following `user`.
    async fn followers_of(&self, user: &UserId) -> Result<BTreeSet<UserId>, StoreError>;

    /// `user`'s own close-friends list.
    async fn close_friends_of(&self, user: &UserId) -> Result<BTreeSet<UserId>, StoreError>;
}

/// Blanket implementation for Arc<T> where T: SocialGraphEffects
#[async_trait]
impl<T: SocialGraphEffects + ?Sized> SocialGraphEffects for Arc<T> {
    async fn following_of(&self, user: &UserId) -> Result<BTreeSet<UserId>, StoreError> {
        (**self).following_of(user).await
    }

    async fn followers_of(&self, user: &UserId) -> Result<BTreeSet<UserId>, StoreError> {
        (**self).followers_of(user).await
    }

    async fn close_friends_of(&self, user: &UserId) -> Result<BTreeSet<UserId>, StoreError> {
        (**self).close_friends_of(user).await
    }
}
