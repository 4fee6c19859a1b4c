//! Repository port traits for persistence.

use std::collections::BTreeSet;

use async_trait::async_trait;
use questline_domain::{NodeKey, UserId};

use super::error::PersistenceError;

// =============================================================================
// Endings Storage
// =============================================================================

/// Durable per-user set of discovered ending keys.
///
/// Implementations must make `add_to_set` atomic per user: two racing adds
/// for the same user both end up in the set.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EndingsRepo: Send + Sync {
    /// The user's full set; empty when nothing was ever recorded.
    async fn get_set(&self, user: &UserId) -> Result<BTreeSet<NodeKey>, PersistenceError>;

    /// Add `key` to the user's set. Returns `true` if it was not present.
    async fn add_to_set(&self, user: &UserId, key: &NodeKey) -> Result<bool, PersistenceError>;
}
