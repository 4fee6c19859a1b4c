//! In-memory endings store.

use std::collections::BTreeSet;

use async_trait::async_trait;
use dashmap::DashMap;
use questline_domain::{NodeKey, UserId};

use crate::infrastructure::ports::{EndingsRepo, PersistenceError};

/// Endings kept in a concurrent map; lost on restart.
#[derive(Default)]
pub struct InMemoryEndingsRepo {
    sets: DashMap<UserId, BTreeSet<NodeKey>>,
}

impl InMemoryEndingsRepo {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EndingsRepo for InMemoryEndingsRepo {
    async fn get_set(&self, user: &UserId) -> Result<BTreeSet<NodeKey>, PersistenceError> {
        Ok(self
            .sets
            .get(user)
            .map(|set| set.value().clone())
            .unwrap_or_default())
    }

    async fn add_to_set(&self, user: &UserId, key: &NodeKey) -> Result<bool, PersistenceError> {
        // The entry guard holds the shard lock for the whole insert
        Ok(self.sets.entry(user.clone()).or_default().insert(key.clone()))
    }
}
