//! In-memory implementation of the character store.
//!
//! # Purpose
//! This store implements the `CharacterStore` trait entirely in memory using
//! `HashMap`s guarded by `tokio::sync::RwLock`. It exists for:
//! - local development and tests (no external dependencies)
//! - deployments where durability is not required
//!
//! # Durability and consistency
//! - **Not durable**: all state is lost on process restart.
//! - **Single-process consistency**: reads take the read lock, mutations the
//!   write lock. `update_inventory` holds the write lock across its whole
//!   read-merge-write, so two concurrent updates to the same character
//!   cannot lose each other's delta.
//!
//! # Metrics
//! This store updates a small set of gauges/counters to keep observability
//! behavior consistent with the remote backend.
use super::{CharacterStore, StoreError, StoreResult};
use crate::model::inventory::merge_stack;
use crate::model::{Character, CharacterRecord, ItemStack};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// One user's namespace: the `timeChanged` stamp plus the character
/// documents keyed by their store-assigned id.
#[derive(Debug)]
struct UserDoc {
    time_changed: DateTime<Utc>,
    characters: HashMap<String, Character>,
}

/// In-memory character store.
///
/// The map is wrapped in `Arc<RwLock<...>>` so the store can be cloned and
/// shared across async request handlers; reads proceed concurrently and
/// writes are serialized to preserve invariants.
pub struct InMemoryStore {
    users: Arc<RwLock<HashMap<String, UserDoc>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            users: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    #[cfg(test)]
    async fn time_changed(&self, uid: &str) -> Option<DateTime<Utc>> {
        self.users.read().await.get(uid).map(|doc| doc.time_changed)
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CharacterStore for InMemoryStore {
    async fn create_character(&self, uid: &str, name: &str) -> StoreResult<CharacterRecord> {
        let mut users = self.users.write().await;
        // The user document's stamp moves on every create, including repeat
        // creates for the same user.
        let user = users.entry(uid.to_string()).or_insert_with(|| UserDoc {
            time_changed: Utc::now(),
            characters: HashMap::new(),
        });
        user.time_changed = Utc::now();

        let id = Uuid::new_v4().to_string();
        let character = Character::new(name);
        user.characters.insert(id.clone(), character.clone());
        metrics::counter!("roster_character_changes_total", "op" => "created").increment(1);
        metrics::gauge!("roster_characters_total").increment(1.0);
        Ok(CharacterRecord::from_character(id, character))
    }

    async fn list_characters(&self, uid: &str) -> StoreResult<Vec<CharacterRecord>> {
        let users = self.users.read().await;
        let records = users
            .get(uid)
            .map(|user| {
                user.characters
                    .iter()
                    .map(|(id, character)| {
                        CharacterRecord::from_character(id.clone(), character.clone())
                    })
                    .collect()
            })
            .unwrap_or_default();
        Ok(records)
    }

    async fn get_character(&self, uid: &str, id: &str) -> StoreResult<Option<CharacterRecord>> {
        let users = self.users.read().await;
        let record = users.get(uid).and_then(|user| {
            user.characters
                .get(id)
                .map(|character| CharacterRecord::from_character(id.to_string(), character.clone()))
        });
        Ok(record)
    }

    async fn update_inventory(
        &self,
        uid: &str,
        id: &str,
        delta: ItemStack,
    ) -> StoreResult<Vec<ItemStack>> {
        // Read-merge-write under one write lock; concurrent updates to the
        // same character serialize here instead of losing deltas.
        let mut users = self.users.write().await;
        let character = users
            .get_mut(uid)
            .and_then(|user| user.characters.get_mut(id))
            .ok_or_else(|| StoreError::NotFound("character".into()))?;
        merge_stack(&mut character.inventory, delta);
        metrics::counter!("roster_inventory_updates_total").increment(1);
        Ok(character.inventory.clone())
    }

    async fn delete_character(&self, uid: &str, id: &str) -> StoreResult<()> {
        let mut users = self.users.write().await;
        if let Some(user) = users.get_mut(uid) {
            if user.characters.remove(id).is_some() {
                metrics::counter!("roster_character_changes_total", "op" => "deleted").increment(1);
                metrics::gauge!("roster_characters_total").decrement(1.0);
            }
        }
        // Idempotent: an absent id (or user) is still a successful delete.
        Ok(())
    }

    async fn health_check(&self) -> StoreResult<()> {
        // In-memory backend is always "healthy" if the process is running.
        Ok(())
    }

    fn is_durable(&self) -> bool {
        false
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
