//! Character storage abstraction.
//!
//! # Purpose
//! Defines the `CharacterStore` trait implemented by the in-memory backend
//! (dev/tests) and the remote document-store client, plus the error type
//! shared by both.
use crate::model::{CharacterRecord, ItemStack};
use async_trait::async_trait;
use thiserror::Error;

pub mod memory;
pub mod remote;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error(transparent)]
    Unavailable(#[from] anyhow::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Storage operations, all scoped to the calling user's namespace
/// (`users/{uid}/characters`).
///
/// The store does not retry; transient failures surface as
/// [`StoreError::Unavailable`] and callers map them to responses as-is.
#[async_trait]
pub trait CharacterStore: Send + Sync {
    /// Touch the user document's `timeChanged` (creating the user namespace
    /// if absent), then create a character with `level = 1` and an empty
    /// inventory. Returns the record including its generated id.
    async fn create_character(&self, uid: &str, name: &str) -> StoreResult<CharacterRecord>;

    /// All characters under the user, in store order (unspecified).
    async fn list_characters(&self, uid: &str) -> StoreResult<Vec<CharacterRecord>>;

    /// One character by id; `None` when absent. Absence is not an error at
    /// this layer.
    async fn get_character(&self, uid: &str, id: &str) -> StoreResult<Option<CharacterRecord>>;

    /// Merge `delta` into the character's inventory and write the result
    /// back, returning the resulting inventory.
    ///
    /// Fails with [`StoreError::NotFound`] when the character is absent or
    /// its stored document carries no inventory field.
    async fn update_inventory(
        &self,
        uid: &str,
        id: &str,
        delta: ItemStack,
    ) -> StoreResult<Vec<ItemStack>>;

    /// Delete the character. Idempotent: deleting an absent id succeeds.
    async fn delete_character(&self, uid: &str, id: &str) -> StoreResult<()>;

    async fn health_check(&self) -> StoreResult<()>;
    fn is_durable(&self) -> bool;
    fn backend_name(&self) -> &'static str;
}
