//! HTTP API request/response types.
//!
//! # Purpose
//! Defines the payload shapes for the character REST API and OpenAPI schema
//! generation. Request bodies are strict: unknown fields are rejected at
//! parse time rather than silently ignored.
use crate::model::{CharacterRecord, ItemStack};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
#[serde(deny_unknown_fields)]
pub struct CreateCharacterRequest {
    pub name: String,
}

/// Body shape shared by get and delete: the character's document id.
#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
#[serde(deny_unknown_fields)]
pub struct CharacterIdRequest {
    pub id: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateInventoryRequest {
    pub id: String,
    pub new_item: ItemStack,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CharacterCreatedResponse {
    pub status: String,
    pub message: String,
    pub data: CharacterRecord,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CharacterListResponse {
    pub data: Vec<CharacterRecord>,
}

/// `data` is `null` when the character does not exist; absence is not an
/// error for reads.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CharacterResponse {
    pub data: Option<CharacterRecord>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct InventoryUpdatedResponse {
    pub message: String,
    pub data: Vec<ItemStack>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CharacterDeletedResponse {
    pub message: String,
    pub data: DeleteAck,
}

/// Opaque delete acknowledgement: the store's delete is idempotent and does
/// not report whether the id existed.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DeleteAck {
    pub id: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthStatus {
    pub status: String,
}
