//! OpenAPI schema aggregation for the character API.
//!
//! # Purpose
//! Collects all routes and schema types into a single OpenAPI document,
//! served at `/openapi.json` for docs and client generation.
use crate::api::{
    characters, system,
    types::{
        CharacterCreatedResponse, CharacterDeletedResponse, CharacterIdRequest,
        CharacterListResponse, CharacterResponse, CreateCharacterRequest, DeleteAck,
        ErrorResponse, HealthStatus, InventoryUpdatedResponse, UpdateInventoryRequest,
    },
};
use crate::model::{Character, CharacterRecord, ItemStack};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "roster",
        version = "v1",
        description = "Character and inventory HTTP API"
    ),
    paths(
        system::health,
        characters::create_character,
        characters::get_all_characters,
        characters::get_character,
        characters::update_inventory,
        characters::delete_character,
    ),
    components(schemas(
        Character,
        CharacterRecord,
        ItemStack,
        CreateCharacterRequest,
        CharacterIdRequest,
        UpdateInventoryRequest,
        CharacterCreatedResponse,
        CharacterListResponse,
        CharacterResponse,
        InventoryUpdatedResponse,
        CharacterDeletedResponse,
        DeleteAck,
        ErrorResponse,
        HealthStatus,
    ))
)]
pub struct ApiDoc;

pub(crate) async fn openapi_json() -> axum::Json<utoipa::openapi::OpenApi> {
    axum::Json(ApiDoc::openapi())
}
