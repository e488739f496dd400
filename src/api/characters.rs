//! Character API handlers.
//!
//! # Purpose
//! Implements the five character operations as linear pipelines: the auth
//! gate has already run, so each handler pulls the verified identity from
//! request extensions, calls the matching store operation, and maps the
//! result into the response envelope.
use crate::api::error::{api_internal, store_error, ApiError};
use crate::api::types::{
    CharacterCreatedResponse, CharacterDeletedResponse, CharacterIdRequest, CharacterListResponse,
    CharacterResponse, CreateCharacterRequest, DeleteAck, InventoryUpdatedResponse,
    UpdateInventoryRequest,
};
use crate::app::AppState;
use crate::auth::Identity;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::{Extension, Json};

#[utoipa::path(
    post,
    path = "/createCharacter",
    tag = "characters",
    request_body = CreateCharacterRequest,
    responses(
        (status = 201, description = "Character created", body = CharacterCreatedResponse),
        (status = 401, description = "Missing or invalid credential", body = crate::api::types::ErrorResponse),
        (status = 500, description = "Store failure", body = crate::api::types::ErrorResponse)
    )
)]
pub(crate) async fn create_character(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Json(body): Json<CreateCharacterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let record = state
        .store
        .create_character(&identity.uid, &body.name)
        .await
        .map_err(|err| api_internal("failed to create character", &err))?;
    tracing::info!(uid = %identity.uid, id = %record.id, "created character");
    Ok((
        StatusCode::CREATED,
        Json(CharacterCreatedResponse {
            status: "created".to_string(),
            message: "Created new character".to_string(),
            data: record,
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/getAllCharacters",
    tag = "characters",
    responses(
        (status = 200, description = "All of the caller's characters", body = CharacterListResponse),
        (status = 401, description = "Missing or invalid credential", body = crate::api::types::ErrorResponse),
        (status = 500, description = "Store failure", body = crate::api::types::ErrorResponse)
    )
)]
pub(crate) async fn get_all_characters(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> Result<Json<CharacterListResponse>, ApiError> {
    let data = state
        .store
        .list_characters(&identity.uid)
        .await
        .map_err(|err| api_internal("failed to list characters", &err))?;
    Ok(Json(CharacterListResponse { data }))
}

#[utoipa::path(
    post,
    path = "/getCharacter",
    tag = "characters",
    request_body = CharacterIdRequest,
    responses(
        (status = 200, description = "The character, or null data when absent", body = CharacterResponse),
        (status = 401, description = "Missing or invalid credential", body = crate::api::types::ErrorResponse),
        (status = 500, description = "Store failure", body = crate::api::types::ErrorResponse)
    )
)]
pub(crate) async fn get_character(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Json(body): Json<CharacterIdRequest>,
) -> Result<Json<CharacterResponse>, ApiError> {
    // Absence is not an error here: a deleted character reads as null data.
    let data = state
        .store
        .get_character(&identity.uid, &body.id)
        .await
        .map_err(|err| api_internal("failed to get character", &err))?;
    Ok(Json(CharacterResponse { data }))
}

#[utoipa::path(
    post,
    path = "/updateInventory",
    tag = "characters",
    request_body = UpdateInventoryRequest,
    responses(
        (status = 200, description = "Inventory after the merge", body = InventoryUpdatedResponse),
        (status = 401, description = "Missing or invalid credential", body = crate::api::types::ErrorResponse),
        (status = 404, description = "Character absent or malformed", body = crate::api::types::ErrorResponse),
        (status = 500, description = "Store failure", body = crate::api::types::ErrorResponse)
    )
)]
pub(crate) async fn update_inventory(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Json(body): Json<UpdateInventoryRequest>,
) -> Result<Json<InventoryUpdatedResponse>, ApiError> {
    let inventory = state
        .store
        .update_inventory(&identity.uid, &body.id, body.new_item)
        .await
        .map_err(|err| store_error("failed to update inventory", err))?;
    Ok(Json(InventoryUpdatedResponse {
        message: "Updated inventory".to_string(),
        data: inventory,
    }))
}

#[utoipa::path(
    delete,
    path = "/deleteCharacter",
    tag = "characters",
    request_body = CharacterIdRequest,
    responses(
        (status = 200, description = "Delete acknowledged (idempotent)", body = CharacterDeletedResponse),
        (status = 401, description = "Missing or invalid credential", body = crate::api::types::ErrorResponse),
        (status = 500, description = "Store failure", body = crate::api::types::ErrorResponse)
    )
)]
pub(crate) async fn delete_character(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Json(body): Json<CharacterIdRequest>,
) -> Result<Json<CharacterDeletedResponse>, ApiError> {
    state
        .store
        .delete_character(&identity.uid, &body.id)
        .await
        .map_err(|err| api_internal("failed to delete character", &err))?;
    tracing::info!(uid = %identity.uid, id = %body.id, "deleted character");
    Ok(Json(CharacterDeletedResponse {
        message: "Deleted character".to_string(),
        data: DeleteAck { id: body.id },
    }))
}
