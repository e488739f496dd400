//! HTTP application wiring.
//!
//! # Purpose
//! Builds the axum router, applies the auth gate and trace middleware, and
//! defines the shared application state injected into handlers.
//!
//! # Notes
//! State is constructed explicitly (no module-level singletons): the store
//! and verifier are trait objects owned by `AppState`, so tests can swap in
//! doubles and the lifecycle is tied to process start/stop.
use crate::api;
use crate::auth::{self, IdentityVerifier};
use crate::observability;
use crate::store::CharacterStore;
use axum::middleware;
use axum::routing::{delete, get, post};
use axum::Router;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing_opentelemetry::OpenTelemetrySpanExt;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn CharacterStore>,
    pub verifier: Arc<dyn IdentityVerifier>,
}

pub fn build_router(state: AppState) -> Router {
    let trace_layer =
        TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
            let parent = observability::trace_context_from_headers(request.headers());
            let span = tracing::info_span!(
                "http.request",
                method = %request.method(),
                uri = %request.uri(),
                version = ?request.version()
            );
            span.set_parent(parent);
            span
        });

    // Every data route sits behind the identity gate; only the health probe
    // and the OpenAPI document are reachable without a credential.
    let gated = Router::new()
        .route("/createCharacter", post(api::characters::create_character))
        .route(
            "/getAllCharacters",
            get(api::characters::get_all_characters),
        )
        .route("/getCharacter", post(api::characters::get_character))
        .route("/updateInventory", post(api::characters::update_inventory))
        .route(
            "/deleteCharacter",
            delete(api::characters::delete_character),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_identity,
        ));

    Router::new()
        .merge(gated)
        .route("/healthz", get(api::system::health))
        .route("/openapi.json", get(api::openapi::openapi_json))
        .layer(trace_layer)
        .with_state(state)
}
