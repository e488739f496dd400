//! Identity model and the request authentication gate.
//!
//! # Purpose and responsibility
//! Defines the verified identity handed to handlers, the verifier seam the
//! app state carries, and the middleware that rejects unauthenticated
//! requests before any handler logic runs.
//!
//! # Key invariants and assumptions
//! - Every data route sits behind [`require_identity`]; a request that
//!   reaches a handler always carries an [`Identity`] extension.
//! - A rejected credential never touches the store: the gate short-circuits
//!   with a 401 before the handler executes.
//!
//! # Security considerations
//! - Verification failures are logged at debug with the error kind only;
//!   token contents are never logged.
use crate::api::error::api_unauthorized;
use crate::app::AppState;
use async_trait::async_trait;
use axum::extract::{Request, State};
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

/// The verified caller: the identity provider's subject id.
#[derive(Debug, Clone)]
pub struct Identity {
    pub uid: String,
}

/// Errors produced while verifying a bearer credential.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("missing bearer credential")]
    MissingCredential,
    #[error("malformed credential")]
    MalformedCredential,
    #[error("unsupported algorithm")]
    UnsupportedAlgorithm,
    #[error("missing key id")]
    MissingKeyId,
    #[error("no key published for the credential's key id")]
    UnknownKey,
    #[error("invalid claim: {0}")]
    InvalidClaim(String),
    #[error("token rejected: {0}")]
    InvalidToken(#[from] jsonwebtoken::errors::Error),
    #[error("key set fetch failed: {0}")]
    Http(#[from] reqwest::Error),
}

/// Verifies a bearer credential and produces the caller's identity.
///
/// Injected as a trait object so tests can substitute a stub without any
/// key material or network access.
#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> Result<Identity, AuthError>;
}

/// Pull the token out of the `Authorization: Bearer ...` header.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(axum::http::header::AUTHORIZATION)?;
    let value = value.to_str().ok()?;
    value.strip_prefix("Bearer ")
}

/// Authentication middleware for the data routes.
///
/// On success the verified [`Identity`] is inserted into the request
/// extensions for handlers to consume; on failure the request is answered
/// with `401 {error}` and the handler never runs.
pub async fn require_identity(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let Some(token) = bearer_token(request.headers()).map(str::to_owned) else {
        return api_unauthorized("missing bearer token").into_response();
    };
    match state.verifier.verify(&token).await {
        Ok(identity) => {
            request.extensions_mut().insert(identity);
            next.run(request).await
        }
        Err(err) => {
            tracing::debug!(error = %err, "rejected bearer token");
            api_unauthorized("invalid bearer token").into_response()
        }
    }
}
