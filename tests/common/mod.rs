use async_trait::async_trait;
use roster::app::AppState;
use roster::auth::{AuthError, Identity, IdentityVerifier};
use roster::store::memory::InMemoryStore;
use roster::store::CharacterStore;
use std::sync::Arc;

/// Verifier double for router tests: the bearer token is taken verbatim as
/// the uid, and the literal token "reject-me" is refused so the gate's
/// failure path can be driven without key material.
pub struct TrustedVerifier;

#[async_trait]
impl IdentityVerifier for TrustedVerifier {
    async fn verify(&self, token: &str) -> Result<Identity, AuthError> {
        if token == "reject-me" {
            return Err(AuthError::MalformedCredential);
        }
        Ok(Identity {
            uid: token.to_string(),
        })
    }
}

pub fn memory_state() -> AppState {
    state_with_store(Arc::new(InMemoryStore::new()))
}

pub fn state_with_store(store: Arc<dyn CharacterStore>) -> AppState {
    AppState {
        store,
        verifier: Arc::new(TrustedVerifier),
    }
}

pub async fn read_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    serde_json::from_slice(&bytes).expect("json")
}
