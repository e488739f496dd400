//! Roster HTTP service entry point.
//!
//! # Purpose
//! Wires configuration, storage, the token verifier, and the HTTP router,
//! then starts the API server with graceful shutdown.
//!
//! # Notes
//! The `build_state` helper keeps wiring testable and minimizes main setup
//! logic.
use anyhow::Context;
use roster::app::{build_router, AppState};
use roster::auth::JwksVerifier;
use roster::config::{RosterConfig, StoreBackend};
use roster::observability;
use roster::store::memory::InMemoryStore;
use roster::store::remote::{RemoteStore, RemoteStoreConfig};
use roster::store::CharacterStore;
use std::future::Future;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = RosterConfig::from_env_or_yaml().context("roster config")?;
    run_with_shutdown(config, async {
        let _ = tokio::signal::ctrl_c().await;
    })
    .await
}

async fn run_with_shutdown<F>(config: RosterConfig, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let metrics_handle = observability::init_observability("roster");
    let state = build_state(&config)?;
    tracing::info!(
        backend = state.store.backend_name(),
        durable = state.store.is_durable(),
        "character store ready"
    );
    let metrics_task = tokio::spawn(observability::serve_metrics(
        metrics_handle,
        config.metrics_bind,
    ));

    let app = build_router(state);
    let addr = config.bind_addr;
    tracing::info!(%addr, "roster listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tokio::pin!(shutdown);
    tokio::select! {
        result = axum::serve(listener, app.into_make_service()) => {
            result?;
        }
        _ = &mut shutdown => {}
    }

    metrics_task.abort();
    let _ = metrics_task.await;
    Ok(())
}

fn build_state(config: &RosterConfig) -> anyhow::Result<AppState> {
    let store: Arc<dyn CharacterStore> = match config.store {
        StoreBackend::Memory => Arc::new(InMemoryStore::new()),
        StoreBackend::Remote => {
            let url = config
                .store_url
                .as_ref()
                .context("remote store configuration missing: set ROSTER_STORE_URL")?;
            Arc::new(RemoteStore::new(&RemoteStoreConfig::new(url.clone()))?)
        }
    };
    let verifier = JwksVerifier::new(
        config.auth.issuer.clone(),
        config.auth.audience.clone(),
        config.auth.jwks_url.clone(),
    );
    Ok(AppState {
        store,
        verifier: Arc::new(verifier),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use roster::config::AuthConfig;
    use serial_test::serial;

    fn test_config(store: StoreBackend, store_url: Option<&str>) -> RosterConfig {
        RosterConfig {
            bind_addr: "127.0.0.1:0".parse().expect("bind"),
            metrics_bind: "127.0.0.1:0".parse().expect("metrics"),
            store,
            store_url: store_url.map(str::to_string),
            auth: AuthConfig {
                issuer: "https://issuer.example".to_string(),
                audience: "roster".to_string(),
                jwks_url: "https://issuer.example/jwks.json".to_string(),
            },
        }
    }

    #[tokio::test]
    async fn build_state_memory_backend() {
        let state = build_state(&test_config(StoreBackend::Memory, None)).expect("state");
        assert_eq!(state.store.backend_name(), "memory");
        assert!(!state.store.is_durable());
    }

    #[tokio::test]
    async fn build_state_remote_requires_url() {
        let err = build_state(&test_config(StoreBackend::Remote, None))
            .err()
            .expect("missing store url");
        assert!(err.to_string().contains("ROSTER_STORE_URL"));
    }

    #[tokio::test]
    async fn build_state_remote_with_url() {
        let state = build_state(&test_config(
            StoreBackend::Remote,
            Some("http://docs.internal"),
        ))
        .expect("state");
        assert_eq!(state.store.backend_name(), "remote");
        assert!(state.store.is_durable());
    }

    #[tokio::test]
    #[serial]
    async fn run_with_shutdown_starts_and_stops() {
        run_with_shutdown(test_config(StoreBackend::Memory, None), async {
            tokio::time::sleep(std::time::Duration::from_millis(100)).await;
        })
        .await
        .expect("run should stop cleanly");
    }
}
