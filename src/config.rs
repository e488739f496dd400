//! Service configuration sourced from environment variables, with an
//! optional YAML override file for deployments that prefer config files.
use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::fs;
use std::net::SocketAddr;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Memory,
    Remote,
}

impl FromStr for StoreBackend {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self> {
        match value {
            "memory" => Ok(Self::Memory),
            "remote" => Ok(Self::Remote),
            other => bail!("unknown store backend: {other}"),
        }
    }
}

/// Identity provider settings for the bearer token gate.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub issuer: String,
    pub audience: String,
    pub jwks_url: String,
}

#[derive(Debug, Clone)]
pub struct RosterConfig {
    pub bind_addr: SocketAddr,
    pub metrics_bind: SocketAddr,
    pub store: StoreBackend,
    /// Document store root; required when `store` is `remote`.
    pub store_url: Option<String>,
    pub auth: AuthConfig,
}

#[derive(Debug, Deserialize)]
struct RosterConfigOverride {
    bind_addr: Option<String>,
    metrics_bind: Option<String>,
    store: Option<String>,
    store_url: Option<String>,
    auth_issuer: Option<String>,
    auth_audience: Option<String>,
    auth_jwks_url: Option<String>,
}

fn required(name: &'static str) -> Result<String> {
    std::env::var(name).with_context(|| format!("{name} is required"))
}

impl RosterConfig {
    pub fn from_env() -> Result<Self> {
        let bind_addr = std::env::var("ROSTER_BIND")
            .unwrap_or_else(|_| "0.0.0.0:8080".to_string())
            .parse()
            .with_context(|| "parse ROSTER_BIND")?;
        let metrics_bind = std::env::var("ROSTER_METRICS_BIND")
            .unwrap_or_else(|_| "0.0.0.0:9464".to_string())
            .parse()
            .with_context(|| "parse ROSTER_METRICS_BIND")?;
        let store = std::env::var("ROSTER_STORE")
            .unwrap_or_else(|_| "memory".to_string())
            .parse()
            .with_context(|| "parse ROSTER_STORE")?;
        let store_url = std::env::var("ROSTER_STORE_URL").ok();
        let auth = AuthConfig {
            issuer: required("ROSTER_AUTH_ISSUER")?,
            audience: required("ROSTER_AUTH_AUDIENCE")?,
            jwks_url: required("ROSTER_AUTH_JWKS_URL")?,
        };
        Ok(Self {
            bind_addr,
            metrics_bind,
            store,
            store_url,
            auth,
        })
    }

    pub fn from_env_or_yaml() -> Result<Self> {
        let mut config = Self::from_env()?;
        if let Ok(path) = std::env::var("ROSTER_CONFIG") {
            let contents =
                fs::read_to_string(&path).with_context(|| format!("read ROSTER_CONFIG: {path}"))?;
            let override_cfg: RosterConfigOverride =
                serde_yaml::from_str(&contents).with_context(|| "parse roster config yaml")?;
            if let Some(value) = override_cfg.bind_addr {
                config.bind_addr = value.parse().with_context(|| "parse bind_addr")?;
            }
            if let Some(value) = override_cfg.metrics_bind {
                config.metrics_bind = value.parse().with_context(|| "parse metrics_bind")?;
            }
            if let Some(value) = override_cfg.store {
                config.store = value.parse()?;
            }
            if let Some(value) = override_cfg.store_url {
                config.store_url = Some(value);
            }
            if let Some(value) = override_cfg.auth_issuer {
                config.auth.issuer = value;
            }
            if let Some(value) = override_cfg.auth_audience {
                config.auth.audience = value;
            }
            if let Some(value) = override_cfg.auth_jwks_url {
                config.auth.jwks_url = value;
            }
        }
        Ok(config)
    }
}
