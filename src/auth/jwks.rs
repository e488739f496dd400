//! Bearer token verification against the identity provider's JWKS.
//!
//! # Purpose
//! Validate inbound bearer JWTs against the identity provider's published
//! key set, fetched over HTTP and cached with a TTL.
//!
//! # Architectural role
//! This is the boundary between external credentials and the service: every
//! data request passes through [`JwksVerifier::verify`] (via the gate in
//! `auth::identity`) before any handler logic runs.
//!
//! # Key invariants
//! - Only configured algorithms are accepted (RS256 by default; the
//!   identity provider signs its tokens with RSA).
//! - Issuer and audience claims are validated against configuration, and
//!   `exp` is enforced with a bounded clock-skew leeway.
//! - The JWKS cache is time-bounded; a `kid` that is not in the cached set
//!   triggers exactly one refetch to pick up key rotation.
//!
//! # Concurrency model
//! The cache lives in a `DashMap` shared across async tasks; concurrent
//! verifications never block each other on a global lock.
use crate::auth::identity::{AuthError, Identity, IdentityVerifier};
use async_trait::async_trait;
use dashmap::DashMap;
use jsonwebtoken::jwk::JwkSet;
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Verifier for identity-provider bearer tokens with a cached JWKS.
#[derive(Debug, Clone)]
pub struct JwksVerifier {
    client: reqwest::Client,
    issuer: String,
    audience: String,
    jwks_url: String,
    allowed_algorithms: Vec<Algorithm>,
    cache: Arc<DashMap<String, CachedJwks>>,
    jwks_ttl: Duration,
    leeway_seconds: u64,
}

#[derive(Debug, Clone)]
struct CachedJwks {
    jwks: JwkSet,
    expires_at: Instant,
}

impl JwksVerifier {
    /// Build a verifier for one issuer/audience pair.
    ///
    /// Defaults: RS256 only, one-hour JWKS cache, 60 seconds of clock-skew
    /// leeway. Use [`JwksVerifier::with_algorithms`] and
    /// [`JwksVerifier::with_cache_ttl`] to adjust.
    pub fn new(
        issuer: impl Into<String>,
        audience: impl Into<String>,
        jwks_url: impl Into<String>,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            issuer: issuer.into(),
            audience: audience.into(),
            jwks_url: jwks_url.into(),
            allowed_algorithms: vec![Algorithm::RS256],
            cache: Arc::new(DashMap::new()),
            jwks_ttl: Duration::from_secs(3600),
            leeway_seconds: 60,
        }
    }

    pub fn with_algorithms(mut self, algorithms: Vec<Algorithm>) -> Self {
        self.allowed_algorithms = algorithms;
        self
    }

    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.jwks_ttl = ttl;
        self
    }

    async fn get_jwks(&self) -> Result<JwkSet, AuthError> {
        if let Some(entry) = self.cache.get(&self.jwks_url) {
            if entry.expires_at > Instant::now() {
                return Ok(entry.jwks.clone());
            }
        }
        self.refresh_jwks().await
    }

    async fn refresh_jwks(&self) -> Result<JwkSet, AuthError> {
        let jwks: JwkSet = self
            .client
            .get(&self.jwks_url)
            .send()
            .await?
            .json()
            .await?;
        self.cache.insert(
            self.jwks_url.clone(),
            CachedJwks {
                jwks: jwks.clone(),
                expires_at: Instant::now() + self.jwks_ttl,
            },
        );
        Ok(jwks)
    }
}

#[async_trait]
impl IdentityVerifier for JwksVerifier {
    async fn verify(&self, token: &str) -> Result<Identity, AuthError> {
        // Check the header algorithm before any network work; this also
        // rejects tokens minted for other services with other key types.
        let header = decode_header(token).map_err(|_| AuthError::MalformedCredential)?;
        if !self.allowed_algorithms.contains(&header.alg) {
            return Err(AuthError::UnsupportedAlgorithm);
        }
        let kid = header.kid.as_deref().ok_or(AuthError::MissingKeyId)?;

        // Resolve the signing key, refetching once on a miss so key
        // rotation does not lock callers out until the cache expires.
        let jwks = self.get_jwks().await?;
        let decoding_key = match find_jwk(&jwks, kid) {
            Some(key) => DecodingKey::from_jwk(key)?,
            None => {
                let refreshed = self.refresh_jwks().await?;
                let key = find_jwk(&refreshed, kid).ok_or(AuthError::UnknownKey)?;
                DecodingKey::from_jwk(key)?
            }
        };

        let mut validation = Validation::new(header.alg);
        validation.set_issuer(&[self.issuer.as_str()]);
        validation.set_audience(&[self.audience.as_str()]);
        validation
            .required_spec_claims
            .extend(["iss".to_string(), "aud".to_string(), "exp".to_string()]);
        validation.leeway = self.leeway_seconds;

        let token = decode::<serde_json::Value>(token, &decoding_key, &validation)?;
        let uid = token
            .claims
            .get("sub")
            .and_then(|value| value.as_str())
            .filter(|value| !value.is_empty())
            .ok_or_else(|| AuthError::InvalidClaim("sub".to_string()))?;
        Ok(Identity {
            uid: uid.to_string(),
        })
    }
}

fn find_jwk<'a>(jwks: &'a JwkSet, kid: &str) -> Option<&'a jsonwebtoken::jwk::Jwk> {
    jwks.keys
        .iter()
        .find(|key| key.common.key_id.as_deref() == Some(kid))
}
