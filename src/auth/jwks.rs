//! JWKS-backed JWT verification.
//!
//! The managed auth provider signs sessions with RS256; this cache keeps its
//! published keys in-process so verification never leaves the box on the hot
//! path. Refresh races are benign, concurrent writers install the same keys.

use anyhow::{Context, Result};
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Deserialize;

use super::Claims;

/// Floor between consecutive JWKS fetches, whatever the cache TTL says. An
/// unknown `kid` storm must not turn into a fetch storm.
const REFETCH_FLOOR: Duration = Duration::from_secs(1);

#[derive(Debug, Deserialize)]
struct JwksDocument {
    keys: Vec<Jwk>,
}

#[derive(Debug, Deserialize)]
struct Jwk {
    kid: String,
    kty: String,
    n: String,
    e: String,
}

struct KeyEntry {
    key: DecodingKey,
    fetched_at: Instant,
}

#[derive(Default)]
struct KeySet {
    by_kid: HashMap<String, KeyEntry>,
    last_fetch: Option<Instant>,
}

#[derive(Clone)]
pub struct JwksCache {
    keys: Arc<RwLock<KeySet>>,
    http: reqwest::Client,
    jwks_url: String,
    issuer: String,
    audience: String,
    ttl: Duration,
}

impl JwksCache {
    pub fn new(jwks_url: String, issuer: String, audience: String, ttl_seconds: u64) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_default();

        Self {
            keys: Arc::new(RwLock::new(KeySet::default())),
            http,
            jwks_url,
            issuer,
            audience,
            ttl: Duration::from_secs(ttl_seconds),
        }
    }

    /// Verify a session token and return its claims.
    pub async fn verify_token(&self, token: &str) -> Result<Claims> {
        let header = decode_header(token).context("Invalid JWT header")?;
        let kid = header.kid.context("JWT missing kid header")?;
        let key = self.key_for(&kid).await?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_issuer(&[&self.issuer]);
        validation.set_audience(&[&self.audience]);
        validation.validate_exp = true;
        validation.validate_nbf = true;

        let decoded = decode::<Claims>(token, &key, &validation).context("JWT validation failed")?;
        Ok(decoded.claims)
    }

    /// Fetch the key set ahead of the first request. Failure is tolerable;
    /// the first verification will fetch again.
    pub async fn warm_cache(&self) -> Result<()> {
        self.refresh().await
    }

    async fn key_for(&self, kid: &str) -> Result<DecodingKey> {
        if let Some(key) = self.fresh_key(kid) {
            return Ok(key);
        }

        self.refresh().await?;

        self.keys
            .read()
            .by_kid
            .get(kid)
            .map(|entry| entry.key.clone())
            .context("Key not found in JWKS")
    }

    fn fresh_key(&self, kid: &str) -> Option<DecodingKey> {
        let keys = self.keys.read();
        let entry = keys.by_kid.get(kid)?;
        (entry.fetched_at.elapsed() < self.ttl).then(|| entry.key.clone())
    }

    async fn refresh(&self) -> Result<()> {
        if let Some(last) = self.keys.read().last_fetch {
            if last.elapsed() < REFETCH_FLOOR {
                return Ok(());
            }
        }

        tracing::debug!(url = %self.jwks_url, "Fetching JWKS");

        let response = self
            .http
            .get(&self.jwks_url)
            .send()
            .await
            .context("Failed to fetch JWKS")?
            .error_for_status()
            .context("JWKS endpoint returned an error")?;

        let document: JwksDocument = response.json().await.context("Failed to parse JWKS")?;
        self.install(document);
        Ok(())
    }

    fn install(&self, document: JwksDocument) {
        let now = Instant::now();
        let mut keys = self.keys.write();
        keys.last_fetch = Some(now);

        for jwk in document.keys {
            if jwk.kty != "RSA" {
                continue;
            }
            match DecodingKey::from_rsa_components(&jwk.n, &jwk.e) {
                Ok(key) => {
                    keys.by_kid.insert(
                        jwk.kid,
                        KeyEntry {
                            key,
                            fetched_at: now,
                        },
                    );
                }
                Err(e) => {
                    tracing::warn!(kid = %jwk.kid, error = %e, "Skipping unparseable JWK");
                }
            }
        }

        tracing::info!(keys = keys.by_kid.len(), "JWKS cache refreshed");
    }
}
