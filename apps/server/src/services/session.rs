//! Identity-provider session token verification.
//!
//! Verifies session JWTs minted by the hosted identity provider using the
//! provider's JWKS.
//!
//! Security features:
//! - RS256 signature verification (algorithm pinned, no fallback)
//! - JWKS cached with TTL + automatic retry on key rotation (kid miss)
//! - HTTP timeouts on JWKS fetch to prevent hanging
//! - JWKS URL derived from the configured issuer
//! - Generic error messages to clients; details logged server-side
//! - Audience validation warned if not configured

use std::sync::Arc;
use std::time::{Duration, Instant};

use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use secrecy::{ExposeSecret, SecretString};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::config::SessionSettings;
use crate::models::{AuthenticatedUser, SessionClaims};

/// JWKS cache TTL (24 hours).
const JWKS_CACHE_TTL: Duration = Duration::from_secs(86400);

/// HTTP connect timeout for JWKS fetch.
const JWKS_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// HTTP total timeout for JWKS fetch.
const JWKS_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Cached JWKS keys.
struct CachedKeys {
    keys: Vec<(String, DecodingKey)>,
    fetched_at: Instant,
}

/// Session token verifier backed by the identity provider's JWKS.
#[derive(Clone)]
pub struct SessionVerifier {
    issuer: String,
    jwks_url: String,
    audience: Option<String>,
    jwks_cache: Arc<RwLock<Option<CachedKeys>>>,
    http_client: reqwest::Client,
}

/// JWKS response from the identity provider.
#[derive(serde::Deserialize)]
struct JwksResponse {
    keys: Vec<serde_json::Value>,
}

impl SessionVerifier {
    /// Create a new verifier from settings.
    pub fn new(settings: &SessionSettings) -> Self {
        // Derive JWKS URL from issuer
        let jwks_url = format!(
            "{}/.well-known/jwks.json",
            settings.issuer.trim_end_matches('/')
        );

        // Warn if audience is not configured
        if settings.audience.is_none() {
            warn!(
                "CG_SESSION_AUDIENCE is not set. \
                 Without audience validation, session tokens minted for other \
                 applications on the same identity provider could be replayed \
                 against this server."
            );
        }

        // Build HTTP client with timeouts
        let http_client = reqwest::Client::builder()
            .connect_timeout(JWKS_CONNECT_TIMEOUT)
            .timeout(JWKS_REQUEST_TIMEOUT)
            .build()
            .expect("Failed to build HTTP client for session verification");

        info!(
            "Session verifier initialized (issuer={}, jwks_url={}, audience={:?})",
            settings.issuer, jwks_url, settings.audience
        );

        Self {
            issuer: settings.issuer.clone(),
            jwks_url,
            audience: settings.audience.clone(),
            jwks_cache: Arc::new(RwLock::new(None)),
            http_client,
        }
    }

    /// Verify a session token and return the authenticated user.
    ///
    /// On failure, returns a generic error string safe for the client.
    /// Detailed errors are logged server-side.
    pub async fn verify_token(&self, token: &SecretString) -> Result<AuthenticatedUser, String> {
        // Decode header to get key ID (the header is not secret)
        let header = decode_header(token.expose_secret()).map_err(|e| {
            warn!("Session: invalid JWT header: {}", e);
            "Invalid session token".to_string()
        })?;
        let kid = header.kid.ok_or_else(|| {
            warn!("Session: JWT missing 'kid' header");
            "Invalid session token".to_string()
        })?;

        // Find the decoding key, retrying JWKS fetch on kid miss
        let decoding_key = self.find_key_with_retry(&kid).await.map_err(|e| {
            warn!("Session: key lookup failed for kid '{}': {}", kid, e);
            "Authentication failed".to_string()
        })?;

        // Build validation
        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_issuer(&[&self.issuer]);
        if let Some(ref aud) = self.audience {
            validation.set_audience(&[aud]);
        } else {
            validation.validate_aud = false;
        }

        // Verify and decode
        let token_data = decode::<SessionClaims>(token.expose_secret(), &decoding_key, &validation)
            .map_err(|e| {
                warn!("Session: JWT verification failed: {}", e);
                "Authentication failed".to_string()
            })?;

        let claims = token_data.claims;

        debug!("Session token verified: sub={}", claims.sub);

        Ok(AuthenticatedUser::from(claims))
    }

    /// Find a decoding key by kid. On miss, force a JWKS refresh and retry once.
    async fn find_key_with_retry(&self, kid: &str) -> Result<DecodingKey, String> {
        // First attempt: use cached keys
        let keys = self.get_or_fetch_keys(false).await?;
        if let Some((_, key)) = keys.iter().find(|(k, _)| k == kid) {
            return Ok(key.clone());
        }

        // Kid not found — force refresh (key rotation may have occurred)
        info!(
            "Session: kid '{}' not in cache, forcing JWKS refresh for key rotation",
            kid
        );
        let keys = self.get_or_fetch_keys(true).await?;
        keys.iter()
            .find(|(k, _)| k == kid)
            .map(|(_, key)| key.clone())
            .ok_or_else(|| format!("Unknown key ID '{}' after JWKS refresh", kid))
    }

    /// Get cached JWKS keys or fetch from the provider. If `force_refresh`
    /// is true, skip the cache.
    async fn get_or_fetch_keys(
        &self,
        force_refresh: bool,
    ) -> Result<Vec<(String, DecodingKey)>, String> {
        if !force_refresh {
            let cache = self.jwks_cache.read().await;
            if let Some(ref cached) = *cache {
                if cached.fetched_at.elapsed() < JWKS_CACHE_TTL {
                    return Ok(cached.keys.clone());
                }
            }
        }

        // Try to fetch new keys
        match self.fetch_jwks().await {
            Ok(keys) => {
                let mut cache = self.jwks_cache.write().await;
                *cache = Some(CachedKeys {
                    keys: keys.clone(),
                    fetched_at: Instant::now(),
                });
                Ok(keys)
            }
            Err(e) => {
                // If we have stale cached keys and this isn't a forced refresh, use them
                if !force_refresh {
                    let cache = self.jwks_cache.read().await;
                    if let Some(ref cached) = *cache {
                        warn!("Failed to refresh JWKS, using stale cache: {}", e);
                        return Ok(cached.keys.clone());
                    }
                }
                Err(e)
            }
        }
    }

    /// Fetch JWKS from the identity provider (derived from issuer URL).
    async fn fetch_jwks(&self) -> Result<Vec<(String, DecodingKey)>, String> {
        info!("Fetching session JWKS from {}", self.jwks_url);

        let response: JwksResponse = self
            .http_client
            .get(&self.jwks_url)
            .send()
            .await
            .map_err(|e| format!("Failed to fetch JWKS: {}", e))?
            .json()
            .await
            .map_err(|e| format!("Failed to parse JWKS response: {}", e))?;

        let mut keys = Vec::new();
        for jwk_value in &response.keys {
            let jwk: jsonwebtoken::jwk::Jwk = match serde_json::from_value(jwk_value.clone()) {
                Ok(j) => j,
                Err(e) => {
                    warn!("Failed to parse JWK: {}", e);
                    continue;
                }
            };

            if let Some(ref kid) = jwk.common.key_id {
                match DecodingKey::from_jwk(&jwk) {
                    Ok(key) => keys.push((kid.clone(), key)),
                    Err(e) => warn!("Failed to create decoding key from JWK {}: {}", kid, e),
                }
            }
        }

        info!("Loaded {} JWKS keys from identity provider", keys.len());
        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SessionSettings;

    #[test]
    fn test_jwks_url_derived_from_issuer() {
        let verifier = SessionVerifier::new(&SessionSettings {
            issuer: "https://sessions.example.com/".to_string(),
            audience: None,
        });

        assert_eq!(
            verifier.jwks_url,
            "https://sessions.example.com/.well-known/jwks.json"
        );
    }

    #[tokio::test]
    async fn test_garbage_token_is_rejected() {
        let verifier = SessionVerifier::new(&SessionSettings {
            issuer: "https://sessions.example.com".to_string(),
            audience: None,
        });

        let err = verifier
            .verify_token(&SecretString::from("not-a-jwt"))
            .await
            .unwrap_err();
        assert_eq!(err, "Invalid session token");
    }
}
