// src/client.rs

use crate::config::{HttpDetails, KeySourceConfig};
use crate::error::{InspectorError, Result};
use crate::model::{discovery_url, parse_jwks, JsonWebKeySet, OidcDiscoveryDocument};
use moka::future::Cache;
use moka::Expiry;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument};
use url::Url;

/// Upper bound on discovery and JWKS response bodies.
pub const MAX_RESPONSE_BYTES: usize = 1024 * 1024;

const DISCOVERY_CONTEXT: &str = "Failed to fetch OpenID configuration";
const JWKS_CONTEXT: &str = "Failed to fetch JWKS";

/// A client for discovering and fetching JSON Web Key Sets from an OIDC provider.
#[derive(Clone)]
pub struct JwksClient {
    // The client is internally ref-counted to allow for cheap cloning.
    inner: Arc<Inner>,
}

struct Inner {
    http: HttpDetails,
    http_client: reqwest::Client,
    // Keyed by issuer or JWKS URL.
    jwks_cache: Cache<String, CachedJwks>,
}

#[derive(Clone)]
struct CachedJwks {
    jwks: Arc<JsonWebKeySet>,
    ttl: Duration,
}

/// Expires each cached key set after the TTL it was fetched with.
struct JwksExpiry;

impl Expiry<String, CachedJwks> for JwksExpiry {
    fn expire_after_create(&self, _key: &String, value: &CachedJwks, _created_at: Instant) -> Option<Duration> {
        Some(value.ttl)
    }
}

impl JwksClient {
    pub fn new(http: &HttpDetails) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(http.timeout)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let jwks_cache = Cache::builder()
            .max_capacity(64)
            .expire_after(JwksExpiry)
            .build();

        Ok(Self {
            inner: Arc::new(Inner {
                http: http.clone(),
                http_client,
                jwks_cache,
            }),
        })
    }

    /// Returns the key set for a key source, fetching it when it is not cached.
    ///
    /// Inline documents are parsed on every call and never cached.
    pub async fn resolve(&self, source: &KeySourceConfig) -> Result<Arc<JsonWebKeySet>> {
        match source {
            KeySourceConfig::Inline(text) => Ok(Arc::new(parse_jwks(text)?)),
            KeySourceConfig::JwksUri(uri) => {
                self.cached(uri.as_str(), || async { self.fetch_jwks_with_ttl(uri).await })
                    .await
            }
            KeySourceConfig::Discovery { issuer_url } => self.resolve_issuer(issuer_url).await,
        }
    }

    /// Discovers the issuer's JWKS URI and returns its key set, cached per issuer.
    #[instrument(skip(self, issuer), fields(issuer = %issuer), err)]
    pub async fn resolve_issuer(&self, issuer: &Url) -> Result<Arc<JsonWebKeySet>> {
        self.cached(issuer.as_str(), || async {
            let document = self.discover(issuer).await?;
            let jwks_uri = document.jwks_url()?;
            debug!("Discovered JWKS URI: {}", jwks_uri);
            self.fetch_jwks_with_ttl(&jwks_uri).await
        })
        .await
    }

    /// Fetches the issuer's OpenID configuration document.
    #[instrument(skip(self, issuer), fields(issuer = %issuer), err)]
    pub async fn discover(&self, issuer: &Url) -> Result<OidcDiscoveryDocument> {
        let url = discovery_url(issuer)?;
        debug!("Performing OIDC discovery at: {}", url);

        let (body, _) = self.get(url, DISCOVERY_CONTEXT).await?;
        serde_json::from_slice(&body).map_err(|e| InspectorError::InvalidDiscoveryDocument(e.to_string()))
    }

    /// Fetches and parses a JWKS document, bypassing the cache.
    pub async fn fetch_jwks(&self, uri: &Url) -> Result<JsonWebKeySet> {
        let (jwks, _) = self.fetch_jwks_with_ttl(uri).await?;
        Ok(jwks)
    }

    #[instrument(skip(self, uri), fields(uri = %uri), err)]
    async fn fetch_jwks_with_ttl(&self, uri: &Url) -> Result<(JsonWebKeySet, Duration)> {
        let (body, max_age) = self.get(uri.clone(), JWKS_CONTEXT).await?;
        let text = String::from_utf8(body)
            .map_err(|_| InspectorError::InvalidJwks("Invalid JWKS: response is not UTF-8".to_string()))?;
        let jwks = parse_jwks(&text)?;

        let ttl = max_age.unwrap_or(self.inner.http.cache_ttl);
        info!("Successfully fetched {} keys. Caching with TTL: {:?}", jwks.keys.len(), ttl);
        Ok((jwks, ttl))
    }

    /// Returns the cached key set for `key`, running `fetch` on a miss.
    ///
    /// Concurrent misses for the same key share a single fetch.
    async fn cached<F, Fut>(&self, key: &str, fetch: F) -> Result<Arc<JsonWebKeySet>>
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = Result<(JsonWebKeySet, Duration)>>,
    {
        let entry = self
            .inner
            .jwks_cache
            .try_get_with(key.to_string(), async {
                debug!("JWKS cache miss for {}. Fetching from provider.", key);
                let (jwks, ttl) = fetch().await?;
                Ok::<_, InspectorError>(CachedJwks {
                    jwks: Arc::new(jwks),
                    ttl,
                })
            })
            .await
            .map_err(|e| Arc::try_unwrap(e).unwrap_or_else(InspectorError::Shared))?;
        Ok(entry.jwks)
    }

    /// GETs a URL, rejecting non-success statuses and oversized bodies.
    /// Returns the body and the `Cache-Control: max-age`, if any.
    async fn get(&self, url: Url, context: &'static str) -> Result<(Vec<u8>, Option<Duration>)> {
        let mut response = self.inner.http_client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(InspectorError::HttpStatus { context, status });
        }

        let max_age = parse_cache_control(response.headers());

        let too_large = || InspectorError::ResponseTooLarge {
            context,
            max: MAX_RESPONSE_BYTES,
        };
        if response.content_length().is_some_and(|len| len > MAX_RESPONSE_BYTES as u64) {
            return Err(too_large());
        }
        let mut body = Vec::new();
        while let Some(chunk) = response.chunk().await? {
            if body.len() + chunk.len() > MAX_RESPONSE_BYTES {
                return Err(too_large());
            }
            body.extend_from_slice(&chunk);
        }

        Ok((body, max_age))
    }
}

/// Parses the `Cache-Control` header to determine the TTL.
fn parse_cache_control(headers: &reqwest::header::HeaderMap) -> Option<Duration> {
    headers
        .get(reqwest::header::CACHE_CONTROL)?
        .to_str()
        .ok()?
        .split(',')
        .find_map(|part| {
            part.trim()
                .strip_prefix("max-age=")?
                .parse::<u64>()
                .ok()
                .map(Duration::from_secs)
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::{HeaderMap, HeaderValue, CACHE_CONTROL};

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CACHE_CONTROL, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn reads_max_age() {
        assert_eq!(
            parse_cache_control(&headers("public, max-age=3600, must-revalidate")),
            Some(Duration::from_secs(3600))
        );
        assert_eq!(parse_cache_control(&headers("max-age=60")), Some(Duration::from_secs(60)));
    }

    #[test]
    fn ignores_missing_or_malformed_max_age() {
        assert_eq!(parse_cache_control(&HeaderMap::new()), None);
        assert_eq!(parse_cache_control(&headers("no-cache")), None);
        assert_eq!(parse_cache_control(&headers("max-age=soon")), None);
    }

    #[tokio::test]
    async fn inline_source_is_parsed_without_network() {
        let client = JwksClient::new(&HttpDetails::default()).unwrap();
        let source = KeySourceConfig::Inline(r#"{"keys":[{"kty":"oct","kid":"a","k":"c2VjcmV0"}]}"#.to_string());
        let jwks = client.resolve(&source).await.unwrap();
        assert_eq!(jwks.keys.len(), 1);
    }
}
