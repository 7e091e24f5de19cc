// src/config.rs

use crate::error::InspectorError;
use crate::validator::Profile;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

/// Contains the settings applied while validating a token's claims.
#[derive(Clone, Debug)]
pub struct ValidationDetails {
    /// The rule set used to classify and validate tokens.
    pub profile: Profile,
    /// The tolerance for clock skew when evaluating `exp` and `nbf`.
    /// Defaults to zero so that an `exp` one second in the past is reported as expired.
    pub leeway: Duration,
    /// Tokens issued longer ago than this get an extra `iat` warning.
    /// Defaults to 24 hours.
    pub max_token_age: Duration,
}

impl Default for ValidationDetails {
    fn default() -> Self {
        Self {
            profile: Profile::OAuth,
            leeway: Duration::ZERO,
            max_token_age: Duration::from_secs(24 * 60 * 60),
        }
    }
}

/// Defines where signature verification keys come from.
#[derive(Clone, Debug, PartialEq)]
pub enum KeySourceConfig {
    /// Keys are discovered through the issuer's `.well-known/openid-configuration` document.
    Discovery { issuer_url: Url },
    /// Keys are fetched directly from a JWKS endpoint.
    JwksUri(Url),
    /// A JWKS document supplied by the user, kept as text and parsed at inspection time.
    Inline(String),
}

/// HTTP settings for discovery and JWKS requests.
#[derive(Clone, Debug)]
pub struct HttpDetails {
    pub timeout: Duration,
    /// How long a fetched JWKS is cached when the response has no `Cache-Control: max-age`.
    pub cache_ttl: Duration,
}

impl Default for HttpDetails {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            cache_ttl: Duration::from_secs(5 * 60),
        }
    }
}

/// The main configuration for the token inspector.
///
/// Construct it with [`ConfigBuilder`]; `InspectorConfig::default()` gives an
/// offline inspector with the OAuth profile and no key source.
#[derive(Clone, Debug, Default)]
pub struct InspectorConfig {
    pub validation: ValidationDetails,
    /// Where verification keys come from. `None` skips signature verification.
    pub key_source: Option<KeySourceConfig>,
    pub http: HttpDetails,
}

/// On-disk representation of [`InspectorConfig`], read from YAML.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub profile: Option<Profile>,
    pub issuer_url: Option<String>,
    pub jwks_uri: Option<String>,
    pub jwks_file: Option<PathBuf>,
    pub leeway_seconds: Option<u64>,
    pub max_token_age_seconds: Option<u64>,
    pub http_timeout_seconds: Option<u64>,
    pub cache_ttl_seconds: Option<u64>,
}

impl FileConfig {
    pub fn from_yaml_str(text: &str) -> Result<Self, InspectorError> {
        Ok(serde_yaml::from_str(text)?)
    }

    pub fn load(path: &Path) -> Result<Self, InspectorError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&text)
    }
}

/// A builder for creating an `InspectorConfig`.
///
/// At most one key source may be configured: an issuer for discovery, a direct
/// JWKS URI, or an inline JWKS document.
#[derive(Default)]
pub struct ConfigBuilder {
    issuer_url: Option<Url>,
    jwks_uri: Option<Url>,
    inline_jwks: Option<String>,
    validation: ValidationDetails,
    http: HttpDetails,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a builder from a parsed configuration file.
    ///
    /// A `jwks_file` is read eagerly so that a missing file is reported before
    /// any token is inspected.
    pub fn from_file_config(file: FileConfig) -> Result<Self, InspectorError> {
        let mut builder = Self::new();
        if let Some(profile) = file.profile {
            builder = builder.profile(profile);
        }
        if let Some(issuer) = &file.issuer_url {
            builder = builder.issuer_url(issuer)?;
        }
        if let Some(uri) = &file.jwks_uri {
            builder = builder.jwks_uri(uri)?;
        }
        if let Some(path) = &file.jwks_file {
            let text = std::fs::read_to_string(path)?;
            builder = builder.inline_jwks(text)?;
        }
        if let Some(secs) = file.leeway_seconds {
            builder = builder.leeway(Duration::from_secs(secs));
        }
        if let Some(secs) = file.max_token_age_seconds {
            builder = builder.max_token_age(Duration::from_secs(secs));
        }
        if let Some(secs) = file.http_timeout_seconds {
            builder = builder.http_timeout(Duration::from_secs(secs));
        }
        if let Some(secs) = file.cache_ttl_seconds {
            builder = builder.cache_ttl(Duration::from_secs(secs));
        }
        Ok(builder)
    }

    pub fn profile(mut self, profile: Profile) -> Self {
        self.validation.profile = profile;
        self
    }

    /// Sets the issuer whose discovery document locates the JWKS.
    ///
    /// # Arguments
    ///
    /// * `url` - The issuer URL, e.g., "https://accounts.google.com".
    pub fn issuer_url(mut self, url: &str) -> Result<Self, InspectorError> {
        if self.jwks_uri.is_some() || self.inline_jwks.is_some() {
            return Err(InspectorError::AmbiguousKeySource(
                "Cannot set an issuer URL when another key source is already configured.".to_string(),
            ));
        }
        self.issuer_url = Some(parse_http_url(url)?);
        Ok(self)
    }

    /// Sets an explicit JWKS URI, bypassing OIDC discovery.
    pub fn jwks_uri(mut self, url: &str) -> Result<Self, InspectorError> {
        if self.issuer_url.is_some() || self.inline_jwks.is_some() {
            return Err(InspectorError::AmbiguousKeySource(
                "Cannot set a JWKS URI when another key source is already configured.".to_string(),
            ));
        }
        self.jwks_uri = Some(parse_http_url(url)?);
        Ok(self)
    }

    /// Uses a JWKS document supplied as text.
    pub fn inline_jwks(mut self, jwks: String) -> Result<Self, InspectorError> {
        if self.issuer_url.is_some() || self.jwks_uri.is_some() {
            return Err(InspectorError::AmbiguousKeySource(
                "Cannot use an inline JWKS when another key source is already configured.".to_string(),
            ));
        }
        self.inline_jwks = Some(jwks);
        Ok(self)
    }

    pub fn leeway(mut self, leeway: Duration) -> Self {
        self.validation.leeway = leeway;
        self
    }

    pub fn max_token_age(mut self, age: Duration) -> Self {
        self.validation.max_token_age = age;
        self
    }

    pub fn http_timeout(mut self, timeout: Duration) -> Self {
        self.http.timeout = timeout;
        self
    }

    pub fn cache_ttl(mut self, ttl: Duration) -> Self {
        self.http.cache_ttl = ttl;
        self
    }

    /// Consumes the builder and returns an `InspectorConfig`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP timeout is zero or more than one key source is set.
    pub fn build(self) -> Result<InspectorConfig, InspectorError> {
        if self.http.timeout.is_zero() {
            return Err(InspectorError::InvalidConfiguration(
                "http timeout must be greater than zero".to_string(),
            ));
        }

        let key_source = match (self.issuer_url, self.jwks_uri, self.inline_jwks) {
            (None, None, None) => None,
            (Some(issuer_url), None, None) => Some(KeySourceConfig::Discovery { issuer_url }),
            (None, Some(uri), None) => Some(KeySourceConfig::JwksUri(uri)),
            (None, None, Some(text)) => Some(KeySourceConfig::Inline(text)),
            _ => {
                return Err(InspectorError::AmbiguousKeySource(
                    "More than one key source configured.".to_string(),
                ))
            }
        };

        Ok(InspectorConfig {
            validation: self.validation,
            key_source,
            http: self.http,
        })
    }
}

fn parse_http_url(url: &str) -> Result<Url, InspectorError> {
    let parsed = Url::parse(url.trim()).map_err(|e| InspectorError::InvalidUrl(e.to_string()))?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        other => Err(InspectorError::InvalidUrl(format!(
            "unsupported scheme '{other}', expected http or https"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_offline_oauth() {
        let config = ConfigBuilder::new().build().unwrap();
        assert!(config.key_source.is_none());
        assert_eq!(config.validation.profile, Profile::OAuth);
        assert_eq!(config.validation.leeway, Duration::ZERO);
        assert_eq!(config.validation.max_token_age, Duration::from_secs(86_400));
        assert_eq!(config.http.timeout, Duration::from_secs(10));
    }

    #[test]
    fn issuer_becomes_discovery_source() {
        let config = ConfigBuilder::new()
            .issuer_url("https://login.example.com/tenant")
            .unwrap()
            .build()
            .unwrap();
        match config.key_source {
            Some(KeySourceConfig::Discovery { issuer_url }) => {
                assert_eq!(issuer_url.as_str(), "https://login.example.com/tenant")
            }
            other => panic!("unexpected key source: {other:?}"),
        }
    }

    #[test]
    fn key_sources_are_mutually_exclusive() {
        let result = ConfigBuilder::new()
            .jwks_uri("https://example.com/jwks.json")
            .unwrap()
            .issuer_url("https://example.com");
        assert!(matches!(result, Err(InspectorError::AmbiguousKeySource(_))));

        let result = ConfigBuilder::new()
            .inline_jwks("{\"keys\":[]}".to_string())
            .unwrap()
            .jwks_uri("https://example.com/jwks.json");
        assert!(matches!(result, Err(InspectorError::AmbiguousKeySource(_))));
    }

    #[test]
    fn rejects_non_http_urls() {
        assert!(matches!(
            ConfigBuilder::new().issuer_url("ftp://example.com"),
            Err(InspectorError::InvalidUrl(_))
        ));
        assert!(matches!(
            ConfigBuilder::new().jwks_uri("not a url"),
            Err(InspectorError::InvalidUrl(_))
        ));
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let result = ConfigBuilder::new().http_timeout(Duration::ZERO).build();
        assert!(matches!(result, Err(InspectorError::InvalidConfiguration(_))));
    }

    #[test]
    fn file_config_seeds_builder() {
        let file = FileConfig::from_yaml_str(
            "profile: oidc\nissuer_url: https://id.example.com/\nleeway_seconds: 30\ncache_ttl_seconds: 60\n",
        )
        .unwrap();
        let config = ConfigBuilder::from_file_config(file).unwrap().build().unwrap();
        assert_eq!(config.validation.profile, Profile::Oidc);
        assert_eq!(config.validation.leeway, Duration::from_secs(30));
        assert_eq!(config.http.cache_ttl, Duration::from_secs(60));
        assert!(matches!(config.key_source, Some(KeySourceConfig::Discovery { .. })));
    }

    #[test]
    fn file_config_reads_jwks_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("jwks.json");
        std::fs::write(&path, "{\"keys\":[]}").unwrap();

        let file = FileConfig {
            jwks_file: Some(path),
            ..FileConfig::default()
        };
        let config = ConfigBuilder::from_file_config(file).unwrap().build().unwrap();
        assert_eq!(config.key_source, Some(KeySourceConfig::Inline("{\"keys\":[]}".to_string())));
    }

    #[test]
    fn file_config_rejects_unknown_fields() {
        assert!(matches!(
            FileConfig::from_yaml_str("listen_addr: 0.0.0.0:8080\n"),
            Err(InspectorError::ConfigFile(_))
        ));
    }
}
