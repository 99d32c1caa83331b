//! Cache configuration loaded via OrthoConfig.

use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use url::Url;

use crate::domain::DomainError;

/// Raw `CACHE_*` settings.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "CACHE")]
pub struct CacheSettings {
    pub host: Option<String>,
    pub port: Option<u16>,
    /// Optional `AUTH` password.
    pub password: Option<String>,
    /// Expiry applied when a write names none; `0` disables it.
    pub default_ttl_seconds: Option<u64>,
}

/// Validated connection parameters for the Redis transport.
#[derive(Clone, PartialEq, Eq)]
pub struct CacheConnection {
    url: Url,
    default_ttl: Option<Duration>,
}

impl CacheConnection {
    /// `redis://` URL, including the password when one is configured.
    pub fn url(&self) -> &str {
        self.url.as_str()
    }

    pub fn default_ttl(&self) -> Option<Duration> {
        self.default_ttl
    }
}

impl std::fmt::Debug for CacheConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut redacted = self.url.clone();
        if redacted.password().is_some() && redacted.set_password(Some("<redacted>")).is_err() {
            return f.write_str("CacheConnection(..)");
        }
        f.debug_struct("CacheConnection")
            .field("url", &redacted.as_str())
            .field("default_ttl", &self.default_ttl)
            .finish()
    }
}

impl CacheSettings {
    /// Resolve the connection, failing when host or port is absent.
    pub fn connection(&self) -> Result<CacheConnection, DomainError> {
        let host = self
            .host
            .as_deref()
            .map(str::trim)
            .filter(|host| !host.is_empty())
            .ok_or_else(|| DomainError::configuration("CACHE_HOST must be set"))?;
        let port = self
            .port
            .ok_or_else(|| DomainError::configuration("CACHE_PORT must be set"))?;
        let mut url = Url::parse(&format!("redis://{host}:{port}"))
            .map_err(|err| DomainError::configuration(format!("invalid cache address: {err}")))?;
        if let Some(password) = self.password.as_deref().filter(|pw| !pw.is_empty()) {
            url.set_password(Some(password))
                .map_err(|()| DomainError::configuration("cache password cannot be encoded"))?;
        }
        Ok(CacheConnection {
            url,
            default_ttl: self
                .default_ttl_seconds
                .filter(|seconds| *seconds > 0)
                .map(Duration::from_secs),
        })
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for cache configuration parsing.

    use super::*;
    use std::ffi::OsString;

    use crate::domain::ErrorKind;
    use env_lock::lock_env;
    use rstest::rstest;

    fn load_from_empty_args() -> CacheSettings {
        CacheSettings::load_from_iter([OsString::from("backend")]).expect("config should load")
    }

    #[rstest]
    fn environment_resolves_to_a_redis_url() {
        let _guard = lock_env([
            ("CACHE_HOST", Some("cache.internal".to_owned())),
            ("CACHE_PORT", Some("6380".to_owned())),
            ("CACHE_PASSWORD", Some("p@ss".to_owned())),
            ("CACHE_DEFAULT_TTL_SECONDS", Some("300".to_owned())),
        ]);

        let connection = load_from_empty_args().connection().expect("complete settings");
        assert_eq!(connection.url(), "redis://:p%40ss@cache.internal:6380");
        assert_eq!(connection.default_ttl(), Some(Duration::from_secs(300)));
        assert!(!format!("{connection:?}").contains("p%40ss"));
    }

    #[rstest]
    #[case(None, Some("6379"), "CACHE_HOST")]
    #[case(Some("localhost"), None, "CACHE_PORT")]
    fn missing_host_or_port_fails_fast(
        #[case] host: Option<&str>,
        #[case] port: Option<&str>,
        #[case] variable: &str,
    ) {
        let _guard = lock_env([
            ("CACHE_HOST", host.map(str::to_owned)),
            ("CACHE_PORT", port.map(str::to_owned)),
            ("CACHE_PASSWORD", None),
            ("CACHE_DEFAULT_TTL_SECONDS", None),
        ]);

        let err = load_from_empty_args()
            .connection()
            .expect_err("incomplete settings rejected");
        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert!(err.message().contains(variable));
    }

    #[rstest]
    fn zero_ttl_means_no_default_expiry() {
        let settings = CacheSettings {
            host: Some("localhost".into()),
            port: Some(6379),
            password: None,
            default_ttl_seconds: Some(0),
        };
        let connection = settings.connection().expect("valid");
        assert_eq!(connection.url(), "redis://localhost:6379");
        assert_eq!(connection.default_ttl(), None);
    }
}
