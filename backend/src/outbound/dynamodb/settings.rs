//! Document store configuration loaded via OrthoConfig.

use ortho_config::OrthoConfig;
use serde::Deserialize;

use crate::domain::DomainError;

const DEFAULT_USERS_TABLE: &str = "users";
const DEFAULT_RESULTS_TABLE: &str = "lotofacil_results";
const DEFAULT_USERS_EMAIL_INDEX: &str = "email-index";

/// Raw `STORE_*` settings.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "STORE")]
pub struct StoreSettings {
    /// Region the tables live in.
    pub region: Option<String>,
    /// Static access key id.
    pub access_key_id: Option<String>,
    /// Static secret access key.
    pub secret_access_key: Option<String>,
    /// Endpoint override, e.g. a local emulator.
    pub endpoint_url: Option<String>,
    pub users_table: Option<String>,
    pub results_table: Option<String>,
    /// Secondary index on the users table keyed by `email`.
    pub users_email_index: Option<String>,
}

/// Validated connection parameters.
#[derive(Clone, PartialEq, Eq)]
pub struct StoreConnection {
    pub region: String,
    pub access_key_id: String,
    pub secret_access_key: String,
    pub endpoint_url: Option<String>,
}

impl std::fmt::Debug for StoreConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreConnection")
            .field("region", &self.region)
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .field("endpoint_url", &self.endpoint_url)
            .finish()
    }
}

/// Table names used by the repositories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreTables {
    pub users: String,
    pub results: String,
    pub users_email_index: String,
}

impl StoreSettings {
    /// Resolve connection parameters, failing on the first missing value.
    pub fn connection(&self) -> Result<StoreConnection, DomainError> {
        Ok(StoreConnection {
            region: required(self.region.as_deref(), "STORE_REGION")?,
            access_key_id: required(self.access_key_id.as_deref(), "STORE_ACCESS_KEY_ID")?,
            secret_access_key: required(
                self.secret_access_key.as_deref(),
                "STORE_SECRET_ACCESS_KEY",
            )?,
            endpoint_url: self
                .endpoint_url
                .as_deref()
                .map(str::trim)
                .filter(|url| !url.is_empty())
                .map(str::to_owned),
        })
    }

    /// Resolve table names, falling back to the defaults.
    pub fn tables(&self) -> Result<StoreTables, DomainError> {
        Ok(StoreTables {
            users: table_name(self.users_table.as_deref(), DEFAULT_USERS_TABLE, "STORE_USERS_TABLE")?,
            results: table_name(
                self.results_table.as_deref(),
                DEFAULT_RESULTS_TABLE,
                "STORE_RESULTS_TABLE",
            )?,
            users_email_index: table_name(
                self.users_email_index.as_deref(),
                DEFAULT_USERS_EMAIL_INDEX,
                "STORE_USERS_EMAIL_INDEX",
            )?,
        })
    }
}

fn required(value: Option<&str>, variable: &str) -> Result<String, DomainError> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_owned)
        .ok_or_else(|| DomainError::configuration(format!("{variable} must be set")))
}

fn table_name(value: Option<&str>, default: &str, variable: &str) -> Result<String, DomainError> {
    match value {
        None => Ok(default.to_owned()),
        Some(name) if name.trim().is_empty() => Err(DomainError::configuration(format!(
            "{variable} must not be blank"
        ))),
        Some(name) => Ok(name.trim().to_owned()),
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for store configuration parsing.

    use super::*;
    use std::ffi::OsString;

    use crate::domain::ErrorKind;
    use env_lock::lock_env;
    use rstest::rstest;

    const VARIABLES: [&str; 7] = [
        "STORE_REGION",
        "STORE_ACCESS_KEY_ID",
        "STORE_SECRET_ACCESS_KEY",
        "STORE_ENDPOINT_URL",
        "STORE_USERS_TABLE",
        "STORE_RESULTS_TABLE",
        "STORE_USERS_EMAIL_INDEX",
    ];

    fn load_from_empty_args() -> StoreSettings {
        StoreSettings::load_from_iter([OsString::from("backend")]).expect("config should load")
    }

    fn env_with(overrides: &[(&str, &str)]) -> Vec<(&'static str, Option<String>)> {
        VARIABLES
            .iter()
            .map(|name| {
                let value = overrides
                    .iter()
                    .find(|(key, _)| key == name)
                    .map(|(_, value)| (*value).to_owned());
                (*name, value)
            })
            .collect()
    }

    #[rstest]
    fn complete_environment_resolves() {
        let _guard = lock_env(env_with(&[
            ("STORE_REGION", "sa-east-1"),
            ("STORE_ACCESS_KEY_ID", "AKIDEXAMPLE"),
            ("STORE_SECRET_ACCESS_KEY", "hunter2"),
            ("STORE_ENDPOINT_URL", "http://localhost:8000"),
            ("STORE_RESULTS_TABLE", "results_v2"),
        ]));

        let settings = load_from_empty_args();
        let connection = settings.connection().expect("complete settings");
        assert_eq!(connection.region, "sa-east-1");
        assert_eq!(connection.endpoint_url.as_deref(), Some("http://localhost:8000"));
        assert!(!format!("{connection:?}").contains("hunter2"));

        let tables = settings.tables().expect("valid tables");
        assert_eq!(tables.users, DEFAULT_USERS_TABLE);
        assert_eq!(tables.results, "results_v2");
        assert_eq!(tables.users_email_index, DEFAULT_USERS_EMAIL_INDEX);
    }

    #[rstest]
    #[case("STORE_REGION")]
    #[case("STORE_ACCESS_KEY_ID")]
    #[case("STORE_SECRET_ACCESS_KEY")]
    fn missing_connection_values_fail_fast(#[case] missing: &str) {
        let present: Vec<(&str, &str)> = [
            ("STORE_REGION", "sa-east-1"),
            ("STORE_ACCESS_KEY_ID", "AKIDEXAMPLE"),
            ("STORE_SECRET_ACCESS_KEY", "secret"),
        ]
        .into_iter()
        .filter(|(name, _)| *name != missing)
        .collect();
        let _guard = lock_env(env_with(&present));

        let err = load_from_empty_args()
            .connection()
            .expect_err("missing value rejected");
        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert!(err.message().contains(missing));
    }

    #[rstest]
    fn blank_table_names_are_rejected() {
        let settings = StoreSettings {
            region: None,
            access_key_id: None,
            secret_access_key: None,
            endpoint_url: None,
            users_table: Some("  ".into()),
            results_table: None,
            users_email_index: None,
        };
        let err = settings.tables().expect_err("blank table rejected");
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }
}
