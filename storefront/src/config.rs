//! Synchronisation settings loaded via OrthoConfig.
//!
//! Values are layered from CLI flags, `STOREFRONT_*` environment variables
//! and optional configuration files. They are read once at startup.

use std::path::PathBuf;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use url::Url;

use crate::domain::{KeyValidationError, UserId};

const DEFAULT_CACHE_DIR: &str = ".storefront-cache";

/// Errors raised while interpreting loaded settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// The backend URL was not configured.
    #[error("remote_url is required (set STOREFRONT_REMOTE_URL or --remote-url)")]
    MissingRemoteUrl,
    /// A URL setting could not be parsed.
    #[error("{setting} is not a valid URL: {source}")]
    InvalidUrl {
        setting: &'static str,
        #[source]
        source: url::ParseError,
    },
    /// The configured user identifier is malformed.
    #[error("user_id is invalid: {0}")]
    InvalidUserId(#[from] KeyValidationError),
}

/// Configuration for one synchronisation session.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "STOREFRONT")]
pub struct SyncSettings {
    /// Base URL of the document backend.
    pub remote_url: Option<String>,
    /// Directory holding the local cache.
    pub cache_dir: Option<PathBuf>,
    /// URL probed for connectivity; defaults to `remote_url`.
    pub probe_url: Option<String>,
    /// Connectivity probe timeout in milliseconds.
    #[ortho_config(default = 3000)]
    pub probe_timeout_ms: u64,
    /// Backend request timeout in milliseconds.
    #[ortho_config(default = 10000)]
    pub request_timeout_ms: u64,
    /// Start offline without probing.
    #[ortho_config(default = false)]
    pub force_offline: bool,
    /// Signed-in user, if any.
    pub user_id: Option<String>,
    /// Emit JSON log lines instead of human-readable ones.
    #[ortho_config(default = false)]
    pub log_json: bool,
}

impl SyncSettings {
    /// Parsed backend base URL.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::MissingRemoteUrl`] when unset, or
    /// [`SettingsError::InvalidUrl`] when it does not parse.
    pub fn remote_url(&self) -> Result<Url, SettingsError> {
        let raw = self
            .remote_url
            .as_deref()
            .ok_or(SettingsError::MissingRemoteUrl)?;
        parse_url("remote_url", raw)
    }

    /// Parsed probe URL, falling back to the backend base URL.
    ///
    /// # Errors
    ///
    /// Propagates the same errors as [`Self::remote_url`].
    pub fn probe_url(&self) -> Result<Url, SettingsError> {
        match self.probe_url.as_deref() {
            Some(raw) => parse_url("probe_url", raw),
            None => self.remote_url(),
        }
    }

    /// Cache directory, falling back to `.storefront-cache`.
    pub fn cache_dir(&self) -> PathBuf {
        self.cache_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CACHE_DIR))
    }

    /// Time the connectivity check may take before the session starts offline.
    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }

    /// Per-request timeout for backend calls.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Validated signed-in user.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::InvalidUserId`] for blank or padded values.
    pub fn user_id(&self) -> Result<Option<UserId>, SettingsError> {
        self.user_id
            .clone()
            .map(UserId::new)
            .transpose()
            .map_err(SettingsError::from)
    }
}

fn parse_url(setting: &'static str, raw: &str) -> Result<Url, SettingsError> {
    Url::parse(raw).map_err(|source| SettingsError::InvalidUrl { setting, source })
}

#[cfg(test)]
mod tests {
    //! Unit tests for settings parsing.

    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    const VARS: [&str; 8] = [
        "STOREFRONT_REMOTE_URL",
        "STOREFRONT_CACHE_DIR",
        "STOREFRONT_PROBE_URL",
        "STOREFRONT_PROBE_TIMEOUT_MS",
        "STOREFRONT_REQUEST_TIMEOUT_MS",
        "STOREFRONT_FORCE_OFFLINE",
        "STOREFRONT_USER_ID",
        "STOREFRONT_LOG_JSON",
    ];

    fn load_from_empty_args() -> SyncSettings {
        SyncSettings::load_from_iter([OsString::from("storefront-sync")])
            .expect("config should load")
    }

    fn env_with(overrides: &[(&str, &str)]) -> Vec<(&'static str, Option<String>)> {
        VARS.iter()
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
    fn default_values_are_used_when_missing() {
        let _guard = lock_env(env_with(&[]));

        let settings = load_from_empty_args();
        assert_eq!(settings.cache_dir(), PathBuf::from(DEFAULT_CACHE_DIR));
        assert_eq!(settings.probe_timeout(), Duration::from_millis(3000));
        assert_eq!(settings.request_timeout(), Duration::from_millis(10000));
        assert!(!settings.force_offline);
        assert!(!settings.log_json);
        assert!(settings.user_id().expect("no user").is_none());
        assert!(matches!(
            settings.remote_url(),
            Err(SettingsError::MissingRemoteUrl)
        ));
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env(env_with(&[
            ("STOREFRONT_REMOTE_URL", "https://api.shop.test/v1"),
            ("STOREFRONT_CACHE_DIR", "/tmp/storefront"),
            ("STOREFRONT_PROBE_TIMEOUT_MS", "750"),
            ("STOREFRONT_FORCE_OFFLINE", "true"),
            ("STOREFRONT_USER_ID", "user-42"),
        ]));

        let settings = load_from_empty_args();
        let remote = settings.remote_url().expect("remote url");
        assert_eq!(remote.as_str(), "https://api.shop.test/v1");
        assert_eq!(settings.probe_url().expect("probe url"), remote);
        assert_eq!(settings.cache_dir(), PathBuf::from("/tmp/storefront"));
        assert_eq!(settings.probe_timeout(), Duration::from_millis(750));
        assert!(settings.force_offline);
        assert_eq!(
            settings.user_id().expect("valid user").map(String::from),
            Some("user-42".to_owned())
        );
    }

    #[rstest]
    fn malformed_urls_are_reported_by_setting_name() {
        let _guard = lock_env(env_with(&[
            ("STOREFRONT_REMOTE_URL", "https://api.shop.test"),
            ("STOREFRONT_PROBE_URL", "not a url"),
        ]));

        let err = load_from_empty_args()
            .probe_url()
            .expect_err("invalid probe url");
        assert!(matches!(
            err,
            SettingsError::InvalidUrl {
                setting: "probe_url",
                ..
            }
        ));
    }
}
