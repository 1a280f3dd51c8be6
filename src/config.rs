use std::path::PathBuf;

use thiserror::Error;

/// Application-level constants
pub const APP_NAME: &str = "RxNotes";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Environment variables read by [`Settings::from_env`].
pub const ENV_SERVER: &str = "RXNOTES_SERVER";
pub const ENV_MEDICINES: &str = "RXNOTES_MEDICINES";
pub const ENV_TIMEOUT_SECS: &str = "RXNOTES_TIMEOUT_SECS";

pub const DEFAULT_SERVER_URL: &str = "http://localhost:8000";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed medicine list {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Log filter used when `RUST_LOG` is not set.
pub fn default_log_filter() -> &'static str {
    if cfg!(debug_assertions) {
        "rxnotes=debug,rxnotes_lib=debug,warn"
    } else {
        "rxnotes=info,rxnotes_lib=info,warn"
    }
}

/// Application data directory: ~/RxNotes/. `None` when no home directory
/// can be determined.
pub fn app_data_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(APP_NAME))
}

/// Default location of a user-supplied medicine list.
pub fn default_medicines_path() -> Option<PathBuf> {
    app_data_dir().map(|dir| dir.join("medicines.json"))
}

/// Runtime settings for the CLI and the submission client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Base URL of the persistence server.
    pub server_url: String,
    /// JSON medicine list to use instead of the built-in one.
    pub medicines_path: Option<PathBuf>,
    pub timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.to_string(),
            medicines_path: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl Settings {
    pub fn from_env() -> Self {
        let mut settings = Self::from_lookup(|key| std::env::var(key).ok());
        if settings.medicines_path.is_none() {
            settings.medicines_path = default_medicines_path().filter(|p| p.is_file());
        }
        settings
    }

    /// Build settings from an arbitrary key lookup. Blank values count as unset;
    /// an unparseable timeout falls back to the default.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let server_url = get(ENV_SERVER)
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_SERVER_URL.to_string());

        let timeout_secs = match get(ENV_TIMEOUT_SECS) {
            Some(raw) => raw.parse().unwrap_or_else(|_| {
                tracing::warn!(value = %raw, "Ignoring invalid {ENV_TIMEOUT_SECS}");
                DEFAULT_TIMEOUT_SECS
            }),
            None => DEFAULT_TIMEOUT_SECS,
        };

        Self {
            server_url,
            medicines_path: get(ENV_MEDICINES).map(PathBuf::from),
            timeout_secs,
        }
    }
}
