use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

const CONFIG_FILE_NAME: &str = "apbdui.toml";
const ENV_PREFIX: &str = "APBDUI";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum Backend {
    /// SQLite file in the user data directory.
    Local,
    /// PostgREST table (Supabase).
    Remote,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum AuthMode {
    /// Compare against `auth.username` / `auth.password`.
    Static,
    /// Ask the remote store's auth service.
    Delegated,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub(crate) struct Settings {
    pub(crate) backend: Backend,
    pub(crate) log_level: String,
    pub(crate) remote: RemoteSettings,
    pub(crate) local: LocalSettings,
    pub(crate) auth: AuthSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub(crate) struct RemoteSettings {
    pub(crate) url: String,
    pub(crate) anon_key: String,
    pub(crate) table: String,
    pub(crate) timeout_secs: u64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub(crate) struct LocalSettings {
    /// Database file. Defaults to `apbdui.db` in the data directory.
    pub(crate) path: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub(crate) struct AuthSettings {
    pub(crate) mode: AuthMode,
    pub(crate) username: String,
    pub(crate) password: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            backend: Backend::Local,
            log_level: "info".to_string(),
            remote: RemoteSettings::default(),
            local: LocalSettings::default(),
            auth: AuthSettings::default(),
        }
    }
}

impl Default for RemoteSettings {
    fn default() -> Self {
        Self {
            url: String::new(),
            anon_key: String::new(),
            table: "apbd_data".to_string(),
            timeout_secs: 15,
        }
    }
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            mode: AuthMode::Static,
            username: "admin".to_string(),
            password: "admin123".to_string(),
        }
    }
}

impl Settings {
    /// Layer the user config file, an explicit `--config` file and `APBDUI_*`
    /// environment variables (nested keys use `__`, e.g. `APBDUI_REMOTE__URL`).
    pub(crate) fn load(config_dir: Option<&Path>, explicit: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder();
        if let Some(dir) = config_dir {
            let default_file = dir.join(CONFIG_FILE_NAME);
            builder = builder.add_source(config::File::from(default_file).required(false));
        }
        if let Some(path) = explicit {
            builder = builder.add_source(config::File::from(path.to_path_buf()).required(true));
        }
        builder = builder.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );
        let settings: Settings = builder
            .build()
            .context("Failed to read configuration")?
            .try_deserialize()
            .context("Invalid configuration")?;
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn test_defaults() {
        let s = Settings::default();
        assert_eq!(s.backend, Backend::Local);
        assert_eq!(s.remote.table, "apbd_data");
        assert_eq!(s.auth.mode, AuthMode::Static);
        assert_eq!(s.auth.username, "admin");
        assert_eq!(s.auth.password, "admin123");
    }

    #[test]
    fn test_load_without_files_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let s = Settings::load(Some(dir.path()), None).unwrap();
        assert_eq!(s.log_level, "info");
        assert!(s.local.path.is_none());
    }

    #[test]
    fn test_load_user_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            r#"
backend = "remote"

[remote]
url = "https://demo.supabase.co"
anon_key = "k"

[auth]
mode = "delegated"
"#,
        )
        .unwrap();
        let s = Settings::load(Some(dir.path()), None).unwrap();
        assert_eq!(s.backend, Backend::Remote);
        assert_eq!(s.remote.url, "https://demo.supabase.co");
        assert_eq!(s.remote.table, "apbd_data");
        assert_eq!(s.remote.timeout_secs, 15);
        assert_eq!(s.auth.mode, AuthMode::Delegated);
    }

    #[test]
    fn test_explicit_file_overrides_user_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE_NAME), "log_level = \"warn\"\n").unwrap();
        let explicit = dir.path().join("other.toml");
        std::fs::write(&explicit, "log_level = \"debug\"\n").unwrap();
        let s = Settings::load(Some(dir.path()), Some(&explicit)).unwrap();
        assert_eq!(s.log_level, "debug");
    }

    #[test]
    fn test_missing_explicit_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        assert!(Settings::load(None, Some(&missing)).is_err());
    }

    #[test]
    fn test_bad_backend_is_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE_NAME), "backend = \"cloud\"\n").unwrap();
        assert!(Settings::load(Some(dir.path()), None).is_err());
    }
}
