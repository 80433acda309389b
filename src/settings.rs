// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Runtime configuration.
//!
//! Sources, later ones winning:
//!
//! 1. built-in defaults,
//! 2. `pocketbook.toml` in the platform config directory, or the file given
//!    with `--config` (which then must exist),
//! 3. `POCKETBOOK_*` environment variables, `__` separating nested keys
//!    (`POCKETBOOK_REMOTE__URL`).

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    #[default]
    Sqlite,
    Remote,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SqliteSettings {
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RemoteSettings {
    pub url: String,
    pub api_key: String,
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_timeout() -> u64 {
    15
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Owner id used when `--user` is not given.
    pub user: Option<String>,
    pub currency: String,
    pub log_level: String,
    pub backend: Backend,
    pub sqlite: SqliteSettings,
    pub remote: Option<RemoteSettings>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            user: None,
            currency: "BRL".to_string(),
            log_level: "warn".to_string(),
            backend: Backend::Sqlite,
            sqlite: SqliteSettings::default(),
            remote: None,
        }
    }
}

impl Settings {
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();
        match explicit {
            Some(path) => {
                builder = builder.add_source(File::from(path).required(true));
            }
            None => {
                if let Some(path) = default_config_file() {
                    builder = builder.add_source(File::from(path).required(false));
                }
            }
        }
        builder = builder.add_source(
            Environment::with_prefix("POCKETBOOK")
                .prefix_separator("_")
                .separator("__"),
        );
        let settings: Settings = builder
            .build()
            .context("Failed to read configuration")?
            .try_deserialize()
            .context("Invalid configuration")?;
        tracing::debug!(backend = ?settings.backend, "configuration loaded");
        Ok(settings)
    }

    pub fn database_path(&self) -> Result<PathBuf> {
        match &self.sqlite.path {
            Some(p) => Ok(p.clone()),
            None => crate::db::db_path(),
        }
    }
}

pub fn default_config_file() -> Option<PathBuf> {
    crate::db::project_dirs()
        .ok()
        .map(|p| p.config_dir().join("pocketbook.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn explicit_file_overrides_defaults() {
        let mut f = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            f,
            r#"
user = "ana"
currency = "EUR"
backend = "remote"

[remote]
url = "https://example.test"
api_key = "anon"
"#
        )
        .unwrap();
        let s = Settings::load(Some(f.path())).unwrap();
        assert_eq!(s.user.as_deref(), Some("ana"));
        assert_eq!(s.currency, "EUR");
        assert_eq!(s.backend, Backend::Remote);
        let remote = s.remote.unwrap();
        assert_eq!(remote.url, "https://example.test");
        assert_eq!(remote.timeout_secs, 15);
        assert_eq!(s.log_level, "warn");
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        assert!(Settings::load(Some(Path::new("/nonexistent/pocketbook.toml"))).is_err());
    }
}
